/*! Multi-CAST corpus XML files

```text
<text>
  <file audio="mc_veraa_isam.wav">
    <unit uid="0001" start_time="0" end_time="1250">
      <utterance_id>…</utterance_id>
      <utterance>…</utterance>
      <utterance_translation>…</utterance_translation>
      <add_comments>…</add_comments>
      <annotations>
        <segment><gword/><gloss/><graid/><refind/><isnref/></segment>
        …
```

Units are decoded into [Unit]s, with one value per segment for each annotation tier.
!*/
use std::path::Path;

use quick_xml::events::{BytesStart, Event};

use crate::error::Error;
use crate::refind::{RefindMap, UNMARKED};

use super::xml::{attribute, local_name, Newline, SerializationPolicy, XmlDocument};

pub const POLICY: SerializationPolicy = SerializationPolicy {
    newline: Newline::CrLf,
    declaration: true,
};

const TIERS: [&str; 5] = ["gword", "gloss", "graid", "refind", "isnref"];
const UNIT_FIELDS: [&str; 5] = [
    "utterance_id",
    "utterance",
    "utterance_translation",
    "add_orthography",
    "add_comments",
];

/// Replace the local indices of all `refind` elements.
pub fn remap_refind(doc: &mut XmlDocument, map: &RefindMap, tid: &str) -> Result<usize, Error> {
    doc.update_texts(
        |path| path.last().map_or(false, |e| local_name(e) == "refind"),
        |value| {
            if value.is_empty() || value == UNMARKED {
                return Ok(None);
            }
            map.get(tid, value)
                .map(|id| Some(id.to_string()))
                .ok_or_else(|| Error::MissingReferent {
                    text: tid.to_string(),
                    refind: value.to_string(),
                })
        },
    )
}

/// Annotation tiers of a unit, one value per segment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tiers {
    pub gword: Vec<String>,
    pub gloss: Vec<String>,
    pub graid: Vec<String>,
    pub refind: Vec<String>,
    pub isnref: Vec<String>,
}

impl Tiers {
    fn push_segment(&mut self, segment: [Option<String>; 5]) {
        let [gword, gloss, graid, refind, isnref] =
            segment.map(|v| v.unwrap_or_else(|| UNMARKED.to_string()));
        self.gword.push(gword);
        self.gloss.push(gloss);
        self.graid.push(graid);
        self.refind.push(refind);
        self.isnref.push(isnref);
    }
}

/// An annotated clause unit.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Unit {
    pub uid: String,
    pub start_time: String,
    pub end_time: String,
    pub utterance_id: Option<String>,
    pub utterance: Option<String>,
    pub utterance_translation: Option<String>,
    pub add_orthography: Option<String>,
    pub add_comments: Option<String>,
    pub tiers: Tiers,
}

impl Unit {
    fn field(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "utterance_id" => Some(&mut self.utterance_id),
            "utterance" => Some(&mut self.utterance),
            "utterance_translation" => Some(&mut self.utterance_translation),
            "add_orthography" => Some(&mut self.add_orthography),
            "add_comments" => Some(&mut self.add_comments),
            _ => None,
        }
    }
}

/// The single recording of a corpus XML file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CorpusFile {
    pub audio: String,
    pub units: Vec<Unit>,
}

impl CorpusFile {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        Self::decode(&XmlDocument::from_path(path)?)
    }

    pub fn decode(doc: &XmlDocument) -> Result<Self, Error> {
        let mut decoder = Decoder::default();
        let mut stack: Vec<String> = Vec::new();
        for event in doc.events() {
            match event {
                Event::Start(e) => {
                    let name = local_name(e);
                    decoder.open(&stack, &name, e)?;
                    stack.push(name);
                }
                Event::Empty(e) => {
                    let name = local_name(e);
                    decoder.open(&stack, &name, e)?;
                    decoder.close(&stack, &name);
                }
                Event::End(_) => {
                    let name = stack.pop().unwrap_or_default();
                    decoder.close(&stack, &name);
                }
                Event::Text(t) => decoder.text(&t.unescape()?),
                Event::CData(t) => decoder.text(&String::from_utf8_lossy(t)),
                _ => (),
            }
        }
        decoder.finish()
    }
}

#[derive(Debug)]
enum Target {
    Unit(String),
    Tier(usize),
}

#[derive(Debug)]
struct Capture {
    depth: usize,
    target: Target,
    buf: String,
}

#[derive(Debug, Default)]
struct Decoder {
    texts: usize,
    files: usize,
    file: CorpusFile,
    unit: Option<Unit>,
    segment: Option<[Option<String>; 5]>,
    capture: Option<Capture>,
}

impl Decoder {
    fn open(&mut self, stack: &[String], name: &str, e: &BytesStart) -> Result<(), Error> {
        if let Some(capture) = &mut self.capture {
            if name == "br" {
                capture.buf.push('\n');
            }
            return Ok(());
        }

        let parent = stack.last().map(String::as_str);
        let target = match (parent, name) {
            (_, "text") => {
                self.texts += 1;
                None
            }
            (Some("text"), "file") => {
                self.files += 1;
                self.file.audio = attribute(e, "audio")?.unwrap_or_default();
                None
            }
            (Some("file"), "unit") => {
                self.unit = Some(Unit {
                    uid: attribute(e, "uid")?.unwrap_or_default(),
                    start_time: attribute(e, "start_time")?.unwrap_or_default(),
                    end_time: attribute(e, "end_time")?.unwrap_or_default(),
                    ..Default::default()
                });
                None
            }
            (Some("unit"), field) if self.unit.is_some() && UNIT_FIELDS.contains(&field) => {
                Some(Target::Unit(field.to_string()))
            }
            (Some("annotations"), "segment") if self.unit.is_some() => {
                self.segment = Some(Default::default());
                None
            }
            (Some("segment"), tier) if self.segment.is_some() => {
                TIERS.iter().position(|t| *t == tier).map(Target::Tier)
            }
            _ => None,
        };

        self.capture = target.map(|target| Capture {
            depth: stack.len(),
            target,
            buf: String::new(),
        });
        Ok(())
    }

    fn text(&mut self, t: &str) {
        if let Some(capture) = &mut self.capture {
            capture.buf.push_str(t);
        }
    }

    /// `stack` is the list of open elements, without the closed one.
    fn close(&mut self, stack: &[String], name: &str) {
        if let Some(capture) = self.capture.take() {
            if capture.depth != stack.len() {
                self.capture = Some(capture);
                return;
            }
            let value = capture.buf.trim().to_string();
            match capture.target {
                Target::Unit(field) => {
                    if let Some(slot) = self.unit.as_mut().and_then(|u| u.field(&field)) {
                        // first element wins
                        if slot.is_none() {
                            *slot = Some(value);
                        }
                    }
                }
                Target::Tier(idx) => {
                    if let Some(segment) = &mut self.segment {
                        if !value.is_empty() {
                            segment[idx] = Some(value);
                        }
                    }
                }
            }
            return;
        }

        match name {
            "segment" => {
                if let (Some(segment), Some(unit)) = (self.segment.take(), self.unit.as_mut()) {
                    unit.tiers.push_segment(segment);
                }
            }
            "unit" => {
                if let Some(unit) = self.unit.take() {
                    self.file.units.push(unit);
                }
            }
            _ => (),
        }
    }

    fn finish(self) -> Result<CorpusFile, Error> {
        if self.texts != 1 || self.files != 1 {
            return Err(Error::MalformedXml(format!(
                "expected exactly one text and one file, found {} and {}",
                self.texts, self.files
            )));
        }
        Ok(self.file)
    }
}

#[cfg(test)]
mod tests {
    use crate::refind::RefindMapBuilder;

    use super::*;

    const XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n\
<corpus>\r\n\
<text id=\"isam\">\r\n\
<file audio=\"mc_veraa_isam.wav\">\r\n\
<unit uid=\"0001\" start_time=\"0\" end_time=\"1250\">\r\n\
<utterance>ne <em>isam</em> me</utterance>\r\n\
<utterance_translation>the man<br/>came</utterance_translation>\r\n\
<annotations>\r\n\
<segment><gword>ne</gword><gloss>ART</gloss><graid>#</graid><refind>0001</refind></segment>\r\n\
<segment><gword>isam</gword><gloss/><graid>np.h:s</graid><refind></refind><isnref>new</isnref></segment>\r\n\
</annotations>\r\n\
</unit>\r\n\
<unit uid=\"0002\" start_time=\"1250\" end_time=\"2000\">\r\n\
<utterance>me</utterance>\r\n\
</unit>\r\n\
</file>\r\n\
</text>\r\n\
</corpus>\r\n";

    #[test]
    fn decode_units() {
        let file = CorpusFile::decode(&XmlDocument::parse(XML).unwrap()).unwrap();
        assert_eq!(file.audio, "mc_veraa_isam.wav");
        assert_eq!(file.units.len(), 2);

        let unit = &file.units[0];
        assert_eq!(unit.uid, "0001");
        assert_eq!(unit.end_time, "1250");
        assert_eq!(unit.utterance.as_deref(), Some("ne isam me"));
        assert_eq!(unit.utterance_translation.as_deref(), Some("the man\ncame"));
        assert_eq!(unit.add_orthography, None);
        assert_eq!(unit.tiers.gword, vec!["ne", "isam"]);
        assert_eq!(unit.tiers.gloss, vec!["ART", UNMARKED]);
        assert_eq!(unit.tiers.refind, vec!["0001", UNMARKED]);
        assert_eq!(unit.tiers.isnref, vec![UNMARKED, "new"]);

        assert!(file.units[1].tiers.gword.is_empty());
    }

    #[test]
    fn one_file_only() {
        let doc = XmlDocument::parse("<text><file/><file/></text>").unwrap();
        assert!(matches!(
            CorpusFile::decode(&doc),
            Err(Error::MalformedXml(_))
        ));
    }

    #[test]
    fn remap() {
        let mut builder = RefindMapBuilder::new();
        builder.add_text("mc_veraa_isam", ["0001"]);
        let map = builder.build().unwrap();

        let mut doc = XmlDocument::parse(XML).unwrap();
        assert_eq!(remap_refind(&mut doc, &map, "isam").unwrap(), 1);
        let out = doc.serialize(POLICY).unwrap();
        assert!(out.contains("<refind>10001</refind>"));
        assert_eq!(out.replace("10001", "0001"), XML);

        // local indices are gone after the first pass
        assert!(remap_refind(&mut doc, &map, "isam").is_err());
    }
}
