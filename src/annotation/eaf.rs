//! ELAN (`.eaf`) annotation files.
use quick_xml::events::{BytesStart, Event};

use crate::error::Error;
use crate::refind::{textid, RefindMap, UNMARKED};

use super::xml::{attribute, local_name, Newline, SerializationPolicy, XmlDocument};

pub const POLICY: SerializationPolicy = SerializationPolicy {
    newline: Newline::Lf,
    declaration: true,
};

/// `TIER[@TIER_ID='refind']/ANNOTATION/REF_ANNOTATION/ANNOTATION_VALUE`
fn is_refind_value(path: &[BytesStart<'static>]) -> bool {
    let n = path.len();
    if n < 4 {
        return false;
    }
    let names = ["TIER", "ANNOTATION", "REF_ANNOTATION", "ANNOTATION_VALUE"];
    path[n - 4..]
        .iter()
        .zip(names)
        .all(|(e, name)| local_name(e) == name)
        && matches!(attribute(&path[n - 4], "TIER_ID"), Ok(Some(id)) if id == "refind")
}

/// Text id of the recording referenced by the first `MEDIA_DESCRIPTOR`.
pub fn media_text_id(doc: &XmlDocument) -> Result<Option<String>, Error> {
    for event in doc.events() {
        if let Event::Start(e) | Event::Empty(e) = event {
            if local_name(e) == "MEDIA_DESCRIPTOR" {
                return Ok(attribute(e, "MEDIA_URL")?.map(|url| {
                    let name = url.rsplit('/').next().unwrap_or(&url);
                    let stem = name.split('.').next().unwrap_or(name);
                    textid::normalize(&textid::text_id(stem)).to_string()
                }));
            }
        }
    }
    Ok(None)
}

/// Replace the local indices of the `refind` tier.
///
/// Indices are looked up for `tid`, then for the text of the media file.
pub fn remap_refind(doc: &mut XmlDocument, map: &RefindMap, tid: &str) -> Result<usize, Error> {
    let media_tid = media_text_id(doc)?;
    doc.update_texts(is_refind_value, |value| {
        if value.is_empty() || value == UNMARKED {
            return Ok(None);
        }
        map.get(tid, value)
            .or_else(|| media_tid.as_deref().and_then(|t| map.get(t, value)))
            .map(|id| Some(id.to_string()))
            .ok_or_else(|| Error::MissingReferent {
                text: tid.to_string(),
                refind: value.to_string(),
            })
    })
}

#[cfg(test)]
mod tests {
    use crate::refind::RefindMapBuilder;

    use super::*;

    fn eaf(media: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ANNOTATION_DOCUMENT>
    <HEADER MEDIA_FILE="" TIME_UNITS="milliseconds">
        <MEDIA_DESCRIPTOR MEDIA_URL="{}" MIME_TYPE="audio/x-wav"/>
    </HEADER>
    <TIER LINGUISTIC_TYPE_REF="refind" PARENT_REF="gword" TIER_ID="refind">
        <ANNOTATION>
            <REF_ANNOTATION ANNOTATION_ID="a1" ANNOTATION_REF="a0">
                <ANNOTATION_VALUE>0001</ANNOTATION_VALUE>
            </REF_ANNOTATION>
        </ANNOTATION>
        <ANNOTATION>
            <REF_ANNOTATION ANNOTATION_ID="a2" ANNOTATION_REF="a0">
                <ANNOTATION_VALUE></ANNOTATION_VALUE>
            </REF_ANNOTATION>
        </ANNOTATION>
    </TIER>
    <TIER TIER_ID="gloss">
        <ANNOTATION>
            <REF_ANNOTATION ANNOTATION_ID="a3" ANNOTATION_REF="a0">
                <ANNOTATION_VALUE>0001</ANNOTATION_VALUE>
            </REF_ANNOTATION>
        </ANNOTATION>
    </TIER>
</ANNOTATION_DOCUMENT>
"#,
            media
        )
    }

    fn map() -> RefindMap {
        let mut builder = RefindMapBuilder::new();
        builder
            .add_text("mc_veraa_isam", ["0001"])
            .add_text("mc_veraa_jak", ["0001"]);
        builder.build().unwrap()
    }

    #[test]
    fn refind_tier_only() {
        let mut doc = XmlDocument::parse(&eaf("mc_veraa_jak.wav")).unwrap();
        assert_eq!(remap_refind(&mut doc, &map(), "isam").unwrap(), 1);
        let out = doc.serialize(POLICY).unwrap();
        assert!(out.contains("<ANNOTATION_VALUE>10001</ANNOTATION_VALUE>"));
        assert!(out.contains("<ANNOTATION_VALUE>0001</ANNOTATION_VALUE>"));
        assert!(out.contains("<ANNOTATION_VALUE></ANNOTATION_VALUE>"));
    }

    #[test]
    fn media_fallback() {
        let doc = XmlDocument::parse(&eaf("file:///x/mc_veraa_jak_a.wav")).unwrap();
        assert_eq!(media_text_id(&doc).unwrap(), Some("jak".to_string()));

        let mut doc = XmlDocument::parse(&eaf("mc_veraa_jak.wav")).unwrap();
        remap_refind(&mut doc, &map(), "unknown").unwrap();
        let out = doc.serialize(POLICY).unwrap();
        assert!(out.contains("<ANNOTATION_VALUE>20001</ANNOTATION_VALUE>"));
    }

    #[test]
    fn missing_referent() {
        let mut doc = XmlDocument::parse(&eaf("mc_veraa_other.wav")).unwrap();
        assert!(matches!(
            remap_refind(&mut doc, &map(), "unknown"),
            Err(Error::MissingReferent { .. })
        ));
    }
}
