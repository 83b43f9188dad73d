/*! Updateable XML documents

An XML file is read into a list of owned [Event]s, which is edited and then written back.
Everything we don't touch is written back byte for byte, except for line endings and the XML
declaration, which follow a [SerializationPolicy].
!*/
use std::path::Path;

use log::debug;
use quick_xml::{
    events::{BytesStart, BytesText, Event},
    Reader, Writer,
};

use crate::error::Error;

const BOM: &str = "\u{feff}";
const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Newline {
    Lf,
    CrLf,
}

impl Newline {
    fn as_str(&self) -> &'static str {
        match self {
            Newline::Lf => "\n",
            Newline::CrLf => "\r\n",
        }
    }
}

/// How a document is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializationPolicy {
    pub newline: Newline,
    /// Add an XML declaration if the document has none.
    pub declaration: bool,
}

/// Owned, editable XML document.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    bom: bool,
    events: Vec<Event<'static>>,
}

impl XmlDocument {
    pub fn parse(src: &str) -> Result<Self, Error> {
        let (bom, src) = match src.strip_prefix(BOM) {
            Some(s) => (true, s),
            None => (false, src),
        };
        let mut reader = Reader::from_str(src);
        let mut events = Vec::new();
        loop {
            match reader.read_event()? {
                Event::Eof => break,
                e => events.push(e.into_owned()),
            }
        }
        Ok(Self { bom, events })
    }

    pub fn from_path(path: &Path) -> Result<Self, Error> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    pub fn events(&self) -> &[Event<'static>] {
        &self.events
    }

    /// Replace the text content of elements.
    ///
    /// `matches` gets the path of open elements (root first) for each text node. For matching
    /// nodes, `replace` gets the unescaped text and returns the new text, or `None` to keep it.
    /// Returns the number of replaced texts.
    pub fn update_texts<M, F>(&mut self, matches: M, mut replace: F) -> Result<usize, Error>
    where
        M: Fn(&[BytesStart<'static>]) -> bool,
        F: FnMut(&str) -> Result<Option<String>, Error>,
    {
        let mut path: Vec<BytesStart<'static>> = Vec::new();
        let mut replaced = 0;
        for event in self.events.iter_mut() {
            match event {
                Event::Start(e) => path.push(e.clone()),
                Event::End(_) => {
                    path.pop();
                }
                Event::Text(t) if !path.is_empty() && matches(&path) => {
                    let new = {
                        let value = t.unescape()?;
                        replace(&value)?
                    };
                    if let Some(new) = new {
                        *t = BytesText::new(&new).into_owned();
                        replaced += 1;
                    }
                }
                _ => (),
            }
        }
        Ok(replaced)
    }

    /// Serialize the document.
    pub fn serialize(&self, policy: SerializationPolicy) -> Result<String, Error> {
        let mut writer = Writer::new(Vec::new());
        for event in &self.events {
            writer.write_event(event.clone())?;
        }
        let body = String::from_utf8(writer.into_inner())
            .map_err(|e| Error::MalformedXml(e.to_string()))?;

        let mut out = String::with_capacity(body.len() + DECLARATION.len() + 2);
        if self.bom {
            out.push_str(BOM);
        }
        let has_declaration = self.events.iter().any(|e| matches!(e, Event::Decl(_)));
        if policy.declaration && !has_declaration {
            out.push_str(DECLARATION);
            out.push('\n');
        }
        out.push_str(&body);

        // normalize first, so that existing CRLF don't become CRCRLF.
        let out = out.replace("\r\n", "\n");
        Ok(match policy.newline {
            Newline::Lf => out,
            Newline::CrLf => out.replace('\n', Newline::CrLf.as_str()),
        })
    }
}

/// Local name of an element.
pub(crate) fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Unescaped value of an attribute.
pub(crate) fn attribute(e: &BytesStart, name: &str) -> Result<Option<String>, Error> {
    match e.try_get_attribute(name)? {
        Some(a) => Ok(Some(a.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

/// Edit the XML document at `path` with `f` and write it back.
///
/// The file is only replaced if `f` succeeds, and then atomically, so that it is never left
/// half-written.
pub fn update_xml<F>(path: &Path, policy: SerializationPolicy, f: F) -> Result<(), Error>
where
    F: FnOnce(&mut XmlDocument) -> Result<(), Error>,
{
    let mut doc = XmlDocument::from_path(path)?;
    f(&mut doc)?;
    let out = doc.serialize(policy)?;
    debug!("writing back {:?}", path);
    super::write_atomic(path, out.as_bytes())
}
