//! Error enum
use std::fmt;
use std::num::ParseIntError;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Csv(csv::Error),
    Serde(serde_json::Error),
    Xml(quick_xml::Error),
    Glob(glob::GlobError),
    GlobPattern(glob::PatternError),
    ParseInt(ParseIntError),
    /// Annotation file with an extension we don't know how to rewrite.
    UnknownExtension(PathBuf),
    /// A referent index has no entry in the refind map.
    MissingReferent {
        text: String,
        refind: String,
    },
    MissingColumn {
        path: PathBuf,
        column: &'static str,
    },
    /// Local referent index that is not a decimal number.
    InvalidReferentCode {
        text: String,
        refind: String,
    },
    /// Text number and digit count don't fit in a `u64` referent id.
    Overflow {
        text_number: u64,
        digits: u32,
    },
    MalformedXml(String),
    Custom(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::Csv(e) => write!(f, "csv error: {}", e),
            Error::Serde(e) => write!(f, "json error: {}", e),
            Error::Xml(e) => write!(f, "xml error: {}", e),
            Error::Glob(e) => write!(f, "glob error: {}", e),
            Error::GlobPattern(e) => write!(f, "glob pattern error: {}", e),
            Error::ParseInt(e) => write!(f, "invalid integer: {}", e),
            Error::UnknownExtension(p) => write!(f, "don't know how to remap {:?}", p),
            Error::MissingReferent { text, refind } => {
                write!(f, "no referent {} in text {}", refind, text)
            }
            Error::MissingColumn { path, column } => {
                write!(f, "{:?} has no {} column", path, column)
            }
            Error::InvalidReferentCode { text, refind } => {
                write!(f, "invalid referent index {:?} in text {}", refind, text)
            }
            Error::Overflow {
                text_number,
                digits,
            } => write!(
                f,
                "referent ids for text number {} with {} digits overflow",
                text_number, digits
            ),
            Error::MalformedXml(s) => write!(f, "malformed xml: {}", s),
            Error::Custom(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Error {
        Error::Csv(e)
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Error {
        Error::Xml(e)
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(e: quick_xml::events::attributes::AttrError) -> Error {
        Error::Xml(e.into())
    }
}

impl From<glob::GlobError> for Error {
    fn from(e: glob::GlobError) -> Error {
        Error::Glob(e)
    }
}

impl From<glob::PatternError> for Error {
    fn from(e: glob::PatternError) -> Error {
        Error::GlobPattern(e)
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(e: tempfile::PersistError) -> Error {
        Error::Io(e.error)
    }
}

impl From<ParseIntError> for Error {
    fn from(e: ParseIntError) -> Error {
        Error::ParseInt(e)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Serde(e)
    }
}
