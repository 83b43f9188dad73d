//! Dataset and text metadata, as stored in `metadata.json` and `raw/texts.json`.
use std::{collections::BTreeMap, fmt, path::Path, str::FromStr};

use serde::Deserialize;

use crate::error::Error;

/// Dataset metadata (`metadata.json`).
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DatasetMetadata {
    /// `mc` followed by the corpus id, e.g. `mcveraa`.
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub citation: Option<String>,
    pub version: Option<String>,
    pub language: Option<String>,
    pub glottocode: Option<String>,
    pub affiliation: Option<String>,
    pub areas: Option<String>,
    pub varieties: Option<String>,
    #[serde(default)]
    pub contributors: Vec<String>,
}

impl DatasetMetadata {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let md: Self = serde_json::from_reader(std::fs::File::open(path)?)?;
        md.corpus_id()?;
        Ok(md)
    }

    /// The corpus id (dataset id without the `mc` prefix).
    pub fn corpus_id(&self) -> Result<&str, Error> {
        self.id
            .strip_prefix("mc")
            .filter(|lid| !lid.is_empty())
            .ok_or_else(|| Error::Custom(format!("invalid dataset id: {}", self.id)))
    }
}

/// A number that may be approximate, written `c40` for "circa 40".
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "RawApproximate")]
pub struct Approximate {
    pub value: i32,
    pub estimated: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawApproximate {
    Int(i32),
    Str(String),
}

impl TryFrom<RawApproximate> for Approximate {
    type Error = String;

    fn try_from(raw: RawApproximate) -> Result<Self, Self::Error> {
        match raw {
            RawApproximate::Int(value) => Ok(Self {
                value,
                estimated: false,
            }),
            RawApproximate::Str(s) => s.parse(),
        }
    }
}

impl FromStr for Approximate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (estimated, number) = match s.strip_prefix('c') {
            Some(n) => (true, n),
            None => (false, s),
        };
        number
            .trim()
            .parse()
            .map(|value| Self { value, estimated })
            .map_err(|_| format!("invalid number: {:?}", s))
    }
}

impl fmt::Display for Approximate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.estimated {
            write!(f, "c{}", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

/// Traditional, autobiographical or stimulus-based narrative.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextType {
    TN,
    AN,
    SN,
}

impl TextType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextType::TN => "TN",
            TextType::AN => "AN",
            TextType::SN => "SN",
        }
    }
}

/// Metadata of a recorded text.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TextMetadata {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Option<TextType>,
    pub recorded: Option<Approximate>,
    pub speaker: Option<String>,
    pub gender: Option<String>,
    pub age: Option<Approximate>,
    pub born: Option<Approximate>,
    pub local_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    age_estimated: bool,
    #[serde(default)]
    born_estimated: bool,
}

impl TextMetadata {
    pub fn age_estimated(&self) -> bool {
        self.age_estimated || self.age.map_or(false, |a| a.estimated)
    }

    pub fn born_estimated(&self) -> bool {
        self.born_estimated || self.born.map_or(false, |b| b.estimated)
    }
}

/// Read `texts.json`, a map from text ids to text metadata.
pub fn read_texts(path: &Path) -> Result<BTreeMap<String, TextMetadata>, Error> {
    Ok(serde_json::from_reader(std::fs::File::open(path)?)?)
}
