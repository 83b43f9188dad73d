//! Semantic classes of referents.
//!
//! Only a single class is assigned to a referent, even where a group contains entities of
//! several classes: humans outweigh other animates, animates outweigh inanimates, and
//! inanimates outweigh everything else.
use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticClass {
    Human,
    Animate,
    Inanimate,
    BodyPart,
    Mass,
    Location,
    Time,
    Abstract,
}

impl SemanticClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "hum",
            Self::Animate => "anm",
            Self::Inanimate => "inm",
            Self::BodyPart => "bdp",
            Self::Mass => "mss",
            Self::Location => "loc",
            Self::Time => "tme",
            Self::Abstract => "abs",
        }
    }

    /// Lower is stronger. Classes below inanimates are not ranked among each other.
    fn precedence(&self) -> u8 {
        match self {
            Self::Human => 0,
            Self::Animate => 1,
            Self::Inanimate => 2,
            _ => 3,
        }
    }

    /// Reduce a class cell to a single class.
    ///
    /// Cells may list several classes separated by `,`, `/`, `;` or whitespace. Returns
    /// `Ok(None)` for empty cells and the first unknown label as error.
    pub fn resolve(cell: &str) -> Result<Option<Self>, String> {
        let mut best: Option<Self> = None;
        for label in cell
            .split(|c: char| c == ',' || c == '/' || c == ';' || c.is_whitespace())
            .filter(|l| !l.is_empty())
        {
            let class: Self = label.parse()?;
            // strict comparison: among unranked classes the first one wins.
            if best.map_or(true, |b| class.precedence() < b.precedence()) {
                best = Some(class);
            }
        }
        Ok(best)
    }
}

impl FromStr for SemanticClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hum" => Ok(Self::Human),
            "anm" => Ok(Self::Animate),
            "inm" => Ok(Self::Inanimate),
            "bdp" => Ok(Self::BodyPart),
            "mss" => Ok(Self::Mass),
            "loc" => Ok(Self::Location),
            "tme" => Ok(Self::Time),
            "abs" => Ok(Self::Abstract),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for SemanticClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SemanticClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
