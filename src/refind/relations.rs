/*! Referent relations

The `relations` column of a referent list describes how a referent relates to other referents
of the same text:

- `<` set member of (partial co-reference)
- `>` includes (split antecedence)
- `M` part-whole

Referents with the same relation are separated by commas, different relations by semicolons,
e.g. `> 0001, 0002; M 0003`. A group without a leading relation marker has an unspecified
relation.
!*/
use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    SetMemberOf,
    Includes,
    PartWhole,
    Unspecified,
}

impl RelationKind {
    fn from_marker(c: char) -> Option<Self> {
        match c {
            '<' => Some(Self::SetMemberOf),
            '>' => Some(Self::Includes),
            'M' => Some(Self::PartWhole),
            _ => None,
        }
    }

    /// Marker used in referent lists and CLDF tables. Empty for [Self::Unspecified].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SetMemberOf => "<",
            Self::Includes => ">",
            Self::PartWhole => "M",
            Self::Unspecified => "",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RelationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Parsed relations of a referent: relation kinds in order of first appearance,
/// each with its sorted, deduplicated local indices.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Relations(Vec<(RelationKind, BTreeSet<String>)>);

impl Relations {
    /// Parse a relations string. Never fails: unknown markers are
    /// read as part of an unspecified relation.
    pub fn parse(s: &str) -> Self {
        let mut relations = Relations::default();
        for group in s.split(';') {
            let group = group.trim();
            let mut chars = group.chars();
            let (kind, refs) = match chars.next().and_then(RelationKind::from_marker) {
                Some(kind) => (kind, chars.as_str()),
                None => (RelationKind::Unspecified, group),
            };
            for r in refs.split(',').map(str::trim).filter(|r| !r.is_empty()) {
                relations.entry(kind).insert(r.to_string());
            }
        }
        relations
    }

    fn entry(&mut self, kind: RelationKind) -> &mut BTreeSet<String> {
        let idx = match self.0.iter().position(|(k, _)| *k == kind) {
            Some(idx) => idx,
            None => {
                self.0.push((kind, BTreeSet::new()));
                self.0.len() - 1
            }
        };
        &mut self.0[idx].1
    }

    pub fn get(&self, kind: RelationKind) -> Option<&BTreeSet<String>> {
        self.0.iter().find(|(k, _)| *k == kind).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(RelationKind, BTreeSet<String>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
