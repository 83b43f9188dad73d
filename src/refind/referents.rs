/*! Referent list reading

Reads the `list-of-referents.tsv` of a corpus and yields referents keyed by their dataset-wide
id, along with their relations to other referents.

Rows are checked against the [RefindMap]:

- referents that are never annotated in any text are skipped,
- duplicate rows are skipped,
- relation targets that can't be resolved are dropped one by one,
- four digit references in descriptions are rewritten when possible.

None of these abort the reading. They are logged, and kept as [ReferentWarning]s.
!*/
use std::{collections::HashSet, fmt, fs::File, io::Read, path::Path};

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Error;

use super::{RefindMap, RelationKind, Relations, SemanticClass, UNMARKED};

lazy_static! {
    static ref NUMBERS: Regex = Regex::new(r"[0-9]+").unwrap();
}

/// Referent id as written in CLDF tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferentId {
    /// No referent.
    Unmarked,
    Id(u64),
}

impl fmt::Display for ReferentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unmarked => f.write_str(UNMARKED),
            Self::Id(id) => write!(f, "{}", id),
        }
    }
}

impl Serialize for ReferentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferentRecord {
    pub refind: ReferentId,
    pub label: String,
    pub description: String,
    pub class: Option<SemanticClass>,
    pub notes: String,
}

impl ReferentRecord {
    /// Placeholder record for unmarked (empty set) referent annotations.
    pub fn unmarked() -> Self {
        Self {
            refind: ReferentId::Unmarked,
            label: String::new(),
            description: String::new(),
            class: None,
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferentRelation {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "Source_Referent_ID")]
    pub source: u64,
    #[serde(rename = "Target_Referent_ID")]
    pub target: u64,
    #[serde(rename = "Relation")]
    pub kind: RelationKind,
}

/// Anomalies found while reading a referent list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferentWarning {
    /// The referent doesn't appear in any annotation tier.
    NotAnnotated { text: String, refind: String },
    Duplicate { text: String, refind: String },
    UnresolvedTarget {
        text: String,
        refind: String,
        target: String,
    },
    /// Four digit number in a description that isn't a referent of the text.
    UnresolvedInline {
        text: String,
        refind: String,
        reference: String,
    },
    UnknownClass {
        text: String,
        refind: String,
        class: String,
    },
}

impl fmt::Display for ReferentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnnotated { text, refind } => {
                write!(f, "[{}] referent {} is not annotated", text, refind)
            }
            Self::Duplicate { text, refind } => {
                write!(f, "[{}] duplicate referent {}", text, refind)
            }
            Self::UnresolvedTarget {
                text,
                refind,
                target,
            } => write!(
                f,
                "[{}] referent {}: unknown relation target {}",
                text, refind, target
            ),
            Self::UnresolvedInline {
                text,
                refind,
                reference,
            } => write!(
                f,
                "[{}] referent {}: unknown referent {} in description",
                text, refind, reference
            ),
            Self::UnknownClass {
                text,
                refind,
                class,
            } => write!(
                f,
                "[{}] referent {}: unknown semantic class {:?}",
                text, refind, class
            ),
        }
    }
}

/// A row of a referent list. The `corpus` column (and any other unknown column) is ignored.
#[derive(Debug, Deserialize)]
struct ReferentRow {
    text: String,
    refind: String,
    #[serde(default)]
    relations: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    class: String,
    #[serde(default)]
    notes: String,
}

/// Iterator over the referents of a referent list, with their relations.
///
/// Relation ids are sequential over the whole list. The iterator can only be consumed once;
/// warnings are available through [Referents::warnings] while or after iterating.
pub struct Referents<'a, R: Read> {
    rows: csv::DeserializeRecordsIntoIter<R, ReferentRow>,
    map: &'a RefindMap,
    seen: HashSet<u64>,
    relation_id: u64,
    warnings: Vec<ReferentWarning>,
}

impl<'a> Referents<'a, File> {
    pub fn from_path(path: &Path, map: &'a RefindMap) -> Result<Self, Error> {
        let reader = super::tsv_reader_builder().from_path(path)?;
        Ok(Self::new(reader, map))
    }
}

impl<'a, R: Read> Referents<'a, R> {
    pub fn from_reader(r: R, map: &'a RefindMap) -> Self {
        Self::new(super::tsv_reader_builder().from_reader(r), map)
    }

    fn new(reader: csv::Reader<R>, map: &'a RefindMap) -> Self {
        Self {
            rows: reader.into_deserialize(),
            map,
            seen: HashSet::new(),
            relation_id: 0,
            warnings: Vec::new(),
        }
    }

    pub fn warnings(&self) -> &[ReferentWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<ReferentWarning> {
        self.warnings
    }

    fn warn(&mut self, w: ReferentWarning) {
        warn!("{}", w);
        self.warnings.push(w);
    }

    /// Build the record and relations of a row, or `None` if the row has to be skipped.
    fn process(&mut self, row: ReferentRow) -> Option<(ReferentRecord, Vec<ReferentRelation>)> {
        let id = match self.map.resolve(&row.text, &row.refind) {
            Some(id) => id,
            None => {
                let w = ReferentWarning::NotAnnotated {
                    text: row.text,
                    refind: row.refind,
                };
                debug!("{}", w);
                self.warnings.push(w);
                return None;
            }
        };

        if !self.seen.insert(id) {
            self.warn(ReferentWarning::Duplicate {
                text: row.text,
                refind: row.refind,
            });
            return None;
        }

        let mut relations = Vec::new();
        for (kind, targets) in Relations::parse(&row.relations).iter() {
            for target in targets {
                match self.map.resolve(&row.text, target) {
                    Some(target) => {
                        self.relation_id += 1;
                        relations.push(ReferentRelation {
                            id: self.relation_id,
                            source: id,
                            target,
                            kind: *kind,
                        });
                    }
                    None => self.warn(ReferentWarning::UnresolvedTarget {
                        text: row.text.clone(),
                        refind: row.refind.clone(),
                        target: target.clone(),
                    }),
                }
            }
        }

        let description = self.rewrite_description(&row.text, &row.refind, &row.description);

        let class = match SemanticClass::resolve(&row.class) {
            Ok(class) => class,
            Err(class) => {
                self.warn(ReferentWarning::UnknownClass {
                    text: row.text.clone(),
                    refind: row.refind.clone(),
                    class,
                });
                None
            }
        };

        let record = ReferentRecord {
            refind: ReferentId::Id(id),
            label: row.label,
            description,
            class,
            notes: row.notes,
        };
        Some((record, relations))
    }

    /// Replace four digit local indices in a description by their dataset-wide ids.
    fn rewrite_description(&mut self, tid: &str, refind: &str, description: &str) -> String {
        let map = self.map;
        let mut unresolved = Vec::new();
        let rewritten = NUMBERS.replace_all(description, |caps: &Captures| {
            let number = &caps[0];
            if number.len() != 4 {
                return number.to_string();
            }
            match map.resolve(tid, number) {
                Some(id) => id.to_string(),
                None => {
                    unresolved.push(number.to_string());
                    number.to_string()
                }
            }
        });
        let rewritten = rewritten.into_owned();

        for reference in unresolved {
            self.warn(ReferentWarning::UnresolvedInline {
                text: tid.to_string(),
                refind: refind.to_string(),
                reference,
            });
        }
        rewritten
    }
}

impl<'a, R: Read> Iterator for Referents<'a, R> {
    type Item = Result<(ReferentRecord, Vec<ReferentRelation>), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.rows.next()? {
                Ok(row) => row,
                Err(e) => return Some(Err(e.into())),
            };
            if let Some(referent) = self.process(row) {
                return Some(Ok(referent));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::refind::RefindMapBuilder;

    use super::*;

    const HEADER: &str = "corpus\ttext\trefind\tlabel\tclass\tdescription\trelations\tnotes\n";

    fn map() -> RefindMap {
        let mut builder = RefindMapBuilder::new();
        builder
            .add_text("mc_veraa_isam", ["0001", "0002", "0003"])
            .add_text("mc_veraa_jak", ["0001"]);
        builder.build().unwrap()
    }

    fn read(rows: &str, map: &RefindMap) -> (Vec<(ReferentRecord, Vec<ReferentRelation>)>, Vec<ReferentWarning>) {
        let src = format!("{}{}", HEADER, rows);
        let mut referents = Referents::from_reader(src.as_bytes(), map);
        let res = referents.by_ref().collect::<Result<Vec<_>, _>>().unwrap();
        (res, referents.into_warnings())
    }

    #[test]
    fn remapped() {
        let map = map();
        let (res, warnings) = read(
            "veraa\tisam\t0001\tman\thum\tthe man\t\t\n\
             veraa\tjak\t0001\tdog\tanm\ta dog\t\tnote\n",
            &map,
        );
        assert!(warnings.is_empty());
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].0.refind, ReferentId::Id(10001));
        assert_eq!(res[0].0.class, Some(SemanticClass::Human));
        assert!(res[0].1.is_empty());
        assert_eq!(res[1].0.refind, ReferentId::Id(20001));
        assert_eq!(res[1].0.notes, "note");
    }

    #[test]
    fn relations() {
        let map = map();
        let (res, warnings) = read(
            "veraa\tisam\t0003\tpeople\thum\tall\t> 0001, 0002\t\n\
             veraa\tisam\t0001\tman\thum\tone\t< 0003\t\n",
            &map,
        );
        assert!(warnings.is_empty());
        let ids: Vec<u64> = res.iter().flat_map(|(_, r)| r.iter().map(|r| r.id)).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(
            res[0].1[1],
            ReferentRelation {
                id: 2,
                source: 10003,
                target: 10002,
                kind: RelationKind::Includes
            }
        );
        assert_eq!(res[1].1[0].kind, RelationKind::SetMemberOf);
    }

    #[test]
    fn not_annotated() {
        let map = map();
        let (res, warnings) = read(
            "veraa\tisam\t0009\tghost\thum\t\t\t\n\
             veraa\tisam\t0001\tman\thum\t\t\t\n",
            &map,
        );
        assert_eq!(res.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ReferentWarning::NotAnnotated { .. }));
    }

    #[test]
    fn unresolved_target() {
        let map = map();
        let (res, warnings) = read("veraa\tisam\t0001\tman\thum\t\tM 0002, 0042; < 0043\t\n", &map);
        assert_eq!(res[0].1.len(), 1);
        assert_eq!(res[0].1[0].target, 10002);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn duplicate() {
        let map = map();
        let (res, warnings) = read(
            "veraa\tisam\t0001\tman\thum\t\t\t\n\
             veraa\tisam\t0001\tman again\thum\t\t\t\n",
            &map,
        );
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].0.label, "man");
        assert_eq!(
            warnings,
            vec![ReferentWarning::Duplicate {
                text: "isam".to_string(),
                refind: "0001".to_string()
            }]
        );
    }

    #[test]
    fn description_references() {
        let map = map();
        let (res, warnings) = read(
            "veraa\tisam\t0003\tpeople\thum\tboth 0001 and 0002, born 1956, not 12345\t\t\n",
            &map,
        );
        assert_eq!(
            res[0].0.description,
            "both 10001 and 10002, born 1956, not 12345"
        );
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn unknown_class() {
        let map = map();
        let (res, warnings) = read("veraa\tisam\t0001\tman\tfoo\t\t\t\n", &map);
        assert_eq!(res[0].0.class, None);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn recovered_text_suffix() {
        let mut builder = RefindMapBuilder::new();
        builder
            .add_text("mc_x_story_c", ["0001", "0002"])
            .add_text("mc_x_walk_a", ["0001"]);
        let map = builder.build().unwrap();

        let (res, warnings) = read(
            "x\tstory\t0001\tman\thum\t\t< 0002\t\n\
             x\twalk_a\t0001\tdog\tanm\t\t\t\n\
             x\tstory_f\t0002\tboat\tinm\t\t\t\n",
            &map,
        );
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].0.refind, ReferentId::Id(10001));
        assert_eq!(res[0].1[0].target, 10002);
        assert_eq!(res[1].0.refind, ReferentId::Id(20001));
        // no part of story_f is annotated
        assert!(matches!(
            warnings.as_slice(),
            [ReferentWarning::NotAnnotated { .. }]
        ));
    }

    #[test]
    fn serialize_unmarked() {
        assert_eq!(ReferentRecord::unmarked().refind.to_string(), UNMARKED);
        assert_eq!(ReferentId::Id(10001).to_string(), "10001");
    }
}
