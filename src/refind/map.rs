/*! Dataset-wide referent ids

Referent indices (RefIND) are only unique within a single text. To use them as keys across a
whole corpus, each text gets a number (its position in the sorted list of per-text tables)
and every local index is prefixed with it:

```text
id = text_number * 10^digits + local_index
```

`digits` is the width of the widest local index found in the whole corpus (`0158` has four
digits), so that ids of different texts can never collide.
!*/
use std::{
    collections::{BTreeSet, HashMap},
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::error::Error;

use super::textid::{self, RECOVERY_SUFFIXES};
use super::UNMARKED;

/// Collects local referent indices by text, then computes the [RefindMap].
#[derive(Debug, Default)]
pub struct RefindMapBuilder {
    // (text id, file stem of first occurrence, local indices)
    texts: Vec<(String, String, BTreeSet<String>)>,
}

impl RefindMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the local indices of the table stored in the file with stem `stem`.
    ///
    /// Split texts (`_a`/`_b`) are merged into a single text.
    pub fn add_text<I, S>(&mut self, stem: &str, refinds: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tid = textid::normalize(&textid::text_id(stem)).to_string();
        let refinds = refinds
            .into_iter()
            .map(Into::into)
            .filter(|r: &String| !r.is_empty() && r != UNMARKED);

        match self.texts.iter_mut().find(|(t, _, _)| t == &tid) {
            Some((_, _, codes)) => {
                debug!("merging split text {} into {}", stem, tid);
                codes.extend(refinds);
            }
            None => self
                .texts
                .push((tid, stem.to_string(), refinds.collect())),
        }
        self
    }

    /// Number texts by file stem and compute referent ids.
    pub fn build(mut self) -> Result<RefindMap, Error> {
        self.texts.sort_by(|a, b| a.1.cmp(&b.1));

        // parse everything first: the number of digits is a corpus-wide property.
        let mut parsed = Vec::with_capacity(self.texts.len());
        for (tid, _, codes) in self.texts {
            let codes = codes
                .into_iter()
                .map(|code| match code.parse::<u64>() {
                    Ok(n) => Ok((code, n)),
                    Err(_) => Err(Error::InvalidReferentCode {
                        text: tid.clone(),
                        refind: code,
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            parsed.push((tid, codes));
        }

        // written width, so that zero-padded codes keep their padding: 0001 -> 10001.
        let digits = parsed
            .iter()
            .flat_map(|(_, codes)| codes.iter())
            .map(|(code, n)| code.len().max(n.to_string().len()) as u32)
            .max()
            .unwrap_or(0);

        let mut map = RefindMap {
            digits,
            ..Default::default()
        };

        for (text_number, (tid, codes)) in (1u64..).zip(parsed) {
            let mut referents = HashMap::with_capacity(codes.len());
            if !codes.is_empty() {
                let base = 10u64
                    .checked_pow(digits)
                    .and_then(|p| p.checked_mul(text_number))
                    .ok_or(Error::Overflow {
                        text_number,
                        digits,
                    })?;
                for (code, n) in codes {
                    referents.insert(code, base + n);
                }
            }
            map.numbers.insert(tid.clone(), text_number);
            map.referents.insert(tid.clone(), referents);
            map.texts.push(tid);
        }

        Ok(map)
    }
}

/// Maps text ids to text numbers and `(text id, local index)` pairs to dataset-wide ids.
///
/// The map is immutable once built.
#[derive(Debug, Default, Clone)]
pub struct RefindMap {
    digits: u32,
    texts: Vec<String>,
    numbers: HashMap<String, u64>,
    referents: HashMap<String, HashMap<String, u64>>,
}

impl RefindMap {
    /// Build the map from a directory of per-text tables (`*.tsv`, with a `refind` column).
    pub fn from_tsv_dir(dir: &Path) -> Result<Self, Error> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        paths.retain(|p| p.extension().map_or(false, |ext| ext == "tsv"));
        paths.sort_by(|a, b| a.file_stem().cmp(&b.file_stem()));

        let mut builder = RefindMapBuilder::new();
        for path in &paths {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| Error::Custom(format!("invalid file name: {:?}", path)))?;
            builder.add_text(stem, read_refinds(path)?);
        }

        let map = builder.build()?;
        info!(
            "{:?}: {} texts, {} referents, {} digits",
            dir,
            map.texts.len(),
            map.nb_referents(),
            map.digits
        );
        Ok(map)
    }

    /// Number of digits reserved for local indices.
    pub fn digits(&self) -> u32 {
        self.digits
    }

    /// Text ids, in text number order.
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// Get the number of a text. Text numbers start at 1.
    pub fn text_number(&self, tid: &str) -> Option<u64> {
        self.numbers.get(tid).copied()
    }

    /// Exact lookup of a local index.
    pub fn get(&self, tid: &str, refind: &str) -> Option<u64> {
        self.referents.get(tid)?.get(refind).copied()
    }

    /// Lookup of a local index of a text named in a referent list.
    ///
    /// Tries the text id as is, then with each of [RECOVERY_SUFFIXES] appended. The suffix step
    /// is a heuristic for split texts and may pick the wrong part.
    ///
    /// In between, the text id is also tried without its `_a`/`_b` suffix. This goes beyond the
    /// literal-then-suffix rule: map keys are normalized text ids, so a list row naming
    /// `isam_a` would otherwise never match.
    pub fn resolve(&self, tid: &str, refind: &str) -> Option<u64> {
        self.get(tid, refind)
            .or_else(|| self.get(textid::normalize(tid), refind))
            .or_else(|| {
                RECOVERY_SUFFIXES
                    .iter()
                    .find_map(|suffix| self.get(&format!("{}{}", tid, suffix), refind))
            })
    }

    /// Number of referent entries.
    pub fn nb_referents(&self) -> usize {
        self.referents.values().map(HashMap::len).sum()
    }

    /// Number of entries, text numbers and referent ids.
    pub fn len(&self) -> usize {
        self.texts.len() + self.nb_referents()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Whether the corpus has any RefIND annotation at all.
    pub fn has_referents(&self) -> bool {
        self.referents.values().any(|r| !r.is_empty())
    }

    /// All dataset-wide referent ids (in no particular order).
    pub fn referent_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.referents.values().flat_map(|r| r.values().copied())
    }
}

/// Get the non-empty values of the `refind` column of a per-text table.
fn read_refinds(path: &Path) -> Result<Vec<String>, Error> {
    let mut reader = super::tsv_reader_builder().from_path(path)?;
    let idx = reader
        .headers()?
        .iter()
        .position(|h| h == "refind")
        .ok_or_else(|| Error::MissingColumn {
            path: path.to_path_buf(),
            column: "refind",
        })?;

    let mut refinds = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(refind) = record.get(idx) {
            refinds.push(refind.to_string());
        }
    }
    Ok(refinds)
}
