/*! CLDF dataset creation

A dataset directory holds the raw data of one corpus version:

```text
metadata.json
raw/
    tsv/mc_<corpus>_<text>.tsv
    eaf/mc_<corpus>_<text>.eaf
    xml/mc_<corpus>_<text>.xml
    texts.json
    list-of-referents.tsv   (optional)
    audio/<stem>.mp3|wav    (optional)
```

[Dataset::makecldf] builds the refind map once, then writes the rewritten annotation files to
`<dst>/media` and the CLDF tables to `<dst>`.
!*/
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use log::{debug, info, warn};
use sha2::{Digest, Sha256};

use crate::{
    annotation::{self, CorpusFile},
    cldf::{self, Table},
    error::Error,
    metadata::{self, DatasetMetadata, TextMetadata},
    refind::{self, textid, RefindMap, ReferentRecord, Referents},
};

/// Annotation file formats, in the order in which they are listed as media.
const ANNOTATION_FORMATS: [&str; 3] = ["eaf", "xml", "tsv"];
const AUDIO_FORMATS: [&str; 2] = ["mp3", "wav"];

/// Counts of a [Dataset::makecldf] run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub texts: usize,
    pub utterances: usize,
    pub media: usize,
    /// `None` if the corpus has no RefIND annotation.
    pub referents: Option<usize>,
    pub relations: Option<usize>,
    pub warnings: usize,
}

/// Row counts of the referent tables.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReferentTables {
    /// Including the unmarked referent.
    pub referents: usize,
    pub relations: usize,
    pub warnings: usize,
}

pub struct Dataset {
    dir: PathBuf,
    metadata: DatasetMetadata,
}

impl Dataset {
    pub fn open(dir: &Path) -> Result<Self, Error> {
        let metadata = DatasetMetadata::from_path(&dir.join("metadata.json"))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            metadata,
        })
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.dir.join("raw")
    }

    /// Default output directory.
    pub fn cldf_dir(&self) -> PathBuf {
        self.dir.join("cldf")
    }

    pub fn refind_map(&self) -> Result<RefindMap, Error> {
        RefindMap::from_tsv_dir(&self.raw_dir().join("tsv"))
    }

    /// Write the CLDF tables and media files to `dst`.
    pub fn makecldf(&self, dst: &Path) -> Result<Summary, Error> {
        let lid = self.metadata.corpus_id()?;
        let map = self.refind_map()?;
        let mut summary = Summary::default();

        std::fs::create_dir_all(dst)?;
        let media_dir = self.copy_annotations(dst, &map)?;

        let mut languages = Table::create(dst, cldf::LANGUAGES)?;
        languages.write(&cldf::Language {
            id: self.metadata.id.clone(),
            name: self.metadata.language.clone(),
            glottocode: self.metadata.glottocode.clone(),
            affiliation: self.metadata.affiliation.clone(),
            areas: self.metadata.areas.clone(),
            varieties: self.metadata.varieties.clone(),
        })?;
        languages.finish()?;

        let list = self.raw_dir().join("list-of-referents.tsv");
        let list = Some(list.as_path()).filter(|p| p.exists());
        match write_referents(dst, &map, list)? {
            Some(tables) => {
                summary.referents = Some(tables.referents);
                summary.relations = Some(tables.relations);
                summary.warnings += tables.warnings;
            }
            None => info!("[{}] no RefIND annotation, skipping referent tables", lid),
        }
        let columns = UtteranceColumns {
            refind: map.has_referents(),
            isnref: has_isnref(&self.raw_dir().join("tsv"))?,
        };

        let mut texts = Table::create(dst, cldf::TEXTS)?;
        let mut utterances = Table::create(dst, cldf::UTTERANCES)?;
        let mut media = Table::create(dst, cldf::MEDIA)?;

        for (tid, text) in metadata::read_texts(&self.raw_dir().join("texts.json"))? {
            let mut media_ids = Vec::new();
            let mut clauses = 0;

            for path in text_files(&media_dir, lid, &tid)? {
                debug!("[{}] reading {:?}", tid, path);
                let file = CorpusFile::from_path(&path)?;
                let fids = self.write_media(&media_dir, &file, &text, &mut media)?;

                for unit in file.units {
                    clauses += 1;
                    utterances.write(&utterance(&self.metadata.id, &tid, unit, &fids, columns)?)?;
                }
                media_ids.extend(fids);
            }

            summary.utterances += clauses;
            texts.write(&self.text_row(&tid, &text, &map, media_ids, clauses))?;
        }

        summary.texts = texts.finish()?;
        utterances.finish()?;
        summary.media = media.finish()?;
        Ok(summary)
    }

    /// Copy annotation files to `<dst>/media` and remap their referent indices.
    fn copy_annotations(&self, dst: &Path, map: &RefindMap) -> Result<PathBuf, Error> {
        let media_dir = dst.join("media");
        if media_dir.exists() {
            std::fs::remove_dir_all(&media_dir)?;
        }
        std::fs::create_dir(&media_dir)?;

        for ext in ANNOTATION_FORMATS {
            let dir = self.raw_dir().join(ext);
            if !dir.exists() {
                warn!("no {} directory", ext);
                continue;
            }
            let pattern = format!("{}/*.{}", glob::Pattern::escape(&dir.to_string_lossy()), ext);
            for src in glob::glob(&pattern)? {
                let src = src?;
                let Some(name) = src.file_name() else {
                    continue;
                };
                let target = media_dir.join(name);
                std::fs::copy(&src, &target)?;
                annotation::remap_refind(&target, map)?;
            }
        }
        Ok(media_dir)
    }

    /// Copy the audio file of `file` and write media rows for it and its annotation files.
    ///
    /// Returns the media ids.
    fn write_media(
        &self,
        media_dir: &Path,
        file: &CorpusFile,
        text: &TextMetadata,
        table: &mut Table,
    ) -> Result<Vec<String>, Error> {
        let stem = Path::new(&file.audio)
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::Custom(format!("invalid audio file name: {:?}", file.audio)))?;

        let mut paths = Vec::with_capacity(4);
        let audio = AUDIO_FORMATS
            .iter()
            .map(|ext| self.raw_dir().join("audio").join(format!("{}.{}", stem, ext)))
            .find(|p| p.exists());
        match audio {
            Some(src) => {
                let target = media_dir.join(src.file_name().unwrap_or_default());
                std::fs::copy(&src, &target)?;
                paths.push(target);
            }
            None => warn!("[{}] no audio file for {}", text.id, stem),
        }
        for ext in ANNOTATION_FORMATS {
            let p = media_dir.join(format!("{}.{}", stem, ext));
            if p.exists() {
                paths.push(p);
            } else {
                warn!("[{}] missing {:?}", text.id, p);
            }
        }

        let mut ids = Vec::with_capacity(paths.len());
        for p in paths {
            let id = get_hash(&p)?;
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            table.write(&cldf::Media {
                id: id.clone(),
                media_type: cldf::media_type(&p),
                size: std::fs::metadata(&p)?.len(),
                length: None,
                contribution_id: text.id.clone(),
                download_url: format!("media/{}", name),
                name,
            })?;
            ids.push(id);
        }
        Ok(ids)
    }

    fn text_row(
        &self,
        tid: &str,
        text: &TextMetadata,
        map: &RefindMap,
        media_ids: Vec<String>,
        clauses: usize,
    ) -> cldf::Text {
        cldf::Text {
            id: text.id.clone(),
            name: text.title.clone().unwrap_or_else(|| text.id.clone()),
            description: text.description.clone(),
            contributor: self.metadata.contributors.join(" and "),
            citation: self.metadata.citation.clone(),
            text_number: map.text_number(tid),
            media_ids: media_ids.join(" "),
            clause_count: clauses,
            speaker: text.speaker.clone(),
            speaker_gender: text.gender.clone(),
            speaker_age: text.age.map(|a| a.value),
            speaker_age_approximated: cldf::yes_no(text.age_estimated()),
            speaker_year_born: text.born.map(|b| b.value),
            speaker_year_born_approximated: cldf::yes_no(text.born_estimated()),
            kind: text.kind.map(|k| k.as_str().to_string()),
            year_recorded: text.recorded.map(|r| r.value),
            recording_length: None,
        }
    }
}

/// Write `referents.csv` and `referent_relations.csv` to `dst`, from the referent list at `list`.
///
/// Returns `None`, and writes nothing, if the corpus has no RefIND annotation at all. Without a
/// list, only the unmarked referent is written.
pub fn write_referents(
    dst: &Path,
    map: &RefindMap,
    list: Option<&Path>,
) -> Result<Option<ReferentTables>, Error> {
    if !map.has_referents() {
        return Ok(None);
    }

    let mut referents = Table::create(dst, cldf::REFERENTS)?;
    let mut relations = Table::create(dst, cldf::REFERENT_RELATIONS)?;
    referents.write(&ReferentRecord::unmarked())?;

    let mut warnings = 0;
    match list {
        Some(list) => {
            let mut rows = Referents::from_path(list, map)?;
            for row in rows.by_ref() {
                let (referent, rels) = row?;
                referents.write(&referent)?;
                for rel in &rels {
                    relations.write(rel)?;
                }
            }
            warnings = rows.warnings().len();
        }
        None => warn!("no list of referents"),
    }

    Ok(Some(ReferentTables {
        referents: referents.finish()?,
        relations: relations.finish()?,
        warnings,
    }))
}

/// Whether any per-text table in `dir` has an ISNRef annotation.
fn has_isnref(dir: &Path) -> Result<bool, Error> {
    let pattern = format!("{}/*.tsv", glob::Pattern::escape(&dir.to_string_lossy()));
    for path in glob::glob(&pattern)? {
        let mut reader = refind::tsv_reader_builder().from_path(path?)?;
        let Some(idx) = reader.headers()?.iter().position(|h| h == "isnref") else {
            continue;
        };
        for record in reader.records() {
            if record?
                .get(idx)
                .map_or(false, |v| !v.is_empty() && v != refind::UNMARKED)
            {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Optional annotation tiers of the utterance table.
#[derive(Debug, Clone, Copy)]
struct UtteranceColumns {
    refind: bool,
    isnref: bool,
}

/// Corpus XML files of text `tid` in `dir`, including the parts of split texts.
fn text_files(dir: &Path, lid: &str, tid: &str) -> Result<Vec<PathBuf>, Error> {
    let pattern = format!(
        "{}/{}*.xml",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(&format!("mc_{}_{}", lid, tid))
    );
    let mut files = Vec::new();
    for p in glob::glob(&pattern)? {
        let p = p?;
        // mc_<lid>_<tid>* also matches other texts starting with tid
        if textid::text_id_from_path(&p).map_or(false, |t| textid::normalize(&t) == tid) {
            files.push(p);
        }
    }
    files.sort();
    Ok(files)
}

fn utterance(
    language_id: &str,
    tid: &str,
    unit: annotation::Unit,
    media_ids: &[String],
    columns: UtteranceColumns,
) -> Result<cldf::Utterance, Error> {
    let refind = columns.refind.then(|| unit.tiers.refind.iter().join("\t"));
    Ok(cldf::Utterance {
        id: format!("{}_{}", tid, unit.uid),
        language_id: language_id.to_string(),
        text_id: tid.to_string(),
        primary_text: unit.utterance,
        analyzed_word: unit.tiers.gword.iter().join("\t"),
        gloss: unit.tiers.gloss.iter().join("\t"),
        translated_text: unit.utterance_translation,
        comment: unit.add_comments,
        audio_start: unit.start_time.trim().parse()?,
        audio_end: unit.end_time.trim().parse()?,
        graid: unit.tiers.graid.iter().join("\t"),
        refind_fk: refind.clone(),
        refind,
        isnref: columns.isnref.then(|| unit.tiers.isnref.iter().join("\t")),
        media_ids: media_ids.join(" "),
    })
}

/// SHA-256 of a file, hex encoded.
fn get_hash(path: &Path) -> Result<String, Error> {
    let mut f = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut f, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}
