/*! CLDF tables

Row types of the tables of a Multi-CAST CLDF dataset, and a small CSV writer for them.
The CLDF metadata (JSON schema) is not written here.

List valued columns are joined with their separator: tabs for annotation tiers, spaces for
media references, ` and ` for contributors.
!*/
mod table;

use std::path::Path;

use serde::Serialize;

pub use table::Table;

pub const LANGUAGES: &str = "languages.csv";
pub const TEXTS: &str = "texts.csv";
pub const UTTERANCES: &str = "utterances.csv";
pub const MEDIA: &str = "media.csv";
pub const REFERENTS: &str = "referents.csv";
pub const REFERENT_RELATIONS: &str = "referent_relations.csv";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Language {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: Option<String>,
    pub glottocode: Option<String>,
    pub affiliation: Option<String>,
    pub areas: Option<String>,
    pub varieties: Option<String>,
}

/// ContributionTable row.
#[derive(Debug, Clone, Serialize)]
pub struct Text {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Contributor")]
    pub contributor: String,
    #[serde(rename = "Citation")]
    pub citation: Option<String>,
    /// Prefix of the referent ids of the text.
    #[serde(rename = "Text_Number")]
    pub text_number: Option<u64>,
    #[serde(rename = "Media_IDs")]
    pub media_ids: String,
    #[serde(rename = "Clause_Count")]
    pub clause_count: usize,
    #[serde(rename = "Speaker")]
    pub speaker: Option<String>,
    #[serde(rename = "Speaker_Gender")]
    pub speaker_gender: Option<String>,
    #[serde(rename = "Speaker_Age")]
    pub speaker_age: Option<i32>,
    #[serde(rename = "Speaker_Age_Approximated")]
    pub speaker_age_approximated: &'static str,
    #[serde(rename = "Speaker_Year_Born")]
    pub speaker_year_born: Option<i32>,
    #[serde(rename = "Speaker_Year_Born_Approximated")]
    pub speaker_year_born_approximated: &'static str,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    #[serde(rename = "Year_Recorded")]
    pub year_recorded: Option<i32>,
    #[serde(rename = "Recording_Length")]
    pub recording_length: Option<f64>,
}

/// ExampleTable row: one annotated clause unit.
#[derive(Debug, Clone, Serialize)]
pub struct Utterance {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Language_ID")]
    pub language_id: String,
    #[serde(rename = "Text_ID")]
    pub text_id: String,
    #[serde(rename = "Primary_Text")]
    pub primary_text: Option<String>,
    #[serde(rename = "Analyzed_Word")]
    pub analyzed_word: String,
    #[serde(rename = "Gloss")]
    pub gloss: String,
    #[serde(rename = "Translated_Text")]
    pub translated_text: Option<String>,
    #[serde(rename = "Comment")]
    pub comment: Option<String>,
    /// Milliseconds.
    #[serde(rename = "Audio_Start")]
    pub audio_start: i64,
    #[serde(rename = "Audio_End")]
    pub audio_end: i64,
    pub graid: String,
    /// Only for corpora with RefIND annotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refind: Option<String>,
    #[serde(rename = "refindFK", skip_serializing_if = "Option::is_none")]
    pub refind_fk: Option<String>,
    /// Only for corpora with ISNRef annotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isnref: Option<String>,
    #[serde(rename = "Media_IDs")]
    pub media_ids: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Media {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Media_Type")]
    pub media_type: &'static str,
    #[serde(rename = "Size")]
    pub size: u64,
    /// Recording length in seconds, for audio files.
    #[serde(rename = "Length")]
    pub length: Option<f64>,
    #[serde(rename = "Contribution_ID")]
    pub contribution_id: String,
    #[serde(rename = "Download_URL")]
    pub download_url: String,
}

/// Media type of a corpus file, by extension.
pub fn media_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/x-wav",
        Some("eaf") => "application/eaf+xml",
        Some("xml") => "application/xml",
        Some("tsv") => "text/tab-separated-values",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// `yes|no` boolean format.
pub fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}
