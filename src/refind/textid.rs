//! Text identifiers derived from file names.
//!
//! Annotation files are named `mc_<corpus>_<text>.<ext>`, where texts that were
//! recorded in several parts get an additional `_a`/`_b` suffix.
use std::path::Path;

/// Suffixes marking a text split across several recordings.
const SPLIT_SUFFIXES: [&str; 2] = ["_a", "_b"];

/// Suffixes tried when a referent list row does not match any text.
///
/// This is a heuristic for split texts whose referent list entries use a
/// different file name than the annotation tier. It is not guaranteed to find
/// the right text and should not be extended.
pub const RECOVERY_SUFFIXES: [&str; 5] = ["_a", "_b", "_c", "_d", "_e"];

/// Get the text id from a file stem, dropping the `mc_<corpus>_` prefix.
///
/// The split suffix (if any) is kept.
pub fn text_id(stem: &str) -> String {
    stem.split('_').skip(2).collect::<Vec<_>>().join("_")
}

/// Get the text id from a file path. See [text_id].
pub fn text_id_from_path(path: &Path) -> Option<String> {
    path.file_stem().and_then(|s| s.to_str()).map(text_id)
}

/// Strip a trailing split suffix (`_a` or `_b`).
pub fn normalize(tid: &str) -> &str {
    SPLIT_SUFFIXES
        .iter()
        .find_map(|suffix| tid.strip_suffix(suffix))
        .unwrap_or(tid)
}
