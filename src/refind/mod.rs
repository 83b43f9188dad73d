/*! Referent indices (RefIND)

Unification of per-text referent indices into dataset-wide ids, and reading of referent lists.

- [RefindMap] is built once per corpus from its per-text tables,
- [Referents] reads the referent list of the corpus against that map,
- [crate::annotation] uses the same map to rewrite annotation files.
!*/
mod class;
mod map;
mod referents;
mod relations;
pub mod textid;

pub use class::SemanticClass;
pub use map::{RefindMap, RefindMapBuilder};
pub use referents::{ReferentId, ReferentRecord, ReferentRelation, ReferentWarning, Referents};
pub use relations::{RelationKind, Relations};

/// Empty set sign, used for missing annotations.
pub const UNMARKED: &str = "\u{2205}";

/// Reader settings for the tab separated files of a corpus.
///
/// Quotes have no special meaning in these files.
pub(crate) fn tsv_reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.delimiter(b'\t').quoting(false).flexible(true);
    builder
}
