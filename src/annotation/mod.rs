/*! Annotation file rewriting

Annotation files carry the local referent indices of a single text. [remap_refind] replaces
them by the dataset-wide ids of a [RefindMap], keeping the rest of the file intact.

| extension | format                | line endings |
|-----------|-----------------------|--------------|
| `tsv`     | tab separated table   | as in source |
| `eaf`     | ELAN annotation file  | LF           |
| `xml`     | Multi-CAST corpus XML | CRLF         |

Files are rewritten as a whole and replaced atomically: a failing rewrite leaves the original
file untouched.
!*/
pub mod corpus;
pub mod eaf;
mod tsv;
pub mod xml;

use std::{io::Write, path::Path};

use log::info;
use tempfile::NamedTempFile;

use crate::error::Error;
use crate::refind::{textid, RefindMap};

pub use corpus::{CorpusFile, Unit};
pub use xml::{update_xml, Newline, SerializationPolicy, XmlDocument};

/// Rewrite the referent indices of the annotation file at `path`, in place.
///
/// Lookup failures are fatal: they mean that the file doesn't match the map.
pub fn remap_refind(path: &Path, map: &RefindMap) -> Result<(), Error> {
    let raw_tid = textid::text_id_from_path(path)
        .ok_or_else(|| Error::Custom(format!("invalid file name: {:?}", path)))?;
    let tid = textid::normalize(&raw_tid);

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let replaced = match ext {
        "eaf" => {
            let mut n = 0;
            update_xml(path, eaf::POLICY, |doc| {
                n = eaf::remap_refind(doc, map, tid)?;
                Ok(())
            })?;
            n
        }
        "xml" => {
            let mut n = 0;
            update_xml(path, corpus::POLICY, |doc| {
                n = corpus::remap_refind(doc, map, tid)?;
                Ok(())
            })?;
            n
        }
        "tsv" => {
            let src = std::fs::read(path)?;
            let (out, n) = tsv::remap_table(&src, path, map, tid, &raw_tid)?;
            write_atomic(path, &out)?;
            n
        }
        _ => return Err(Error::UnknownExtension(path.to_path_buf())),
    };

    info!("{:?}: {} referent indices remapped", path, replaced);
    Ok(())
}

/// Replace the content of `path` with `content`, going through a temporary file in the same
/// directory.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<(), Error> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use crate::refind::RefindMapBuilder;

    use super::*;

    fn map() -> RefindMap {
        let mut builder = RefindMapBuilder::new();
        builder.add_text("mc_veraa_isam_a", ["0001"]);
        builder.build().unwrap()
    }

    #[test]
    fn unknown_extension() {
        let dst = tempdir().unwrap();
        let p = dst.path().join("mc_veraa_isam.txt");
        fs::write(&p, "refind\n0001\n").unwrap();
        assert!(matches!(
            remap_refind(&p, &map()),
            Err(Error::UnknownExtension(_))
        ));
    }

    #[test]
    fn split_text_table() {
        let dst = tempdir().unwrap();
        let p = dst.path().join("mc_veraa_isam_a.tsv");
        fs::write(&p, "refind\n0001\n").unwrap();
        remap_refind(&p, &map()).unwrap();
        assert_eq!(fs::read_to_string(&p).unwrap(), "refind\n10001\n");
    }

    #[test]
    fn failure_leaves_file_untouched() {
        let dst = tempdir().unwrap();
        let p = dst.path().join("mc_veraa_isam.xml");
        let src = "<text><file><unit><refind>0001</refind><refind>0002</refind></unit></file></text>";
        fs::write(&p, src).unwrap();
        assert!(remap_refind(&p, &map()).is_err());
        assert_eq!(fs::read_to_string(&p).unwrap(), src);
        assert_eq!(fs::read_dir(dst.path()).unwrap().count(), 1);
    }
}
