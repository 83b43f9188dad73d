//! Tab separated annotation tables.
use std::path::Path;

use csv::StringRecord;

use crate::error::Error;
use crate::refind::{RefindMap, UNMARKED};

/// Rewrite the `refind` column of a table held in `src`.
///
/// Local indices are looked up for `tid`, then for `raw_tid` (the text id with split suffix).
/// Only the `refind` values change: the header, blank lines, line endings and a missing final
/// newline are copied from the source.
pub fn remap_table(
    src: &[u8],
    path: &Path,
    map: &RefindMap,
    tid: &str,
    raw_tid: &str,
) -> Result<(Vec<u8>, usize), Error> {
    let mut reader = crate::refind::tsv_reader_builder().from_reader(src);
    let idx = reader
        .headers()?
        .iter()
        .position(|h| h == "refind")
        .ok_or_else(|| Error::MissingColumn {
            path: path.to_path_buf(),
            column: "refind",
        })?;

    let mut records: Vec<(usize, StringRecord)> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let start = record.position().map_or(0, |p| p.byte() as usize);
        records.push((start, record));
    }

    let mut out = Vec::with_capacity(src.len() + records.len());
    let header_end = records.first().map_or(src.len(), |(start, _)| *start);
    out.extend_from_slice(&src[..header_end]);

    let mut replaced = 0;
    for (i, (start, record)) in records.iter().enumerate() {
        let end = records.get(i + 1).map_or(src.len(), |(next, _)| *next);
        let line = &src[*start..end];
        // blank lines skipped by the reader belong to the next record
        let blank = line
            .iter()
            .take_while(|b| **b == b'\n' || **b == b'\r')
            .count();
        // no quoting: fields and tabs are the raw content of the line
        let width = record.iter().map(str::len).sum::<usize>() + record.len().saturating_sub(1);

        let mut fields = Vec::with_capacity(record.len());
        for (col, value) in record.iter().enumerate() {
            if col != idx || value.is_empty() || value == UNMARKED {
                fields.push(value.to_string());
                continue;
            }
            let id = map
                .get(tid, value)
                .or_else(|| map.get(raw_tid, value))
                .ok_or_else(|| Error::MissingReferent {
                    text: tid.to_string(),
                    refind: value.to_string(),
                })?;
            fields.push(id.to_string());
            replaced += 1;
        }

        out.extend_from_slice(&line[..blank]);
        out.extend_from_slice(fields.join("\t").as_bytes());
        out.extend_from_slice(&line[(blank + width).min(line.len())..]);
    }

    Ok((out, replaced))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::refind::RefindMapBuilder;

    use super::*;

    fn map() -> RefindMap {
        let mut builder = RefindMapBuilder::new();
        builder.add_text("mc_veraa_isam", ["0001", "0002"]);
        builder.build().unwrap()
    }

    #[test]
    fn remap() {
        let src = "corpus\ttext\trefind\tgloss\nveraa\tisam\t0001\t\"x\nveraa\tisam\t\tART\nveraa\tisam\t0002\t\n";
        let (out, n) = remap_table(src.as_bytes(), Path::new("t.tsv"), &map(), "isam", "isam").unwrap();
        assert_eq!(n, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "corpus\ttext\trefind\tgloss\nveraa\tisam\t10001\t\"x\nveraa\tisam\t\tART\nveraa\tisam\t10002\t\n"
        );
    }

    #[test]
    fn keeps_crlf() {
        let src = "refind\tgloss\r\n0001\tA\r\n";
        let (out, _) = remap_table(src.as_bytes(), Path::new("t.tsv"), &map(), "isam", "isam").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "refind\tgloss\r\n10001\tA\r\n");
    }

    #[test]
    fn blank_lines_and_last_line() {
        let src = "gword\trefind\na\t0001\n\nb\t\r\n\n\nc\t0002";
        let (out, n) = remap_table(src.as_bytes(), Path::new("t.tsv"), &map(), "isam", "isam").unwrap();
        assert_eq!(n, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "gword\trefind\na\t10001\n\nb\t\r\n\n\nc\t10002"
        );
    }

    #[test]
    fn header_only() {
        let src = "gword\trefind\n";
        let (out, n) = remap_table(src.as_bytes(), Path::new("t.tsv"), &map(), "isam", "isam").unwrap();
        assert_eq!(n, 0);
        assert_eq!(out, src.as_bytes());
    }

    #[test]
    fn raw_text_id() {
        let src = "refind\n0002\n";
        let (out, _) = remap_table(src.as_bytes(), Path::new("t.tsv"), &map(), "nope", "isam").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "refind\n10002\n");
    }

    #[test]
    fn missing() {
        let src = "refind\n0003\n";
        assert!(matches!(
            remap_table(src.as_bytes(), Path::new("t.tsv"), &map(), "isam", "isam"),
            Err(Error::MissingReferent { .. })
        ));
        assert!(matches!(
            remap_table(b"gloss\nA\n", Path::new("t.tsv"), &map(), "isam", "isam"),
            Err(Error::MissingColumn { .. })
        ));
    }
}
