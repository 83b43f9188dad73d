use std::fs;
use std::path::Path;

use multicast::dataset::{write_referents, ReferentTables};
use multicast::error::Error;
use multicast::refind::{RefindMap, Referents};
use tempfile::tempdir;

fn write_table(dir: &Path, stem: &str, refinds: &[&str]) {
    let mut content = String::from("corpus\ttext\tgword\trefind\n");
    for (i, r) in refinds.iter().enumerate() {
        content.push_str(&format!("veraa\t{}\tw{}\t{}\n", stem, i, r));
    }
    fs::write(dir.join(format!("{}.tsv", stem)), content).unwrap();
}

#[test]
fn from_tsv_dir() {
    let dir = tempdir().unwrap();
    write_table(dir.path(), "mc_veraa_wo", &["0002", "", "0001"]);
    write_table(dir.path(), "mc_veraa_isam", &["0001", "0158"]);
    write_table(dir.path(), "mc_veraa_isam_b", &["0160"]);
    fs::write(dir.path().join("README.md"), "not a table").unwrap();

    let map = RefindMap::from_tsv_dir(dir.path()).unwrap();
    assert_eq!(map.digits(), 4);
    assert_eq!(map.texts(), &["isam".to_string(), "wo".to_string()]);
    assert_eq!(map.get("isam", "0158"), Some(10158));
    assert_eq!(map.get("isam", "0160"), Some(10160));
    assert_eq!(map.get("wo", "0002"), Some(20002));
    // 2 texts, 5 referents
    assert_eq!(map.len(), 7);
}

#[test]
fn text_entries_match_text_count() {
    let dir = tempdir().unwrap();
    for stem in ["mc_x_a", "mc_x_b_a", "mc_x_b_b", "mc_x_c"] {
        write_table(dir.path(), stem, &["0001"]);
    }
    let map = RefindMap::from_tsv_dir(dir.path()).unwrap();
    assert_eq!(map.texts().len(), 3);
    let max = map.referent_ids().max().unwrap();
    assert!(max < (3 + 1) * 10u64.pow(map.digits()));
}

#[test]
fn missing_refind_column() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("mc_x_a.tsv"), "corpus\ttext\nx\ta\n").unwrap();
    assert!(matches!(
        RefindMap::from_tsv_dir(dir.path()),
        Err(Error::MissingColumn { .. })
    ));
}

#[test_log::test]
fn referent_list() {
    let dir = tempdir().unwrap();
    let tsv = dir.path().join("tsv");
    fs::create_dir(&tsv).unwrap();
    write_table(&tsv, "mc_veraa_isam", &["0001", "0002", "0003"]);

    let list = dir.path().join("list-of-referents.tsv");
    fs::write(
        &list,
        "corpus\ttext\trefind\tlabel\tclass\tdescription\trelations\tnotes\n\
         veraa\tisam\t0001\tman\thum\t\t\t\n\
         veraa\tisam\t0004\tnever annotated\thum\t\t\t\n\
         veraa\tisam\t0003\tpeople\thum\t\t> 0001, 0002, 0009\t\n\
         veraa\tisam\t0002\twoman\thum\t\t\t\n",
    )
    .unwrap();

    let map = RefindMap::from_tsv_dir(&tsv).unwrap();
    let mut referents = Referents::from_path(&list, &map).unwrap();
    let rows: Vec<_> = referents.by_ref().map(Result::unwrap).collect();

    assert_eq!(rows.len(), 3);
    let relations: Vec<_> = rows.iter().flat_map(|(_, r)| r.iter()).collect();
    assert_eq!(relations.len(), 2);
    assert_eq!(
        relations.iter().map(|r| (r.id, r.target)).collect::<Vec<_>>(),
        vec![(1, 10001), (2, 10002)]
    );
    // one row not annotated, one relation target unknown
    assert_eq!(referents.warnings().len(), 2);
}

#[test]
fn empty_relations() {
    let dir = tempdir().unwrap();
    write_table(dir.path(), "mc_veraa_isam", &["0001"]);
    let map = RefindMap::from_tsv_dir(dir.path()).unwrap();

    let list = "corpus\ttext\trefind\trelations\nveraa\tisam\t0001\t\n";
    let rows: Vec<_> = Referents::from_reader(list.as_bytes(), &map)
        .map(Result::unwrap)
        .collect();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].1.is_empty());
}

#[test]
fn referent_tables_need_annotation() {
    let dir = tempdir().unwrap();
    let tsv = dir.path().join("tsv");
    fs::create_dir(&tsv).unwrap();
    write_table(&tsv, "mc_veraa_isam", &["", ""]);
    let list = dir.path().join("list-of-referents.tsv");
    fs::write(
        &list,
        "corpus\ttext\trefind\tlabel\nveraa\tisam\t0001\tman\n",
    )
    .unwrap();

    let map = RefindMap::from_tsv_dir(&tsv).unwrap();
    let dst = dir.path().join("out");
    fs::create_dir(&dst).unwrap();
    assert_eq!(write_referents(&dst, &map, Some(list.as_path())).unwrap(), None);
    assert!(!dst.join("referents.csv").exists());
    assert!(!dst.join("referent_relations.csv").exists());

    write_table(&tsv, "mc_veraa_isam", &["0001"]);
    let map = RefindMap::from_tsv_dir(&tsv).unwrap();
    assert_eq!(
        write_referents(&dst, &map, Some(list.as_path())).unwrap(),
        Some(ReferentTables {
            referents: 2,
            relations: 0,
            warnings: 0,
        })
    );
    assert_eq!(
        fs::read_to_string(dst.join("referents.csv")).unwrap(),
        "refind,label,description,class,notes\n\u{2205},,,,\n10001,man,,,\n"
    );
}
