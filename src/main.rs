//! # multicast
//!
//! Conversion of Multi-CAST corpora into CLDF datasets.
//!
//! Referent indices of the corpora are only unique within a text: they are rewritten into
//! dataset-wide ids in every annotation file and in the referent tables.
//!
//! ## Getting started
//!
//! ```sh
//! multicast 0.1.0
//! Multi-CAST to CLDF conversion tool.
//!
//! USAGE:
//!     multicast <SUBCOMMAND>
//!
//! SUBCOMMANDS:
//!     help         Prints this message or the help of the given subcommand(s)
//!     makecldf     Create the CLDF data of a dataset
//!     map          Show the referent index map of a corpus
//!     referents    Write referent and referent relation tables
//!     remap        Rewrite referent indices of annotation files, in place
//! ```
//!
//! Set `RUST_LOG=info` (or `debug`) to follow progress.
use structopt::StructOpt;

#[macro_use]
extern crate log;

mod cli;

use multicast::{
    annotation,
    dataset::{self, Dataset},
    error::Error,
    refind::RefindMap,
};

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::Multicast::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::Multicast::Makecldf(m) => {
            let dataset = Dataset::open(&m.dataset)?;
            let dst = m.dst.unwrap_or_else(|| dataset.cldf_dir());
            let summary = dataset.makecldf(&dst)?;
            println!(
                "{}: {} texts, {} utterances, {} media files",
                dataset.metadata().id,
                summary.texts,
                summary.utterances,
                summary.media
            );
            match (summary.referents, summary.relations) {
                (Some(referents), Some(relations)) => println!(
                    "{} referents, {} relations, {} warnings",
                    referents, relations, summary.warnings
                ),
                _ => println!("no referent annotation"),
            }
        }

        cli::Multicast::Remap(r) => {
            let map = RefindMap::from_tsv_dir(&r.tsv_dir)?;
            for file in &r.files {
                annotation::remap_refind(file, &map)?;
            }
        }

        cli::Multicast::Referents(r) => {
            let map = RefindMap::from_tsv_dir(&r.tsv_dir)?;
            std::fs::create_dir_all(&r.dst)?;
            match dataset::write_referents(&r.dst, &map, Some(r.list.as_path()))? {
                Some(tables) => println!(
                    "{} referents, {} relations, {} warnings",
                    tables.referents, tables.relations, tables.warnings
                ),
                None => println!("no referent annotation"),
            }
        }

        cli::Multicast::Map(m) => {
            let map = RefindMap::from_tsv_dir(&m.tsv_dir)?;
            println!("digits: {}", map.digits());
            println!("texts: {}", map.texts().len());
            println!("referents: {}", map.nb_referents());
            for tid in map.texts() {
                if let Some(n) = map.text_number(tid) {
                    println!("{}\t{}", n, tid);
                }
            }
        }
    };
    Ok(())
}
