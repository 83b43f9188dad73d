//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "multicast", about = "Multi-CAST to CLDF conversion tool.")]
/// Holds every command that is callable by the `multicast` command.
pub enum Multicast {
    #[structopt(about = "Create the CLDF data of a dataset")]
    Makecldf(Makecldf),
    #[structopt(about = "Rewrite referent indices of annotation files, in place")]
    Remap(Remap),
    #[structopt(about = "Write referent and referent relation tables")]
    Referents(ReferentsCmd),
    #[structopt(about = "Show the referent index map of a corpus")]
    Map(Map),
}

#[derive(Debug, StructOpt)]
/// Makecldf command and parameters.
///
/// ```sh
/// multicast-makecldf 0.1.0
/// Create the CLDF data of a dataset
///
/// USAGE:
///     multicast makecldf [OPTIONS] <dataset>
///
/// OPTIONS:
///     --dst <dst>    output directory. Default is <dataset>/cldf.
///
/// ARGS:
///     <dataset>    dataset directory (contains metadata.json and raw/)
/// ```
pub struct Makecldf {
    #[structopt(
        parse(from_os_str),
        help = "dataset directory (contains metadata.json and raw/)"
    )]
    pub dataset: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "dst",
        help = "output directory. Default is <dataset>/cldf."
    )]
    pub dst: Option<PathBuf>,
}

#[derive(Debug, StructOpt)]
pub struct Remap {
    #[structopt(parse(from_os_str), help = "directory of per-text tsv files")]
    pub tsv_dir: PathBuf,
    #[structopt(
        parse(from_os_str),
        required = true,
        help = "annotation files (.tsv, .eaf, .xml)"
    )]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, StructOpt)]
pub struct ReferentsCmd {
    #[structopt(parse(from_os_str), help = "directory of per-text tsv files")]
    pub tsv_dir: PathBuf,
    #[structopt(parse(from_os_str), help = "list of referents (tsv)")]
    pub list: PathBuf,
    #[structopt(parse(from_os_str), help = "destination directory")]
    pub dst: PathBuf,
}

#[derive(Debug, StructOpt)]
pub struct Map {
    #[structopt(parse(from_os_str), help = "directory of per-text tsv files")]
    pub tsv_dir: PathBuf,
}
