use dao_tlk::TalkTable;
use miette::{Context, IntoDiagnostic, Result};
use std::{fs::File, path::Path};

pub mod dedup;
pub mod diff;
pub mod text;
pub mod xml;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Export the strings of a TLK file to a text listing
    Tlk2txt(text::ExportArgs),
    /// Import a text listing into a TLK file
    Txt2tlk(text::ImportArgs),
    /// Export the strings of a TLK file to an XML document
    Tlk2xml(xml::ExportArgs),
    /// Import an XML document into a TLK file
    Xml2tlk(xml::ImportArgs),
    /// Merge strings with identical text
    Dedup(dedup::DedupArgs),
    /// Compare two TLK files
    Diff(diff::DiffArgs),
}

impl Commands {
    pub fn handle(&self) -> Result<()> {
        match self {
            Commands::Tlk2txt(args) => args.handle(),
            Commands::Txt2tlk(args) => args.handle(),
            Commands::Tlk2xml(args) => args.handle(),
            Commands::Xml2tlk(args) => args.handle(),
            Commands::Dedup(args) => args.handle(),
            Commands::Diff(args) => args.handle(),
        }
    }
}

pub(crate) fn open_table(path: &Path) -> Result<TalkTable> {
    TalkTable::open(path).context(format!("path: {}", path.display()))
}

pub(crate) fn create_output(path: &Path, overwrite: bool) -> Result<File> {
    if !overwrite {
        File::create_new(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    } else {
        File::create(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    }
}
