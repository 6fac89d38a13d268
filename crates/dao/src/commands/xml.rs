use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use std::{io::Write, path::PathBuf};
use tracing::info;

use super::{create_output, open_table};

#[derive(Args)]
pub struct ExportArgs {
    /// An input TLK file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// A target XML file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Merge strings with identical text before exporting
    #[arg(long, default_value_t = false)]
    merge: bool,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExportArgs {
    pub fn handle(&self) -> Result<()> {
        let mut tlk = open_table(&self.input)?;
        if self.merge {
            tlk.merge_duplicates();
        }

        let xml = tlk.to_xml()?;

        let mut out = create_output(&self.output, self.overwrite)?;
        out.write_all(xml.as_bytes())
            .into_diagnostic()
            .context(format!("writing {}", self.output.display()))?;

        info!(
            "exported {} strings to {}",
            tlk.records().len(),
            self.output.display()
        );
        Ok(())
    }
}

#[derive(Args)]
pub struct ImportArgs {
    /// An input XML file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// A target TLK file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// The TLK file to apply the document to, defaults to the target
    #[arg(short, long, value_name = "FILE")]
    base: Option<PathBuf>,

    /// Give edited references a string of their own instead of changing shared strings
    #[arg(long, default_value_t = false)]
    split: bool,
}

impl ImportArgs {
    pub fn handle(&self) -> Result<()> {
        let base = self.base.as_ref().unwrap_or(&self.output);
        let mut tlk = open_table(base)?;

        let document = std::fs::read_to_string(&self.input)
            .into_diagnostic()
            .context(format!("path: {}", self.input.display()))?;

        let changed = tlk
            .import_xml(&document, self.split)
            .context(format!("parsing {}", self.input.display()))?;
        info!("changed {} strings", changed);

        tlk.save(&self.output)
            .context(format!("writing {}", self.output.display()))?;
        Ok(())
    }
}
