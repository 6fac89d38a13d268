use clap::Args;
use dao_tlk::{edit::ExportOptions, text};
use miette::{Context, IntoDiagnostic, Result};
use std::{io::BufWriter, path::PathBuf};
use tracing::info;

use super::{create_output, open_table};

#[derive(Args)]
pub struct ExportArgs {
    /// An input TLK file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// A target text file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// List every string once instead of once per reference
    #[arg(long, default_value_t = false)]
    unique: bool,

    /// Keep line breaks instead of writing them as `\n`
    #[arg(long, default_value_t = false)]
    raw: bool,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExportArgs {
    pub fn handle(&self) -> Result<()> {
        let tlk = open_table(&self.input)?;

        let items = tlk.export(
            ExportOptions::builder()
                .unique(self.unique)
                .escape_newlines(!self.raw)
                .build(),
        );

        let out = create_output(&self.output, self.overwrite)?;
        text::write_items(&items, BufWriter::new(out))
            .context(format!("writing {}", self.output.display()))?;

        info!("exported {} strings to {}", items.len(), self.output.display());
        Ok(())
    }
}

#[derive(Args)]
pub struct ImportArgs {
    /// An input text file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// A target TLK file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// The TLK file to apply the listing to, defaults to the target
    #[arg(short, long, value_name = "FILE")]
    base: Option<PathBuf>,

    /// Give edited references a string of their own instead of changing shared strings
    #[arg(long, default_value_t = false)]
    split: bool,

    /// Merge strings with identical text before saving
    #[arg(long, default_value_t = false)]
    merge: bool,
}

impl ImportArgs {
    pub fn handle(&self) -> Result<()> {
        let base = self.base.as_ref().unwrap_or(&self.output);
        let mut tlk = open_table(base)?;

        let listing = std::fs::read_to_string(&self.input)
            .into_diagnostic()
            .context(format!("path: {}", self.input.display()))?;
        let items = text::parse_items(&listing);

        let changed = tlk.import(&items, self.split);
        info!("changed {} of {} strings", changed, items.len());

        if self.merge {
            tlk.merge_duplicates();
        }

        tlk.save(&self.output)
            .context(format!("writing {}", self.output.display()))?;
        Ok(())
    }
}
