use clap::Args;
use miette::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use super::{create_output, open_table};

#[derive(Args)]
pub struct DedupArgs {
    /// An input TLK file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// A target TLK file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl DedupArgs {
    pub fn handle(&self) -> Result<()> {
        let mut tlk = open_table(&self.input)?;
        let before = tlk.records().len();

        let merged = tlk.merge_duplicates();
        info!("merged {} of {} strings", merged, before);

        let out = create_output(&self.output, self.overwrite)?;
        tlk.write(out)
            .context(format!("writing {}", self.output.display()))?;

        Ok(())
    }
}
