//! Archive command implementation
//!
//! `padkit archive --export-id <id>` zips the folder of a recorded export.

use crate::cli::commands::export::archive;
use crate::cli::commands::{coordinator, load, EXIT_OK};
use crate::domain::ids::ExportId;
use clap::Args;

/// Arguments for the archive command
#[derive(Args, Debug)]
pub struct ArchiveArgs {
    /// Export to archive, as listed by `padkit history`
    #[arg(short, long, value_name = "ID")]
    pub export_id: ExportId,
}

impl ArchiveArgs {
    /// Execute the archive command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        let coordinator = match coordinator(&config).await {
            Ok(coordinator) => coordinator,
            Err(code) => return Ok(code),
        };

        Ok(match archive(&coordinator, self.export_id).await {
            Ok(()) => EXIT_OK,
            Err(code) => code,
        })
    }
}
