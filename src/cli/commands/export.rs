//! Export command implementation
//!
//! `padkit export --sample <id>...` exports one sample, or a batch when more
//! than one id is given.

use crate::cli::commands::{
    coordinator, exit_code, load, OutputArgs, EXIT_CONFIG, EXIT_OK, EXIT_PARTIAL,
};
use crate::core::export::{BatchExportResult, ExportCoordinator, ExportResult};
use crate::domain::ids::{ExportId, SampleId};
use clap::Args;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Sample id(s) to export; more than one runs a batch
    #[arg(short, long = "sample", value_name = "ID", required = true, num_args = 1..)]
    pub samples: Vec<SampleId>,

    /// Folder layout: flat, genre, bpm, or kit
    #[arg(long)]
    pub organize_by: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(samples = self.samples.len(), "Starting export command");

        let config = match load(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        let export_config = match self.output.export_config(&config, self.organize_by.as_deref()) {
            Ok(export_config) => export_config,
            Err(e) => {
                eprintln!("Invalid export options: {e}");
                return Ok(EXIT_CONFIG);
            }
        };
        let coordinator = match coordinator(&config).await {
            Ok(coordinator) => coordinator,
            Err(code) => return Ok(code),
        };

        println!(
            "🚀 Exporting {} sample(s) to {}",
            self.samples.len(),
            export_config.output_base_path.display()
        );
        println!();

        let (export_id, code) = if let [sample_id] = self.samples.as_slice() {
            match coordinator.export_sample(*sample_id, &export_config).await {
                Ok(result) => {
                    print_single(&result);
                    let code = if result.success { EXIT_OK } else { EXIT_PARTIAL };
                    (result.export_id, code)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Export failed");
                    eprintln!("Export failed: {e}");
                    return Ok(exit_code(&e));
                }
            }
        } else {
            match coordinator.export_batch(&self.samples, &export_config).await {
                Ok(batch) => {
                    print_batch(&batch);
                    let code = if batch.is_successful() { EXIT_OK } else { EXIT_PARTIAL };
                    (batch.export_id, code)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Export failed");
                    eprintln!("Export failed: {e}");
                    return Ok(exit_code(&e));
                }
            }
        };

        if self.output.archive {
            if let Some(export_id) = export_id {
                if let Err(code) = archive(&coordinator, export_id).await {
                    return Ok(code);
                }
            }
        }

        Ok(code)
    }
}

pub(crate) async fn archive(coordinator: &ExportCoordinator, export_id: ExportId) -> Result<(), i32> {
    match coordinator.archive_export(export_id).await {
        Ok(summary) => {
            println!(
                "📦 Archived {} file(s) to {}",
                summary.file_count,
                summary.archive_path.display()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(export_id = %export_id, error = %e, "Archive failed");
            eprintln!("Archive failed: {e}");
            Err(exit_code(&e))
        }
    }
}

fn print_single(result: &ExportResult) {
    match (&result.output_path, &result.error) {
        (Some(path), _) if result.success => {
            println!("✅ Sample {} exported to {}", result.sample_id, path.display());
            if let Some(metadata) = &result.metadata_path {
                println!("   Metadata: {}", metadata.display());
            }
            if result.used_fallback {
                println!("   Converted with the reduced-quality resampler");
            }
            if let Some(export_id) = result.export_id {
                println!("   Export id: {export_id}");
            }
        }
        (_, Some(error)) => println!("⚠️  Sample {} not exported: {}", result.sample_id, error),
        _ => println!("⚠️  Sample {} not exported", result.sample_id),
    }
}

fn print_batch(batch: &BatchExportResult) {
    println!("📊 Export Summary:");
    if let Some(export_id) = batch.export_id {
        println!("  Export id: {export_id}");
    }
    println!("  Requested: {}", batch.requested);
    println!("  Successful: {}", batch.successful);
    println!("  Failed: {}", batch.failed);
    println!("  Total size: {} bytes", batch.total_size_bytes);
    println!("  Duration: {:.2}s", batch.total_time.as_secs_f64());
    println!("  Success Rate: {:.2}%", batch.success_rate());
    println!();

    if !batch.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in &batch.errors {
            println!("  - {error}");
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_parse_multiple_samples() {
        let cli = Cli::parse_from([
            "padkit", "export", "--sample", "1", "--sample", "2", "--organize-by", "bpm",
            "--no-metadata",
        ]);
        let Commands::Export(args) = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(args.samples, vec![SampleId::from(1), SampleId::from(2)]);
        assert_eq!(args.organize_by.as_deref(), Some("bpm"));
        assert!(args.output.no_metadata);
        assert!(!args.output.archive);
    }

    #[test]
    fn test_sample_is_required() {
        assert!(Cli::try_parse_from(["padkit", "export"]).is_err());
    }

    #[test]
    fn test_negative_sample_rejected() {
        assert!(Cli::try_parse_from(["padkit", "export", "--sample", "-3"]).is_err());
    }
}
