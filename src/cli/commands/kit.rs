//! Kit command implementation
//!
//! `padkit kit --kit <id>` exports a kit folder with its `PADCONF.BIN`.

use crate::cli::commands::export::archive;
use crate::cli::commands::{coordinator, exit_code, load, OutputArgs, EXIT_CONFIG, EXIT_OK, EXIT_PARTIAL};
use crate::core::export::KitExportResult;
use crate::domain::ids::KitId;
use clap::Args;

/// Arguments for the kit command
#[derive(Args, Debug)]
pub struct KitArgs {
    /// Kit id to export
    #[arg(short, long, value_name = "ID")]
    pub kit: KitId,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl KitArgs {
    /// Execute the kit command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(kit_id = %self.kit, "Starting kit export command");

        let config = match load(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        let export_config = match self.output.export_config(&config, Some("kit")) {
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

        println!("🥁 Exporting kit {}", self.kit);
        println!();

        let result = match coordinator.export_kit(self.kit, &export_config).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(kit_id = %self.kit, error = %e, "Kit export failed");
                eprintln!("Kit export failed: {e}");
                return Ok(exit_code(&e));
            }
        };
        print_kit(&result);

        if self.output.archive {
            if let Some(export_id) = result.export_id {
                if let Err(code) = archive(&coordinator, export_id).await {
                    return Ok(code);
                }
            }
        }

        Ok(if result.failed == 0 && result.success {
            EXIT_OK
        } else {
            EXIT_PARTIAL
        })
    }
}

fn print_kit(result: &KitExportResult) {
    println!("Kit: {} ({})", result.kit_name, result.kit_id);
    println!("  Folder: {}", result.kit_path.display());
    println!("  PADCONF: {}", result.padconf_path.display());
    let banks: Vec<String> = result.banks.iter().map(ToString::to_string).collect();
    println!("  Banks: {}", banks.join(", "));
    println!();

    if let Some(export_id) = result.export_id {
        println!("  Export id: {export_id}");
    }
    println!("  Pads: {}", result.requested);
    println!("  Successful: {}", result.successful);
    println!("  Failed: {}", result.failed);
    println!("  Total size: {} bytes", result.total_size_bytes);
    println!("  Duration: {:.2}s", result.total_time.as_secs_f64());
    println!();

    for error in &result.errors {
        println!("  - {error}");
    }

    match &result.error {
        Some(error) if result.success => println!("⚠️  {error}"),
        Some(error) => println!("❌ {error}"),
        None => println!("✅ Kit exported successfully!"),
    }
}
