//! History command implementation
//!
//! `padkit history` lists recorded exports, newest first. With
//! `--export-id` it shows the per-sample rows of one export.

use crate::adapters::database::{ExportDetail, ExportHistoryPage};
use crate::cli::commands::{coordinator, exit_code, load, EXIT_CONFIG, EXIT_OK};
use crate::domain::ids::ExportId;
use clap::Args;

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Exports per page (at most 100)
    #[arg(long, default_value_t = 20)]
    pub page_size: u32,

    /// Show one export in detail
    #[arg(long, value_name = "ID")]
    pub export_id: Option<ExportId>,
}

impl HistoryArgs {
    /// Execute the history command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load(config_path) {
            Ok(config) => config,
            Err(code) => return Ok(code),
        };
        let coordinator = match coordinator(&config).await {
            Ok(coordinator) => coordinator,
            Err(code) => return Ok(code),
        };

        if let Some(export_id) = self.export_id {
            return Ok(match coordinator.get_export(export_id).await {
                Ok(Some(detail)) => {
                    print_detail(&detail);
                    EXIT_OK
                }
                Ok(None) => {
                    eprintln!("Export {export_id} not found");
                    EXIT_CONFIG
                }
                Err(e) => {
                    eprintln!("Failed to load export {export_id}: {e}");
                    exit_code(&e)
                }
            });
        }

        Ok(match coordinator.list_history(self.page, self.page_size).await {
            Ok(page) => {
                print_page(&page);
                EXIT_OK
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to list export history");
                eprintln!("Failed to list export history: {e}");
                exit_code(&e)
            }
        })
    }
}

fn print_page(page: &ExportHistoryPage) {
    println!(
        "📜 Export History (page {} of {}, {} total)",
        page.page,
        page.total_pages().max(1),
        page.total
    );
    println!();

    if page.records.is_empty() {
        println!("No exports found.");
        return;
    }

    println!(
        "{:<8} {:<7} {:>7} {:>12} {:<8} {:<25} Path",
        "Id", "Type", "Samples", "Bytes", "Format", "Created"
    );
    for record in &page.records {
        println!(
            "{:<8} {:<7} {:>7} {:>12} {:<8} {:<25} {}",
            record.id,
            record.export_type,
            record.sample_count,
            record.total_size_bytes,
            record.format,
            record.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            record.output_path
        );
    }
}

fn print_detail(detail: &ExportDetail) {
    let record = &detail.record;
    println!("Export {} ({})", record.id, record.export_type);
    println!("  Created: {}", record.created_at.to_rfc3339());
    println!("  Path: {}", record.output_path);
    println!("  Organize by: {}", record.organize_by);
    println!("  Format: {}", record.format);
    println!("  Samples: {}", record.sample_count);
    println!("  Total size: {} bytes", record.total_size_bytes);
    println!("  Duration: {:.2}s", record.duration_seconds);
    println!();

    for sample in &detail.samples {
        let location = match (&sample.output_subfolder, &sample.output_filename) {
            (Some(folder), Some(file)) if !folder.is_empty() => format!("{folder}/{file}"),
            (_, Some(file)) => file.clone(),
            _ => "-".to_string(),
        };
        if sample.success {
            println!("  ✅ sample {}: {}", sample.sample_id, location);
        } else {
            println!(
                "  ❌ sample {}: {}",
                sample.sample_id,
                sample.error_message.as_deref().unwrap_or("failed")
            );
        }
    }
}
