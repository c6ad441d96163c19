//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the padkit configuration file and the catalog it points to.

use crate::adapters::catalog::TomlCatalog;
use crate::cli::commands::{EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use crate::config::schema::{DatabaseTarget, PadkitConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Skip loading the sample catalog
    #[arg(long)]
    pub skip_catalog: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as well
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if !self.skip_catalog {
            match TomlCatalog::load(&config.catalog.path) {
                Ok(catalog) => println!(
                    "✅ Catalog loaded: {} sample(s), {} kit(s)",
                    catalog.sample_count(),
                    catalog.kit_count()
                ),
                Err(e) => {
                    println!("❌ Catalog could not be loaded");
                    println!("   Error: {e}");
                    return Ok(EXIT_CONFIG);
                }
            }
        }

        println!();
        print_summary(&config);
        Ok(EXIT_OK)
    }
}

fn print_summary(config: &PadkitConfig) {
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Catalog: {}", config.catalog.path.display());
    println!("  Output Folder: {}", config.export.output_base_path.display());
    println!("  Archive Folder: {}", config.export.archive_dir.display());
    println!("  Organize By: {}", config.export.organize_by);
    println!("  Format: {}", config.export.format);
    println!("  Metadata Sidecars: {}", config.export.include_metadata);
    println!("  Sanitize Filenames: {}", config.export.sanitize_filenames);
    println!(
        "  Target: {} Hz / {}-bit",
        config.hardware.target_sample_rate, config.hardware.target_bit_depth
    );
    println!("  Minimum Duration: {} ms", config.hardware.min_duration_ms);
    println!(
        "  Conversions: {} at a time, {}s timeout",
        config.hardware.max_concurrent_conversions, config.hardware.conversion_timeout_secs
    );

    match config.database_target {
        DatabaseTarget::Sqlite => {
            println!("  Database Target: SQLite");
            println!("  SQLite URL: {}", config.sqlite.url);
        }
        DatabaseTarget::PostgreSQL => {
            if let Some(ref pg_config) = config.postgresql {
                use secrecy::ExposeSecret;
                println!("  Database Target: PostgreSQL");
                println!(
                    "  PostgreSQL Connection: {}",
                    pg_config
                        .connection_string
                        .expose_secret()
                        .as_ref()
                        .split('@')
                        .next_back()
                        .unwrap_or("***")
                );
                println!("  Max Connections: {}", pg_config.max_connections);
            }
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_config_is_config_error() {
        let args = ValidateArgs { skip_catalog: true };
        let code = args.execute("/nonexistent/padkit.toml").await.unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }

    #[tokio::test]
    async fn test_valid_config_with_catalog() {
        let dir = TempDir::new().unwrap();
        let catalog = dir.path().join("catalog.toml");
        std::fs::write(&catalog, "[[samples]]\nid = 1\nfile_path = \"kick.wav\"\n").unwrap();
        let config = dir.path().join("padkit.toml");
        std::fs::write(
            &config,
            format!("[catalog]\npath = \"{}\"\n", catalog.display()),
        )
        .unwrap();

        let args = ValidateArgs { skip_catalog: false };
        let code = args.execute(config.to_str().unwrap()).await.unwrap();
        assert_eq!(code, EXIT_OK);
    }
}
