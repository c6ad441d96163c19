//! CLI command implementations
//!
//! Each command returns its process exit code:
//!
//! | Code | Meaning |
//! |---|---|
//! | 0 | success |
//! | 1 | finished, but at least one item failed |
//! | 2 | configuration or usage error |
//! | 4 | database error |
//! | 5 | fatal error |

pub mod archive;
pub mod export;
pub mod history;
pub mod kit;
pub mod validate;

use crate::config::{load_config, PadkitConfig};
use crate::core::export::ExportCoordinator;
use crate::domain::options::ExportConfig;
use crate::domain::PadkitError;
use std::path::PathBuf;

pub const EXIT_OK: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_DATABASE: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// Exit code for an error that ended a command
pub fn exit_code(error: &PadkitError) -> i32 {
    match error {
        PadkitError::Configuration(_) | PadkitError::Validation(_) | PadkitError::NotFound(_) => {
            EXIT_CONFIG
        }
        PadkitError::Database(_) | PadkitError::Persistence(_) => EXIT_DATABASE,
        _ => EXIT_FATAL,
    }
}

/// Export options shared by `export` and `kit`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output folder (overrides export.output_base_path)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Output format: wav or aiff
    #[arg(long)]
    pub format: Option<String>,

    /// Do not write JSON sidecar files
    #[arg(long)]
    pub no_metadata: bool,

    /// Keep original names, only replacing path separators
    #[arg(long)]
    pub no_sanitize: bool,

    /// Zip the export folder once the export is recorded
    #[arg(long)]
    pub archive: bool,
}

impl OutputArgs {
    /// Merge the flags over the `[export]` defaults
    pub fn export_config(
        &self,
        config: &PadkitConfig,
        organize_by: Option<&str>,
    ) -> Result<ExportConfig, PadkitError> {
        let defaults = &config.export;
        ExportConfig::from_strs(
            organize_by.unwrap_or(&defaults.organize_by),
            self.format.as_deref().unwrap_or(&defaults.format),
            defaults.include_metadata && !self.no_metadata,
            defaults.sanitize_filenames && !self.no_sanitize,
            self.output
                .clone()
                .unwrap_or_else(|| defaults.output_base_path.clone()),
        )
    }
}

/// Load the configuration, printing the failure
pub(crate) fn load(config_path: &str) -> Result<PadkitConfig, i32> {
    load_config(config_path).map_err(|e| {
        tracing::error!(config_path = %config_path, error = %e, "Failed to load configuration");
        eprintln!("❌ Failed to load configuration file {config_path}");
        eprintln!("   Error: {e}");
        exit_code(&e)
    })
}

/// Build the coordinator, printing the failure
pub(crate) async fn coordinator(config: &PadkitConfig) -> Result<ExportCoordinator, i32> {
    ExportCoordinator::from_config(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to create export coordinator");
        eprintln!("❌ Failed to initialize export: {e}");
        exit_code(&e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&PadkitError::Configuration("x".into())), EXIT_CONFIG);
        assert_eq!(exit_code(&PadkitError::NotFound("sample 9".into())), EXIT_CONFIG);
        assert_eq!(exit_code(&PadkitError::Persistence("x".into())), EXIT_DATABASE);
        assert_eq!(exit_code(&PadkitError::Database("x".into())), EXIT_DATABASE);
        assert_eq!(exit_code(&PadkitError::Filesystem("x".into())), EXIT_FATAL);
    }

    #[test]
    fn test_output_args_override_defaults() {
        let config = PadkitConfig::default();
        let args = OutputArgs {
            output: Some(PathBuf::from("/tmp/out")),
            format: Some("aiff".to_string()),
            no_metadata: true,
            no_sanitize: false,
            archive: false,
        };

        let export = args.export_config(&config, Some("genre")).unwrap();
        assert_eq!(export.output_base_path, PathBuf::from("/tmp/out"));
        assert_eq!(export.format.as_str(), "aiff");
        assert_eq!(export.organize_by.as_str(), "genre");
        assert!(!export.include_metadata);
        assert!(export.sanitize_filenames);
    }

    #[test]
    fn test_output_args_reject_unknown_format() {
        let args = OutputArgs {
            format: Some("mp3".to_string()),
            ..Default::default()
        };
        assert!(args.export_config(&PadkitConfig::default(), None).is_err());
    }
}
