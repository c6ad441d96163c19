//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DatabaseTarget, PadkitConfig};
use crate::domain::errors::PadkitError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into PadkitConfig
/// 4. Applies environment variable overrides (PADKIT_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`PadkitError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, the TOML is malformed, or
/// validation fails.
///
/// # Examples
///
/// ```no_run
/// use padkit::config::load_config;
///
/// let config = load_config("padkit.toml").expect("Failed to load config");
/// println!("Exporting to {}", config.export.output_base_path.display());
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PadkitConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PadkitError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PadkitError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution, overrides, and validation
pub fn parse_config(contents: &str) -> Result<PadkitConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: PadkitConfig = toml::from_str(&contents)
        .map_err(|e| PadkitError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        PadkitError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| PadkitError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PadkitError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|val| val.parse().ok())
}

/// Applies environment variable overrides using PADKIT_* prefix
///
/// Environment variables follow the pattern: PADKIT_<SECTION>_<KEY>
/// For example: PADKIT_EXPORT_ORGANIZE_BY, PADKIT_HARDWARE_TARGET_SAMPLE_RATE
fn apply_env_overrides(config: &mut PadkitConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("PADKIT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Export overrides
    if let Ok(val) = std::env::var("PADKIT_EXPORT_ORGANIZE_BY") {
        config.export.organize_by = val;
    }
    if let Ok(val) = std::env::var("PADKIT_EXPORT_FORMAT") {
        config.export.format = val;
    }
    if let Some(val) = parse_env("PADKIT_EXPORT_INCLUDE_METADATA") {
        config.export.include_metadata = val;
    }
    if let Some(val) = parse_env("PADKIT_EXPORT_SANITIZE_FILENAMES") {
        config.export.sanitize_filenames = val;
    }
    if let Ok(val) = std::env::var("PADKIT_EXPORT_OUTPUT_BASE_PATH") {
        config.export.output_base_path = val.into();
    }
    if let Ok(val) = std::env::var("PADKIT_EXPORT_ARCHIVE_DIR") {
        config.export.archive_dir = val.into();
    }

    // Hardware overrides
    if let Some(val) = parse_env("PADKIT_HARDWARE_TARGET_SAMPLE_RATE") {
        config.hardware.target_sample_rate = val;
    }
    if let Some(val) = parse_env("PADKIT_HARDWARE_TARGET_BIT_DEPTH") {
        config.hardware.target_bit_depth = val;
    }
    if let Some(val) = parse_env("PADKIT_HARDWARE_CONVERSION_TIMEOUT_SECS") {
        config.hardware.conversion_timeout_secs = val;
    }
    if let Some(val) = parse_env("PADKIT_HARDWARE_MAX_CONCURRENT_CONVERSIONS") {
        config.hardware.max_concurrent_conversions = val;
    }

    // Catalog overrides
    if let Ok(val) = std::env::var("PADKIT_CATALOG_PATH") {
        config.catalog.path = val.into();
    }

    // Database overrides
    if let Ok(val) = std::env::var("PADKIT_DATABASE_TARGET") {
        config.database_target = match val.to_ascii_lowercase().as_str() {
            "sqlite" => DatabaseTarget::Sqlite,
            "postgresql" => DatabaseTarget::PostgreSQL,
            other => {
                return Err(PadkitError::Configuration(format!(
                    "Invalid PADKIT_DATABASE_TARGET '{other}'. Must be one of: sqlite, postgresql"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("PADKIT_SQLITE_URL") {
        config.sqlite.url = val;
    }
    if let Some(ref mut pg_config) = config.postgresql {
        if let Ok(val) = std::env::var("PADKIT_POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = super::secret::secret_string(val);
        }
        if let Some(val) = parse_env("PADKIT_POSTGRESQL_MAX_CONNECTIONS") {
            pg_config.max_connections = val;
        }
    }

    // Logging overrides
    if let Some(val) = parse_env("PADKIT_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("PADKIT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
