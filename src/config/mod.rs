//! Configuration management for padkit.
//!
//! # Overview
//!
//! padkit reads a TOML file (`padkit.toml` by default) with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `PADKIT_<SECTION>_<KEY>` environment overrides
//! - Default values for every section
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use padkit::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("padkit.toml")?;
//!
//! println!("Target rate: {} Hz", config.hardware.target_sample_rate);
//! println!("Organize by: {}", config.export.organize_by);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level
//! - [`ExportSettings`] - default export options and the archive directory
//! - [`HardwareConfig`] - target sample rate/bit depth and conversion limits
//! - [`CatalogConfig`] - location of the sample/kit catalog
//! - [`SqliteConfig`] / [`PostgreSQLConfig`] - export history backend
//! - [`LoggingConfig`] - local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! database_target = "postgresql"
//!
//! [application]
//! log_level = "info"
//!
//! [export]
//! organize_by = "bpm"
//! format = "wav"
//! output_base_path = "/media/sampler/SAMPLES"
//!
//! [hardware]
//! target_sample_rate = 48000
//! target_bit_depth = 16
//!
//! [catalog]
//! path = "library/catalog.toml"
//!
//! [postgresql]
//! connection_string = "${PADKIT_PG_URL}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, CatalogConfig, DatabaseTarget, ExportSettings, HardwareConfig,
    LoggingConfig, PadkitConfig, PostgreSQLConfig, SqliteConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
