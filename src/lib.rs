// padkit - Sample export and kit packaging for hardware samplers
// Copyright (c) 2025 padkit contributors
// Licensed under the MIT License

//! # padkit - sample export and kit packaging
//!
//! padkit turns samples from a library into files a hardware sampler can
//! load: PCM at the device's sample rate and bit depth, device-safe names,
//! an organized folder tree, and, for kits, a binary pad configuration.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Validating** inputs (readable, supported format, minimum duration)
//! - **Converting** audio with `symphonia`, `rubato`, and `hound`
//! - **Organizing** exports flat, by genre, by tempo, or as kit banks
//! - **Packaging** kits with a fixed-size `PADCONF.BIN`
//! - **Recording** every export in SQLite or PostgreSQL
//! - **Archiving** export folders as zip files
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (validation, conversion, export, archive)
//! - [`adapters`] - External integrations (codec, catalog, history databases)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use padkit::config::load_config;
//! use padkit::core::export::ExportCoordinator;
//! use padkit::domain::{KitId, SampleId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("padkit.toml")?;
//!     let coordinator = ExportCoordinator::from_config(&config).await?;
//!     let export_config = config.export.to_export_config()?;
//!
//!     let result = coordinator.export_sample(SampleId::from(1), &export_config).await?;
//!     println!("Exported: {}", result.success);
//!
//!     let kit = coordinator.export_kit(KitId::from(1), &export_config).await?;
//!     println!("Kit folder: {}", kit.kit_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Operations that can end a whole job return [`domain::Result`]. Problems
//! with a single item inside a batch or kit are reported in the job result
//! instead:
//!
//! ```rust,no_run
//! # use padkit::core::export::ExportCoordinator;
//! # use padkit::domain::{ExportConfig, SampleId};
//! # async fn example(coordinator: ExportCoordinator, config: ExportConfig) -> padkit::domain::Result<()> {
//! let ids = [SampleId::from(1), SampleId::from(2)];
//! let batch = coordinator.export_batch(&ids, &config).await?;
//! for line in &batch.errors {
//!     eprintln!("{line}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! padkit uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(sample_id = 7, "Exporting sample");
//! warn!(kit_id = 3, "Kit has no pad assignments");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
