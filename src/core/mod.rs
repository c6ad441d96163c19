//! Core business logic for padkit.
//!
//! # Modules
//!
//! - [`validate`] - input checks (readable, supported format, minimum duration)
//! - [`sanitize`] - device-safe file and folder names
//! - [`organize`] - output folder placement strategies
//! - [`convert`] - decode, resample, and re-encode to the device format
//! - [`padconf`] - kit pad configuration file
//! - [`export`] - single, batch, and kit export orchestration
//! - [`archive`] - zip packaging of export folders
//!
//! # Export Workflow
//!
//! 1. **Fetch**: look the sample (or kit and its pads) up in the repository
//! 2. **Validate**: reject unreadable, unsupported, or too-short inputs
//! 3. **Place**: sanitize the filename and resolve the output folder
//! 4. **Convert**: write PCM at the target sample rate and bit depth
//! 5. **Describe**: optionally write a JSON sidecar
//! 6. **Record**: store the export and its per-sample rows in one transaction
//! 7. **Archive** (optional): zip the export folder
//!
//! # Example
//!
//! ```rust,no_run
//! use padkit::config::load_config;
//! use padkit::core::export::ExportCoordinator;
//! use padkit::domain::SampleId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("padkit.toml")?;
//! let coordinator = ExportCoordinator::from_config(&config).await?;
//! let export_config = config.export.to_export_config()?;
//!
//! let ids = [SampleId::from(1), SampleId::from(2)];
//! let batch = coordinator.export_batch(&ids, &export_config).await?;
//!
//! println!("Successful: {}", batch.successful);
//! println!("Failed: {}", batch.failed);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod convert;
pub mod export;
pub mod organize;
pub mod padconf;
pub mod sanitize;
pub mod validate;
