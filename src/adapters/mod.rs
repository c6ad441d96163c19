//! External system integrations for padkit.
//!
//! - [`codec`] - audio decode, resample, and encode (`symphonia`, `rubato`, `hound`)
//! - [`repository`] - sample and kit lookup traits
//! - [`catalog`] - TOML-backed implementation of the lookup traits
//! - [`database`] - export history abstraction (trait-based)
//! - [`sqlite`] - SQLite export history (default)
//! - [`postgresql`] - PostgreSQL export history
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the export
//! pipeline can be tested with in-memory implementations.
//!
//! ```rust,no_run
//! use padkit::adapters::catalog::TomlCatalog;
//! use padkit::adapters::repository::SampleRepository;
//! use padkit::domain::SampleId;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = TomlCatalog::load(Path::new("catalog.toml"))?;
//! let sample = catalog.get_by_id(&SampleId::from(1)).await?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod codec;
pub mod database;
pub mod postgresql;
pub mod repository;
pub mod sqlite;
