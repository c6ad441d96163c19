//! Domain models and types for padkit.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`SampleId`], [`KitId`], [`ExportId`])
//! - **Library models** ([`Sample`], [`Kit`], [`KitPadAssignment`], [`PadMap`])
//! - **Export options** ([`ExportConfig`], [`OrganizeBy`], [`OutputFormat`])
//! - **Error types** ([`PadkitError`], [`CodecError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers are newtypes so a kit id can never be passed where a sample id
//! is expected:
//!
//! ```rust
//! use padkit::domain::{KitId, SampleId};
//!
//! # fn example() -> Result<(), String> {
//! let sample_id = SampleId::new(12)?;
//! let kit_id = KitId::new(3)?;
//!
//! // This won't compile
//! // let wrong: SampleId = kit_id;
//! # let _ = (sample_id, kit_id);
//! # Ok(())
//! # }
//! ```
//!
//! # Validated construction
//!
//! Options and pad layouts reject invalid values when they are built, before
//! any file is touched:
//!
//! ```rust
//! use padkit::domain::ExportConfig;
//!
//! assert!(ExportConfig::from_strs("mood", "wav", true, true, "/tmp/out").is_err());
//! assert!(ExportConfig::from_strs("genre", "wav", true, true, "/tmp/out").is_ok());
//! ```

pub mod errors;
pub mod ids;
pub mod kit;
pub mod options;
pub mod result;
pub mod sample;

pub use errors::{CodecError, PadkitError};
pub use ids::{ExportId, KitId, SampleId};
pub use kit::{BankLetter, Kit, KitPadAssignment, PadMap, PadNumber, PadParameters};
pub use options::{ExportConfig, OrganizeBy, OutputFormat};
pub use result::Result;
pub use sample::Sample;
