//! Export orchestration
//!
//! - [`coordinator`] - collaborators, single-sample exports, archiving, history
//! - [`batch`] - multi-sample jobs
//! - [`kit`] - kit folders and `PADCONF.BIN`
//! - [`summary`] - per-item and per-job results

pub mod batch;
pub mod coordinator;
pub mod kit;
pub mod summary;

pub use coordinator::{Collaborators, ExportCoordinator};
pub use kit::DEFAULT_KIT_NAME;
pub use summary::{
    BatchExportResult, ExportErrorKind, ExportResult, ExportStage, ItemError, KitExportResult,
};
