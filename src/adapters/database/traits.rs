//! Export history storage trait
//!
//! Every backend writes a parent record and its children atomically. A
//! failure on any child rolls the parent back, so history never contains a
//! parent whose `sample_count` disagrees with its children.

use crate::adapters::database::models::{ExportDetail, ExportHistoryPage, NewExportRecord};
use crate::domain::ids::ExportId;
use crate::domain::Result;
use async_trait::async_trait;

/// Persists export bookkeeping
#[async_trait]
pub trait ExportRecorder: Send + Sync {
    /// Create the history tables if they do not exist
    ///
    /// # Errors
    ///
    /// Returns [`PadkitError::Database`](crate::domain::PadkitError::Database)
    /// if the schema cannot be applied.
    async fn ensure_schema(&self) -> Result<()>;

    /// Write the parent record and all children in one transaction
    ///
    /// # Errors
    ///
    /// Returns [`PadkitError::Persistence`](crate::domain::PadkitError::Persistence)
    /// after rolling back when any row fails to insert.
    async fn record_export(&self, record: &NewExportRecord) -> Result<ExportId>;

    /// Fetch one export with its children
    async fn get_export(&self, id: ExportId) -> Result<Option<ExportDetail>>;

    /// Page through exports, newest first. `page` is 1-based.
    async fn list_exports(&self, page: u32, page_size: u32) -> Result<ExportHistoryPage>;

    /// Backend name for logs
    fn backend_name(&self) -> &'static str;
}
