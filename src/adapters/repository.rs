//! Read-side collaborators
//!
//! The export pipeline never owns sample or kit data. It looks items up
//! through these traits, which the catalog adapter implements for the CLI
//! and tests implement with in-memory maps.

use crate::domain::ids::{KitId, SampleId};
use crate::domain::kit::{Kit, KitPadAssignment};
use crate::domain::sample::Sample;
use crate::domain::Result;
use async_trait::async_trait;

/// Sample lookup
#[async_trait]
pub trait SampleRepository: Send + Sync {
    /// Fetch a sample by id, `Ok(None)` when unknown
    async fn get_by_id(&self, id: &SampleId) -> Result<Option<Sample>>;
}

/// Kit and pad assignment lookup
#[async_trait]
pub trait KitRepository: Send + Sync {
    /// Fetch a kit by id, `Ok(None)` when unknown
    async fn get_kit(&self, id: &KitId) -> Result<Option<Kit>>;

    /// All pad assignments of a kit; empty for a kit with no pads
    async fn get_pad_assignments(&self, id: &KitId) -> Result<Vec<KitPadAssignment>>;
}
