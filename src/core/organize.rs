//! Output directory placement
//!
//! Each [`OrganizeBy`] strategy maps a sample to one directory under the
//! export base path. Resolution is pure; creating the directory is left to
//! the caller.

use crate::core::sanitize::sanitize_component;
use crate::domain::options::OrganizeBy;
use crate::domain::sample::Sample;
use std::path::{Path, PathBuf};

/// Folder for samples without a genre
pub const UNKNOWN_GENRE: &str = "unknown_genre";

/// Folder for samples without a usable tempo
pub const UNKNOWN_BPM: &str = "unknown_bpm";

/// Tempo buckets as half-open `[lower, upper)` ranges
const BPM_BUCKETS: &[(f64, f64, &str)] = &[
    (0.0, 70.0, "slow"),
    (70.0, 90.0, "70-90"),
    (90.0, 110.0, "90-110"),
    (110.0, 130.0, "110-130"),
    (130.0, 150.0, "130-150"),
    (150.0, 300.0, "fast"),
];

/// Resolve the directory a sample is exported into
pub fn resolve_output_dir(base: &Path, sample: &Sample, strategy: OrganizeBy) -> PathBuf {
    match strategy {
        OrganizeBy::Flat | OrganizeBy::Kit => base.to_path_buf(),
        OrganizeBy::Genre => {
            let genre = sample.genre.as_deref().unwrap_or(UNKNOWN_GENRE);
            base.join(sanitize_component(genre, UNKNOWN_GENRE))
        }
        OrganizeBy::Bpm => base.join(bpm_bucket(sample.bpm)),
    }
}

/// Resolve by raw strategy name; unknown names fall back to flat placement
pub fn resolve_by_name(base: &Path, sample: &Sample, strategy: &str) -> PathBuf {
    let (organize_by, recognised) = OrganizeBy::parse_lenient(strategy);
    if !recognised {
        tracing::warn!(
            strategy = strategy,
            sample_id = %sample.id,
            "Unknown organize strategy, using flat placement"
        );
    }
    resolve_output_dir(base, sample, organize_by)
}

/// Folder name for a tempo
pub fn bpm_bucket(bpm: Option<f64>) -> &'static str {
    let Some(bpm) = bpm.filter(|b| b.is_finite()) else {
        return UNKNOWN_BPM;
    };

    BPM_BUCKETS
        .iter()
        .find(|(lower, upper, _)| bpm >= *lower && bpm < *upper)
        .map(|(_, _, name)| *name)
        .unwrap_or(UNKNOWN_BPM)
}
