//! Export history records
//!
//! One parent row per export job and one child row per requested sample.
//! These types are shared by every recorder backend.

use crate::domain::errors::PadkitError;
use crate::domain::ids::{ExportId, SampleId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of export job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    Single,
    Batch,
    Kit,
}

impl ExportType {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportType::Single => "single",
            ExportType::Batch => "batch",
            ExportType::Kit => "kit",
        }
    }
}

impl fmt::Display for ExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportType {
    type Err = PadkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(ExportType::Single),
            "batch" => Ok(ExportType::Batch),
            "kit" => Ok(ExportType::Kit),
            other => Err(PadkitError::Database(format!(
                "unknown export type '{other}' in export history"
            ))),
        }
    }
}

/// Child row to insert
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExportedSample {
    pub sample_id: SampleId,
    pub output_filename: Option<String>,
    pub output_subfolder: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
}

/// Parent row plus children, written in one transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExportRecord {
    pub export_type: ExportType,
    pub output_path: String,
    pub organize_by: String,
    pub format: String,
    pub total_size_bytes: u64,
    pub duration_seconds: f64,
    pub samples: Vec<NewExportedSample>,
}

impl NewExportRecord {
    /// Stored as `sample_count`; always the number of children
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// Stored parent row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    pub id: ExportId,
    pub export_type: ExportType,
    pub sample_count: i64,
    pub output_path: String,
    pub organize_by: String,
    pub format: String,
    pub total_size_bytes: i64,
    pub duration_seconds: f64,
    pub created_at: DateTime<Utc>,
}

/// Stored child row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedSampleRecord {
    pub id: i64,
    pub export_id: ExportId,
    pub sample_id: SampleId,
    pub output_filename: Option<String>,
    pub output_subfolder: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
}

/// A parent row with all of its children
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDetail {
    pub record: ExportRecord,
    pub samples: Vec<ExportedSampleRecord>,
}

/// One page of export history, newest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportHistoryPage {
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub records: Vec<ExportRecord>,
}

impl ExportHistoryPage {
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }
}

/// Clamp paging input to `page >= 1`, `1 <= page_size <= 100`, returning
/// the row offset as well
pub fn normalize_page(page: u32, page_size: u32) -> (u32, u32, i64) {
    let page = page.max(1);
    let page_size = page_size.clamp(1, 100);
    let offset = i64::from(page - 1) * i64::from(page_size);
    (page, page_size, offset)
}

pub(crate) fn size_to_i64(size: u64) -> i64 {
    i64::try_from(size).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_type_round_trip() {
        for export_type in [ExportType::Single, ExportType::Batch, ExportType::Kit] {
            assert_eq!(export_type.as_str().parse::<ExportType>().unwrap(), export_type);
        }
        assert!("bundle".parse::<ExportType>().is_err());
    }

    #[test]
    fn test_normalize_page() {
        assert_eq!(normalize_page(0, 0), (1, 1, 0));
        assert_eq!(normalize_page(3, 20), (3, 20, 40));
        assert_eq!(normalize_page(2, 500), (2, 100, 100));
    }

    #[test]
    fn test_total_pages() {
        let page = ExportHistoryPage {
            page: 1,
            page_size: 20,
            total: 41,
            records: Vec::new(),
        };
        assert_eq!(page.total_pages(), 3);
    }
}
