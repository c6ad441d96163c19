//! Export results and reporting
//!
//! Per-item outcomes are data. A batch or kit job folds its item results
//! into a [`BatchExportResult`], which keeps the counters and error strings
//! consistent with the item list.

use crate::domain::ids::{ExportId, KitId, SampleId};
use crate::domain::kit::BankLetter;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Where a single-sample export stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStage {
    Pending,
    Validating,
    Invalid,
    Converting,
    ConversionFailed,
    Recording,
    Recorded,
}

/// Category of a per-item failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportErrorKind {
    /// Unknown sample id or missing source file
    InputNotFound,
    ValidationFailed,
    ConversionFailed,
    /// Output directory or sidecar could not be written
    FilesystemFailure,
    PersistenceFailure,
}

impl ExportErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportErrorKind::InputNotFound => "input_not_found",
            ExportErrorKind::ValidationFailed => "validation_failed",
            ExportErrorKind::ConversionFailed => "conversion_failed",
            ExportErrorKind::FilesystemFailure => "filesystem_failure",
            ExportErrorKind::PersistenceFailure => "persistence_failure",
        }
    }
}

impl fmt::Display for ExportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure attached to one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemError {
    pub kind: ExportErrorKind,
    pub message: String,
}

impl ItemError {
    pub fn new(kind: ExportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Outcome of exporting one sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportResult {
    pub sample_id: SampleId,
    /// History record of a single export; batch and kit items leave this unset
    pub export_id: Option<ExportId>,
    pub success: bool,
    pub stage: ExportStage,
    pub source_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub output_filename: Option<String>,
    /// Directory relative to the export base, empty for flat placement
    pub output_subfolder: Option<String>,
    pub metadata_path: Option<PathBuf>,
    pub size_bytes: u64,
    pub duration_ms: Option<u64>,
    pub used_fallback: bool,
    pub error: Option<ItemError>,
}

impl ExportResult {
    pub fn pending(sample_id: SampleId) -> Self {
        Self {
            sample_id,
            export_id: None,
            success: false,
            stage: ExportStage::Pending,
            source_path: None,
            output_path: None,
            output_filename: None,
            output_subfolder: None,
            metadata_path: None,
            size_bytes: 0,
            duration_ms: None,
            used_fallback: false,
            error: None,
        }
    }

    /// Mark the item failed at `stage`
    pub fn fail(mut self, stage: ExportStage, kind: ExportErrorKind, message: impl Into<String>) -> Self {
        self.success = false;
        self.stage = stage;
        self.error = Some(ItemError::new(kind, message));
        self
    }

    /// Error line used in job summaries, prefixed with the sample id
    pub fn error_line(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|e| format!("sample {}: {}", self.sample_id, e.message))
    }
}

/// Aggregate outcome of a multi-sample job
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchExportResult {
    pub export_id: Option<ExportId>,
    pub requested: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_size_bytes: u64,
    pub total_time: Duration,
    pub results: Vec<ExportResult>,
    pub errors: Vec<String>,
}

impl BatchExportResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one item result into the aggregate
    pub fn push(&mut self, result: ExportResult) {
        self.requested += 1;
        if result.success {
            self.successful += 1;
            self.total_size_bytes += result.size_bytes;
        } else {
            self.failed += 1;
            if let Some(line) = result.error_line() {
                self.errors.push(line);
            }
        }
        self.results.push(result);
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.total_time = duration;
        self
    }

    /// True when no item failed
    pub fn is_successful(&self) -> bool {
        self.failed == 0
    }

    pub fn success_rate(&self) -> f64 {
        if self.requested == 0 {
            return 100.0;
        }
        (self.successful as f64 / self.requested as f64) * 100.0
    }

    /// Ids of the items that failed, in request order
    pub fn failed_ids(&self) -> Vec<SampleId> {
        self.results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.sample_id)
            .collect()
    }

    pub fn log_summary(&self) {
        tracing::info!(
            export_id = ?self.export_id.map(|id| id.value()),
            requested = self.requested,
            successful = self.successful,
            failed = self.failed,
            total_size_bytes = self.total_size_bytes,
            duration_ms = self.total_time.as_millis() as u64,
            success_rate = format!("{:.2}%", self.success_rate()),
            "Export completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(error_count = self.errors.len(), "Export completed with errors");
            for result in self.results.iter().filter(|r| !r.success) {
                if let Some(error) = &result.error {
                    tracing::warn!(
                        sample_id = %result.sample_id,
                        kind = %error.kind,
                        message = %error.message,
                        "Export error"
                    );
                }
            }
        }
    }
}

/// Aggregate outcome of a kit export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KitExportResult {
    pub export_id: Option<ExportId>,
    pub kit_id: KitId,
    pub kit_name: String,
    pub kit_path: PathBuf,
    pub padconf_path: PathBuf,
    /// Banks that received at least one pad, in order
    pub banks: Vec<BankLetter>,
    /// True when at least one pad converted
    pub success: bool,
    /// `"<n> of <m> pads failed"` when any pad failed
    pub error: Option<String>,
    pub requested: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_size_bytes: u64,
    pub total_time: Duration,
    pub results: Vec<ExportResult>,
    pub errors: Vec<String>,
}

impl KitExportResult {
    /// Build from the folded pad results
    pub fn from_pads(
        kit_id: KitId,
        kit_name: impl Into<String>,
        kit_path: PathBuf,
        padconf_path: PathBuf,
        banks: Vec<BankLetter>,
        pads: BatchExportResult,
    ) -> Self {
        let error = (pads.failed > 0)
            .then(|| format!("{} of {} pads failed", pads.failed, pads.requested));

        Self {
            export_id: pads.export_id,
            kit_id,
            kit_name: kit_name.into(),
            kit_path,
            padconf_path,
            banks,
            success: pads.successful > 0,
            error,
            requested: pads.requested,
            successful: pads.successful,
            failed: pads.failed,
            total_size_bytes: pads.total_size_bytes,
            total_time: pads.total_time,
            results: pads.results,
            errors: pads.errors,
        }
    }

    pub fn log_summary(&self) {
        tracing::info!(
            kit_id = %self.kit_id,
            kit_name = %self.kit_name,
            banks = self.banks.len(),
            successful = self.successful,
            failed = self.failed,
            padconf = %self.padconf_path.display(),
            duration_ms = self.total_time.as_millis() as u64,
            "Kit export completed"
        );
        for line in &self.errors {
            tracing::warn!(error = %line, "Kit pad failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(id: u32, size: u64) -> ExportResult {
        let mut result = ExportResult::pending(SampleId::from(id));
        result.success = true;
        result.stage = ExportStage::Recorded;
        result.size_bytes = size;
        result
    }

    fn failed(id: u32) -> ExportResult {
        ExportResult::pending(SampleId::from(id)).fail(
            ExportStage::Invalid,
            ExportErrorKind::ValidationFailed,
            "too short",
        )
    }

    #[test]
    fn test_batch_fold_counters() {
        let mut batch = BatchExportResult::new();
        batch.push(ok(1, 100));
        batch.push(failed(2));
        batch.push(ok(3, 50));

        assert_eq!(batch.requested, 3);
        assert_eq!(batch.successful, 2);
        assert_eq!(batch.failed, 1);
        assert_eq!(batch.total_size_bytes, 150);
        assert_eq!(batch.errors, vec!["sample 2: too short".to_string()]);
        assert_eq!(batch.failed_ids(), vec![SampleId::from(2)]);
        assert!(!batch.is_successful());
    }

    #[test]
    fn test_success_rate() {
        let mut batch = BatchExportResult::new();
        assert_eq!(batch.success_rate(), 100.0);

        batch.push(ok(1, 1));
        batch.push(failed(2));
        assert_eq!(batch.success_rate(), 50.0);
    }

    #[test]
    fn test_kit_result_error_summary() {
        let mut pads = BatchExportResult::new();
        pads.push(ok(1, 10));
        pads.push(failed(2));
        pads.push(failed(3));

        let kit = KitExportResult::from_pads(
            KitId::from(4),
            "Boom Bap",
            PathBuf::from("/out/Boom_Bap"),
            PathBuf::from("/out/Boom_Bap/PADCONF.BIN"),
            vec![BankLetter::A],
            pads,
        );
        assert!(kit.success);
        assert_eq!(kit.error.as_deref(), Some("2 of 3 pads failed"));
        assert_eq!(kit.errors.len(), 2);
    }

    #[test]
    fn test_kit_result_all_failed() {
        let mut pads = BatchExportResult::new();
        pads.push(failed(1));

        let kit = KitExportResult::from_pads(
            KitId::from(1),
            "Empty",
            PathBuf::from("/out/Empty"),
            PathBuf::from("/out/Empty/PADCONF.BIN"),
            vec![BankLetter::A],
            pads,
        );
        assert!(!kit.success);
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ExportErrorKind::InputNotFound.to_string(), "input_not_found");
        let error = ItemError::new(ExportErrorKind::ConversionFailed, "decode failed");
        assert_eq!(error.to_string(), "conversion_failed: decode failed");
    }
}
