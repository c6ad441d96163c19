//! Export coordinator - main orchestrator for the export process
//!
//! This module wires the validator, sanitizer, path organizer, converter,
//! and export recorder together. Single-sample exports live here; batch and
//! kit jobs are in [`batch`](super::batch) and [`kit`](super::kit) and share
//! the per-item pipeline defined below.

use crate::adapters::catalog::TomlCatalog;
use crate::adapters::codec::{AudioCodec, SymphoniaCodec};
use crate::adapters::database::{
    create_export_recorder, ExportDetail, ExportHistoryPage, ExportRecorder, ExportType,
    NewExportRecord, NewExportedSample,
};
use crate::adapters::repository::{KitRepository, SampleRepository};
use crate::config::{HardwareConfig, PadkitConfig};
use crate::core::archive::{archive_directory, archive_files, ArchiveSummary};
use crate::core::convert::Converter;
use crate::core::export::summary::{ExportErrorKind, ExportResult, ExportStage};
use crate::core::organize::resolve_output_dir;
use crate::core::sanitize::{escape_path_separators, sanitize_filename_with_limit};
use crate::core::validate::Validator;
use crate::domain::ids::{ExportId, SampleId};
use crate::domain::options::{ExportConfig, OutputFormat};
use crate::domain::sample::Sample;
use crate::domain::{PadkitError, Result};
use crate::{log_export_complete, log_export_start, log_item_failure};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Services the coordinator depends on
#[derive(Clone)]
pub struct Collaborators {
    pub samples: Arc<dyn SampleRepository>,
    pub kits: Arc<dyn KitRepository>,
    pub recorder: Arc<dyn ExportRecorder>,
    pub codec: Arc<dyn AudioCodec>,
}

/// Export coordinator
///
/// `Send + Sync`; share it behind an `Arc` to run jobs from several tasks.
/// Items inside one job are processed one after another.
pub struct ExportCoordinator {
    pub(super) samples: Arc<dyn SampleRepository>,
    pub(super) kits: Arc<dyn KitRepository>,
    pub(super) recorder: Arc<dyn ExportRecorder>,
    validator: Validator,
    converter: Converter,
    pub(super) max_filename_len: usize,
    archive_dir: PathBuf,
}

impl ExportCoordinator {
    /// Create a coordinator from explicit collaborators
    pub fn new(
        collaborators: Collaborators,
        hardware: &HardwareConfig,
        archive_dir: impl Into<PathBuf>,
    ) -> Self {
        let validator = Validator::new(collaborators.codec.clone(), hardware.min_duration_ms);
        let converter = Converter::from_hardware(collaborators.codec, hardware);

        Self {
            samples: collaborators.samples,
            kits: collaborators.kits,
            recorder: collaborators.recorder,
            validator,
            converter,
            max_filename_len: hardware.max_filename_len,
            archive_dir: archive_dir.into(),
        }
    }

    /// Create a coordinator backed by the configured catalog and history database
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or the export
    /// recorder cannot be created.
    pub async fn from_config(config: &PadkitConfig) -> Result<Self> {
        let catalog = Arc::new(TomlCatalog::load(&config.catalog.path)?);
        let recorder = create_export_recorder(config).await?;

        tracing::info!(
            backend = recorder.backend_name(),
            target_sample_rate = config.hardware.target_sample_rate,
            target_bit_depth = config.hardware.target_bit_depth,
            "Export coordinator ready"
        );

        let collaborators = Collaborators {
            samples: catalog.clone(),
            kits: catalog,
            recorder,
            codec: Arc::new(SymphoniaCodec::new()),
        };
        Ok(Self::new(
            collaborators,
            &config.hardware,
            config.export.archive_dir.clone(),
        ))
    }

    /// Export one sample and record it
    ///
    /// Validation and conversion failures come back as an unsuccessful
    /// [`ExportResult`] and are not recorded.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown sample id
    /// - `Filesystem` if the output root cannot be created
    /// - `Persistence` if the history write fails
    pub async fn export_sample(
        &self,
        sample_id: SampleId,
        config: &ExportConfig,
    ) -> Result<ExportResult> {
        let started = Instant::now();
        log_export_start!(ExportType::Single, 1);

        let sample = self
            .samples
            .get_by_id(&sample_id)
            .await?
            .ok_or_else(|| PadkitError::NotFound(format!("sample {sample_id}")))?;
        ensure_root(&config.output_base_path).await?;

        let target = self.sample_target(&sample, config, &mut JobNames::default());
        let mut result = self.export_item(&sample, target, config).await;

        if result.success {
            let record = new_record(
                ExportType::Single,
                &config.output_base_path,
                config.organize_by.as_str(),
                config.format,
                std::slice::from_ref(&result),
                started.elapsed(),
            );
            let export_id = self.recorder.record_export(&record).await?;
            result.export_id = Some(export_id);
            mark_recorded(std::slice::from_mut(&mut result));
        }

        log_export_complete!(
            ExportType::Single,
            usize::from(result.success),
            usize::from(!result.success),
            started.elapsed()
        );
        Ok(result)
    }

    /// Zip a recorded export into `<archive_dir>/export_<id>.zip`
    ///
    /// Kit exports are archived as their whole kit folder. Single and batch
    /// exports share the output root with other jobs, so only the files
    /// recorded for this export (and their sidecars) are included.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown export id or a recorded file that no longer exists
    /// - `Archive` if the zip cannot be written
    pub async fn archive_export(&self, export_id: ExportId) -> Result<ArchiveSummary> {
        let detail = self
            .recorder
            .get_export(export_id)
            .await?
            .ok_or_else(|| PadkitError::NotFound(format!("export {export_id}")))?;

        let root = PathBuf::from(&detail.record.output_path);
        let dest = self.archive_dir.join(format!("export_{export_id}.zip"));
        tracing::info!(
            export_id = %export_id,
            export_type = %detail.record.export_type,
            source = %root.display(),
            archive = %dest.display(),
            "Archiving export"
        );

        let task = if detail.record.export_type == ExportType::Kit {
            tokio::task::spawn_blocking(move || archive_directory(&root, &dest))
        } else {
            let files = exported_files(&root, &detail);
            tokio::task::spawn_blocking(move || archive_files(&root, &files, &dest))
        };
        task.await
            .map_err(|e| PadkitError::Archive(format!("archive task failed: {e}")))?
    }

    /// One page of export history, newest first
    pub async fn list_history(&self, page: u32, page_size: u32) -> Result<ExportHistoryPage> {
        self.recorder.list_exports(page, page_size).await
    }

    /// One export with its per-sample rows
    pub async fn get_export(&self, export_id: ExportId) -> Result<Option<ExportDetail>> {
        self.recorder.get_export(export_id).await
    }

    /// Placement for a single or batch item
    pub(super) fn sample_target(
        &self,
        sample: &Sample,
        config: &ExportConfig,
        names: &mut JobNames,
    ) -> ItemTarget {
        let dir = resolve_output_dir(&config.output_base_path, sample, config.organize_by);
        let raw = format!("{}.{}", sample.display_name(), config.format.extension());
        let filename = self.clean_filename(&raw, config);
        let filename = names.claim(&dir, filename, sample.id, self.max_filename_len);
        let subfolder = relative_subfolder(&config.output_base_path, &dir);

        ItemTarget {
            dir,
            filename,
            subfolder,
        }
    }

    pub(super) fn clean_filename(&self, raw: &str, config: &ExportConfig) -> String {
        if config.sanitize_filenames {
            sanitize_filename_with_limit(raw, self.max_filename_len)
        } else {
            escape_path_separators(raw)
        }
    }

    /// Validate, convert, and describe one sample
    ///
    /// Never fails; every problem is recorded in the returned result. A
    /// successful result stops at [`ExportStage::Recording`].
    pub(super) async fn export_item(
        &self,
        sample: &Sample,
        target: ItemTarget,
        config: &ExportConfig,
    ) -> ExportResult {
        let mut result = ExportResult::pending(sample.id);
        result.source_path = Some(sample.file_path.clone());
        result.stage = ExportStage::Validating;

        let validator = self.validator.clone();
        let source = sample.file_path.clone();
        let limit = self.converter.timeout();
        let task = tokio::task::spawn_blocking(move || validator.validate(&source));
        let validation = match tokio::time::timeout(limit, task).await {
            Ok(Ok(validation)) => validation,
            Ok(Err(e)) => {
                return item_failed(
                    result,
                    ExportStage::Invalid,
                    ExportErrorKind::ValidationFailed,
                    format!("validation task failed: {e}"),
                )
            }
            Err(_) => {
                return item_failed(
                    result,
                    ExportStage::Invalid,
                    ExportErrorKind::ValidationFailed,
                    format!("validation timed out after {}s", limit.as_secs()),
                )
            }
        };

        result.duration_ms = validation.duration_ms;
        if !validation.valid {
            let kind = if validation.readable {
                ExportErrorKind::ValidationFailed
            } else {
                ExportErrorKind::InputNotFound
            };
            return item_failed(result, ExportStage::Invalid, kind, validation.summary());
        }

        result.stage = ExportStage::Converting;
        if let Err(e) = tokio::fs::create_dir_all(&target.dir).await {
            return item_failed(
                result,
                ExportStage::ConversionFailed,
                ExportErrorKind::FilesystemFailure,
                format!("cannot create {}: {}", target.dir.display(), e),
            );
        }

        let output = target.dir.join(&target.filename);
        let conversion = self
            .converter
            .convert(&sample.file_path, &output, config.format)
            .await;
        if !conversion.success {
            let message = conversion
                .error
                .unwrap_or_else(|| "conversion failed".to_string());
            return item_failed(
                result,
                ExportStage::ConversionFailed,
                ExportErrorKind::ConversionFailed,
                message,
            );
        }
        result.used_fallback = conversion.used_fallback;
        result.duration_ms = conversion.converted_duration_ms.or(result.duration_ms);

        if config.include_metadata {
            let sidecar = SampleSidecar {
                sample_id: sample.id,
                title: sample.title.as_deref(),
                genre: sample.genre.as_deref(),
                bpm: sample.bpm,
                key: sample.musical_key.as_deref(),
                source_file: sample.file_path.display().to_string(),
                output_file: &target.filename,
                format: config.format.as_str(),
                sample_rate: conversion.converted_sample_rate,
                bit_depth: conversion.converted_bit_depth,
                channels: conversion.channels,
                duration_ms: result.duration_ms,
                exported_at: Utc::now(),
                exporter: concat!("padkit ", env!("CARGO_PKG_VERSION")),
            };
            match write_sidecar(&output, &sidecar).await {
                Ok(path) => result.metadata_path = Some(path),
                Err(e) => {
                    return item_failed(
                        result,
                        ExportStage::ConversionFailed,
                        ExportErrorKind::FilesystemFailure,
                        e.to_string(),
                    )
                }
            }
        }

        result.size_bytes = tokio::fs::metadata(&output)
            .await
            .map(|m| m.len())
            .unwrap_or_default();
        result.output_path = Some(output);
        result.output_filename = Some(target.filename);
        result.output_subfolder = Some(target.subfolder);
        result.success = true;
        result.stage = ExportStage::Recording;
        result
    }
}

/// Where and under what name one item is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ItemTarget {
    pub dir: PathBuf,
    pub filename: String,
    /// `dir` relative to the job root, empty for the root itself
    pub subfolder: String,
}

/// Output paths already handed out in the current job
#[derive(Debug, Default)]
pub(super) struct JobNames {
    taken: HashSet<PathBuf>,
}

impl JobNames {
    /// Claim `filename` in `dir`. A name already used in this job gets
    /// `_<sample id>` appended to its stem.
    pub fn claim(
        &mut self,
        dir: &Path,
        filename: String,
        sample_id: SampleId,
        max_len: usize,
    ) -> String {
        if self.taken.insert(dir.join(&filename)) {
            return filename;
        }

        let mut attempt = 0usize;
        loop {
            let suffix = match attempt {
                0 => format!("_{sample_id}"),
                n => format!("_{sample_id}_{n}"),
            };
            let candidate = append_to_stem(&filename, &suffix, max_len);
            if self.taken.insert(dir.join(&candidate)) {
                tracing::debug!(original = %filename, renamed = %candidate, "Renamed colliding output");
                return candidate;
            }
            attempt += 1;
        }
    }
}

fn append_to_stem(filename: &str, suffix: &str, max_len: usize) -> String {
    let (stem, extension) = match filename.rsplit_once('.') {
        Some((stem, extension)) => (stem, Some(extension)),
        None => (filename, None),
    };
    let reserved = suffix.len() + extension.map_or(0, |e| e.len() + 1);
    let mut keep = max_len.saturating_sub(reserved).max(1).min(stem.len());
    // Unsanitized stems may hold multi-byte characters.
    while !stem.is_char_boundary(keep) {
        keep -= 1;
    }

    match extension {
        Some(extension) => format!("{}{}.{}", &stem[..keep], suffix, extension),
        None => format!("{}{}", &stem[..keep], suffix),
    }
}

/// JSON written next to an exported file
#[derive(Debug, Serialize)]
struct SampleSidecar<'a> {
    sample_id: SampleId,
    title: Option<&'a str>,
    genre: Option<&'a str>,
    bpm: Option<f64>,
    key: Option<&'a str>,
    source_file: String,
    output_file: &'a str,
    format: &'static str,
    sample_rate: Option<u32>,
    bit_depth: Option<u16>,
    channels: Option<u16>,
    duration_ms: Option<u64>,
    exported_at: DateTime<Utc>,
    exporter: &'static str,
}

/// Writes `<stem>.json` beside `output`
async fn write_sidecar(output: &Path, sidecar: &SampleSidecar<'_>) -> Result<PathBuf> {
    let path = output.with_extension("json");
    let body = serde_json::to_vec_pretty(sidecar)?;
    tokio::fs::write(&path, body).await.map_err(|e| {
        PadkitError::Filesystem(format!("cannot write {}: {}", path.display(), e))
    })?;
    Ok(path)
}

/// Files written by the successful items of a recorded export, relative to its root
fn exported_files(root: &Path, detail: &ExportDetail) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for sample in detail.samples.iter().filter(|s| s.success) {
        let Some(filename) = sample.output_filename.as_deref() else {
            continue;
        };
        let relative = match sample.output_subfolder.as_deref() {
            Some(subfolder) if !subfolder.is_empty() => PathBuf::from(subfolder).join(filename),
            _ => PathBuf::from(filename),
        };

        let sidecar = relative.with_extension("json");
        files.push(relative);
        if root.join(&sidecar).is_file() {
            files.push(sidecar);
        }
    }
    files
}

/// Create a shared output root; failure ends the whole job
pub(super) async fn ensure_root(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path).await.map_err(|e| {
        PadkitError::Filesystem(format!("cannot create {}: {}", path.display(), e))
    })
}

pub(super) fn relative_subfolder(root: &Path, dir: &Path) -> String {
    dir.strip_prefix(root)
        .map(|relative| {
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}

pub(super) fn item_failed(
    result: ExportResult,
    stage: ExportStage,
    kind: ExportErrorKind,
    message: impl Into<String>,
) -> ExportResult {
    let message = message.into();
    log_item_failure!(result.sample_id, kind, message);
    result.fail(stage, kind, message)
}

/// Failure for an id the repository could not resolve
pub(super) fn lookup_failed(sample_id: SampleId, message: impl Into<String>) -> ExportResult {
    item_failed(
        ExportResult::pending(sample_id),
        ExportStage::Pending,
        ExportErrorKind::InputNotFound,
        message,
    )
}

pub(super) fn new_record(
    export_type: ExportType,
    output_path: &Path,
    organize_by: &str,
    format: OutputFormat,
    results: &[ExportResult],
    elapsed: Duration,
) -> NewExportRecord {
    NewExportRecord {
        export_type,
        output_path: output_path.display().to_string(),
        organize_by: organize_by.to_string(),
        format: format.as_str().to_string(),
        total_size_bytes: results
            .iter()
            .filter(|r| r.success)
            .map(|r| r.size_bytes)
            .sum(),
        duration_seconds: elapsed.as_secs_f64(),
        samples: results
            .iter()
            .map(|r| NewExportedSample {
                sample_id: r.sample_id,
                output_filename: r.output_filename.clone(),
                output_subfolder: r.output_subfolder.clone(),
                success: r.success,
                error_message: r.error.as_ref().map(|e| e.to_string()),
            })
            .collect(),
    }
}

pub(super) fn mark_recorded(results: &mut [ExportResult]) {
    for result in results.iter_mut().filter(|r| r.success) {
        result.stage = ExportStage::Recorded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_appends_sample_id_on_collision() {
        let mut names = JobNames::default();
        let dir = Path::new("/out");

        let first = names.claim(dir, "kick.wav".to_string(), SampleId::from(1), 255);
        let second = names.claim(dir, "kick.wav".to_string(), SampleId::from(7), 255);
        let third = names.claim(dir, "kick.wav".to_string(), SampleId::from(7), 255);
        let elsewhere = names.claim(Path::new("/out/house"), "kick.wav".to_string(), SampleId::from(8), 255);

        assert_eq!(first, "kick.wav");
        assert_eq!(second, "kick_7.wav");
        assert_eq!(third, "kick_7_1.wav");
        assert_eq!(elsewhere, "kick.wav");
    }

    #[test]
    fn test_suffix_respects_length_limit() {
        let renamed = append_to_stem("abcdefghij.wav", "_42", 12);
        assert_eq!(renamed, "abcde_42.wav");
        assert!(renamed.len() <= 12);
    }

    #[test]
    fn test_relative_subfolder() {
        let root = Path::new("/exports");
        assert_eq!(relative_subfolder(root, Path::new("/exports")), "");
        assert_eq!(relative_subfolder(root, Path::new("/exports/house")), "house");
        assert_eq!(relative_subfolder(root, Path::new("/exports/kit/bank_a")), "kit/bank_a");
    }

    #[test]
    fn test_record_counts_children() {
        let mut ok = ExportResult::pending(SampleId::from(1));
        ok.success = true;
        ok.size_bytes = 10;
        ok.output_filename = Some("a.wav".to_string());
        let failed = lookup_failed(SampleId::from(2), "sample 2 not found");

        let record = new_record(
            ExportType::Batch,
            Path::new("/exports"),
            "flat",
            OutputFormat::Wav,
            &[ok, failed],
            Duration::from_millis(1500),
        );

        assert_eq!(record.sample_count(), 2);
        assert_eq!(record.total_size_bytes, 10);
        assert_eq!(record.format, "wav");
        assert_eq!(
            record.samples[1].error_message.as_deref(),
            Some("input_not_found: sample 2 not found")
        );
        assert!((record.duration_seconds - 1.5).abs() < f64::EPSILON);
    }
}
