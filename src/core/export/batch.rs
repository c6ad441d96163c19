//! Batch export
//!
//! Runs the single-sample pipeline over a list of ids and records the whole
//! job as one export with a child row per requested id.

use crate::adapters::database::ExportType;
use crate::core::export::coordinator::{
    ensure_root, lookup_failed, mark_recorded, new_record, ExportCoordinator, JobNames,
};
use crate::core::export::summary::BatchExportResult;
use crate::domain::ids::SampleId;
use crate::domain::options::ExportConfig;
use crate::domain::{PadkitError, Result};
use crate::log_export_start;
use std::time::Instant;

impl ExportCoordinator {
    /// Export several samples as one job
    ///
    /// A failing item never stops the job. Unknown ids, invalid inputs, and
    /// conversion failures are counted as failed items.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty id list
    /// - `Filesystem` if the output root cannot be created
    /// - `Persistence` if the history write fails
    pub async fn export_batch(
        &self,
        sample_ids: &[SampleId],
        config: &ExportConfig,
    ) -> Result<BatchExportResult> {
        if sample_ids.is_empty() {
            return Err(PadkitError::Validation(
                "batch export needs at least one sample id".to_string(),
            ));
        }

        let started = Instant::now();
        log_export_start!(ExportType::Batch, sample_ids.len());
        ensure_root(&config.output_base_path).await?;

        let mut batch = BatchExportResult::new();
        let mut names = JobNames::default();

        for (index, sample_id) in sample_ids.iter().enumerate() {
            let result = match self.samples.get_by_id(sample_id).await {
                Ok(Some(sample)) => {
                    let target = self.sample_target(&sample, config, &mut names);
                    self.export_item(&sample, target, config).await
                }
                Ok(None) => lookup_failed(*sample_id, format!("sample {sample_id} not found")),
                Err(e) => lookup_failed(*sample_id, format!("sample lookup failed: {e}")),
            };

            tracing::debug!(
                sample_id = %sample_id,
                position = index + 1,
                total = sample_ids.len(),
                success = result.success,
                "Processed batch item"
            );
            batch.push(result);
        }

        let record = new_record(
            ExportType::Batch,
            &config.output_base_path,
            config.organize_by.as_str(),
            config.format,
            &batch.results,
            started.elapsed(),
        );
        let export_id = self.recorder.record_export(&record).await?;
        batch.export_id = Some(export_id);
        mark_recorded(&mut batch.results);

        let batch = batch.with_duration(started.elapsed());
        batch.log_summary();
        Ok(batch)
    }
}
