//! Kit export
//!
//! Lays a kit out the way the sampler expects it:
//!
//! ```text
//! <base>/<kit name>/PADCONF.BIN
//! <base>/<kit name>/bank_a/pad_01_<sample>.wav
//! <base>/<kit name>/bank_b/...
//! ```

use crate::adapters::database::ExportType;
use crate::core::export::coordinator::{
    ensure_root, lookup_failed, mark_recorded, new_record, relative_subfolder, ExportCoordinator,
    ItemTarget,
};
use crate::core::export::summary::{BatchExportResult, KitExportResult};
use crate::core::padconf::write_padconf;
use crate::core::sanitize::sanitize_component;
use crate::domain::ids::KitId;
use crate::domain::kit::{KitPadAssignment, PadMap};
use crate::domain::options::{ExportConfig, OrganizeBy};
use crate::domain::sample::Sample;
use crate::domain::{PadkitError, Result};
use crate::log_export_start;
use std::path::Path;
use std::time::Instant;

/// Folder name used when a kit name sanitizes to nothing
pub const DEFAULT_KIT_NAME: &str = "kit";

impl ExportCoordinator {
    /// Export every pad of a kit and write its `PADCONF.BIN`
    ///
    /// Pads are converted in bank and pad order; a failing pad does not stop
    /// the others. The pad configuration is written once, after all pads,
    /// whatever their outcome. `config.organize_by` is ignored.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown kit id
    /// - `Validation` when two assignments share a pad or a parameter is out of range
    /// - `Filesystem` if the kit folder, a bank folder, or `PADCONF.BIN` cannot be written
    /// - `Persistence` if the history write fails
    pub async fn export_kit(&self, kit_id: KitId, config: &ExportConfig) -> Result<KitExportResult> {
        let started = Instant::now();

        let kit = self
            .kits
            .get_kit(&kit_id)
            .await?
            .ok_or_else(|| PadkitError::NotFound(format!("kit {kit_id}")))?;
        let pads = PadMap::from_assignments(self.kits.get_pad_assignments(&kit_id).await?)?;
        log_export_start!(ExportType::Kit, pads.len());

        if pads.is_empty() {
            tracing::warn!(kit_id = %kit_id, kit_name = %kit.name, "Kit has no pad assignments");
        }

        let kit_dir = config
            .output_base_path
            .join(sanitize_component(&kit.name, DEFAULT_KIT_NAME));
        ensure_root(&kit_dir).await?;
        let banks = pads.banks();
        for bank in &banks {
            ensure_root(&kit_dir.join(bank.folder_name())).await?;
        }

        let mut batch = BatchExportResult::new();
        for assignment in pads.iter() {
            let result = match self.samples.get_by_id(&assignment.sample_id).await {
                Ok(Some(sample)) => {
                    let target = self.pad_target(&kit_dir, assignment, &sample, config);
                    self.export_item(&sample, target, config).await
                }
                Ok(None) => lookup_failed(
                    assignment.sample_id,
                    format!(
                        "sample {} on pad {}{} not found",
                        assignment.sample_id, assignment.bank, assignment.pad
                    ),
                ),
                Err(e) => lookup_failed(assignment.sample_id, format!("sample lookup failed: {e}")),
            };
            batch.push(result);
        }

        let padconf_path = write_padconf(&kit_dir, &pads)?;
        tracing::debug!(path = %padconf_path.display(), pads = pads.len(), "Wrote PADCONF");

        let record = new_record(
            ExportType::Kit,
            &kit_dir,
            OrganizeBy::Kit.as_str(),
            config.format,
            &batch.results,
            started.elapsed(),
        );
        let export_id = self.recorder.record_export(&record).await?;
        batch.export_id = Some(export_id);
        mark_recorded(&mut batch.results);

        let result = KitExportResult::from_pads(
            kit.id,
            kit.name,
            kit_dir,
            padconf_path,
            banks,
            batch.with_duration(started.elapsed()),
        );
        result.log_summary();
        Ok(result)
    }

    /// `bank_<letter>/pad_<NN>_<name>.<ext>` under the kit folder
    fn pad_target(
        &self,
        kit_dir: &Path,
        assignment: &KitPadAssignment,
        sample: &Sample,
        config: &ExportConfig,
    ) -> ItemTarget {
        let dir = kit_dir.join(assignment.bank.folder_name());
        let raw = format!(
            "pad_{:02}_{}.{}",
            assignment.pad.get(),
            sample.display_name(),
            config.format.extension()
        );

        ItemTarget {
            filename: self.clean_filename(&raw, config),
            subfolder: relative_subfolder(kit_dir, &dir),
            dir,
        }
    }
}
