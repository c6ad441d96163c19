//! End-to-end tests for single and batch exports

mod common;

use common::{count_files, Harness};
use padkit::adapters::catalog::TomlCatalog;
use padkit::adapters::database::{ExportRecorder, ExportType};
use padkit::core::export::{ExportErrorKind, ExportStage};
use padkit::adapters::codec::{AudioCodec, AudioInfo, DecodedAudio, ResampleQuality, SymphoniaCodec};
use padkit::config::HardwareConfig;
use padkit::domain::{CodecError, OrganizeBy, OutputFormat, PadkitError, Sample, SampleId};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_single_export_writes_converted_file_and_record() {
    let harness = Harness::new().await;
    let mut catalog = TomlCatalog::default();
    catalog.insert_sample(
        Sample::new(SampleId::from(1), harness.tone("kick.wav", 44_100, 300))
            .with_title("Deep Kick")
            .with_genre("Techno"),
    );
    let coordinator = harness.coordinator(catalog);

    let result = coordinator
        .export_sample(SampleId::from(1), &harness.export_config(OrganizeBy::Genre))
        .await
        .unwrap();

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.stage, ExportStage::Recorded);
    let output = result.output_path.clone().unwrap();
    assert_eq!(output, harness.output.join("Techno").join("Deep_Kick.wav"));
    assert!(result.metadata_path.as_ref().unwrap().exists());
    assert!(result.size_bytes > 0);

    let reader = hound::WavReader::open(&output).unwrap();
    assert_eq!(reader.spec().sample_rate, 48_000);
    assert_eq!(reader.spec().bits_per_sample, 16);

    let detail = harness
        .recorder
        .get_export(result.export_id.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.record.export_type, ExportType::Single);
    assert_eq!(detail.record.sample_count, 1);
    assert_eq!(detail.samples[0].output_subfolder.as_deref(), Some("Techno"));
    assert!(detail.samples[0].success);
}

#[tokio::test]
async fn test_single_export_unknown_sample() {
    let harness = Harness::new().await;
    let coordinator = harness.coordinator(TomlCatalog::default());

    let err = coordinator
        .export_sample(SampleId::from(42), &harness.export_config(OrganizeBy::Flat))
        .await
        .unwrap_err();
    assert!(matches!(err, PadkitError::NotFound(_)));
}

#[tokio::test]
async fn test_failed_single_export_is_not_recorded() {
    let harness = Harness::new().await;
    let mut catalog = TomlCatalog::default();
    catalog.insert_sample(Sample::new(
        SampleId::from(5),
        harness.tone("click.wav", 44_100, 20),
    ));
    let coordinator = harness.coordinator(catalog);

    let result = coordinator
        .export_sample(SampleId::from(5), &harness.export_config(OrganizeBy::Flat))
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.stage, ExportStage::Invalid);
    assert_eq!(result.error.unwrap().kind, ExportErrorKind::ValidationFailed);
    assert!(result.export_id.is_none());
    assert_eq!(harness.recorder.list_exports(1, 20).await.unwrap().total, 0);
}

/// Symphonia with a slow stream inspection
struct StallingCodec(SymphoniaCodec);

impl AudioCodec for StallingCodec {
    fn probe(&self, path: &Path) -> Result<AudioInfo, CodecError> {
        std::thread::sleep(Duration::from_millis(1500));
        self.0.probe(path)
    }

    fn decode(&self, path: &Path) -> Result<DecodedAudio, CodecError> {
        self.0.decode(path)
    }

    fn resample(
        &self,
        audio: &DecodedAudio,
        target_rate: u32,
        quality: ResampleQuality,
    ) -> Result<DecodedAudio, CodecError> {
        self.0.resample(audio, target_rate, quality)
    }

    fn encode(
        &self,
        audio: &DecodedAudio,
        path: &Path,
        format: OutputFormat,
        bit_depth: u16,
    ) -> Result<(), CodecError> {
        self.0.encode(audio, path, format, bit_depth)
    }
}

#[tokio::test]
async fn test_validation_is_bounded_by_conversion_timeout() {
    let harness = Harness::new().await;
    let mut catalog = TomlCatalog::default();
    catalog.insert_sample(Sample::new(
        SampleId::from(9),
        harness.tone("pad.wav", 44_100, 300),
    ));
    let hardware = HardwareConfig {
        conversion_timeout_secs: 1,
        ..HardwareConfig::default()
    };
    let coordinator =
        harness.coordinator_with_codec(catalog, &hardware, Arc::new(StallingCodec(SymphoniaCodec::new())));

    let result = coordinator
        .export_sample(SampleId::from(9), &harness.export_config(OrganizeBy::Flat))
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.stage, ExportStage::Invalid);
    let error = result.error.unwrap();
    assert_eq!(error.kind, ExportErrorKind::ValidationFailed);
    assert!(error.message.contains("validation timed out"), "{}", error.message);
    assert_eq!(count_files(&harness.output), 0);
}

#[tokio::test]
async fn test_batch_continues_past_failures() {
    let harness = Harness::new().await;
    let mut catalog = TomlCatalog::default();
    let short = [SampleId::from(3), SampleId::from(7)];
    for n in 1..=10u32 {
        let id = SampleId::from(n);
        let duration = if short.contains(&id) { 30 } else { 250 };
        let path = harness.tone(&format!("hit_{n}.wav"), 44_100, duration);
        catalog.insert_sample(Sample::new(id, path).with_title(format!("Hit {n}")));
    }
    let coordinator = harness.coordinator(catalog);
    let ids: Vec<SampleId> = (1..=10u32).map(SampleId::from).collect();

    let batch = coordinator
        .export_batch(&ids, &harness.export_config(OrganizeBy::Flat))
        .await
        .unwrap();

    assert_eq!(batch.requested, 10);
    assert_eq!(batch.successful, 8);
    assert_eq!(batch.failed, 2);
    assert!(!batch.is_successful());
    assert_eq!(batch.failed_ids(), short.to_vec());
    assert_eq!(batch.errors.len(), 2);
    assert!(batch.errors[0].starts_with("sample 3:"));
    assert!(batch.errors[1].starts_with("sample 7:"));

    // 8 audio files plus 8 sidecars
    assert_eq!(count_files(&harness.output), 16);

    let detail = harness
        .recorder
        .get_export(batch.export_id.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(detail.record.export_type, ExportType::Batch);
    assert_eq!(detail.record.sample_count, 10);
    assert_eq!(detail.samples.iter().filter(|s| !s.success).count(), 2);
}

#[tokio::test]
async fn test_batch_with_unknown_id() {
    let harness = Harness::new().await;
    let mut catalog = TomlCatalog::default();
    catalog.insert_sample(Sample::new(
        SampleId::from(1),
        harness.tone("snare.wav", 48_000, 200),
    ));
    let coordinator = harness.coordinator(catalog);

    let batch = coordinator
        .export_batch(
            &[SampleId::from(1), SampleId::from(99)],
            &harness.export_config(OrganizeBy::Flat),
        )
        .await
        .unwrap();

    assert_eq!(batch.successful, 1);
    assert_eq!(batch.failed, 1);
    let missing = &batch.results[1];
    assert_eq!(missing.error.as_ref().unwrap().kind, ExportErrorKind::InputNotFound);
    assert!(batch.export_id.is_some());
}

#[tokio::test]
async fn test_batch_name_collisions_get_id_suffix() {
    let harness = Harness::new().await;
    let mut catalog = TomlCatalog::default();
    for n in 1..=2u32 {
        let path = harness.tone(&format!("src_{n}.wav"), 48_000, 200);
        catalog.insert_sample(Sample::new(SampleId::from(n), path).with_title("Clap"));
    }
    let coordinator = harness.coordinator(catalog);

    let batch = coordinator
        .export_batch(
            &[SampleId::from(1), SampleId::from(2)],
            &harness.export_config(OrganizeBy::Flat),
        )
        .await
        .unwrap();

    assert!(batch.is_successful());
    assert_eq!(batch.results[0].output_filename.as_deref(), Some("Clap.wav"));
    assert_eq!(batch.results[1].output_filename.as_deref(), Some("Clap_2.wav"));
}

#[tokio::test]
async fn test_empty_batch_rejected() {
    let harness = Harness::new().await;
    let coordinator = harness.coordinator(TomlCatalog::default());

    let err = coordinator
        .export_batch(&[], &harness.export_config(OrganizeBy::Flat))
        .await
        .unwrap_err();
    assert!(matches!(err, PadkitError::Validation(_)));
}

#[tokio::test]
async fn test_bpm_layout_and_history_paging() {
    let harness = Harness::new().await;
    let mut catalog = TomlCatalog::default();
    catalog.insert_sample(
        Sample::new(SampleId::from(1), harness.tone("loop.wav", 44_100, 200))
            .with_title("Loop")
            .with_bpm(124.0),
    );
    let coordinator = harness.coordinator(catalog);
    let config = harness.export_config(OrganizeBy::Bpm);

    for _ in 0..3 {
        let result = coordinator.export_sample(SampleId::from(1), &config).await.unwrap();
        assert!(result.success);
        assert!(result.output_path.unwrap().starts_with(harness.output.join("110-130")));
    }

    let page = coordinator.list_history(1, 2).await.unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.records.len(), 2);
    assert_eq!(page.total_pages(), 2);
    assert!(page.records[0].id.value() > page.records[1].id.value());
}

fn archive_entries(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_archive_holds_only_its_own_export() {
    let harness = Harness::new().await;
    let mut catalog = TomlCatalog::default();
    catalog.insert_sample(
        Sample::new(SampleId::from(1), harness.tone("a.wav", 44_100, 200)).with_title("A"),
    );
    catalog.insert_sample(
        Sample::new(SampleId::from(2), harness.tone("b.wav", 44_100, 200)).with_title("B"),
    );
    let coordinator = harness.coordinator(catalog);
    let config = harness.export_config(OrganizeBy::Flat);

    let first = coordinator.export_sample(SampleId::from(1), &config).await.unwrap();
    let second = coordinator.export_sample(SampleId::from(2), &config).await.unwrap();
    assert!(first.success && second.success);

    let summary = coordinator
        .archive_export(first.export_id.unwrap())
        .await
        .unwrap();

    assert_eq!(summary.file_count, 2);
    assert_eq!(archive_entries(&summary.archive_path), vec!["A.json", "A.wav"]);
}

#[tokio::test]
async fn test_archive_batch_keeps_subfolders() {
    let harness = Harness::new().await;
    let mut catalog = TomlCatalog::default();
    catalog.insert_sample(
        Sample::new(SampleId::from(1), harness.tone("a.wav", 44_100, 200))
            .with_title("Pad")
            .with_genre("Ambient"),
    );
    catalog.insert_sample(Sample::new(
        SampleId::from(2),
        harness.tone("short.wav", 44_100, 20),
    ));
    let coordinator = harness.coordinator(catalog);
    let config = harness.export_config(OrganizeBy::Genre);

    // An earlier job leaves a file under the same root
    let earlier = harness.output.join("Ambient").join("Old.wav");
    std::fs::create_dir_all(earlier.parent().unwrap()).unwrap();
    std::fs::write(&earlier, b"RIFF").unwrap();

    let batch = coordinator
        .export_batch(&[SampleId::from(1), SampleId::from(2)], &config)
        .await
        .unwrap();
    assert_eq!(batch.successful, 1);

    let summary = coordinator
        .archive_export(batch.export_id.unwrap())
        .await
        .unwrap();
    assert_eq!(
        archive_entries(&summary.archive_path),
        vec!["Ambient/Pad.json", "Ambient/Pad.wav"]
    );
}
