//! Shared fixtures for integration tests
#![allow(dead_code)]

use padkit::adapters::catalog::TomlCatalog;
use padkit::adapters::codec::{AudioCodec, SymphoniaCodec};
use padkit::adapters::sqlite::SqliteRecorder;
use padkit::config::{HardwareConfig, SqliteConfig};
use padkit::core::export::{Collaborators, ExportCoordinator};
use padkit::domain::{ExportConfig, OrganizeBy, OutputFormat};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Write a 16-bit mono sine tone
pub fn write_wav(path: &Path, sample_rate: u32, duration_ms: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let frames = sample_rate as u64 * u64::from(duration_ms) / 1000;
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for n in 0..frames {
        let t = n as f32 / sample_rate as f32;
        let value = (t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 0.5;
        writer.write_sample((value * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// Temporary library, output tree, and in-memory history
pub struct Harness {
    pub dir: TempDir,
    pub library: PathBuf,
    pub output: PathBuf,
    pub archives: PathBuf,
    pub recorder: SqliteRecorder,
}

impl Harness {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let library = dir.path().join("library");
        std::fs::create_dir_all(&library).unwrap();

        let recorder = SqliteRecorder::connect(&SqliteConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        })
        .await
        .unwrap();
        padkit::adapters::database::ExportRecorder::ensure_schema(&recorder)
            .await
            .unwrap();

        Self {
            output: dir.path().join("out"),
            archives: dir.path().join("archives"),
            library,
            recorder,
            dir,
        }
    }

    /// Path of a library file, written as a tone of the given length
    pub fn tone(&self, name: &str, sample_rate: u32, duration_ms: u32) -> PathBuf {
        let path = self.library.join(name);
        write_wav(&path, sample_rate, duration_ms);
        path
    }

    pub fn export_config(&self, organize_by: OrganizeBy) -> ExportConfig {
        ExportConfig::new(organize_by, OutputFormat::Wav, true, true, &self.output).unwrap()
    }

    pub fn coordinator(&self, catalog: TomlCatalog) -> ExportCoordinator {
        self.coordinator_with(catalog, &HardwareConfig::default())
    }

    pub fn coordinator_with(&self, catalog: TomlCatalog, hardware: &HardwareConfig) -> ExportCoordinator {
        self.coordinator_with_codec(catalog, hardware, Arc::new(SymphoniaCodec::new()))
    }

    pub fn coordinator_with_codec(
        &self,
        catalog: TomlCatalog,
        hardware: &HardwareConfig,
        codec: Arc<dyn AudioCodec>,
    ) -> ExportCoordinator {
        let catalog = Arc::new(catalog);
        let collaborators = Collaborators {
            samples: catalog.clone(),
            kits: catalog,
            recorder: Arc::new(self.recorder.clone()),
            codec,
        };
        ExportCoordinator::new(collaborators, hardware, &self.archives)
    }
}

/// Count regular files below `dir`
pub fn count_files(dir: &Path) -> usize {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .count()
}
