//! TOML sample and kit catalog
//!
//! A flat file listing the sample library and its kits, used by the CLI.
//!
//! ```toml
//! [[samples]]
//! id = 1
//! file_path = "drums/kick.wav"
//! title = "Deep Kick"
//! genre = "house"
//! bpm = 124.0
//!
//! [[kits]]
//! id = 1
//! name = "Boom Bap"
//!
//! [[kits.pads]]
//! bank = "A"
//! pad = 1
//! sample_id = 1
//! params = { volume = 110, pitch = -2 }
//! ```
//!
//! Relative `file_path` values are resolved against the catalog's directory.

use crate::adapters::repository::{KitRepository, SampleRepository};
use crate::domain::ids::{KitId, SampleId};
use crate::domain::kit::{Kit, KitPadAssignment};
use crate::domain::sample::Sample;
use crate::domain::{PadkitError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    samples: Vec<Sample>,
    #[serde(default)]
    kits: Vec<KitEntry>,
}

#[derive(Debug, Deserialize)]
struct KitEntry {
    id: KitId,
    name: String,
    #[serde(default)]
    pads: Vec<KitPadAssignment>,
}

/// In-memory catalog loaded from TOML
#[derive(Debug, Default, Clone)]
pub struct TomlCatalog {
    samples: HashMap<SampleId, Sample>,
    kits: HashMap<KitId, (Kit, Vec<KitPadAssignment>)>,
}

impl TomlCatalog {
    /// Load a catalog file
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the file is missing, is not valid
    /// TOML, or lists an id twice.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PadkitError::Configuration(format!(
                "Failed to read catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let catalog = Self::parse(&content, base_dir)?;

        tracing::info!(
            path = %path.display(),
            samples = catalog.samples.len(),
            kits = catalog.kits.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Parse catalog text, resolving relative sample paths against `base_dir`
    pub fn parse(content: &str, base_dir: &Path) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| PadkitError::Configuration(format!("Invalid catalog: {}", e)))?;

        let mut catalog = Self::default();
        for mut sample in file.samples {
            if sample.file_path.is_relative() {
                sample.file_path = base_dir.join(&sample.file_path);
            }
            let id = sample.id;
            if catalog.samples.insert(id, sample).is_some() {
                return Err(PadkitError::Configuration(format!(
                    "Catalog lists sample {id} more than once"
                )));
            }
        }
        for entry in file.kits {
            let kit = Kit {
                id: entry.id,
                name: entry.name,
            };
            if catalog.kits.insert(entry.id, (kit, entry.pads)).is_some() {
                return Err(PadkitError::Configuration(format!(
                    "Catalog lists kit {} more than once",
                    entry.id
                )));
            }
        }
        Ok(catalog)
    }

    /// Add or replace a sample
    pub fn insert_sample(&mut self, sample: Sample) {
        self.samples.insert(sample.id, sample);
    }

    /// Add or replace a kit and its assignments
    pub fn insert_kit(&mut self, kit: Kit, pads: Vec<KitPadAssignment>) {
        self.kits.insert(kit.id, (kit, pads));
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn kit_count(&self) -> usize {
        self.kits.len()
    }
}

#[async_trait]
impl SampleRepository for TomlCatalog {
    async fn get_by_id(&self, id: &SampleId) -> Result<Option<Sample>> {
        Ok(self.samples.get(id).cloned())
    }
}

#[async_trait]
impl KitRepository for TomlCatalog {
    async fn get_kit(&self, id: &KitId) -> Result<Option<Kit>> {
        Ok(self.kits.get(id).map(|(kit, _)| kit.clone()))
    }

    async fn get_pad_assignments(&self, id: &KitId) -> Result<Vec<KitPadAssignment>> {
        Ok(self
            .kits
            .get(id)
            .map(|(_, pads)| pads.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::kit::{BankLetter, PadNumber};
    use std::path::PathBuf;

    const CATALOG: &str = r#"
[[samples]]
id = 1
file_path = "drums/kick.wav"
title = "Deep Kick"
bpm = 124.0
key = "Am"

[[samples]]
id = 2
file_path = "/abs/snare.wav"

[[kits]]
id = 5
name = "Boom Bap"

[[kits.pads]]
bank = "b"
pad = 3
sample_id = 1
params = { volume = 100, loop = true }
"#;

    #[tokio::test]
    async fn test_parse_and_lookup() {
        let catalog = TomlCatalog::parse(CATALOG, Path::new("/library")).unwrap();
        assert_eq!(catalog.sample_count(), 2);
        assert_eq!(catalog.kit_count(), 1);

        let kick = catalog.get_by_id(&SampleId::from(1)).await.unwrap().unwrap();
        assert_eq!(kick.file_path, PathBuf::from("/library/drums/kick.wav"));
        assert_eq!(kick.musical_key.as_deref(), Some("Am"));

        let snare = catalog.get_by_id(&SampleId::from(2)).await.unwrap().unwrap();
        assert_eq!(snare.file_path, PathBuf::from("/abs/snare.wav"));

        assert!(catalog.get_by_id(&SampleId::from(3)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_kit_assignments() {
        let catalog = TomlCatalog::parse(CATALOG, Path::new("/library")).unwrap();
        let kit = catalog.get_kit(&KitId::from(5)).await.unwrap().unwrap();
        assert_eq!(kit.name, "Boom Bap");

        let pads = catalog.get_pad_assignments(&KitId::from(5)).await.unwrap();
        assert_eq!(pads.len(), 1);
        assert_eq!(pads[0].bank, BankLetter::B);
        assert_eq!(pads[0].pad, PadNumber::new(3).unwrap());
        assert_eq!(pads[0].params.volume, 100);
        assert!(pads[0].params.loop_playback);

        assert!(catalog.get_kit(&KitId::from(6)).await.unwrap().is_none());
        assert!(catalog
            .get_pad_assignments(&KitId::from(6))
            .await
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_duplicate_sample_rejected() {
        let content = r#"
[[samples]]
id = 1
file_path = "a.wav"

[[samples]]
id = 1
file_path = "b.wav"
"#;
        assert!(TomlCatalog::parse(content, Path::new(".")).is_err());
    }
}
