//! Sample domain model
//!
//! A [`Sample`] is an audio file in the sample library together with the
//! descriptive metadata used for placement and sidecar files. The export
//! pipeline only ever reads samples.

use super::ids::SampleId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name used when a sample has neither a title nor a usable file stem
pub const DEFAULT_SAMPLE_NAME: &str = "sample";

/// An audio sample in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Library id
    pub id: SampleId,

    /// Location of the source audio file
    pub file_path: PathBuf,

    /// Duration in milliseconds, as recorded by the library
    #[serde(default)]
    pub duration_ms: Option<u64>,

    /// Genre label
    #[serde(default)]
    pub genre: Option<String>,

    /// Tempo in beats per minute
    #[serde(default)]
    pub bpm: Option<f64>,

    /// Musical key (e.g. "Am", "F#")
    #[serde(default, alias = "key")]
    pub musical_key: Option<String>,

    /// Human-readable title
    #[serde(default)]
    pub title: Option<String>,
}

impl Sample {
    /// Create a sample with only the required fields set
    pub fn new(id: SampleId, file_path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            file_path: file_path.into(),
            duration_ms: None,
            genre: None,
            bpm: None,
            musical_key: None,
            title: None,
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the genre
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Set the tempo
    pub fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = Some(bpm);
        self
    }

    /// Set the musical key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.musical_key = Some(key.into());
        self
    }

    /// Name used to build the exported filename
    ///
    /// Prefers a non-blank title, then the source file stem.
    pub fn display_name(&self) -> String {
        if let Some(title) = self.title.as_deref().map(str::trim) {
            if !title.is_empty() {
                return title.to_string();
            }
        }

        self.file_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().trim().to_string())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| DEFAULT_SAMPLE_NAME.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_title() {
        let sample = Sample::new(SampleId::from(1), "/lib/kick_01.wav").with_title("Big Kick");
        assert_eq!(sample.display_name(), "Big Kick");
    }

    #[test]
    fn test_display_name_falls_back_to_stem() {
        let sample = Sample::new(SampleId::from(1), "/lib/kick_01.wav").with_title("   ");
        assert_eq!(sample.display_name(), "kick_01");
    }

    #[test]
    fn test_display_name_default() {
        let sample = Sample::new(SampleId::from(1), "/");
        assert_eq!(sample.display_name(), DEFAULT_SAMPLE_NAME);
    }

    #[test]
    fn test_deserialize_with_key_alias() {
        let sample: Sample = toml::from_str(
            r#"
id = 3
file_path = "snare.wav"
key = "Am"
bpm = 92.5
"#,
        )
        .unwrap();

        assert_eq!(sample.id, SampleId::from(3));
        assert_eq!(sample.musical_key.as_deref(), Some("Am"));
        assert_eq!(sample.bpm, Some(92.5));
        assert!(sample.genre.is_none());
    }
}
