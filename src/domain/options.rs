//! Export options
//!
//! [`ExportConfig`] is passed explicitly to every export call. There is no
//! process-wide default output location.

use super::errors::PadkitError;
use super::result::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Directory placement strategy for exported files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizeBy {
    /// Everything directly under the base path
    #[default]
    Flat,
    /// One folder per genre
    Genre,
    /// One folder per tempo bucket
    Bpm,
    /// Kit folders with bank subfolders
    Kit,
}

impl OrganizeBy {
    /// Name used in configuration files and export records
    pub fn as_str(self) -> &'static str {
        match self {
            OrganizeBy::Flat => "flat",
            OrganizeBy::Genre => "genre",
            OrganizeBy::Bpm => "bpm",
            OrganizeBy::Kit => "kit",
        }
    }

    /// Parse a strategy name, falling back to [`OrganizeBy::Flat`] for unknown names
    pub fn parse_lenient(name: &str) -> (Self, bool) {
        match name.parse() {
            Ok(strategy) => (strategy, true),
            Err(_) => (OrganizeBy::Flat, false),
        }
    }
}

impl FromStr for OrganizeBy {
    type Err = PadkitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(OrganizeBy::Flat),
            "genre" => Ok(OrganizeBy::Genre),
            "bpm" => Ok(OrganizeBy::Bpm),
            "kit" => Ok(OrganizeBy::Kit),
            _ => Err(PadkitError::Configuration(format!(
                "Invalid organize_by '{s}'. Must be one of: flat, genre, bpm, kit"
            ))),
        }
    }
}

impl fmt::Display for OrganizeBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container format written for the hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Wav,
    Aiff,
}

impl OutputFormat {
    /// File extension without the leading dot
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Wav => "wav",
            OutputFormat::Aiff => "aif",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Wav => "wav",
            OutputFormat::Aiff => "aiff",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = PadkitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wav" => Ok(OutputFormat::Wav),
            "aiff" | "aif" => Ok(OutputFormat::Aiff),
            _ => Err(PadkitError::Configuration(format!(
                "Invalid format '{s}'. Must be one of: wav, aiff"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for one export call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub organize_by: OrganizeBy,
    pub format: OutputFormat,
    /// Write a `<stem>.json` sidecar next to each exported file
    pub include_metadata: bool,
    pub sanitize_filenames: bool,
    /// Root of the export tree
    pub output_base_path: PathBuf,
}

impl ExportConfig {
    /// Create an export config, rejecting an empty output path
    pub fn new(
        organize_by: OrganizeBy,
        format: OutputFormat,
        include_metadata: bool,
        sanitize_filenames: bool,
        output_base_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let output_base_path = output_base_path.into();
        if output_base_path.as_os_str().is_empty() {
            return Err(PadkitError::Configuration(
                "output_base_path cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            organize_by,
            format,
            include_metadata,
            sanitize_filenames,
            output_base_path,
        })
    }

    /// Create an export config from raw option strings
    pub fn from_strs(
        organize_by: &str,
        format: &str,
        include_metadata: bool,
        sanitize_filenames: bool,
        output_base_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        Self::new(
            organize_by.parse()?,
            format.parse()?,
            include_metadata,
            sanitize_filenames,
            output_base_path,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organize_by_parsing() {
        assert_eq!("Genre".parse::<OrganizeBy>().unwrap(), OrganizeBy::Genre);
        assert_eq!(" bpm ".parse::<OrganizeBy>().unwrap(), OrganizeBy::Bpm);
        assert!("mood".parse::<OrganizeBy>().is_err());
    }

    #[test]
    fn test_organize_by_lenient() {
        assert_eq!(OrganizeBy::parse_lenient("kit"), (OrganizeBy::Kit, true));
        assert_eq!(OrganizeBy::parse_lenient("mood"), (OrganizeBy::Flat, false));
    }

    #[test]
    fn test_output_format() {
        assert_eq!("AIF".parse::<OutputFormat>().unwrap(), OutputFormat::Aiff);
        assert_eq!(OutputFormat::Wav.extension(), "wav");
        assert_eq!(OutputFormat::Aiff.extension(), "aif");
        assert!("mp3".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_export_config_rejects_empty_path() {
        let result = ExportConfig::new(OrganizeBy::Flat, OutputFormat::Wav, true, true, "");
        assert!(matches!(result, Err(PadkitError::Configuration(_))));
    }

    #[test]
    fn test_export_config_from_strs() {
        let config = ExportConfig::from_strs("bpm", "wav", false, true, "/tmp/out").unwrap();
        assert_eq!(config.organize_by, OrganizeBy::Bpm);
        assert_eq!(config.format, OutputFormat::Wav);
        assert!(!config.include_metadata);

        assert!(ExportConfig::from_strs("mood", "wav", true, true, "/tmp/out").is_err());
        assert!(ExportConfig::from_strs("flat", "ogg", true, true, "/tmp/out").is_err());
    }
}
