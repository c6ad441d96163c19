//! Domain error types
//!
//! This module defines the error hierarchy for padkit. Library code returns
//! [`PadkitError`]; third-party error types are converted at the boundary and
//! never leak through the public API.

use thiserror::Error;

/// Main padkit error type
///
/// Per-item problems inside a batch or kit job (validation and conversion
/// failures) are reported as data in the job result and never surface as this
/// type. `PadkitError` is reserved for failures that end the whole operation.
#[derive(Debug, Error)]
pub enum PadkitError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unknown sample, kit, or export id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request or input data
    #[error("Validation error: {0}")]
    Validation(String),

    /// Audio codec errors
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Filesystem failure affecting a shared output location
    #[error("Filesystem error: {0}")]
    Filesystem(String),

    /// Export history write failed and was rolled back
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Archive creation errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Audio codec errors
///
/// Raised by [`AudioCodec`](crate::adapters::codec::AudioCodec)
/// implementations. The variant records the pipeline stage that failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Container or codec is not supported
    #[error("Unsupported audio: {0}")]
    Unsupported(String),

    /// Decoding failed
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Sample rate conversion failed
    #[error("Resample failed: {0}")]
    Resample(String),

    /// Encoding failed
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Reading or writing the file failed
    #[error("I/O failed: {0}")]
    Io(String),
}

impl CodecError {
    /// Whether a reduced-quality retry can be expected to help
    ///
    /// Only the resample and encode stages depend on the quality setting;
    /// decode and I/O failures would fail again on the same input.
    pub fn allows_fallback(&self) -> bool {
        matches!(self, CodecError::Resample(_) | CodecError::Encode(_))
    }
}

impl From<std::io::Error> for PadkitError {
    fn from(err: std::io::Error) -> Self {
        PadkitError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PadkitError {
    fn from(err: serde_json::Error) -> Self {
        PadkitError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PadkitError {
    fn from(err: toml::de::Error) -> Self {
        PadkitError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<sqlx::Error> for PadkitError {
    fn from(err: sqlx::Error) -> Self {
        PadkitError::Database(err.to_string())
    }
}

impl From<zip::result::ZipError> for PadkitError {
    fn from(err: zip::result::ZipError) -> Self {
        PadkitError::Archive(err.to_string())
    }
}

impl From<walkdir::Error> for PadkitError {
    fn from(err: walkdir::Error) -> Self {
        PadkitError::Io(err.to_string())
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io(err.to_string())
    }
}

impl From<hound::Error> for CodecError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => CodecError::Io(e.to_string()),
            other => CodecError::Encode(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padkit_error_display() {
        let err = PadkitError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_codec_error_conversion() {
        let codec_err = CodecError::Decode("bad header".to_string());
        let err: PadkitError = codec_err.into();
        assert!(matches!(err, PadkitError::Codec(_)));
        assert!(err.to_string().contains("bad header"));
    }

    #[test]
    fn test_codec_error_fallback_stages() {
        assert!(CodecError::Resample("x".to_string()).allows_fallback());
        assert!(CodecError::Encode("x".to_string()).allows_fallback());
        assert!(!CodecError::Decode("x".to_string()).allows_fallback());
        assert!(!CodecError::Io("x".to_string()).allows_fallback());
        assert!(!CodecError::Unsupported("x".to_string()).allows_fallback());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: PadkitError = io_err.into();
        assert!(matches!(err, PadkitError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: PadkitError = json_err.into();
        assert!(matches!(err, PadkitError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: PadkitError = toml_err.into();
        assert!(matches!(err, PadkitError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_padkit_error_implements_std_error() {
        let err = PadkitError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
