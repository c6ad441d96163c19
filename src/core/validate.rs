//! Input checks run before conversion
//!
//! Validation never fails. Every check in [`ValidationResult`] is populated,
//! and a check that could not run is reported as `false` with a message.

use crate::adapters::codec::AudioCodec;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Input extensions the codec can decode
pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] =
    &["wav", "aif", "aiff", "flac", "mp3", "ogg", "m4a", "aac"];

/// Default shortest accepted sample
pub const DEFAULT_MIN_DURATION_MS: u64 = 100;

/// Result of validating one input file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub duration_ms: Option<u64>,
    pub readable: bool,
    pub format_ok: bool,
    pub duration_ok: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Errors joined into one line
    pub fn summary(&self) -> String {
        self.errors.join("; ")
    }
}

/// Checks that an input file can be exported
#[derive(Clone)]
pub struct Validator {
    codec: Arc<dyn AudioCodec>,
    min_duration_ms: u64,
}

impl Validator {
    pub fn new(codec: Arc<dyn AudioCodec>, min_duration_ms: u64) -> Self {
        Self {
            codec,
            min_duration_ms,
        }
    }

    pub fn min_duration_ms(&self) -> u64 {
        self.min_duration_ms
    }

    /// Run all checks in order: readable, extension, duration
    pub fn validate(&self, path: &Path) -> ValidationResult {
        let mut result = ValidationResult::default();

        match File::open(path).and_then(|f| f.metadata()) {
            Ok(meta) if meta.is_file() => result.readable = true,
            Ok(_) => result
                .errors
                .push(format!("{} is not a regular file", path.display())),
            Err(e) => result
                .errors
                .push(format!("cannot read {}: {}", path.display(), e)),
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some(ext) if SUPPORTED_INPUT_EXTENSIONS.contains(&ext) => result.format_ok = true,
            Some(ext) => result
                .errors
                .push(format!("unsupported input format '.{ext}'")),
            None => result
                .errors
                .push("input file has no extension".to_string()),
        }

        if !(result.readable && result.format_ok) {
            result
                .errors
                .push("duration not checked: file unreadable or format unsupported".to_string());
        } else {
            match self.codec.probe(path) {
                Ok(info) => {
                    result.duration_ms = Some(info.duration_ms);
                    if info.duration_ms >= self.min_duration_ms {
                        result.duration_ok = true;
                    } else {
                        result.errors.push(format!(
                            "duration {} ms is below the {} ms minimum",
                            info.duration_ms, self.min_duration_ms
                        ));
                    }
                }
                Err(e) => result.errors.push(format!("cannot read duration: {e}")),
            }
        }

        result.valid = result.readable && result.format_ok && result.duration_ok;
        result
    }
}
