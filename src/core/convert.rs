//! Sample conversion to the device format
//!
//! [`Converter::convert`] turns any supported input into PCM at the target
//! sample rate and bit depth, keeping the channel count. Work runs on the
//! blocking pool, limited by a semaphore and a per-file timeout. Failures
//! are returned as data in [`ConversionResult`].
//!
//! The codec writes into a staging file next to the output. The staging
//! file is moved onto the output only while the caller is still waiting,
//! so a conversion that timed out never leaves a file behind.

use crate::adapters::codec::{AudioCodec, DecodedAudio, ResampleQuality};
use crate::config::HardwareConfig;
use crate::domain::errors::CodecError;
use crate::domain::options::OutputFormat;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::ffi::OsString;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Sample rate and bit depth the device expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetFormat {
    pub sample_rate: u32,
    pub bit_depth: u16,
}

impl Default for TargetFormat {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            bit_depth: 16,
        }
    }
}

impl From<&HardwareConfig> for TargetFormat {
    fn from(config: &HardwareConfig) -> Self {
        Self {
            sample_rate: config.target_sample_rate,
            bit_depth: config.target_bit_depth,
        }
    }
}

/// Outcome of converting one file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionResult {
    pub success: bool,
    pub output_path: PathBuf,
    pub original_sample_rate: Option<u32>,
    pub converted_sample_rate: Option<u32>,
    pub original_bit_depth: Option<u16>,
    pub converted_bit_depth: Option<u16>,
    pub original_duration_ms: Option<u64>,
    pub converted_duration_ms: Option<u64>,
    pub channels: Option<u16>,
    /// The reduced-quality retry produced this output
    pub used_fallback: bool,
    pub error: Option<String>,
}

impl ConversionResult {
    fn failed(output_path: &Path, error: impl Into<String>) -> Self {
        Self {
            success: false,
            output_path: output_path.to_path_buf(),
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Converts samples through an [`AudioCodec`]
pub struct Converter {
    codec: Arc<dyn AudioCodec>,
    target: TargetFormat,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl Converter {
    pub fn new(
        codec: Arc<dyn AudioCodec>,
        target: TargetFormat,
        timeout: Duration,
        max_concurrent: usize,
    ) -> Self {
        Self {
            codec,
            target,
            timeout,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Build a converter from the `[hardware]` section
    pub fn from_hardware(codec: Arc<dyn AudioCodec>, config: &HardwareConfig) -> Self {
        Self::new(
            codec,
            TargetFormat::from(config),
            Duration::from_secs(config.conversion_timeout_secs),
            config.max_concurrent_conversions,
        )
    }

    pub fn target(&self) -> TargetFormat {
        self.target
    }

    pub fn codec(&self) -> Arc<dyn AudioCodec> {
        Arc::clone(&self.codec)
    }

    /// Per-file time limit, also applied to validation
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Convert `input` into `output`
    ///
    /// Never returns an error. Decode, resample, encode, timeout, and task
    /// failures all produce `success = false` with a message.
    pub async fn convert(&self, input: &Path, output: &Path, format: OutputFormat) -> ConversionResult {
        let permit = match Arc::clone(&self.permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => return ConversionResult::failed(output, format!("converter closed: {e}")),
        };

        let codec = Arc::clone(&self.codec);
        let target = self.target;
        let input_path = input.to_path_buf();
        let output_path = output.to_path_buf();
        let gate = Arc::new(OutputGate::default());
        let worker_gate = Arc::clone(&gate);

        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            convert_blocking(
                codec.as_ref(),
                &input_path,
                &output_path,
                format,
                target,
                &worker_gate,
            )
        });

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                warn!(input = %input.display(), error = %join_error, "Conversion task failed");
                gate.abandon(output);
                ConversionResult::failed(output, format!("conversion task failed: {join_error}"))
            }
            Err(_) => {
                gate.abandon(output);
                warn!(
                    input = %input.display(),
                    timeout_secs = self.timeout.as_secs(),
                    "Conversion timed out"
                );
                ConversionResult::failed(
                    output,
                    format!("conversion timed out after {}s", self.timeout.as_secs()),
                )
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum GateState {
    #[default]
    Pending,
    Published,
    Abandoned,
}

/// Decides whether a finished conversion may appear at its output path
///
/// The worker publishes and the caller abandons under the same lock, so
/// exactly one of them wins.
#[derive(Debug, Default)]
struct OutputGate {
    state: Mutex<GateState>,
}

impl OutputGate {
    /// Move `staging` onto `output` unless the caller has given up
    fn publish(&self, staging: &Path, output: &Path) -> Result<(), CodecError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == GateState::Abandoned {
            remove_if_present(staging);
            return Err(CodecError::Io(format!(
                "{}: conversion abandoned",
                output.display()
            )));
        }
        if let Err(e) = std::fs::rename(staging, output) {
            remove_if_present(staging);
            return Err(CodecError::Io(format!("{}: {e}", output.display())));
        }
        *state = GateState::Published;
        Ok(())
    }

    /// Give up on the conversion and remove whatever it wrote
    ///
    /// `output` is only removed when this conversion published it, so an
    /// earlier file at the same path survives a timed-out overwrite.
    fn abandon(&self, output: &Path) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == GateState::Published {
            remove_if_present(output);
        }
        *state = GateState::Abandoned;
        let staging = staging_path(output);
        remove_if_present(&with_suffix(&staging, ".partial"));
        remove_if_present(&staging);
    }
}

/// Where the codec writes before the result is published
fn staging_path(output: &Path) -> PathBuf {
    with_suffix(output, ".converting")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(OsString::from(suffix));
    PathBuf::from(name)
}

fn remove_if_present(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed abandoned conversion file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove conversion file"),
    }
}

fn convert_blocking(
    codec: &dyn AudioCodec,
    input: &Path,
    output: &Path,
    format: OutputFormat,
    target: TargetFormat,
    gate: &OutputGate,
) -> ConversionResult {
    let decoded = match codec.decode(input) {
        Ok(decoded) => decoded,
        Err(e) => return ConversionResult::failed(output, e.to_string()),
    };

    let mut result = ConversionResult {
        output_path: output.to_path_buf(),
        original_sample_rate: Some(decoded.sample_rate),
        original_bit_depth: decoded.bits_per_sample,
        original_duration_ms: Some(decoded.duration_ms()),
        channels: u16::try_from(decoded.channel_count()).ok(),
        ..Default::default()
    };

    let staging = staging_path(output);
    let attempt = match resample_and_encode(codec, &decoded, &staging, format, target, ResampleQuality::High) {
        Err(e) if e.allows_fallback() => {
            warn!(
                input = %input.display(),
                error = %e,
                "Conversion failed, retrying with reduced quality"
            );
            result.used_fallback = true;
            resample_and_encode(codec, &decoded, &staging, format, target, ResampleQuality::Fast)
        }
        other => other,
    };
    let attempt = attempt.and_then(|frames| gate.publish(&staging, output).map(|()| frames));

    match attempt {
        Ok(frames) => {
            result.success = true;
            result.converted_sample_rate = Some(target.sample_rate);
            result.converted_bit_depth = Some(target.bit_depth);
            result.converted_duration_ms =
                Some(frames as u64 * 1000 / u64::from(target.sample_rate.max(1)));
            debug!(
                input = %input.display(),
                output = %output.display(),
                used_fallback = result.used_fallback,
                "Converted sample"
            );
        }
        Err(e) => {
            result.error = Some(e.to_string());
        }
    }

    result
}

/// Returns the number of frames written
fn resample_and_encode(
    codec: &dyn AudioCodec,
    decoded: &DecodedAudio,
    output: &Path,
    format: OutputFormat,
    target: TargetFormat,
    quality: ResampleQuality,
) -> Result<usize, CodecError> {
    let frames = if decoded.sample_rate == target.sample_rate {
        codec.encode(decoded, output, format, target.bit_depth)?;
        decoded.frames()
    } else {
        let resampled = codec.resample(decoded, target.sample_rate, quality)?;
        codec.encode(&resampled, output, format, target.bit_depth)?;
        resampled.frames()
    };
    Ok(frames)
}
