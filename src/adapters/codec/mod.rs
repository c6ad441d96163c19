//! Audio codec collaborator
//!
//! The converter never touches DSP itself. It drives an [`AudioCodec`]
//! through decode, resample, and encode, and only decides when each step
//! runs. [`SymphoniaCodec`] is the default implementation.

pub mod aiff;
pub mod symphonia;

pub use self::symphonia::SymphoniaCodec;

use crate::domain::errors::CodecError;
use crate::domain::options::OutputFormat;
use std::path::Path;

/// Stream properties read without decoding the whole file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: u16,
    /// Bits per sample, when the container reports one
    pub bits_per_sample: Option<u16>,
    pub duration_ms: u64,
}

/// Decoded PCM, one `Vec<f32>` per channel, samples in `[-1.0, 1.0]`
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
    pub bits_per_sample: Option<u16>,
}

impl DecodedAudio {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Frames per channel
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1000 / u64::from(self.sample_rate)
    }
}

/// Resampler quality
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleQuality {
    /// Band-limited FFT resampler
    High,
    /// Linear interpolation, used for the reduced-quality retry
    Fast,
}

/// Decode, resample, and encode audio files
///
/// Implementations are synchronous and CPU-bound. Callers run them on a
/// blocking thread.
pub trait AudioCodec: Send + Sync {
    /// Read stream properties and duration
    fn probe(&self, path: &Path) -> Result<AudioInfo, CodecError>;

    /// Decode the first audio track to planar f32
    fn decode(&self, path: &Path) -> Result<DecodedAudio, CodecError>;

    /// Convert to `target_rate`, keeping the channel count
    fn resample(
        &self,
        audio: &DecodedAudio,
        target_rate: u32,
        quality: ResampleQuality,
    ) -> Result<DecodedAudio, CodecError>;

    /// Write integer PCM at `bit_depth` in the given container
    fn encode(
        &self,
        audio: &DecodedAudio,
        path: &Path,
        format: OutputFormat,
        bit_depth: u16,
    ) -> Result<(), CodecError>;
}

/// Scale a float sample to a signed integer of `bits` width
pub(crate) fn quantize(sample: f32, bits: u16) -> i32 {
    let scale = (1_i64 << (bits - 1)) as f64;
    let value = (f64::from(sample) * scale).round();
    value.clamp(-scale, scale - 1.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_16_bit_range() {
        assert_eq!(quantize(0.0, 16), 0);
        assert_eq!(quantize(1.0, 16), i32::from(i16::MAX));
        assert_eq!(quantize(-1.0, 16), i32::from(i16::MIN));
        assert_eq!(quantize(2.0, 16), i32::from(i16::MAX));
    }

    #[test]
    fn test_quantize_round_trips_integer_samples() {
        for raw in [-32768_i32, -1234, -1, 0, 1, 999, 32767] {
            let sample = raw as f32 / 32768.0;
            assert_eq!(quantize(sample, 16), raw);
        }
        for raw in [-8_388_608_i32, -77, 0, 4_000_000, 8_388_607] {
            let sample = raw as f32 / 8_388_608.0;
            assert_eq!(quantize(sample, 24), raw);
        }
    }

    #[test]
    fn test_decoded_audio_dimensions() {
        let audio = DecodedAudio {
            channels: vec![vec![0.0; 4800], vec![0.0; 4800]],
            sample_rate: 48_000,
            bits_per_sample: Some(16),
        };
        assert_eq!(audio.channel_count(), 2);
        assert_eq!(audio.frames(), 4800);
        assert_eq!(audio.duration_ms(), 100);
    }
}
