//! Default codec: symphonia decode, rubato resample, hound/AIFF encode

use super::aiff::write_aiff;
use super::{quantize, AudioCodec, AudioInfo, DecodedAudio, ResampleQuality};
use crate::domain::errors::CodecError;
use crate::domain::options::OutputFormat;
use rubato::{FftFixedInOut, Resampler};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, trace};

/// Frames per rubato processing block
const CHUNK_SIZE: usize = 1024;

/// Codec backed by symphonia, rubato, and hound
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaCodec;

impl SymphoniaCodec {
    pub fn new() -> Self {
        Self
    }
}

struct OpenedTrack {
    format: Box<dyn FormatReader>,
    track_id: u32,
    codec_params: symphonia::core::codecs::CodecParameters,
}

fn open_track(path: &Path) -> Result<OpenedTrack, CodecError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| CodecError::Unsupported(format!("{}: {}", path.display(), e)))?;

    let format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| CodecError::Decode(format!("{}: no audio tracks", path.display())))?;

    Ok(OpenedTrack {
        track_id: track.id,
        codec_params: track.codec_params.clone(),
        format,
    })
}

fn bits_of(params: &symphonia::core::codecs::CodecParameters) -> Option<u16> {
    params
        .bits_per_sample
        .or(params.bits_per_coded_sample)
        .and_then(|b| u16::try_from(b).ok())
}

fn decode_track(path: &Path, opened: OpenedTrack) -> Result<DecodedAudio, CodecError> {
    let OpenedTrack {
        mut format,
        track_id,
        codec_params,
    } = opened;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| CodecError::Unsupported(format!("{}: {}", path.display(), e)))?;

    let mut sample_rate = codec_params.sample_rate.unwrap_or(0);
    let mut channels: Vec<Vec<f32>> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => {
                return Err(CodecError::Decode(format!(
                    "{}: failed to read packet: {}",
                    path.display(),
                    e
                )))
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                trace!(path = %path.display(), error = e, "Skipping corrupted frame");
                continue;
            }
            Err(e) => {
                return Err(CodecError::Decode(format!("{}: {}", path.display(), e)));
            }
        };

        let spec = *decoded.spec();
        let channel_count = spec.channels.count();
        if channel_count == 0 {
            continue;
        }
        if channels.is_empty() {
            channels = vec![Vec::new(); channel_count];
            sample_rate = spec.rate;
        }

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        for frame in sample_buf.samples().chunks_exact(channel_count) {
            for (dst, sample) in channels.iter_mut().zip(frame) {
                dst.push(*sample);
            }
        }
    }

    if channels.is_empty() || sample_rate == 0 {
        return Err(CodecError::Decode(format!(
            "{}: no decodable audio",
            path.display()
        )));
    }

    Ok(DecodedAudio {
        channels,
        sample_rate,
        bits_per_sample: bits_of(&codec_params),
    })
}

/// Output frame count for a rate change
fn expected_frames(frames: usize, from_rate: u32, to_rate: u32) -> usize {
    (frames as u64 * u64::from(to_rate)).div_ceil(u64::from(from_rate)) as usize
}

fn resample_fft(audio: &DecodedAudio, to_rate: u32) -> Result<Vec<Vec<f32>>, CodecError> {
    let channel_count = audio.channel_count();
    let frames = audio.frames();
    let expected = expected_frames(frames, audio.sample_rate, to_rate);

    let mut resampler = FftFixedInOut::<f32>::new(
        audio.sample_rate as usize,
        to_rate as usize,
        CHUNK_SIZE,
        channel_count,
    )
    .map_err(|e| CodecError::Resample(e.to_string()))?;

    let delay = resampler.output_delay();
    let needed = expected + delay;
    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(needed); channel_count];

    let mut pos = 0;
    while output[0].len() < needed {
        let block_len = resampler.input_frames_next();
        let block: Vec<Vec<f32>> = audio
            .channels
            .iter()
            .map(|channel| {
                let mut buf = vec![0.0; block_len];
                if pos < frames {
                    let end = (pos + block_len).min(frames);
                    buf[..end - pos].copy_from_slice(&channel[pos..end]);
                }
                buf
            })
            .collect();

        let processed = resampler
            .process(&block, None)
            .map_err(|e| CodecError::Resample(e.to_string()))?;
        if processed.first().map_or(true, Vec::is_empty) {
            return Err(CodecError::Resample("resampler produced no output".to_string()));
        }
        for (dst, src) in output.iter_mut().zip(processed) {
            dst.extend_from_slice(&src);
        }
        pos += block_len;
    }

    for channel in &mut output {
        channel.drain(..delay);
        channel.truncate(expected);
    }
    Ok(output)
}

/// Linear interpolation resampler
fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }

    let ratio = f64::from(from_rate) / f64::from(to_rate);
    let output_len = expected_frames(samples.len(), from_rate, to_rate);
    let last = samples.len() - 1;

    (0..output_len)
        .map(|i| {
            let src_pos = i as f64 * ratio;
            let src_idx = (src_pos as usize).min(last);
            let frac = (src_pos - src_idx as f64) as f32;
            if src_idx < last {
                samples[src_idx] * (1.0 - frac) + samples[src_idx + 1] * frac
            } else {
                samples[last]
            }
        })
        .collect()
}

/// Sibling path used while a file is being written
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

fn write_wav(audio: &DecodedAudio, path: &Path, bit_depth: u16) -> Result<(), CodecError> {
    let spec = hound::WavSpec {
        channels: u16::try_from(audio.channel_count())
            .map_err(|_| CodecError::Encode("too many channels".to_string()))?,
        sample_rate: audio.sample_rate,
        bits_per_sample: bit_depth,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for frame in 0..audio.frames() {
        for channel in &audio.channels {
            let value = quantize(channel[frame], bit_depth);
            if bit_depth == 16 {
                writer.write_sample(value as i16)?;
            } else {
                writer.write_sample(value)?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}

fn write_aiff_file(audio: &DecodedAudio, path: &Path, bit_depth: u16) -> Result<(), CodecError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_aiff(&mut writer, audio, bit_depth)?;
    let file = writer
        .into_inner()
        .map_err(|e| CodecError::Io(e.error().to_string()))?;
    file.sync_all()?;
    Ok(())
}

impl AudioCodec for SymphoniaCodec {
    fn probe(&self, path: &Path) -> Result<AudioInfo, CodecError> {
        let opened = open_track(path)?;
        let params = &opened.codec_params;

        if let (Some(rate), Some(frames)) = (params.sample_rate, params.n_frames) {
            if rate > 0 {
                return Ok(AudioInfo {
                    sample_rate: rate,
                    channels: params.channels.map_or(0, |c| c.count() as u16),
                    bits_per_sample: bits_of(params),
                    duration_ms: frames * 1000 / u64::from(rate),
                });
            }
        }

        // Container does not report a length; count decoded frames instead.
        debug!(path = %path.display(), "Frame count unknown, decoding to measure duration");
        let audio = decode_track(path, opened)?;
        Ok(AudioInfo {
            sample_rate: audio.sample_rate,
            channels: audio.channel_count() as u16,
            bits_per_sample: audio.bits_per_sample,
            duration_ms: audio.duration_ms(),
        })
    }

    fn decode(&self, path: &Path) -> Result<DecodedAudio, CodecError> {
        let opened = open_track(path)?;
        let audio = decode_track(path, opened)?;
        debug!(
            path = %path.display(),
            sample_rate = audio.sample_rate,
            channels = audio.channel_count(),
            frames = audio.frames(),
            "Decoded audio"
        );
        Ok(audio)
    }

    fn resample(
        &self,
        audio: &DecodedAudio,
        target_rate: u32,
        quality: ResampleQuality,
    ) -> Result<DecodedAudio, CodecError> {
        if target_rate == 0 || audio.sample_rate == 0 {
            return Err(CodecError::Resample(format!(
                "invalid rate change {} -> {}",
                audio.sample_rate, target_rate
            )));
        }
        if audio.sample_rate == target_rate {
            return Ok(audio.clone());
        }

        let channels = if audio.frames() == 0 {
            vec![Vec::new(); audio.channel_count()]
        } else {
            match quality {
                ResampleQuality::High => resample_fft(audio, target_rate)?,
                ResampleQuality::Fast => audio
                    .channels
                    .iter()
                    .map(|c| resample_linear(c, audio.sample_rate, target_rate))
                    .collect(),
            }
        };

        Ok(DecodedAudio {
            channels,
            sample_rate: target_rate,
            bits_per_sample: audio.bits_per_sample,
        })
    }

    fn encode(
        &self,
        audio: &DecodedAudio,
        path: &Path,
        format: OutputFormat,
        bit_depth: u16,
    ) -> Result<(), CodecError> {
        if bit_depth != 16 && bit_depth != 24 {
            return Err(CodecError::Unsupported(format!(
                "bit depth {bit_depth} is not supported"
            )));
        }
        if audio.channel_count() == 0 {
            return Err(CodecError::Encode("no channels to encode".to_string()));
        }

        let partial = partial_path(path);
        let written = match format {
            OutputFormat::Wav => write_wav(audio, &partial, bit_depth),
            OutputFormat::Aiff => write_aiff_file(audio, &partial, bit_depth),
        };

        if let Err(e) = written {
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }

        std::fs::rename(&partial, path).map_err(|e| {
            let _ = std::fs::remove_file(&partial);
            CodecError::Io(format!("{}: {}", path.display(), e))
        })
    }
}
