//! AIFF writer
//!
//! Big-endian FORM/COMM/SSND layout with integer PCM. hound only writes
//! WAV, so AIFF output is produced here.

use super::{quantize, DecodedAudio};
use crate::domain::errors::CodecError;
use std::io::Write;

const COMM_CHUNK_SIZE: u32 = 18;
const SSND_HEADER_SIZE: u32 = 8;

/// Encode an IEEE 754 80-bit extended float holding an integer sample rate
pub fn extended_sample_rate(rate: u32) -> [u8; 10] {
    let mut out = [0u8; 10];
    if rate == 0 {
        return out;
    }

    let shift = rate.leading_zeros();
    let exponent = (16_383 + 31 - shift) as u16;
    let mantissa = u64::from(rate) << (32 + shift);

    out[..2].copy_from_slice(&exponent.to_be_bytes());
    out[2..].copy_from_slice(&mantissa.to_be_bytes());
    out
}

/// Write `audio` as AIFF at `bit_depth` (16 or 24)
pub fn write_aiff<W: Write>(
    writer: &mut W,
    audio: &DecodedAudio,
    bit_depth: u16,
) -> Result<(), CodecError> {
    if bit_depth != 16 && bit_depth != 24 {
        return Err(CodecError::Unsupported(format!(
            "AIFF bit depth {bit_depth} is not supported"
        )));
    }

    let channels = u16::try_from(audio.channel_count())
        .map_err(|_| CodecError::Encode("too many channels".to_string()))?;
    let frames = u32::try_from(audio.frames())
        .map_err(|_| CodecError::Encode("too many frames for AIFF".to_string()))?;
    let bytes_per_sample = u32::from(bit_depth / 8);

    let data_len = u64::from(frames) * u64::from(channels) * u64::from(bytes_per_sample);
    let data_len = u32::try_from(data_len)
        .map_err(|_| CodecError::Encode("audio too long for AIFF".to_string()))?;
    let pad = data_len % 2;
    let ssnd_size = SSND_HEADER_SIZE + data_len;
    let form_size = 4 + (8 + COMM_CHUNK_SIZE) + (8 + ssnd_size) + pad;

    writer.write_all(b"FORM")?;
    writer.write_all(&form_size.to_be_bytes())?;
    writer.write_all(b"AIFF")?;

    writer.write_all(b"COMM")?;
    writer.write_all(&COMM_CHUNK_SIZE.to_be_bytes())?;
    writer.write_all(&channels.to_be_bytes())?;
    writer.write_all(&frames.to_be_bytes())?;
    writer.write_all(&bit_depth.to_be_bytes())?;
    writer.write_all(&extended_sample_rate(audio.sample_rate))?;

    writer.write_all(b"SSND")?;
    writer.write_all(&ssnd_size.to_be_bytes())?;
    writer.write_all(&0u32.to_be_bytes())?; // offset
    writer.write_all(&0u32.to_be_bytes())?; // block size

    let mut frame_bytes = Vec::with_capacity(channels as usize * bytes_per_sample as usize);
    for frame in 0..audio.frames() {
        frame_bytes.clear();
        for channel in &audio.channels {
            let value = quantize(channel[frame], bit_depth);
            if bit_depth == 16 {
                frame_bytes.extend_from_slice(&(value as i16).to_be_bytes());
            } else {
                frame_bytes.extend_from_slice(&value.to_be_bytes()[1..]);
            }
        }
        writer.write_all(&frame_bytes)?;
    }

    if pad == 1 {
        writer.write_all(&[0])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(channels: Vec<Vec<f32>>, sample_rate: u32) -> DecodedAudio {
        DecodedAudio {
            channels,
            sample_rate,
            bits_per_sample: Some(16),
        }
    }

    #[test]
    fn test_extended_sample_rate_known_values() {
        assert_eq!(
            extended_sample_rate(44_100),
            [0x40, 0x0E, 0xAC, 0x44, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            extended_sample_rate(48_000),
            [0x40, 0x0E, 0xBB, 0x80, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(extended_sample_rate(0), [0; 10]);
    }

    #[test]
    fn test_write_aiff_layout_16_bit_stereo() {
        let input = audio(vec![vec![0.5, -0.5], vec![0.0, 1.0]], 48_000);
        let mut out = Vec::new();
        write_aiff(&mut out, &input, 16).unwrap();

        // header 12 + COMM 26 + SSND header 16 + 2 frames * 2 ch * 2 bytes
        assert_eq!(out.len(), 12 + 26 + 16 + 8);
        assert_eq!(&out[0..4], b"FORM");
        assert_eq!(u32::from_be_bytes([out[4], out[5], out[6], out[7]]) as usize, out.len() - 8);
        assert_eq!(&out[8..12], b"AIFF");
        assert_eq!(&out[12..16], b"COMM");
        assert_eq!(u16::from_be_bytes([out[20], out[21]]), 2);
        assert_eq!(u32::from_be_bytes([out[22], out[23], out[24], out[25]]), 2);
        assert_eq!(u16::from_be_bytes([out[26], out[27]]), 16);
        assert_eq!(&out[38..42], b"SSND");

        let data = &out[54..];
        assert_eq!(i16::from_be_bytes([data[0], data[1]]), 16_384);
        assert_eq!(i16::from_be_bytes([data[2], data[3]]), 0);
        assert_eq!(i16::from_be_bytes([data[4], data[5]]), -16_384);
        assert_eq!(i16::from_be_bytes([data[6], data[7]]), i16::MAX);
    }

    #[test]
    fn test_write_aiff_pads_odd_data() {
        let input = audio(vec![vec![0.25]], 44_100);
        let mut out = Vec::new();
        write_aiff(&mut out, &input, 24).unwrap();

        // 3 data bytes plus one pad byte
        assert_eq!(out.len(), 12 + 26 + 16 + 3 + 1);
        assert_eq!(u32::from_be_bytes([out[4], out[5], out[6], out[7]]) as usize, out.len() - 8);
        assert_eq!(u32::from_be_bytes([out[42], out[43], out[44], out[45]]), 8 + 3);
    }

    #[test]
    fn test_write_aiff_rejects_unsupported_depth() {
        let input = audio(vec![vec![0.0]], 44_100);
        let mut out = Vec::new();
        assert!(matches!(
            write_aiff(&mut out, &input, 8),
            Err(CodecError::Unsupported(_))
        ));
    }
}
