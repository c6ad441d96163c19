//! PADCONF encoder
//!
//! Serializes a kit's [`PadMap`] into the fixed-size pad configuration file
//! the sampler reads from each kit folder. Offsets and widths live in
//! [`layout`]; this module only fills them in.

pub mod layout;

use crate::domain::errors::PadkitError;
use crate::domain::ids::SampleId;
use crate::domain::kit::{BankLetter, PadMap, PadNumber, PadParameters, PADS_PER_BANK};
use crate::domain::result::Result;
use layout::*;
use std::path::{Path, PathBuf};

/// File name written into each kit folder
pub const PADCONF_FILE_NAME: &str = "PADCONF.BIN";

pub use layout::PADCONF_LEN;

/// One decoded pad record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadSlot {
    pub bank: BankLetter,
    pub pad: PadNumber,
    /// `None` for an unassigned pad
    pub sample_id: Option<SampleId>,
    pub params: PadParameters,
}

/// Encode a pad map; the output is always [`PADCONF_LEN`] bytes
pub fn encode_padconf(pads: &PadMap) -> Vec<u8> {
    let mut buf = vec![0u8; PADCONF_LEN];

    buf[..8].copy_from_slice(MAGIC);
    buf[8..10].copy_from_slice(&VERSION.to_le_bytes());
    buf[10..12].copy_from_slice(&(BankLetter::ALL.len() as u16).to_le_bytes());
    buf[12..14].copy_from_slice(&u16::from(PADS_PER_BANK).to_le_bytes());
    buf[14..16].copy_from_slice(&(RECORD_LEN as u16).to_le_bytes());

    for bank in BankLetter::ALL {
        for pad_index in 0..usize::from(PADS_PER_BANK) {
            let offset = record_offset(bank.index(), pad_index);
            let record = &mut buf[offset..offset + RECORD_LEN];
            record[OFFSET_SAMPLE_ID..OFFSET_SAMPLE_ID + 8]
                .copy_from_slice(&EMPTY_SAMPLE_ID.to_le_bytes());
        }
    }

    for assignment in pads.iter() {
        let offset = record_offset(assignment.bank.index(), assignment.pad.index());
        let record = &mut buf[offset..offset + RECORD_LEN];
        let params = &assignment.params;

        let mut flags = FLAG_OCCUPIED;
        if params.gate {
            flags |= FLAG_GATE;
        }
        if params.loop_playback {
            flags |= FLAG_LOOP;
        }
        if params.reverse {
            flags |= FLAG_REVERSE;
        }

        record[OFFSET_FLAGS] = flags;
        record[OFFSET_VOLUME] = params.volume;
        record[OFFSET_PITCH] = params.pitch.to_le_bytes()[0];
        record[OFFSET_PAN] = params.pan.to_le_bytes()[0];
        // Ids are non-negative by construction.
        record[OFFSET_SAMPLE_ID..OFFSET_SAMPLE_ID + 8]
            .copy_from_slice(&(assignment.sample_id.value() as u64).to_le_bytes());
    }

    buf
}

/// Decode a PADCONF blob into its 160 pad records
pub fn decode_padconf(bytes: &[u8]) -> Result<Vec<PadSlot>> {
    if bytes.len() != PADCONF_LEN {
        return Err(PadkitError::Validation(format!(
            "PADCONF must be {} bytes, got {}",
            PADCONF_LEN,
            bytes.len()
        )));
    }
    if &bytes[..8] != MAGIC {
        return Err(PadkitError::Validation("PADCONF magic mismatch".to_string()));
    }
    let version = u16::from_le_bytes([bytes[8], bytes[9]]);
    if version != VERSION {
        return Err(PadkitError::Validation(format!(
            "unsupported PADCONF version {version}"
        )));
    }

    let mut slots = Vec::with_capacity(PAD_COUNT);
    for bank in BankLetter::ALL {
        for pad_number in 1..=PADS_PER_BANK {
            let pad = PadNumber::new(pad_number)?;
            let offset = record_offset(bank.index(), pad.index());
            let record = &bytes[offset..offset + RECORD_LEN];

            let flags = record[OFFSET_FLAGS];
            let mut raw_id = [0u8; 8];
            raw_id.copy_from_slice(&record[OFFSET_SAMPLE_ID..OFFSET_SAMPLE_ID + 8]);
            let raw_id = u64::from_le_bytes(raw_id);

            let sample_id = if flags & FLAG_OCCUPIED == 0 {
                None
            } else {
                let id = i64::try_from(raw_id)
                    .map_err(|_| PadkitError::Validation(format!("sample id {raw_id} out of range")))?;
                Some(SampleId::new(id).map_err(PadkitError::Validation)?)
            };

            slots.push(PadSlot {
                bank,
                pad,
                sample_id,
                params: PadParameters {
                    volume: record[OFFSET_VOLUME],
                    pitch: i8::from_le_bytes([record[OFFSET_PITCH]]),
                    pan: i8::from_le_bytes([record[OFFSET_PAN]]),
                    gate: flags & FLAG_GATE != 0,
                    loop_playback: flags & FLAG_LOOP != 0,
                    reverse: flags & FLAG_REVERSE != 0,
                },
            });
        }
    }

    Ok(slots)
}

/// Write `PADCONF.BIN` into `kit_dir`, returning its path
pub fn write_padconf(kit_dir: &Path, pads: &PadMap) -> Result<PathBuf> {
    let path = kit_dir.join(PADCONF_FILE_NAME);
    std::fs::write(&path, encode_padconf(pads)).map_err(|e| {
        PadkitError::Filesystem(format!("failed to write {}: {}", path.display(), e))
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::kit::KitPadAssignment;

    fn pad(n: u8) -> PadNumber {
        PadNumber::new(n).unwrap()
    }

    #[test]
    fn test_empty_map_has_fixed_length() {
        let bytes = encode_padconf(&PadMap::default());
        assert_eq!(bytes.len(), PADCONF_LEN);
        assert_eq!(&bytes[..8], b"PADCONF\0");

        let slots = decode_padconf(&bytes).unwrap();
        assert_eq!(slots.len(), 160);
        assert!(slots.iter().all(|s| s.sample_id.is_none()));
    }

    #[test]
    fn test_occupancy_does_not_change_length() {
        let full = PadMap::from_assignments(BankLetter::ALL.iter().flat_map(|bank| {
            (1..=16).map(move |n| {
                KitPadAssignment::new(*bank, pad(n), SampleId::from(u32::from(n)))
            })
        }))
        .unwrap();
        assert_eq!(encode_padconf(&full).len(), PADCONF_LEN);
    }

    #[test]
    fn test_record_contents() {
        let mut assignment = KitPadAssignment::new(BankLetter::B, pad(3), SampleId::from(42));
        assignment.params = PadParameters {
            volume: 100,
            pitch: -7,
            pan: 20,
            gate: true,
            loop_playback: false,
            reverse: true,
        };
        let map = PadMap::from_assignments(vec![assignment.clone()]).unwrap();
        let bytes = encode_padconf(&map);

        let offset = record_offset(1, 2);
        assert_eq!(bytes[offset], FLAG_OCCUPIED | FLAG_GATE | FLAG_REVERSE);
        assert_eq!(bytes[offset + 1], 100);
        assert_eq!(bytes[offset + 2] as i8, -7);
        assert_eq!(bytes[offset + 3], 20);
        assert_eq!(&bytes[offset + 4..offset + 12], &42u64.to_le_bytes());
        assert!(bytes[offset + 12..offset + 32].iter().all(|b| *b == 0));

        let empty = record_offset(0, 0);
        assert_eq!(&bytes[empty..empty + 4], &[0, 0, 0, 0]);
        assert_eq!(&bytes[empty + 4..empty + 12], &[0xFF; 8]);

        let slot = decode_padconf(&bytes)
            .unwrap()
            .into_iter()
            .find(|s| s.bank == BankLetter::B && s.pad == pad(3))
            .unwrap();
        assert_eq!(slot.sample_id, Some(SampleId::from(42)));
        assert_eq!(slot.params, assignment.params);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let map = PadMap::from_assignments(vec![
            KitPadAssignment::new(BankLetter::J, pad(16), SampleId::from(9)),
            KitPadAssignment::new(BankLetter::A, pad(1), SampleId::from(1)),
        ])
        .unwrap();
        assert_eq!(encode_padconf(&map), encode_padconf(&map.clone()));
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(decode_padconf(&[0u8; 10]).is_err());

        let mut bytes = encode_padconf(&PadMap::default());
        bytes[0] = b'X';
        assert!(decode_padconf(&bytes).is_err());
    }
}
