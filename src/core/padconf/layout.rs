//! PADCONF binary layout, version 1
//!
//! All multi-byte fields are little-endian.
//!
//! | Offset | Width | Field |
//! |---|---|---|
//! | 0 | 8 | magic `PADCONF\0` |
//! | 8 | 2 | layout version |
//! | 10 | 2 | bank count |
//! | 12 | 2 | pads per bank |
//! | 14 | 2 | record size |
//! | 16 | 160 × 32 | pad records, A1..A16, B1..B16, .. J16 |
//!
//! Pad record:
//!
//! | Offset | Width | Field |
//! |---|---|---|
//! | 0 | 1 | flags |
//! | 1 | 1 | volume |
//! | 2 | 1 | pitch (i8) |
//! | 3 | 1 | pan (i8) |
//! | 4 | 8 | sample id |
//! | 12 | 20 | reserved, zero |

use crate::domain::kit::{BANK_COUNT, PADS_PER_BANK};

pub const MAGIC: &[u8; 8] = b"PADCONF\0";
pub const VERSION: u16 = 1;
pub const HEADER_LEN: usize = 16;
pub const RECORD_LEN: usize = 32;
pub const PAD_COUNT: usize = BANK_COUNT * PADS_PER_BANK as usize;

/// Total encoded length, independent of how many pads are used
pub const PADCONF_LEN: usize = HEADER_LEN + PAD_COUNT * RECORD_LEN;

/// Sample id stored in unassigned pads
pub const EMPTY_SAMPLE_ID: u64 = u64::MAX;

pub const FLAG_OCCUPIED: u8 = 0b0000_0001;
pub const FLAG_GATE: u8 = 0b0000_0010;
pub const FLAG_LOOP: u8 = 0b0000_0100;
pub const FLAG_REVERSE: u8 = 0b0000_1000;

// Field offsets within a record
pub const OFFSET_FLAGS: usize = 0;
pub const OFFSET_VOLUME: usize = 1;
pub const OFFSET_PITCH: usize = 2;
pub const OFFSET_PAN: usize = 3;
pub const OFFSET_SAMPLE_ID: usize = 4;

/// Byte offset of the record for (bank index, pad index)
pub const fn record_offset(bank_index: usize, pad_index: usize) -> usize {
    HEADER_LEN + (bank_index * PADS_PER_BANK as usize + pad_index) * RECORD_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_length() {
        assert_eq!(PADCONF_LEN, 5136);
    }

    #[test]
    fn test_record_offsets() {
        assert_eq!(record_offset(0, 0), 16);
        assert_eq!(record_offset(0, 15), 16 + 15 * 32);
        assert_eq!(record_offset(1, 0), 16 + 16 * 32);
        assert_eq!(record_offset(9, 15) + RECORD_LEN, PADCONF_LEN);
    }
}
