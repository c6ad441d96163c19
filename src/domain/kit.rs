//! Kit and pad layout domain types
//!
//! A kit maps samples onto pads. The sampler groups its pads into ten
//! lettered banks (A–J) of sixteen pads each. [`PadMap`] is the validated,
//! ordered form of a kit's assignments and is what the PADCONF encoder
//! consumes.

use super::errors::PadkitError;
use super::ids::{KitId, SampleId};
use super::result::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Number of banks on the device
pub const BANK_COUNT: usize = 10;

/// Number of pads in each bank
pub const PADS_PER_BANK: u8 = 16;

/// Bank letter A–J
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BankLetter {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
}

impl BankLetter {
    /// All banks in device order
    pub const ALL: [BankLetter; BANK_COUNT] = [
        BankLetter::A,
        BankLetter::B,
        BankLetter::C,
        BankLetter::D,
        BankLetter::E,
        BankLetter::F,
        BankLetter::G,
        BankLetter::H,
        BankLetter::I,
        BankLetter::J,
    ];

    /// Zero-based position of the bank on the device
    pub fn index(self) -> usize {
        self as usize
    }

    /// Upper-case letter
    pub fn as_char(self) -> char {
        (b'A' + self as u8) as char
    }

    /// Folder name used for this bank inside a kit export (`bank_a`)
    pub fn folder_name(self) -> String {
        format!("bank_{}", self.as_char().to_ascii_lowercase())
    }
}

impl TryFrom<char> for BankLetter {
    type Error = PadkitError;

    fn try_from(c: char) -> Result<Self> {
        let upper = c.to_ascii_uppercase();
        BankLetter::ALL
            .iter()
            .copied()
            .find(|bank| bank.as_char() == upper)
            .ok_or_else(|| PadkitError::Validation(format!("Invalid bank letter '{c}'. Expected A-J")))
    }
}

impl FromStr for BankLetter {
    type Err = PadkitError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => BankLetter::try_from(c),
            _ => Err(PadkitError::Validation(format!(
                "Invalid bank '{s}'. Expected a single letter A-J"
            ))),
        }
    }
}

impl TryFrom<String> for BankLetter {
    type Error = PadkitError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<BankLetter> for String {
    fn from(bank: BankLetter) -> Self {
        bank.as_char().to_string()
    }
}

impl fmt::Display for BankLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Pad number within a bank, 1–16
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PadNumber(u8);

impl PadNumber {
    /// Create a pad number, rejecting values outside 1–16
    pub fn new(pad: u8) -> Result<Self> {
        if pad == 0 || pad > PADS_PER_BANK {
            return Err(PadkitError::Validation(format!(
                "Invalid pad number {pad}. Expected 1-{PADS_PER_BANK}"
            )));
        }
        Ok(Self(pad))
    }

    /// One-based pad number
    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position within the bank
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<u8> for PadNumber {
    type Error = PadkitError;

    fn try_from(pad: u8) -> Result<Self> {
        Self::new(pad)
    }
}

impl From<PadNumber> for u8 {
    fn from(pad: PadNumber) -> Self {
        pad.0
    }
}

impl fmt::Display for PadNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-pad playback parameters stored in PADCONF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PadParameters {
    /// Volume, 0–127
    pub volume: u8,
    /// Pitch offset in semitones, -12..=12
    pub pitch: i8,
    /// Pan, -64 (left) ..= 63 (right)
    pub pan: i8,
    /// Play only while the pad is held
    pub gate: bool,
    /// Loop playback
    #[serde(rename = "loop")]
    pub loop_playback: bool,
    /// Play backwards
    pub reverse: bool,
}

impl Default for PadParameters {
    fn default() -> Self {
        Self {
            volume: 127,
            pitch: 0,
            pan: 0,
            gate: false,
            loop_playback: false,
            reverse: false,
        }
    }
}

impl PadParameters {
    /// Check that every parameter is within the device range
    pub fn validate(&self) -> Result<()> {
        if self.volume > 127 {
            return Err(PadkitError::Validation(format!(
                "Pad volume must be 0-127, got {}",
                self.volume
            )));
        }
        if !(-12..=12).contains(&self.pitch) {
            return Err(PadkitError::Validation(format!(
                "Pad pitch must be -12..=12 semitones, got {}",
                self.pitch
            )));
        }
        if !(-64..=63).contains(&self.pan) {
            return Err(PadkitError::Validation(format!(
                "Pad pan must be -64..=63, got {}",
                self.pan
            )));
        }
        Ok(())
    }
}

/// One sample placed on one pad
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitPadAssignment {
    /// Bank letter
    pub bank: BankLetter,
    /// Pad within the bank
    pub pad: PadNumber,
    /// Sample triggered by the pad
    pub sample_id: SampleId,
    /// Playback parameters
    #[serde(default)]
    pub params: PadParameters,
}

impl KitPadAssignment {
    /// Create an assignment with default playback parameters
    pub fn new(bank: BankLetter, pad: PadNumber, sample_id: SampleId) -> Self {
        Self {
            bank,
            pad,
            sample_id,
            params: PadParameters::default(),
        }
    }

    /// Ordering key of the assignment
    pub fn slot(&self) -> (BankLetter, PadNumber) {
        (self.bank, self.pad)
    }
}

/// A named kit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kit {
    /// Library id
    pub id: KitId,
    /// Display name, also used for the kit folder
    pub name: String,
}

/// A kit's assignments keyed and ordered by (bank, pad)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PadMap {
    slots: BTreeMap<(BankLetter, PadNumber), KitPadAssignment>,
}

impl PadMap {
    /// Build a pad map, rejecting duplicate slots and out-of-range parameters
    pub fn from_assignments(assignments: impl IntoIterator<Item = KitPadAssignment>) -> Result<Self> {
        let mut slots = BTreeMap::new();
        for assignment in assignments {
            assignment.params.validate()?;
            let slot = assignment.slot();
            if slots.insert(slot, assignment).is_some() {
                return Err(PadkitError::Validation(format!(
                    "Pad {}{} is assigned more than once",
                    slot.0, slot.1
                )));
            }
        }
        Ok(Self { slots })
    }

    /// Assignment on a slot, if any
    pub fn get(&self, bank: BankLetter, pad: PadNumber) -> Option<&KitPadAssignment> {
        self.slots.get(&(bank, pad))
    }

    /// Assignments in (bank, pad) order
    pub fn iter(&self) -> impl Iterator<Item = &KitPadAssignment> {
        self.slots.values()
    }

    /// Distinct banks that hold at least one assignment, in order
    pub fn banks(&self) -> Vec<BankLetter> {
        let mut banks: Vec<BankLetter> = self.slots.keys().map(|(bank, _)| *bank).collect();
        banks.dedup();
        banks
    }

    /// Number of occupied pads
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no pad is occupied
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(n: u8) -> PadNumber {
        PadNumber::new(n).unwrap()
    }

    #[test]
    fn test_bank_letter_parsing() {
        assert_eq!("a".parse::<BankLetter>().unwrap(), BankLetter::A);
        assert_eq!("J".parse::<BankLetter>().unwrap(), BankLetter::J);
        assert!("K".parse::<BankLetter>().is_err());
        assert!("AB".parse::<BankLetter>().is_err());
        assert!("".parse::<BankLetter>().is_err());
    }

    #[test]
    fn test_bank_letter_index_and_folder() {
        assert_eq!(BankLetter::A.index(), 0);
        assert_eq!(BankLetter::J.index(), 9);
        assert_eq!(BankLetter::C.folder_name(), "bank_c");
    }

    #[test]
    fn test_pad_number_range() {
        assert!(PadNumber::new(0).is_err());
        assert!(PadNumber::new(17).is_err());
        assert_eq!(pad(1).index(), 0);
        assert_eq!(pad(16).index(), 15);
    }

    #[test]
    fn test_pad_parameters_validation() {
        assert!(PadParameters::default().validate().is_ok());

        let loud = PadParameters {
            volume: 200,
            ..Default::default()
        };
        assert!(loud.validate().is_err());

        let sharp = PadParameters {
            pitch: 13,
            ..Default::default()
        };
        assert!(sharp.validate().is_err());
    }

    #[test]
    fn test_pad_map_orders_by_bank_then_pad() {
        let map = PadMap::from_assignments(vec![
            KitPadAssignment::new(BankLetter::B, pad(2), SampleId::from(3)),
            KitPadAssignment::new(BankLetter::A, pad(16), SampleId::from(2)),
            KitPadAssignment::new(BankLetter::A, pad(1), SampleId::from(1)),
        ])
        .unwrap();

        let order: Vec<SampleId> = map.iter().map(|a| a.sample_id).collect();
        assert_eq!(
            order,
            vec![SampleId::from(1), SampleId::from(2), SampleId::from(3)]
        );
        assert_eq!(map.banks(), vec![BankLetter::A, BankLetter::B]);
    }

    #[test]
    fn test_pad_map_rejects_duplicates() {
        let result = PadMap::from_assignments(vec![
            KitPadAssignment::new(BankLetter::A, pad(1), SampleId::from(1)),
            KitPadAssignment::new(BankLetter::A, pad(1), SampleId::from(2)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_assignment_deserialize_defaults() {
        let assignment: KitPadAssignment = toml::from_str(
            r#"
bank = "c"
pad = 4
sample_id = 9
"#,
        )
        .unwrap();

        assert_eq!(assignment.bank, BankLetter::C);
        assert_eq!(assignment.pad, pad(4));
        assert_eq!(assignment.params, PadParameters::default());
    }
}
