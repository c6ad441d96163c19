//! Domain identifier types with validation
//!
//! Newtype wrappers keep sample, kit, and export ids from being mixed up.
//! All three are non-negative integers, matching the row ids of the sample
//! library and the export history tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            #[doc = concat!("Creates a new ", $label, " id, rejecting negative values")]
            pub fn new(id: i64) -> Result<Self, String> {
                if id < 0 {
                    return Err(format!("{} id cannot be negative: {}", $label, id));
                }
                Ok(Self(id))
            }

            /// Returns the raw integer value
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let id = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| format!("Invalid {} id '{}': {}", $label, s, e))?;
                Self::new(id)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = String;

            fn try_from(id: i64) -> Result<Self, Self::Error> {
                Self::new(id)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(i64::from(id))
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

numeric_id!(
    /// Sample identifier in the sample library
    ///
    /// # Examples
    ///
    /// ```
    /// use padkit::domain::ids::SampleId;
    /// use std::str::FromStr;
    ///
    /// let id = SampleId::from_str("42").unwrap();
    /// assert_eq!(id.value(), 42);
    /// ```
    SampleId,
    "sample"
);

numeric_id!(
    /// Kit identifier in the kit library
    KitId,
    "kit"
);

numeric_id!(
    /// Export record identifier in the export history
    ExportId,
    "export"
);
