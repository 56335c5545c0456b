//! String labels used to identify and group gear.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a single piece of gear (e.g. `H001`). Unique within an inventory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

/// Kit number shared by gear issued together. Not unique.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KitNumber(String);

macro_rules! impl_label_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Build the label, trimming surrounding whitespace.
            ///
            /// Rejects blank values and values with line breaks.
            pub fn parse(value: impl AsRef<str>) -> Result<Self, DomainError> {
                let value = value.as_ref().trim();
                if value.is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: cannot be empty", $name)));
                }
                if value.contains(['\n', '\r']) {
                    return Err(DomainError::invalid_id(format!(
                        "{}: cannot contain line breaks",
                        $name
                    )));
                }
                Ok(Self(value.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

impl_label_newtype!(ItemId, "ItemId");
impl_label_newtype!(KitNumber, "KitNumber");

impl KitNumber {
    /// Numeric value of the kit number, when it is a plain unsigned integer.
    pub fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}
