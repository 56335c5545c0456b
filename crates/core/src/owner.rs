//! Name of the person holding a piece of gear.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Spelling of "no owner" in the inventory file.
pub const ABSENT_OWNER: &str = "None";

/// Validated owner name.
///
/// Always stored trimmed, so a name written to the inventory file reads back
/// unchanged. Names that the file format cannot carry are rejected: blank names, line
/// breaks, `|` (the history separator) and the reserved [`ABSENT_OWNER`] token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Owner(String);

impl Owner {
    pub fn parse(value: impl AsRef<str>) -> Result<Self, DomainError> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return Err(DomainError::validation("owner cannot be empty"));
        }
        if value.contains(['\n', '\r']) {
            return Err(DomainError::validation("owner cannot contain line breaks"));
        }
        if value.contains('|') {
            return Err(DomainError::validation("owner cannot contain '|'"));
        }
        if value == ABSENT_OWNER {
            return Err(DomainError::validation(format!(
                "owner cannot be the reserved name {ABSENT_OWNER:?}"
            )));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Owner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Owner {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Owner {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Owner {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Owner> for String {
    fn from(value: Owner) -> Self {
        value.0
    }
}
