//! Day-month-year calendar dates as they appear in storage and on the wire.

use chrono::NaiveDate;

use crate::error::DomainError;

/// `dd-mm-YYYY`, zero padded.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| DomainError::validation(format!("invalid date {s:?}: {e}")))
}

/// Serde adapter for `NaiveDate` fields using [`DATE_FORMAT`].
pub mod serde_dmy {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_date(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero_padded() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_date(d), "05-03-2024");
        assert_eq!(parse_date("05-03-2024").unwrap(), d);
    }

    #[test]
    fn rejects_iso_dates() {
        assert!(matches!(parse_date("2024-03-05"), Err(DomainError::Validation(_))));
    }
}
