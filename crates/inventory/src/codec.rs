//! One storage record per item.
//!
//! Field order: `id, kit_number, type, status, last_updated, curr_owner, history, notes`.
//! History entries are joined with `|`, each `owner:dd-mm-YYYY`; the bare token `None`
//! stands for an entry with neither owner nor date. Quoting is left to the CSV layer,
//! which only quotes fields holding a comma, a double quote or a line break.

use thiserror::Error;

use gearcage_core::{ABSENT_OWNER, DomainError, ItemId, KitNumber, Owner, format_date, parse_date};

use crate::item::{HistoryEntry, Item, ItemSnapshot, ItemStatus, ItemType};

/// Number of fields in a complete record.
pub const FIELD_COUNT: usize = 8;

const HISTORY_SEPARATOR: char = '|';

/// A record that has enough fields but cannot be turned into an item.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("field `{field}`: {reason}")]
pub struct DecodeError {
    pub field: &'static str,
    pub reason: String,
}

impl DecodeError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    fn domain(field: &'static str) -> impl FnOnce(DomainError) -> Self {
        move |e| Self::new(field, e.to_string())
    }
}

pub fn encode_record(item: &Item) -> [String; FIELD_COUNT] {
    [
        item.id().to_string(),
        item.kit_number().to_string(),
        item.item_type().ordinal().to_string(),
        item.status().ordinal().to_string(),
        format_date(item.last_updated()),
        item.curr_owner().unwrap_or_default().to_string(),
        encode_history(item.ownership_history()),
        item.notes().to_string(),
    ]
}

/// Decode the first [`FIELD_COUNT`] fields of `record`; extra fields are ignored.
pub fn decode_record(record: &csv::StringRecord) -> Result<Item, DecodeError> {
    if record.len() < FIELD_COUNT {
        return Err(DecodeError::new(
            "record",
            format!("expected {FIELD_COUNT} fields, found {}", record.len()),
        ));
    }
    let field = |idx: usize| record.get(idx).unwrap_or_default();

    let snapshot = ItemSnapshot {
        id: ItemId::parse(field(0)).map_err(DecodeError::domain("id"))?,
        kit_number: KitNumber::parse(field(1)).map_err(DecodeError::domain("kit_number"))?,
        item_type: parse_ordinal(field(2), "type")
            .and_then(|v| ItemType::try_from(v).map_err(DecodeError::domain("type")))?,
        status: parse_ordinal(field(3), "status")
            .and_then(|v| ItemStatus::try_from(v).map_err(DecodeError::domain("status")))?,
        last_updated: parse_date(field(4)).map_err(DecodeError::domain("last_updated"))?,
        curr_owner: decode_owner(field(5), "curr_owner")?,
        ownership_history: decode_history(field(6))?,
        notes: field(7).to_string(),
    };

    Item::from_snapshot(snapshot).map_err(DecodeError::domain("record"))
}

fn parse_ordinal(raw: &str, field: &'static str) -> Result<u8, DecodeError> {
    raw.trim()
        .parse()
        .map_err(|e| DecodeError::new(field, format!("{raw:?} is not an ordinal: {e}")))
}

// Older files spell a missing owner as the literal `None`. Anything else must be a
// valid owner exactly as written.
fn decode_owner(raw: &str, field: &'static str) -> Result<Option<Owner>, DecodeError> {
    match raw {
        "" | ABSENT_OWNER => Ok(None),
        name => {
            let owner = Owner::parse(name).map_err(DecodeError::domain(field))?;
            if owner.as_str() != name {
                return Err(DecodeError::new(
                    field,
                    format!("owner {name:?} has surrounding whitespace"),
                ));
            }
            Ok(Some(owner))
        }
    }
}

fn encode_history(history: &[HistoryEntry]) -> String {
    let mut out = String::new();
    for (idx, entry) in history.iter().enumerate() {
        if idx > 0 {
            out.push(HISTORY_SEPARATOR);
        }
        if entry.is_unknown() {
            out.push_str(ABSENT_OWNER);
            continue;
        }
        out.push_str(entry.owner().unwrap_or(ABSENT_OWNER));
        out.push(':');
        if let Some(date) = entry.date() {
            out.push_str(&format_date(date));
        }
    }
    out
}

fn decode_history(raw: &str) -> Result<Vec<HistoryEntry>, DecodeError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(HISTORY_SEPARATOR)
        .map(|token| {
            if token == ABSENT_OWNER {
                return Ok(HistoryEntry::unknown());
            }
            // Dates never contain ':', so split on the last one.
            let (owner, date) = token.rsplit_once(':').ok_or_else(|| {
                DecodeError::new("history", format!("entry {token:?} is not owner:date"))
            })?;
            let date = match date.trim() {
                "" => None,
                d => Some(parse_date(d).map_err(DecodeError::domain("history"))?),
            };
            Ok(HistoryEntry::new(decode_owner(owner, "history")?, date))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, n).unwrap()
    }

    fn owner(name: &str) -> Owner {
        Owner::parse(name).unwrap()
    }

    fn record(fields: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(fields.to_vec())
    }

    fn decode_err(fields: &[&str]) -> DecodeError {
        decode_record(&record(fields)).unwrap_err()
    }

    #[test]
    fn encodes_fields_in_order() {
        let mut item = Item::new(
            ItemId::parse("H001").unwrap(),
            KitNumber::parse("101").unwrap(),
            ItemType::Helmet,
            day(1),
        )
        .with_notes("spare");
        item.borrow(owner("Alice"), day(2));
        item.change_owner(owner("Bob"), day(3));

        assert_eq!(
            encode_record(&item),
            ["H001", "101", "0", "1", "03-02-2024", "Bob", "Alice:02-02-2024", "spare"]
        );
    }

    #[test]
    fn encodes_absent_owner_entries() {
        let history = [
            HistoryEntry::closed(owner("Alice"), day(2)),
            HistoryEntry::unknown(),
            HistoryEntry::new(None, Some(day(4))),
        ];
        assert_eq!(encode_history(&history), "Alice:02-02-2024|None|None:04-02-2024");
        assert_eq!(decode_history(&encode_history(&history)).unwrap(), history);
    }

    #[test]
    fn decodes_legacy_record() {
        let item = decode_record(&record(&[
            "LG003", "203", "1", "3", "01-05-2024", "None", "Carol:12-04-2024|None", "test",
        ]))
        .unwrap();

        assert_eq!(item.id().as_str(), "LG003");
        assert_eq!(item.item_type(), ItemType::LeftGlove);
        assert_eq!(item.status(), ItemStatus::Lost);
        assert_eq!(item.curr_owner(), None);
        assert_eq!(item.ownership_history().len(), 2);
        assert_eq!(item.ownership_history()[0].owner(), Some("Carol"));
        assert!(item.ownership_history()[1].is_unknown());
    }

    #[test]
    fn owner_may_contain_colon() {
        let history = decode_history("Team: Red:02-02-2024").unwrap();
        assert_eq!(history, [HistoryEntry::closed(owner("Team: Red"), day(2))]);
    }

    #[test]
    fn rejects_out_of_range_ordinals() {
        let err = decode_err(&["H1", "1", "5", "0", "01-01-2024", "", "", ""]);
        assert_eq!(err.field, "type");

        let err = decode_err(&["H1", "1", "0", "x", "01-01-2024", "", "", ""]);
        assert_eq!(err.field, "status");
    }

    #[test]
    fn rejects_owner_status_mismatch() {
        let err = decode_err(&["H1", "1", "0", "1", "01-01-2024", "", "", ""]);
        assert_eq!(err.field, "record");

        // `None` means "no owner", so a borrowed item cannot be held by it.
        let err = decode_err(&["H1", "1", "0", "1", "01-01-2024", "None", "", ""]);
        assert_eq!(err.field, "record");
    }

    #[test]
    fn owners_are_read_exactly_as_written() {
        let err = decode_err(&["H1", "1", "0", "1", "01-01-2024", " Alice", "", ""]);
        assert_eq!(err.field, "curr_owner");

        let err = decode_err(&["H1", "1", "0", "0", "01-01-2024", "", "Bob :02-01-2024", ""]);
        assert_eq!(err.field, "history");
    }

    #[test]
    fn rejects_malformed_history_entry() {
        let err = decode_err(&["H1", "1", "0", "0", "01-01-2024", "", "Alice", ""]);
        assert_eq!(err.field, "history");
    }
}
