use chrono::NaiveDate;
use serde::Deserialize;

use gearcage_core::{ItemId, KitNumber, Owner, format_date};
use gearcage_inventory::ItemType;

use crate::app::services::{ItemFilter, NewItem, SortKey};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `borrow` and `change-owner`.
#[derive(Debug, Deserialize)]
pub struct OwnerRequest {
    pub owner: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NotesRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub id: String,
    pub kit_number: String,
    #[serde(rename = "type")]
    pub item_type: u8,
    #[serde(default)]
    pub notes: String,
}

/// Query string of `GET /api/items`.
#[derive(Debug, Default, Deserialize)]
pub struct ItemQuery {
    pub kit_number: Option<String>,
    pub owner: Option<String>,
    #[serde(default)]
    pub borrowed: bool,
    pub sort: Option<String>,
}

// -------------------------
// Request → domain mapping
// -------------------------

/// The owner named in an optional body, validated. `Err` carries the user-facing message.
pub fn owner_from(body: Option<OwnerRequest>) -> Result<Owner, String> {
    let owner = body
        .and_then(|b| b.owner)
        .ok_or_else(|| "owner is required".to_string())?;
    Owner::parse(owner).map_err(|e| e.to_string())
}

pub fn notes_from(body: Option<NotesRequest>) -> Result<String, String> {
    body.and_then(|b| b.notes)
        .ok_or_else(|| "notes are required".to_string())
}

impl CreateItemRequest {
    pub fn into_new_item(self) -> Result<NewItem, String> {
        Ok(NewItem {
            id: ItemId::parse(&self.id).map_err(|e| e.to_string())?,
            kit_number: KitNumber::parse(&self.kit_number).map_err(|e| e.to_string())?,
            item_type: ItemType::try_from(self.item_type).map_err(|e| e.to_string())?,
            notes: self.notes,
        })
    }
}

impl ItemQuery {
    pub fn into_filter(self) -> Result<ItemFilter, String> {
        let sort = match self.sort.as_deref() {
            None | Some("") => None,
            Some("kit_number") => Some(SortKey::KitNumber),
            Some("status") => Some(SortKey::Status),
            Some(other) => {
                return Err(format!("unknown sort key {other:?} (expected kit_number or status)"));
            }
        };
        Ok(ItemFilter {
            kit_number: self.kit_number,
            owner: self.owner,
            borrowed_only: self.borrowed,
            sort,
        })
    }
}

// -------------------------
// Response mapping
// -------------------------

pub fn cage_check_to_json(last_checked: Option<NaiveDate>) -> serde_json::Value {
    serde_json::json!({
        "last_checked": last_checked.map(format_date),
    })
}
