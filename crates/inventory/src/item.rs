use chrono::NaiveDate;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};

use gearcage_core::{DomainError, DomainResult, Entity, ItemId, KitNumber, Owner, ValueObject};

/// Kind of protective gear.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ItemType {
    Helmet,
    LeftGlove,
    RightGlove,
    LeftArmGuard,
    RightArmGuard,
}

impl ItemType {
    pub const ALL: [ItemType; 5] = [
        ItemType::Helmet,
        ItemType::LeftGlove,
        ItemType::RightGlove,
        ItemType::LeftArmGuard,
        ItemType::RightArmGuard,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemType::Helmet => "Helmet",
            ItemType::LeftGlove => "Left Glove",
            ItemType::RightGlove => "Right Glove",
            ItemType::LeftArmGuard => "Left Arm Guard",
            ItemType::RightArmGuard => "Right Arm Guard",
        }
    }
}

impl TryFrom<u8> for ItemType {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| DomainError::validation(format!("item type out of range: {value}")))
    }
}

impl From<ItemType> for u8 {
    fn from(value: ItemType) -> Self {
        value.ordinal()
    }
}

impl core::fmt::Display for ItemType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle state of an item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ItemStatus {
    Returned,
    Borrowed,
    /// Only ever comes from stored data; no transition produces it.
    Unknown,
    Lost,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 4] = [
        ItemStatus::Returned,
        ItemStatus::Borrowed,
        ItemStatus::Unknown,
        ItemStatus::Lost,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemStatus::Returned => "Returned",
            ItemStatus::Borrowed => "Borrowed",
            ItemStatus::Unknown => "Unknown",
            ItemStatus::Lost => "Lost",
        }
    }
}

impl TryFrom<u8> for ItemStatus {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| DomainError::validation(format!("item status out of range: {value}")))
    }
}

impl From<ItemStatus> for u8 {
    fn from(value: ItemStatus) -> Self {
        value.ordinal()
    }
}

impl core::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// A closed custody interval: who held the item and the date recorded when it closed.
///
/// Entries written by transitions always carry both fields. Entries with no owner (and
/// possibly no date) only come from stored data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "Option<(Option<String>, Option<String>)>")]
pub struct HistoryEntry {
    owner: Option<Owner>,
    date: Option<NaiveDate>,
}

impl ValueObject for HistoryEntry {}

impl HistoryEntry {
    pub fn new(owner: Option<Owner>, date: Option<NaiveDate>) -> Self {
        Self { owner, date }
    }

    pub fn closed(owner: Owner, date: NaiveDate) -> Self {
        Self::new(Some(owner), Some(date))
    }

    /// Entry with neither owner nor date.
    pub fn unknown() -> Self {
        Self::new(None, None)
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_ref().map(Owner::as_str)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn is_unknown(&self) -> bool {
        self.owner.is_none() && self.date.is_none()
    }
}

/// JSON form: `[owner|null, "dd-mm-YYYY"|null]`, or `null` when nothing is known.
impl Serialize for HistoryEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_unknown() {
            return serializer.serialize_none();
        }
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.owner)?;
        tuple.serialize_element(&self.date.map(gearcage_core::format_date))?;
        tuple.end()
    }
}

impl TryFrom<Option<(Option<String>, Option<String>)>> for HistoryEntry {
    type Error = DomainError;

    fn try_from(value: Option<(Option<String>, Option<String>)>) -> Result<Self, Self::Error> {
        let Some((owner, date)) = value else {
            return Ok(Self::unknown());
        };
        let owner = owner.map(Owner::parse).transpose()?;
        let date = date.as_deref().map(gearcage_core::parse_date).transpose()?;
        Ok(Self::new(owner, date))
    }
}

/// Named state transitions and their preconditions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transition {
    Borrow,
    Return,
    Lose,
    Find,
    ChangeOwner,
}

impl Transition {
    /// Whether an item in `status` accepts this transition.
    pub fn permits(self, status: ItemStatus) -> bool {
        match self {
            Transition::Borrow => status == ItemStatus::Returned,
            Transition::Return | Transition::Lose | Transition::ChangeOwner => {
                status == ItemStatus::Borrowed
            }
            Transition::Find => matches!(status, ItemStatus::Unknown | ItemStatus::Lost),
        }
    }
}

/// Every field of an item as plain data.
///
/// This is the JSON wire representation and the input for rebuilding an item from
/// storage ([`Item::from_snapshot`] validates it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub id: ItemId,
    pub kit_number: KitNumber,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub status: ItemStatus,
    pub curr_owner: Option<Owner>,
    #[serde(with = "gearcage_core::date::serde_dmy")]
    pub last_updated: NaiveDate,
    pub notes: String,
    pub ownership_history: Vec<HistoryEntry>,
}

/// A single loanable piece of gear.
///
/// Equality is identity: two items are equal iff their ids are equal. Compare
/// [`Item::snapshot`]s for field-by-field equality.
#[derive(Debug, Clone)]
pub struct Item {
    id: ItemId,
    kit_number: KitNumber,
    item_type: ItemType,
    status: ItemStatus,
    curr_owner: Option<Owner>,
    last_updated: NaiveDate,
    ownership_history: Vec<HistoryEntry>,
    notes: String,
}

impl Item {
    /// A fresh item in the `Returned` state with empty history and notes.
    pub fn new(id: ItemId, kit_number: KitNumber, item_type: ItemType, today: NaiveDate) -> Self {
        Self {
            id,
            kit_number,
            item_type,
            status: ItemStatus::Returned,
            curr_owner: None,
            last_updated: today,
            ownership_history: Vec::new(),
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Rebuild an item from plain data, enforcing the owner/status invariant.
    pub fn from_snapshot(snapshot: ItemSnapshot) -> DomainResult<Self> {
        let borrowed = snapshot.status == ItemStatus::Borrowed;
        match (&snapshot.curr_owner, borrowed) {
            (None, true) => {
                return Err(DomainError::invariant(format!(
                    "item {} is borrowed but has no current owner",
                    snapshot.id
                )));
            }
            (Some(owner), false) => {
                return Err(DomainError::invariant(format!(
                    "item {} is {} but has current owner {owner}",
                    snapshot.id, snapshot.status
                )));
            }
            _ => {}
        }

        Ok(Self {
            id: snapshot.id,
            kit_number: snapshot.kit_number,
            item_type: snapshot.item_type,
            status: snapshot.status,
            curr_owner: snapshot.curr_owner,
            last_updated: snapshot.last_updated,
            ownership_history: snapshot.ownership_history,
            notes: snapshot.notes,
        })
    }

    pub fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            id: self.id.clone(),
            kit_number: self.kit_number.clone(),
            item_type: self.item_type,
            status: self.status,
            curr_owner: self.curr_owner.clone(),
            last_updated: self.last_updated,
            notes: self.notes.clone(),
            ownership_history: self.ownership_history.clone(),
        }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn kit_number(&self) -> &KitNumber {
        &self.kit_number
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn curr_owner(&self) -> Option<&str> {
        self.curr_owner.as_ref().map(Owner::as_str)
    }

    pub fn last_updated(&self) -> NaiveDate {
        self.last_updated
    }

    pub fn ownership_history(&self) -> &[HistoryEntry] {
        &self.ownership_history
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn permits(&self, transition: Transition) -> bool {
        transition.permits(self.status)
    }

    /// Lend a returned item. Returns `false` (and changes nothing) otherwise.
    pub fn borrow(&mut self, owner: Owner, on: NaiveDate) -> bool {
        if !self.permits(Transition::Borrow) {
            return false;
        }
        self.curr_owner = Some(owner);
        self.last_updated = on;
        self.status = ItemStatus::Borrowed;
        true
    }

    /// Take a borrowed item back.
    pub fn return_item(&mut self, on: NaiveDate) -> bool {
        if !self.permits(Transition::Return) {
            return false;
        }
        self.close_custody();
        self.curr_owner = None;
        self.last_updated = on;
        self.status = ItemStatus::Returned;
        true
    }

    /// Mark a borrowed item as lost by its holder.
    pub fn lose(&mut self, on: NaiveDate) -> bool {
        if !self.permits(Transition::Lose) {
            return false;
        }
        self.close_custody();
        self.curr_owner = None;
        self.last_updated = on;
        self.status = ItemStatus::Lost;
        true
    }

    /// Recover a lost or unknown item. History is left as is.
    pub fn find(&mut self, on: NaiveDate) -> bool {
        if !self.permits(Transition::Find) {
            return false;
        }
        self.last_updated = on;
        self.status = ItemStatus::Returned;
        true
    }

    /// Hand a borrowed item straight to someone else.
    pub fn change_owner(&mut self, owner: Owner, on: NaiveDate) -> bool {
        if !self.permits(Transition::ChangeOwner) {
            return false;
        }
        self.close_custody();
        self.curr_owner = Some(owner);
        self.last_updated = on;
        true
    }

    // Snapshot of the departing holder; must run before curr_owner is touched.
    fn close_custody(&mut self) {
        self.ownership_history
            .push(HistoryEntry::new(self.curr_owner.clone(), Some(self.last_updated)));
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity_as(other)
    }
}

impl Eq for Item {}

impl core::hash::Hash for Item {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl core::fmt::Display for Item {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Kit {} {}, Status: ", self.kit_number, self.item_type)?;
        if self.status == ItemStatus::Borrowed {
            let owner = self.curr_owner().unwrap_or("Unknown");
            return write!(f, "Borrowed, Owner: {owner}");
        }
        match self.ownership_history.last() {
            None => write!(f, "{}", self.status),
            Some(last) => {
                let owner = last.owner().unwrap_or(gearcage_core::ABSENT_OWNER);
                write!(f, "{}, Last owner: {owner}", self.status)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, n).unwrap()
    }

    fn helmet() -> Item {
        Item::new(
            ItemId::parse("H001").unwrap(),
            KitNumber::parse("101").unwrap(),
            ItemType::Helmet,
            day(1),
        )
    }

    fn owner(name: &str) -> Owner {
        Owner::parse(name).unwrap()
    }

    fn with_status(status: ItemStatus) -> Item {
        let mut snapshot = helmet().snapshot();
        snapshot.status = status;
        Item::from_snapshot(snapshot).unwrap()
    }

    #[test]
    fn borrow_change_owner_return_records_each_holder() {
        let mut item = helmet();

        assert!(item.borrow(owner("Alice"), day(2)));
        assert_eq!(item.status(), ItemStatus::Borrowed);
        assert_eq!(item.curr_owner(), Some("Alice"));

        assert!(item.change_owner(owner("Bob"), day(3)));
        assert_eq!(item.status(), ItemStatus::Borrowed);
        assert_eq!(item.curr_owner(), Some("Bob"));
        assert_eq!(item.ownership_history(), &[HistoryEntry::closed(owner("Alice"), day(2))]);

        assert!(item.return_item(day(4)));
        assert_eq!(item.status(), ItemStatus::Returned);
        assert_eq!(item.curr_owner(), None);
        assert_eq!(
            item.ownership_history(),
            &[
                HistoryEntry::closed(owner("Alice"), day(2)),
                HistoryEntry::closed(owner("Bob"), day(3)),
            ]
        );
        assert_eq!(item.last_updated(), day(4));
    }

    #[test]
    fn same_day_borrow_and_return_appends_one_entry() {
        let mut item = helmet();
        item.borrow(owner("Dana"), day(9));
        item.return_item(day(9));

        assert_eq!(item.status(), ItemStatus::Returned);
        assert_eq!(item.curr_owner(), None);
        assert_eq!(item.ownership_history(), &[HistoryEntry::closed(owner("Dana"), day(9))]);
    }

    #[test]
    fn lose_then_find_keeps_last_holder_in_history() {
        let mut item = helmet();
        item.borrow(owner("Carol"), day(2));

        assert!(item.lose(day(5)));
        assert_eq!(item.status(), ItemStatus::Lost);
        assert_eq!(item.curr_owner(), None);
        assert_eq!(item.ownership_history().len(), 1);
        assert_eq!(item.ownership_history()[0].owner(), Some("Carol"));

        assert!(item.find(day(8)));
        assert_eq!(item.status(), ItemStatus::Returned);
        assert_eq!(item.curr_owner(), None);
        assert_eq!(item.ownership_history().len(), 1);
        assert_eq!(item.last_updated(), day(8));
    }

    #[test]
    fn lose_on_returned_item_is_noop() {
        let mut item = helmet();
        let before = item.snapshot();
        assert!(!item.lose(day(3)));
        assert_eq!(item.snapshot(), before);
    }

    #[test]
    fn find_on_returned_item_is_noop() {
        let mut item = helmet();
        let before = item.snapshot();
        assert!(!item.find(day(3)));
        assert_eq!(item.snapshot(), before);
    }

    #[test]
    fn rejected_transitions_leave_state_untouched() {
        let mut item = helmet();
        assert!(!item.return_item(day(2)));
        assert!(!item.change_owner(owner("Zed"), day(2)));

        item.borrow(owner("Alice"), day(2));
        let before = item.snapshot();
        assert!(!item.borrow(owner("Bob"), day(3)));
        assert!(!item.find(day(3)));
        assert_eq!(item.snapshot(), before);
    }

    #[test]
    fn unknown_item_can_only_be_found() {
        let mut item = with_status(ItemStatus::Unknown);
        assert!(!item.borrow(owner("Alice"), day(2)));
        assert!(!item.lose(day(2)));
        assert!(item.find(day(2)));
        assert_eq!(item.status(), ItemStatus::Returned);
        assert!(item.ownership_history().is_empty());
    }

    #[test]
    fn from_snapshot_enforces_owner_invariant() {
        let mut snapshot = helmet().snapshot();
        snapshot.status = ItemStatus::Borrowed;
        let err = Item::from_snapshot(snapshot.clone()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        snapshot.status = ItemStatus::Lost;
        snapshot.curr_owner = Some(owner("Eve"));
        let err = Item::from_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn items_are_equal_by_id_only() {
        let a = helmet();
        let mut b = helmet().with_notes("different");
        b.borrow(owner("Alice"), day(2));
        assert_eq!(a, b);

        let c = Item::new(
            ItemId::parse("H002").unwrap(),
            KitNumber::parse("101").unwrap(),
            ItemType::Helmet,
            day(1),
        );
        assert_ne!(a, c);
    }

    #[test]
    fn display_reflects_status_and_last_owner() {
        let mut item = helmet();
        assert_eq!(item.to_string(), "Kit 101 Helmet, Status: Returned");

        item.borrow(owner("Alice"), day(2));
        assert_eq!(item.to_string(), "Kit 101 Helmet, Status: Borrowed, Owner: Alice");

        item.lose(day(3));
        assert_eq!(item.to_string(), "Kit 101 Helmet, Status: Lost, Last owner: Alice");

        let mut snapshot = helmet().snapshot();
        snapshot.ownership_history = vec![HistoryEntry::unknown()];
        let item = Item::from_snapshot(snapshot).unwrap();
        assert_eq!(item.to_string(), "Kit 101 Helmet, Status: Returned, Last owner: None");
    }

    #[test]
    fn enums_reject_out_of_range_ordinals() {
        assert_eq!(ItemType::try_from(4).unwrap(), ItemType::RightArmGuard);
        assert!(ItemType::try_from(5).is_err());
        assert_eq!(ItemStatus::try_from(3).unwrap(), ItemStatus::Lost);
        assert!(ItemStatus::try_from(4).is_err());
    }

    #[test]
    fn snapshot_json_uses_ordinals_and_pairs() {
        let mut item = helmet();
        item.borrow(owner("Alice"), day(2));
        item.return_item(day(3));
        let mut snapshot = item.snapshot();
        snapshot.ownership_history.push(HistoryEntry::unknown());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["type"], 0);
        assert_eq!(json["status"], 0);
        assert_eq!(json["curr_owner"], serde_json::Value::Null);
        assert_eq!(json["last_updated"], "03-05-2024");
        assert_eq!(json["ownership_history"][0], serde_json::json!(["Alice", "02-05-2024"]));
        assert_eq!(json["ownership_history"][1], serde_json::Value::Null);
    }

    #[test]
    fn history_json_rejects_reserved_owner() {
        let entry: HistoryEntry = serde_json::from_str(r#"[" Alice ", "02-05-2024"]"#).unwrap();
        assert_eq!(entry, HistoryEntry::closed(owner("Alice"), day(2)));

        assert!(serde_json::from_str::<HistoryEntry>(r#"["None", "02-05-2024"]"#).is_err());
        assert!(serde_json::from_str::<HistoryEntry>(r#"["", null]"#).is_err());
    }

    #[derive(Debug, Clone)]
    enum Step {
        Borrow(Owner),
        Return,
        Lose,
        Find,
        ChangeOwner(Owner),
    }

    fn owner_name() -> impl Strategy<Value = Owner> {
        "[A-Za-z]{1,8}".prop_filter_map("reserved owner", |s| Owner::parse(s).ok())
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            owner_name().prop_map(Step::Borrow),
            Just(Step::Return),
            Just(Step::Lose),
            Just(Step::Find),
            owner_name().prop_map(Step::ChangeOwner),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: after any sequence of transitions, an owner is present exactly
        /// when the item is borrowed, and history only ever grows.
        #[test]
        fn owner_present_iff_borrowed(steps in prop::collection::vec(step(), 0..40)) {
            let mut item = helmet();
            let mut history_len = 0;

            for (i, s) in steps.into_iter().enumerate() {
                let on = day(1 + (i as u32 % 28));
                match s {
                    Step::Borrow(o) => { item.borrow(o, on); }
                    Step::Return => { item.return_item(on); }
                    Step::Lose => { item.lose(on); }
                    Step::Find => { item.find(on); }
                    Step::ChangeOwner(o) => { item.change_owner(o, on); }
                }

                prop_assert_eq!(item.curr_owner().is_some(), item.status() == ItemStatus::Borrowed);
                prop_assert!(item.ownership_history().len() >= history_len);
                history_len = item.ownership_history().len();
            }
        }
    }
}
