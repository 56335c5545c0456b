use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use gearcage_core::{Entity, KitNumber};

use crate::item::{Item, ItemStatus, ItemType};

/// Counts of items per (type, status), indexed `[type][status]` by ordinal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatsMatrix([[usize; 4]; 5]);

impl StatsMatrix {
    pub fn get(&self, item_type: ItemType, status: ItemStatus) -> usize {
        self.0[usize::from(item_type.ordinal())][usize::from(status.ordinal())]
    }

    pub fn rows(&self) -> &[[usize; 4]; 5] {
        &self.0
    }

    pub fn total(&self) -> usize {
        self.0.iter().flatten().sum()
    }

    fn bump(&mut self, item_type: ItemType, status: ItemStatus) {
        self.0[usize::from(item_type.ordinal())][usize::from(status.ordinal())] += 1;
    }
}

/// The club's gear, bound to the file it is persisted in.
///
/// Holds no lock of its own; callers sharing one across threads must serialise every
/// mutate-then-save sequence.
#[derive(Debug, Clone)]
pub struct Inventory {
    pub(crate) path: PathBuf,
    pub(crate) items: Vec<Item>,
    last_checked: Option<NaiveDate>,
}

impl Inventory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            items: Vec::new(),
            last_checked: None,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Insert `item` unless one with the same id is already present.
    pub fn add(&mut self, item: Item) -> bool {
        if self.items.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Insert `item` at `index` (clamped to the end) unless its id is already present.
    pub fn insert(&mut self, index: usize, item: Item) -> bool {
        if self.items.contains(&item) {
            return false;
        }
        self.items.insert(index.min(self.items.len()), item);
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<Item> {
        self.position(id).map(|idx| self.items.remove(idx))
    }

    /// Index of the item in collection (and file) order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.key() == id)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.key() == id)
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.key() == id)
    }

    pub fn find_by_kit_number(&self, kit_number: &str) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.kit_number().as_str() == kit_number)
            .collect()
    }

    pub fn borrowed_items(&self) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.status() == ItemStatus::Borrowed)
            .collect()
    }

    pub fn items_by_owner(&self, owner: &str) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.curr_owner() == Some(owner))
            .collect()
    }

    pub fn stats(&self) -> StatsMatrix {
        let mut stats = StatsMatrix::default();
        for item in &self.items {
            stats.bump(item.item_type(), item.status());
        }
        stats
    }

    /// Stable sort. Numeric kit numbers come first, by value ("2" before "10"); the
    /// rest follow in lexicographic order.
    pub fn sort_by_kit_number(&mut self) {
        self.items
            .sort_by(|a, b| kit_order(a.kit_number()).cmp(&kit_order(b.kit_number())));
    }

    pub fn sort_by_status(&mut self) {
        self.items.sort_by_key(|item| item.status());
    }

    /// Record that the gear cage was physically checked on `on`.
    pub fn mark_checked(&mut self, on: NaiveDate) {
        self.last_checked = Some(on);
    }

    pub fn last_checked(&self) -> Option<NaiveDate> {
        self.last_checked
    }
}

fn kit_order(kit: &KitNumber) -> (bool, u64, &str) {
    match kit.numeric() {
        Some(n) => (false, n, kit.as_str()),
        None => (true, 0, kit.as_str()),
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
