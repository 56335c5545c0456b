//! Service layer: the one shared inventory and every read-modify-persist sequence on it.
//!
//! All access goes through a single mutex. A mutation and the `save` that follows it
//! happen under the same guard, and a failed save rolls the mutation back before the
//! guard is released.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use thiserror::Error;

use gearcage_core::{DomainError, DomainResult, ItemId, KitNumber, Owner};
use gearcage_inventory::{
    Inventory, Item, ItemSnapshot, ItemStatus, ItemType, StatsMatrix, StorageError, Transition,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("inventory lock poisoned")]
    LockPoisoned,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// A requested state change on one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemAction {
    Borrow { owner: Owner },
    Return,
    Lose,
    Find,
    ChangeOwner { owner: Owner },
}

impl ItemAction {
    pub fn transition(&self) -> Transition {
        match self {
            ItemAction::Borrow { .. } => Transition::Borrow,
            ItemAction::Return => Transition::Return,
            ItemAction::Lose => Transition::Lose,
            ItemAction::Find => Transition::Find,
            ItemAction::ChangeOwner { .. } => Transition::ChangeOwner,
        }
    }

    fn rejection(&self) -> &'static str {
        match self {
            ItemAction::Borrow { .. } => "item is not available for borrowing",
            ItemAction::Return => "item is not borrowed",
            ItemAction::Lose => "only borrowed items can be marked as lost",
            ItemAction::Find => "only lost or unknown items can be marked as found",
            ItemAction::ChangeOwner { .. } => "item is not currently borrowed",
        }
    }

    fn apply_to(self, item: &mut Item, on: NaiveDate) -> bool {
        match self {
            ItemAction::Borrow { owner } => item.borrow(owner, on),
            ItemAction::Return => item.return_item(on),
            ItemAction::Lose => item.lose(on),
            ItemAction::Find => item.find(on),
            ItemAction::ChangeOwner { owner } => item.change_owner(owner, on),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortKey {
    KitNumber,
    Status,
}

/// Listing options. Filters combine with AND.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub kit_number: Option<String>,
    pub owner: Option<String>,
    pub borrowed_only: bool,
    pub sort: Option<SortKey>,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub id: ItemId,
    pub kit_number: KitNumber,
    pub item_type: ItemType,
    pub notes: String,
}

/// Shared application services (held behind `Arc` in the router).
#[derive(Debug)]
pub struct GearService {
    inventory: Mutex<Inventory>,
}

impl GearService {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inventory: Mutex::new(inventory),
        }
    }

    /// Bind to `path`, loading it if it exists. A missing file means an empty inventory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let mut inventory = Inventory::new(path);
        if path.exists() {
            inventory.load()?;
        } else {
            tracing::warn!(path = %path.display(), "inventory file not found; starting empty");
        }
        Ok(Self::new(inventory))
    }

    pub fn list_items(&self, filter: &ItemFilter) -> ServiceResult<Vec<ItemSnapshot>> {
        let mut inventory = self.lock()?;
        match filter.sort {
            Some(SortKey::KitNumber) => inventory.sort_by_kit_number(),
            Some(SortKey::Status) => inventory.sort_by_status(),
            None => {}
        }

        let mut items: Vec<&Item> = match (&filter.kit_number, &filter.owner) {
            (Some(kit), _) => inventory.find_by_kit_number(kit),
            (None, Some(owner)) => inventory.items_by_owner(owner),
            (None, None) if filter.borrowed_only => inventory.borrowed_items(),
            (None, None) => inventory.iter().collect(),
        };
        if let Some(owner) = &filter.owner {
            items.retain(|item| item.curr_owner() == Some(owner.as_str()));
        }
        if filter.borrowed_only {
            items.retain(|item| item.status() == ItemStatus::Borrowed);
        }

        Ok(items.into_iter().map(Item::snapshot).collect())
    }

    pub fn stats(&self) -> ServiceResult<StatsMatrix> {
        Ok(self.lock()?.stats())
    }

    pub fn get_item(&self, id: &str) -> ServiceResult<ItemSnapshot> {
        self.lock()?
            .find_by_id(id)
            .map(Item::snapshot)
            .ok_or_else(|| DomainError::not_found().into())
    }

    pub fn create_item(&self, new: NewItem, today: NaiveDate) -> ServiceResult<ItemSnapshot> {
        let mut inventory = self.lock()?;
        let id = new.id.clone();
        let item = Item::new(new.id, new.kit_number, new.item_type, today).with_notes(new.notes);
        let snapshot = item.snapshot();

        if !inventory.add(item) {
            return Err(DomainError::conflict(format!("item {id} already exists")).into());
        }
        if let Err(e) = inventory.save() {
            inventory.remove(id.as_str());
            tracing::error!(item_id = %id, error = %e, "save failed; item not created");
            return Err(e.into());
        }

        tracing::info!(item_id = %id, "item created");
        Ok(snapshot)
    }

    pub fn delete_item(&self, id: &str) -> ServiceResult<()> {
        let mut inventory = self.lock()?;
        let index = inventory.position(id).ok_or_else(DomainError::not_found)?;
        let removed = inventory.remove(id).ok_or_else(DomainError::not_found)?;

        if let Err(e) = inventory.save() {
            inventory.insert(index, removed);
            tracing::error!(item_id = %id, error = %e, "save failed; item kept");
            return Err(e.into());
        }

        tracing::info!(item_id = %id, "item deleted");
        Ok(())
    }

    /// Check the action's precondition, apply it, persist.
    ///
    /// An action the item's state does not permit is an `InvariantViolation`, not a
    /// silent no-op.
    pub fn apply(
        &self,
        id: &str,
        action: ItemAction,
        today: NaiveDate,
    ) -> ServiceResult<ItemSnapshot> {
        let transition = action.transition();
        self.mutate_item(id, |item| {
            if !item.permits(transition) {
                return Err(DomainError::invariant(action.rejection()));
            }
            action.apply_to(item, today);
            Ok(())
        })
    }

    pub fn update_notes(&self, id: &str, notes: String) -> ServiceResult<ItemSnapshot> {
        self.mutate_item(id, |item| {
            item.set_notes(notes);
            Ok(())
        })
    }

    pub fn mark_checked(&self, today: NaiveDate) -> ServiceResult<NaiveDate> {
        let mut inventory = self.lock()?;
        inventory.mark_checked(today);
        tracing::info!(date = %today, "gear cage checked");
        Ok(today)
    }

    pub fn last_checked(&self) -> ServiceResult<Option<NaiveDate>> {
        Ok(self.lock()?.last_checked())
    }

    fn lock(&self) -> ServiceResult<MutexGuard<'_, Inventory>> {
        self.inventory.lock().map_err(|_| ServiceError::LockPoisoned)
    }

    fn mutate_item<F>(&self, id: &str, f: F) -> ServiceResult<ItemSnapshot>
    where
        F: FnOnce(&mut Item) -> DomainResult<()>,
    {
        let mut inventory = self.lock()?;
        let item = inventory.find_by_id_mut(id).ok_or_else(DomainError::not_found)?;
        let before = item.clone();
        f(&mut *item)?;
        let after = item.snapshot();

        if let Err(e) = inventory.save() {
            if let Some(item) = inventory.find_by_id_mut(id) {
                *item = before;
            }
            tracing::error!(item_id = %id, error = %e, "save failed; change rolled back");
            return Err(e.into());
        }

        tracing::info!(item_id = %id, status = %after.status, "item updated");
        Ok(after)
    }
}
