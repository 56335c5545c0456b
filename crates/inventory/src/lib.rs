//! Gear inventory domain: items, their loan state machine, and the inventory file.
//!
//! Transitions are pure in-memory mutations. Persistence is an explicit
//! whole-collection rewrite (`Inventory::save`), so callers decide when state hits disk.

pub mod codec;
pub mod inventory;
pub mod item;
pub mod storage;

pub use codec::DecodeError;
pub use inventory::{Inventory, StatsMatrix};
pub use item::{HistoryEntry, Item, ItemSnapshot, ItemStatus, ItemType, Transition};
pub use storage::StorageError;
