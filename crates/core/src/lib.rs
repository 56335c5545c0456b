//! `gearcage-core` — domain building blocks shared by the gear inventory crates.
//!
//! This crate contains **pure domain** primitives (no IO).

pub mod date;
pub mod entity;
pub mod error;
pub mod id;
pub mod owner;
pub mod value_object;

pub use date::{DATE_FORMAT, format_date, parse_date};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ItemId, KitNumber};
pub use owner::{ABSENT_OWNER, Owner};
pub use value_object::ValueObject;
