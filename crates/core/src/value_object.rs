//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity and are never mutated after construction: an
/// ownership-history entry is one, an item is not. Two value objects with the same
/// attribute values are equal.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Custody { owner: String, until: NaiveDate }
///
/// impl ValueObject for Custody {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
