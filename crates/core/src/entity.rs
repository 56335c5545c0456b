//! Entity trait: identity that survives every state change.

/// Something tracked by identity rather than by value.
///
/// An item keeps its id through borrows, returns and losses; two records with the same
/// id describe the same item even when every other field differs.
pub trait Entity {
    /// Label-style identifier, addressable by its string form.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + AsRef<str>;

    fn id(&self) -> &Self::Id;

    /// The id as it appears in URLs and storage records.
    fn key(&self) -> &str {
        self.id().as_ref()
    }

    fn same_identity_as(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
