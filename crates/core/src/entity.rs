//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Entities are compared by identity, never by attribute values: two
/// entities with the same id are the same entity regardless of state.
/// [`same_identity`] is the shared comparison helper; concrete types stay
/// free to derive `PartialEq` for full structural comparison in tests.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Identity-based equality for two entities of the same type.
pub fn same_identity<E: Entity>(a: &E, b: &E) -> bool {
    a.id() == b.id()
}
