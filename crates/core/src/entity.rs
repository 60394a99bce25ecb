//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Implementors should derive equality and hashing from `id()` alone, so two
/// instances carrying the same identifier are treated as the same entity even
/// when their mutable state differs.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
