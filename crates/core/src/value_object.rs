//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two instances with the same attribute
/// values are interchangeable. They are never mutated after construction; a
/// "changed" value is a new instance.
///
/// - **Value Object**: an order line `{ order_id, sku, qty }` (equal when all fields are equal)
/// - **Entity**: a batch (equal when references match, whatever its allocations)
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// struct Pallet {
///     sku: Sku,
///     qty: Quantity,
/// }
///
/// impl ValueObject for Pallet {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
