use serde::{Deserialize, Serialize};

use stockflow_core::{Quantity, Reference, Sku, ValueObject};

/// A request to ship `qty` units of `sku` for order `order_id`.
///
/// Compared and hashed by all three fields, so the same line allocated twice
/// is recognised as one allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderLine {
    pub order_id: Reference,
    pub sku: Sku,
    pub qty: Quantity,
}

impl OrderLine {
    pub fn new(order_id: impl Into<Reference>, sku: impl Into<Sku>, qty: Quantity) -> Self {
        Self {
            order_id: order_id.into(),
            sku: sku.into(),
            qty,
        }
    }
}

impl ValueObject for OrderLine {}
