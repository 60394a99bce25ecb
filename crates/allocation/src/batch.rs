use core::cmp::Ordering;
use core::hash::{Hash, Hasher};
use std::collections::HashSet;

use chrono::NaiveDate;

use stockflow_core::{Entity, Quantity, Reference, Sku};

use crate::order_line::OrderLine;

/// Entity: a delivery of a fixed quantity of one SKU.
///
/// A batch with no `eta` is already in the warehouse. Equality and hashing
/// use `reference` only; the allocation ledger is mutable state, not identity.
#[derive(Debug, Clone)]
pub struct Batch {
    reference: Reference,
    sku: Sku,
    purchased_quantity: Quantity,
    eta: Option<NaiveDate>,
    allocations: HashSet<OrderLine>,
}

impl Batch {
    pub fn new(
        reference: impl Into<Reference>,
        sku: impl Into<Sku>,
        qty: Quantity,
        eta: Option<NaiveDate>,
    ) -> Self {
        Self {
            reference: reference.into(),
            sku: sku.into(),
            purchased_quantity: qty,
            eta,
            allocations: HashSet::new(),
        }
    }

    /// Rebuild a batch from persisted state.
    ///
    /// Lines go straight into the ledger without the `can_allocate` gate; they
    /// were gated when first allocated.
    pub fn restore(
        reference: Reference,
        sku: Sku,
        qty: Quantity,
        eta: Option<NaiveDate>,
        allocations: impl IntoIterator<Item = OrderLine>,
    ) -> Self {
        Self {
            reference,
            sku,
            purchased_quantity: qty,
            eta,
            allocations: allocations.into_iter().collect(),
        }
    }

    pub fn reference(&self) -> &Reference {
        &self.reference
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn eta(&self) -> Option<NaiveDate> {
        self.eta
    }

    pub fn purchased_quantity(&self) -> Quantity {
        self.purchased_quantity
    }

    /// Lines currently allocated to this batch, in no particular order.
    pub fn allocations(&self) -> impl Iterator<Item = &OrderLine> {
        self.allocations.iter()
    }

    pub fn is_allocated(&self, line: &OrderLine) -> bool {
        self.allocations.contains(line)
    }

    /// Sum of quantities over the allocation ledger. Recomputed on each call.
    pub fn allocated_quantity(&self) -> Quantity {
        self.allocations.iter().map(|line| line.qty).sum()
    }

    pub fn available_quantity(&self) -> Quantity {
        self.purchased_quantity - self.allocated_quantity()
    }

    pub fn can_allocate(&self, line: &OrderLine) -> bool {
        self.sku == line.sku && self.available_quantity() >= line.qty
    }

    /// Record `line` against this batch. No-op when `can_allocate` is false.
    pub fn allocate(&mut self, line: &OrderLine) {
        if self.can_allocate(line) {
            self.allocations.insert(line.clone());
        }
    }

    /// Release `line`. No-op when it was never allocated here.
    pub fn deallocate(&mut self, line: &OrderLine) {
        self.allocations.remove(line);
    }

    /// Allocation priority: in-stock batches first, then by earliest ETA.
    ///
    /// Batches with equal ETAs compare `Equal` even when they are different
    /// entities, so this is only a sort key and never a stand-in for `==`.
    pub fn allocation_order(a: &Batch, b: &Batch) -> Ordering {
        match (a.eta, b.eta) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.cmp(&y),
        }
    }
}

impl PartialEq for Batch {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl Eq for Batch {}

impl Hash for Batch {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.reference.hash(state);
    }
}

impl Entity for Batch {
    type Id = Reference;

    fn id(&self) -> &Self::Id {
        &self.reference
    }
}
