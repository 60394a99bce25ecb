//! Allocation domain service.

use stockflow_core::{DomainError, DomainResult, Reference};

use crate::batch::Batch;
use crate::order_line::OrderLine;

/// Allocate `line` to the preferred batch among `batches` and return its reference.
///
/// Candidates are visited in [`Batch::allocation_order`] (in-stock first, then
/// earliest ETA); ties keep their slice order. The first batch that
/// `can_allocate` the line receives it and no other batch is touched.
///
/// The slice itself is not reordered. Callers that persist batches afterwards
/// can locate the chosen one by the returned reference.
///
/// Returns [`DomainError::OutOfStock`] when no candidate fits, in which case
/// nothing is mutated.
pub fn allocate(line: &OrderLine, batches: &mut [Batch]) -> DomainResult<Reference> {
    let mut order: Vec<usize> = (0..batches.len()).collect();
    order.sort_by(|&a, &b| Batch::allocation_order(&batches[a], &batches[b]));

    let Some(idx) = order.into_iter().find(|&i| batches[i].can_allocate(line)) else {
        tracing::warn!(
            order_id = %line.order_id,
            sku = %line.sku,
            qty = %line.qty,
            candidates = batches.len(),
            "no batch can satisfy order line"
        );
        return Err(DomainError::out_of_stock(line.sku.clone()));
    };

    let batch = &mut batches[idx];
    batch.allocate(line);

    tracing::debug!(
        order_id = %line.order_id,
        sku = %line.sku,
        qty = %line.qty,
        batch = %batch.reference(),
        "order line allocated"
    );

    Ok(batch.reference().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate, Utc};
    use stockflow_core::Quantity;

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn tomorrow() -> Option<NaiveDate> {
        today().checked_add_days(Days::new(1))
    }

    fn later() -> Option<NaiveDate> {
        today().checked_add_days(Days::new(10))
    }

    #[test]
    fn returns_allocated_batch_ref() {
        let mut batches = vec![
            Batch::new("in-stock-batch-ref", "HIGHBROW-POSTER", Quantity::new(100), None),
            Batch::new("shipment-batch-ref", "HIGHBROW-POSTER", Quantity::new(100), tomorrow()),
        ];
        let line = OrderLine::new("oref", "HIGHBROW-POSTER", Quantity::new(10));

        let allocated = allocate(&line, &mut batches).unwrap();

        assert_eq!(allocated, Reference::new("in-stock-batch-ref"));
    }

    #[test]
    fn prefers_current_stock_batches_to_shipments() {
        let mut batches = vec![
            Batch::new("shipment-batch", "RETRO-CLOCK", Quantity::new(100), tomorrow()),
            Batch::new("in-stock-batch", "RETRO-CLOCK", Quantity::new(100), None),
        ];
        let line = OrderLine::new("oref", "RETRO-CLOCK", Quantity::new(10));

        allocate(&line, &mut batches).unwrap();

        assert_eq!(batches[0].available_quantity(), Quantity::new(100));
        assert_eq!(batches[1].available_quantity(), Quantity::new(90));
    }

    #[test]
    fn prefers_earlier_batches() {
        let mut batches = vec![
            Batch::new("normal-batch", "MINIMALIST-SPOON", Quantity::new(100), tomorrow()),
            Batch::new("speedy-batch", "MINIMALIST-SPOON", Quantity::new(100), Some(today())),
            Batch::new("slow-batch", "MINIMALIST-SPOON", Quantity::new(100), later()),
        ];
        let line = OrderLine::new("order1", "MINIMALIST-SPOON", Quantity::new(10));

        let allocated = allocate(&line, &mut batches).unwrap();

        assert_eq!(allocated, Reference::new("speedy-batch"));
        assert_eq!(batches[0].available_quantity(), Quantity::new(100));
        assert_eq!(batches[1].available_quantity(), Quantity::new(90));
        assert_eq!(batches[2].available_quantity(), Quantity::new(100));
    }

    #[test]
    fn skips_preferred_batches_that_are_too_small_or_wrong_sku() {
        let mut batches = vec![
            Batch::new("other-sku", "BIG-SOFA", Quantity::new(100), None),
            Batch::new("too-small", "FLUFFY-RUG", Quantity::new(5), None),
            Batch::new("fits", "FLUFFY-RUG", Quantity::new(50), tomorrow()),
        ];
        let line = OrderLine::new("order1", "FLUFFY-RUG", Quantity::new(10));

        let allocated = allocate(&line, &mut batches).unwrap();

        assert_eq!(allocated, Reference::new("fits"));
        assert_eq!(batches[0].allocations().count(), 0);
        assert_eq!(batches[1].allocations().count(), 0);
    }

    #[test]
    fn ties_are_broken_by_input_order() {
        let mut batches = vec![
            Batch::new("first", "TWIN-LAMP", Quantity::new(100), tomorrow()),
            Batch::new("second", "TWIN-LAMP", Quantity::new(100), tomorrow()),
        ];
        let line = OrderLine::new("order1", "TWIN-LAMP", Quantity::new(10));

        let allocated = allocate(&line, &mut batches).unwrap();

        assert_eq!(allocated, Reference::new("first"));
        assert_eq!(batches[1].available_quantity(), Quantity::new(100));
    }

    #[test]
    fn raises_out_of_stock_if_cannot_allocate() {
        let mut batches = vec![Batch::new("batch1", "SMALL-FORK", Quantity::new(10), Some(today()))];

        allocate(&OrderLine::new("order1", "SMALL-FORK", Quantity::new(10)), &mut batches).unwrap();

        let err = allocate(&OrderLine::new("order2", "SMALL-FORK", Quantity::new(1)), &mut batches)
            .unwrap_err();
        match err {
            DomainError::OutOfStock(sku) => assert_eq!(sku.as_str(), "SMALL-FORK"),
        }
        assert_eq!(batches[0].available_quantity(), Quantity::ZERO);
        assert_eq!(batches[0].allocations().count(), 1);
    }

    #[test]
    fn no_candidates_is_out_of_stock() {
        let line = OrderLine::new("order1", "GHOST-SKU", Quantity::new(1));
        let mut none: Vec<Batch> = Vec::new();
        let err = allocate(&line, &mut none).unwrap_err();
        assert!(err.to_string().contains("GHOST-SKU"));
    }
}
