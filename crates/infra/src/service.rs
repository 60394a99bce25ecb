//! Repository-backed allocation.
//!
//! Load → decide (pure domain) → persist. The domain function picks and
//! mutates one batch; only that batch is written back.

use thiserror::Error;
use tracing::instrument;

use stockflow_allocation::OrderLine;
use stockflow_core::{DomainError, Reference};

use crate::repository::{BatchRepository, RepositoryError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Allocate `line` against every batch known to `repo` and persist the chosen batch.
///
/// Fails with [`DomainError::OutOfStock`] (nothing persisted) when no batch fits.
#[instrument(skip(line, repo), fields(order_id = %line.order_id, sku = %line.sku), err)]
pub async fn allocate_line<R>(line: &OrderLine, repo: &R) -> Result<Reference, ServiceError>
where
    R: BatchRepository + ?Sized,
{
    let mut batches = repo.list().await?;
    let reference = stockflow_allocation::allocate(line, &mut batches)?;

    if let Some(chosen) = batches.into_iter().find(|b| b.reference() == &reference) {
        repo.add(chosen).await?;
    }

    tracing::info!(batch = %reference, "allocation persisted");
    Ok(reference)
}

/// Release `line` from the batch stored under `reference` and persist it.
///
/// Unknown references surface as [`RepositoryError::NotFound`]. Releasing a
/// line that was never allocated to the batch is a no-op write.
#[instrument(skip(line, repo), fields(order_id = %line.order_id, sku = %line.sku), err)]
pub async fn deallocate_line<R>(
    line: &OrderLine,
    reference: &Reference,
    repo: &R,
) -> Result<(), ServiceError>
where
    R: BatchRepository + ?Sized,
{
    let mut batch = repo.get(reference).await?;
    batch.deallocate(line);
    repo.add(batch).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{Days, Utc};
    use stockflow_allocation::Batch;
    use stockflow_core::Quantity;

    use crate::repository::InMemoryBatchRepository;

    fn seeded() -> InMemoryBatchRepository {
        let tomorrow = Utc::now().date_naive().checked_add_days(Days::new(1));
        InMemoryBatchRepository::with_batches([
            Batch::new("in-stock", "RETRO-CLOCK", Quantity::new(100), None),
            Batch::new("shipment", "RETRO-CLOCK", Quantity::new(100), tomorrow),
            Batch::new("other", "VELVET-CURTAIN", Quantity::new(100), None),
        ])
    }

    #[tokio::test]
    async fn allocation_is_persisted_to_the_chosen_batch_only() {
        let repo = seeded();
        let line = OrderLine::new("order-1", "RETRO-CLOCK", Quantity::new(10));

        let reference = allocate_line(&line, &repo).await.unwrap();

        assert_eq!(reference, Reference::new("in-stock"));
        let in_stock = repo.get(&Reference::new("in-stock")).await.unwrap();
        let shipment = repo.get(&Reference::new("shipment")).await.unwrap();
        assert_eq!(in_stock.available_quantity(), Quantity::new(90));
        assert!(in_stock.is_allocated(&line));
        assert_eq!(shipment.available_quantity(), Quantity::new(100));
    }

    #[tokio::test]
    async fn exhaustion_reports_out_of_stock_and_writes_nothing() {
        let repo = InMemoryBatchRepository::with_batches([Batch::new(
            "batch1",
            "SMALL-FORK",
            Quantity::new(10),
            None,
        )]);

        allocate_line(&OrderLine::new("order1", "SMALL-FORK", Quantity::new(10)), &repo)
            .await
            .unwrap();
        let err = allocate_line(&OrderLine::new("order2", "SMALL-FORK", Quantity::new(1)), &repo)
            .await
            .unwrap_err();

        match err {
            ServiceError::Domain(DomainError::OutOfStock(sku)) => {
                assert_eq!(sku.as_str(), "SMALL-FORK")
            }
            other => panic!("expected OutOfStock, got {other:?}"),
        }
        let stored = repo.get(&Reference::new("batch1")).await.unwrap();
        assert_eq!(stored.allocations().count(), 1);
    }

    #[tokio::test]
    async fn deallocation_frees_capacity_for_the_next_line() {
        let repo: Arc<dyn BatchRepository> = Arc::new(seeded());
        let first = OrderLine::new("order-1", "VELVET-CURTAIN", Quantity::new(100));
        let second = OrderLine::new("order-2", "VELVET-CURTAIN", Quantity::new(60));

        let reference = allocate_line(&first, &repo).await.unwrap();
        assert!(allocate_line(&second, &repo).await.is_err());

        deallocate_line(&first, &reference, &repo).await.unwrap();
        let reference = allocate_line(&second, &repo).await.unwrap();

        let stored = repo.get(&reference).await.unwrap();
        assert_eq!(stored.available_quantity(), Quantity::new(40));
        assert!(!stored.is_allocated(&first));
    }

    #[tokio::test]
    async fn deallocating_from_unknown_batch_is_not_found() {
        let repo = seeded();
        let line = OrderLine::new("order-1", "RETRO-CLOCK", Quantity::new(1));

        let err = deallocate_line(&line, &Reference::new("nope"), &repo)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Repository(RepositoryError::NotFound(_))
        ));
    }
}
