use std::sync::Arc;

use thiserror::Error;

use stockflow_allocation::Batch;
use stockflow_core::Reference;

/// Repository operation error.
///
/// These are **infrastructure errors** (missing records, storage failures) as
/// opposed to domain outcomes such as running out of stock.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No batch is registered under this reference.
    #[error("batch not found: {0}")]
    NotFound(Reference),

    /// The backing store failed (connection, query, lock poisoning, corrupt row).
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Store of batches keyed by reference.
///
/// ## Contract
///
/// - `add` is an upsert: adding a batch whose reference is already stored
///   replaces the stored state, allocation ledger included. This is how a
///   caller persists a batch after allocating against it.
/// - `get` returns [`RepositoryError::NotFound`] for unknown references.
/// - `list` returns every stored batch in no particular order. Allocation
///   re-sorts candidates itself.
///
/// Implementations must be safe to share across tasks. They do not arbitrate
/// concurrent read-modify-write cycles on the same batch; that is up to the
/// caller.
#[async_trait::async_trait]
pub trait BatchRepository: Send + Sync {
    async fn add(&self, batch: Batch) -> Result<(), RepositoryError>;

    async fn get(&self, reference: &Reference) -> Result<Batch, RepositoryError>;

    async fn list(&self) -> Result<Vec<Batch>, RepositoryError>;
}

#[async_trait::async_trait]
impl<R> BatchRepository for Arc<R>
where
    R: BatchRepository + ?Sized,
{
    async fn add(&self, batch: Batch) -> Result<(), RepositoryError> {
        (**self).add(batch).await
    }

    async fn get(&self, reference: &Reference) -> Result<Batch, RepositoryError> {
        (**self).get(reference).await
    }

    async fn list(&self) -> Result<Vec<Batch>, RepositoryError> {
        (**self).list().await
    }
}
