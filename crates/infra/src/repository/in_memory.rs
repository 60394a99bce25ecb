use std::collections::HashMap;
use std::sync::RwLock;

use stockflow_allocation::Batch;
use stockflow_core::Reference;

use super::r#trait::{BatchRepository, RepositoryError};

/// In-memory batch repository.
///
/// Intended for tests/dev. Batches are cloned in and out, so mutating a
/// returned batch has no effect until it is `add`ed back.
#[derive(Debug, Default)]
pub struct InMemoryBatchRepository {
    batches: RwLock<HashMap<Reference, Batch>>,
}

impl InMemoryBatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with fixtures. Later batches win on duplicate references.
    pub fn with_batches(batches: impl IntoIterator<Item = Batch>) -> Self {
        let map = batches
            .into_iter()
            .map(|b| (b.reference().clone(), b))
            .collect();
        Self {
            batches: RwLock::new(map),
        }
    }

    fn poisoned() -> RepositoryError {
        RepositoryError::Storage("lock poisoned".to_string())
    }
}

#[async_trait::async_trait]
impl BatchRepository for InMemoryBatchRepository {
    async fn add(&self, batch: Batch) -> Result<(), RepositoryError> {
        let mut batches = self.batches.write().map_err(|_| Self::poisoned())?;
        batches.insert(batch.reference().clone(), batch);
        Ok(())
    }

    async fn get(&self, reference: &Reference) -> Result<Batch, RepositoryError> {
        let batches = self.batches.read().map_err(|_| Self::poisoned())?;
        batches
            .get(reference)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(reference.clone()))
    }

    async fn list(&self) -> Result<Vec<Batch>, RepositoryError> {
        let batches = self.batches.read().map_err(|_| Self::poisoned())?;
        Ok(batches.values().cloned().collect())
    }
}
