//! Batch persistence boundary.
//!
//! The allocation domain never talks to storage directly. Callers load
//! candidate batches through a [`BatchRepository`], run the pure allocation
//! logic, and hand the mutated batch back.

pub mod in_memory;
pub mod postgres;
pub mod schema;
pub mod r#trait;

pub use in_memory::InMemoryBatchRepository;
pub use postgres::PostgresBatchRepository;
pub use r#trait::{BatchRepository, RepositoryError};
