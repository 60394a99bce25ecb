//! Infrastructure layer: batch persistence, configuration, application services.

pub mod config;
pub mod repository;
pub mod service;

pub use config::RepositoryConfig;
pub use repository::{BatchRepository, InMemoryBatchRepository, PostgresBatchRepository, RepositoryError};
pub use service::{allocate_line, deallocate_line, ServiceError};
