//! Repository selection from the process environment.
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `USE_PERSISTENT_STORES` | `true` selects Postgres; anything else (or unset) selects in-memory |
//! | `DATABASE_URL` | Postgres connection string, required when persistent |
//!
//! `build` logs which backend was chosen; install a subscriber first
//! (`stockflow_observability::init`) to see it.

use std::sync::Arc;

use anyhow::{bail, Context};
use sqlx::PgPool;

use crate::repository::schema::ensure_schema;
use crate::repository::{BatchRepository, InMemoryBatchRepository, PostgresBatchRepository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryConfig {
    InMemory,
    Postgres { database_url: String },
}

impl RepositoryConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let use_persistent = lookup("USE_PERSISTENT_STORES")
            .and_then(|v| v.trim().parse::<bool>().ok())
            .unwrap_or(false);

        if !use_persistent {
            return Ok(RepositoryConfig::InMemory);
        }

        match lookup("DATABASE_URL") {
            Some(url) if !url.trim().is_empty() => Ok(RepositoryConfig::Postgres {
                database_url: url,
            }),
            _ => bail!("DATABASE_URL must be set when USE_PERSISTENT_STORES=true"),
        }
    }

    /// Construct the configured repository. Postgres connects and bootstraps its tables.
    pub async fn build(&self) -> anyhow::Result<Arc<dyn BatchRepository>> {
        match self {
            RepositoryConfig::InMemory => {
                tracing::info!("using in-memory batch repository");
                Ok(Arc::new(InMemoryBatchRepository::new()))
            }
            RepositoryConfig::Postgres { database_url } => {
                let pool = PgPool::connect(database_url)
                    .await
                    .context("failed to connect to Postgres")?;
                ensure_schema(&pool)
                    .await
                    .context("failed to create batch tables")?;
                tracing::info!("using Postgres batch repository");
                Ok(Arc::new(PostgresBatchRepository::new(pool)))
            }
        }
    }
}
