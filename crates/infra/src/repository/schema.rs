//! Table bootstrap for the Postgres batch repository.

use sqlx::PgPool;

use super::postgres::map_sqlx_error;
use super::r#trait::RepositoryError;

const CREATE_BATCHES: &str = r#"
CREATE TABLE IF NOT EXISTS batches (
    reference TEXT PRIMARY KEY,
    sku TEXT NOT NULL,
    purchased_quantity BIGINT NOT NULL,
    eta DATE NULL
)
"#;

// The full line value is the key, matching the in-memory set semantics.
const CREATE_ALLOCATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS allocations (
    batch_reference TEXT NOT NULL REFERENCES batches (reference) ON DELETE CASCADE,
    order_id TEXT NOT NULL,
    sku TEXT NOT NULL,
    qty BIGINT NOT NULL,
    PRIMARY KEY (batch_reference, order_id, sku, qty)
)
"#;

/// Create the batch tables if they do not exist yet. Idempotent.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), RepositoryError> {
    for statement in [CREATE_BATCHES, CREATE_ALLOCATIONS] {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }

    tracing::debug!("batch schema ready");
    Ok(())
}
