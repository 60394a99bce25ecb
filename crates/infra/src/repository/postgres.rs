//! Postgres-backed batch repository.
//!
//! A batch is stored as one row in `batches` plus one row per allocated order
//! line in `allocations`. `add` rewrites both inside a single transaction, so a
//! reader never observes a batch with half of its ledger.
//!
//! ## Error Mapping
//!
//! | SQLx Error | RepositoryError |
//! |------------|-----------------|
//! | `Database` | `Storage` (with the Postgres message) |
//! | `PoolClosed` | `Storage` |
//! | `ColumnDecode` / other | `Storage` |
//!
//! Reads (`get`, `list`) run in a `REPEATABLE READ, READ ONLY` transaction so
//! the batch rows and allocation rows come from the same snapshot.
//!
//! Missing batches are detected with `fetch_optional` and reported as
//! `NotFound`, never via `RowNotFound`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use stockflow_allocation::{Batch, OrderLine};
use stockflow_core::{Quantity, Reference, Sku};

use super::r#trait::{BatchRepository, RepositoryError};

/// Postgres-backed batch repository.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct PostgresBatchRepository {
    pool: Arc<PgPool>,
}

impl PostgresBatchRepository {
    /// Create a repository on an existing pool. Tables must already exist
    /// (see [`super::schema::ensure_schema`]).
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Read-only transaction whose statements all see one snapshot, so a batch
    /// row is never paired with a ledger written after it was read.
    async fn begin_snapshot(&self) -> Result<Transaction<'static, Postgres>, RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("set_isolation", e))?;

        Ok(tx)
    }

    #[instrument(skip(self, batch), fields(reference = %batch.reference()), err)]
    async fn upsert_batch(&self, batch: &Batch) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        sqlx::query(
            r#"
            INSERT INTO batches (reference, sku, purchased_quantity, eta)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (reference)
            DO UPDATE SET
                sku = EXCLUDED.sku,
                purchased_quantity = EXCLUDED.purchased_quantity,
                eta = EXCLUDED.eta
            "#,
        )
        .bind(batch.reference().as_str())
        .bind(batch.sku().as_str())
        .bind(batch.purchased_quantity().value())
        .bind(batch.eta())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("upsert_batch", e))?;

        sqlx::query("DELETE FROM allocations WHERE batch_reference = $1")
            .bind(batch.reference().as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("clear_allocations", e))?;

        for line in batch.allocations() {
            sqlx::query(
                r#"
                INSERT INTO allocations (batch_reference, order_id, sku, qty)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(batch.reference().as_str())
            .bind(line.order_id.as_str())
            .bind(line.sku.as_str())
            .bind(line.qty.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_allocation", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        Ok(())
    }

    #[instrument(skip(self, reference), fields(reference = %reference), err)]
    async fn fetch_batch(&self, reference: &Reference) -> Result<Batch, RepositoryError> {
        let mut tx = self.begin_snapshot().await?;

        let row = sqlx::query(
            r#"
            SELECT reference, sku, purchased_quantity, eta
            FROM batches
            WHERE reference = $1
            "#,
        )
        .bind(reference.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("fetch_batch", e))?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound(reference.clone()));
        };
        let head = BatchRow::from_row(&row).map_err(|e| decode_error("batches", e))?;

        let rows = sqlx::query(
            r#"
            SELECT batch_reference, order_id, sku, qty
            FROM allocations
            WHERE batch_reference = $1
            "#,
        )
        .bind(reference.as_str())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("fetch_allocations", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            let line = AllocationRow::from_row(&row).map_err(|e| decode_error("allocations", e))?;
            lines.push(line.into_order_line());
        }

        Ok(head.into_batch(lines))
    }

    #[instrument(skip(self), fields(batch_count = tracing::field::Empty), err)]
    async fn fetch_all(&self) -> Result<Vec<Batch>, RepositoryError> {
        let mut tx = self.begin_snapshot().await?;

        let batch_rows = sqlx::query("SELECT reference, sku, purchased_quantity, eta FROM batches")
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("fetch_all_batches", e))?;

        let allocation_rows =
            sqlx::query("SELECT batch_reference, order_id, sku, qty FROM allocations")
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("fetch_all_allocations", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        let mut ledgers: HashMap<String, Vec<OrderLine>> = HashMap::new();
        for row in allocation_rows {
            let line = AllocationRow::from_row(&row).map_err(|e| decode_error("allocations", e))?;
            ledgers
                .entry(line.batch_reference.clone())
                .or_default()
                .push(line.into_order_line());
        }

        let mut batches = Vec::with_capacity(batch_rows.len());
        for row in batch_rows {
            let head = BatchRow::from_row(&row).map_err(|e| decode_error("batches", e))?;
            let lines = ledgers.remove(&head.reference).unwrap_or_default();
            batches.push(head.into_batch(lines));
        }

        tracing::Span::current().record("batch_count", batches.len());
        Ok(batches)
    }
}

#[async_trait::async_trait]
impl BatchRepository for PostgresBatchRepository {
    async fn add(&self, batch: Batch) -> Result<(), RepositoryError> {
        self.upsert_batch(&batch).await
    }

    async fn get(&self, reference: &Reference) -> Result<Batch, RepositoryError> {
        self.fetch_batch(reference).await
    }

    async fn list(&self) -> Result<Vec<Batch>, RepositoryError> {
        self.fetch_all().await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BatchRow {
    reference: String,
    sku: String,
    purchased_quantity: i64,
    eta: Option<NaiveDate>,
}

impl<'r> FromRow<'r, PgRow> for BatchRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(BatchRow {
            reference: row.try_get("reference")?,
            sku: row.try_get("sku")?,
            purchased_quantity: row.try_get("purchased_quantity")?,
            eta: row.try_get("eta")?,
        })
    }
}

impl BatchRow {
    fn into_batch(self, lines: Vec<OrderLine>) -> Batch {
        Batch::restore(
            Reference::new(self.reference),
            Sku::new(self.sku),
            Quantity::new(self.purchased_quantity),
            self.eta,
            lines,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AllocationRow {
    batch_reference: String,
    order_id: String,
    sku: String,
    qty: i64,
}

impl<'r> FromRow<'r, PgRow> for AllocationRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(AllocationRow {
            batch_reference: row.try_get("batch_reference")?,
            order_id: row.try_get("order_id")?,
            sku: row.try_get("sku")?,
            qty: row.try_get("qty")?,
        })
    }
}

impl AllocationRow {
    fn into_order_line(self) -> OrderLine {
        OrderLine::new(self.order_id, self.sku, Quantity::new(self.qty))
    }
}

fn decode_error(table: &str, err: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(format!("failed to decode {table} row: {err}"))
}

/// Map SQLx errors to repository errors, keeping the failing operation in the message.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
            RepositoryError::Storage(format!(
                "database error in {operation} (code {code}): {}",
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::Storage(format!("connection pool closed in {operation}"))
        }
        _ => RepositoryError::Storage(format!("sqlx error in {operation}: {err}")),
    }
}
