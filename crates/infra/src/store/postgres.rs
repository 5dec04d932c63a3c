//! Postgres-backed store implementation.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (other) | Any other | `Backend` |
//! | RowNotFound | N/A | `MissingRow` |
//! | ColumnDecode / Decode | N/A | `Malformed` |
//! | Other | N/A | `Backend` |
//!
//! Listing reads the count and the page inside one read-only repeatable-read
//! transaction, so `total` always describes the snapshot the page came from.
//!
//! A batch runs inside one transaction. Any failure returns before `commit`,
//! and dropping the uncommitted transaction rolls it back. The same holds when
//! the calling future is dropped mid-batch.

use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};
use tracing::{instrument, Span};
use uuid::Uuid;

use super::{
    ActiveProductQuery, OutboxRow, ProductColumn, ProductRow, Store, StoreError, WriteOp,
};

const PRODUCT_COLUMNS: &str = "product_id, name, description, category, \
     base_price_numerator, base_price_denominator, \
     discount_percent, discount_start_date, discount_end_date, \
     status, created_at, updated_at, archived_at";

/// Postgres-backed row store.
///
/// `Send + Sync`; share it behind an `Arc` or clone it (the pool is shared).
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the `products` and `outbox_events` tables if missing.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

const SCHEMA: &str = include_str!("../../migrations/0001_catalog.sql");

#[async_trait::async_trait]
impl Store for PostgresStore {
    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn fetch_product(&self, product_id: Uuid) -> Result<Option<ProductRow>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_product", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(
        skip(self, query),
        fields(
            category = ?query.category,
            limit = query.limit,
            offset = query.offset,
            row_count = tracing::field::Empty
        ),
        err
    )]
    async fn list_active_products(
        &self,
        query: &ActiveProductQuery,
    ) -> Result<(Vec<ProductRow>, i64), StoreError> {
        // Count and page must come from one snapshot.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("set_transaction", e))?;

        let count_row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM products
            WHERE status = 'ACTIVE'
                AND ($1::text IS NULL OR category = $1)
            "#,
        )
        .bind(query.category.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("count_active_products", e))?;

        let total: i64 = count_row
            .try_get("total")
            .map_err(|e| StoreError::Malformed(format!("failed to read count: {e}")))?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE status = 'ACTIVE'
                AND ($1::text IS NULL OR category = $1)
            ORDER BY created_at DESC, product_id
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(query.category.as_deref())
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("list_active_products", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        let products = rows
            .iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Span::current().record("row_count", products.len());
        Ok((products, total))
    }

    #[instrument(skip(self, ops), fields(op_count = ops.len()), err)]
    async fn apply_atomically(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for op in &ops {
            match op {
                WriteOp::InsertProduct(row) => insert_product(&mut tx, row).await?,
                WriteOp::UpdateProduct {
                    product_id,
                    columns,
                } => update_product(&mut tx, *product_id, columns).await?,
                WriteOp::InsertOutbox(row) => insert_outbox(&mut tx, row).await?,
            }
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(())
    }
}

async fn insert_product(
    tx: &mut Transaction<'_, Postgres>,
    row: &ProductRow,
) -> Result<(), StoreError> {
    sqlx::query(&format!(
        r#"
        INSERT INTO products ({PRODUCT_COLUMNS})
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#
    ))
    .bind(row.product_id)
    .bind(&row.name)
    .bind(&row.description)
    .bind(&row.category)
    .bind(row.base_price_numerator)
    .bind(row.base_price_denominator)
    .bind(row.discount_percent)
    .bind(row.discount_start_date)
    .bind(row.discount_end_date)
    .bind(&row.status)
    .bind(row.created_at)
    .bind(row.updated_at)
    .bind(row.archived_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_product", e))?;

    Ok(())
}

async fn update_product(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    columns: &[ProductColumn],
) -> Result<(), StoreError> {
    if columns.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE products SET ");
    let mut assignments = builder.separated(", ");
    for column in columns {
        match column {
            ProductColumn::Name(v) => {
                assignments.push("name = ").push_bind_unseparated(v.clone());
            }
            ProductColumn::Description(v) => {
                assignments.push("description = ").push_bind_unseparated(v.clone());
            }
            ProductColumn::Category(v) => {
                assignments.push("category = ").push_bind_unseparated(v.clone());
            }
            ProductColumn::BasePrice {
                numerator,
                denominator,
            } => {
                assignments
                    .push("base_price_numerator = ")
                    .push_bind_unseparated(*numerator);
                assignments
                    .push("base_price_denominator = ")
                    .push_bind_unseparated(*denominator);
            }
            ProductColumn::Discount(d) => {
                assignments
                    .push("discount_percent = ")
                    .push_bind_unseparated(d.as_ref().map(|d| d.percent));
                assignments
                    .push("discount_start_date = ")
                    .push_bind_unseparated(d.as_ref().map(|d| d.start_date));
                assignments
                    .push("discount_end_date = ")
                    .push_bind_unseparated(d.as_ref().map(|d| d.end_date));
            }
            ProductColumn::Status(v) => {
                assignments.push("status = ").push_bind_unseparated(v.clone());
            }
            ProductColumn::ArchivedAt(v) => {
                assignments.push("archived_at = ").push_bind_unseparated(*v);
            }
            ProductColumn::UpdatedAt(v) => {
                assignments.push("updated_at = ").push_bind_unseparated(*v);
            }
        }
    }
    builder.push(" WHERE product_id = ").push_bind(product_id);

    let result = builder
        .build()
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

    if result.rows_affected() == 0 {
        return Err(StoreError::MissingRow(format!("product {product_id}")));
    }
    Ok(())
}

async fn insert_outbox(
    tx: &mut Transaction<'_, Postgres>,
    row: &OutboxRow,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO outbox_events (
            event_id,
            event_type,
            aggregate_id,
            payload,
            status,
            created_at,
            processed_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(row.event_id)
    .bind(&row.event_type)
    .bind(&row.aggregate_id)
    .bind(&row.payload)
    .bind(&row.status)
    .bind(row.created_at)
    .bind(row.processed_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_outbox", e))?;

    Ok(())
}

fn product_from_row(row: &PgRow) -> Result<ProductRow, StoreError> {
    let read = |e: sqlx::Error| StoreError::Malformed(format!("failed to read product row: {e}"));

    Ok(ProductRow {
        product_id: row.try_get("product_id").map_err(read)?,
        name: row.try_get("name").map_err(read)?,
        description: row.try_get("description").map_err(read)?,
        category: row.try_get("category").map_err(read)?,
        base_price_numerator: row.try_get("base_price_numerator").map_err(read)?,
        base_price_denominator: row.try_get("base_price_denominator").map_err(read)?,
        discount_percent: row.try_get("discount_percent").map_err(read)?,
        discount_start_date: row.try_get("discount_start_date").map_err(read)?,
        discount_end_date: row.try_get("discount_end_date").map_err(read)?,
        status: row.try_get("status").map_err(read)?,
        created_at: row.try_get("created_at").map_err(read)?,
        updated_at: row.try_get("updated_at").map_err(read)?,
        archived_at: row.try_get("archived_at").map_err(read)?,
    })
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Duplicate(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::RowNotFound => {
            StoreError::MissingRow(format!("unexpected row not found in {operation}"))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Malformed(format!("decode error in {operation}: {err}"))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    /// Live-database tests run only when `DATABASE_URL` points at a scratch Postgres.
    async fn store() -> Option<PostgresStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = PgPool::connect(&url).await.ok()?;
        let store = PostgresStore::new(pool);
        store.migrate().await.unwrap();
        Some(store)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn row(category: &str, created_at: DateTime<Utc>) -> ProductRow {
        ProductRow {
            product_id: Uuid::now_v7(),
            name: "n".to_string(),
            description: String::new(),
            category: category.to_string(),
            base_price_numerator: 100,
            base_price_denominator: 1,
            discount_percent: None,
            discount_start_date: None,
            discount_end_date: None,
            status: "ACTIVE".to_string(),
            created_at,
            updated_at: created_at,
            archived_at: None,
        }
    }

    #[tokio::test]
    async fn listing_total_matches_the_page_snapshot() {
        let Some(store) = store().await else {
            return;
        };
        let category = format!("list-{}", Uuid::now_v7());
        let rows: Vec<ProductRow> = (0..3)
            .map(|i| row(&category, t0() + Duration::minutes(i)))
            .collect();
        store
            .apply_atomically(rows.iter().cloned().map(WriteOp::InsertProduct).collect())
            .await
            .unwrap();

        let (page, total) = store
            .list_active_products(&ActiveProductQuery {
                category: Some(category.clone()),
                limit: 2,
                offset: 0,
            })
            .await
            .unwrap();

        assert_eq!(total, 3);
        assert_eq!(
            page.iter().map(|r| r.product_id).collect::<Vec<_>>(),
            vec![rows[2].product_id, rows[1].product_id]
        );
    }

    #[tokio::test]
    async fn failed_batch_leaves_no_rows() {
        let Some(store) = store().await else {
            return;
        };
        let existing = row("dup", t0());
        store
            .apply_atomically(vec![WriteOp::InsertProduct(existing.clone())])
            .await
            .unwrap();

        let fresh = row("dup", t0());
        let err = store
            .apply_atomically(vec![
                WriteOp::InsertProduct(fresh.clone()),
                WriteOp::InsertProduct(existing),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Duplicate(_)));
        assert!(store.fetch_product(fresh.product_id).await.unwrap().is_none());
    }
}
