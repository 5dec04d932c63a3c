//! Backing store boundary.
//!
//! The store knows rows and write operations, nothing about products as
//! aggregates. Every write goes through [`Store::apply_atomically`], which
//! either applies a whole batch or none of it.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Outbox status written for every new row.
pub const OUTBOX_STATUS_PENDING: &str = "PENDING";

/// One row of the `products` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRow {
    pub product_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price_numerator: i64,
    pub base_price_denominator: i64,
    pub discount_percent: Option<Decimal>,
    pub discount_start_date: Option<DateTime<Utc>>,
    pub discount_end_date: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// Persisted discount columns; written and cleared together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountColumns {
    pub percent: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// A single column assignment in a partial product update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductColumn {
    Name(String),
    Description(String),
    Category(String),
    BasePrice { numerator: i64, denominator: i64 },
    Discount(Option<DiscountColumns>),
    Status(String),
    ArchivedAt(Option<DateTime<Utc>>),
    UpdatedAt(DateTime<Utc>),
}

impl ProductColumn {
    /// Apply this assignment to an in-memory row.
    pub fn apply_to(&self, row: &mut ProductRow) {
        match self {
            ProductColumn::Name(v) => row.name = v.clone(),
            ProductColumn::Description(v) => row.description = v.clone(),
            ProductColumn::Category(v) => row.category = v.clone(),
            ProductColumn::BasePrice {
                numerator,
                denominator,
            } => {
                row.base_price_numerator = *numerator;
                row.base_price_denominator = *denominator;
            }
            ProductColumn::Discount(Some(d)) => {
                row.discount_percent = Some(d.percent);
                row.discount_start_date = Some(d.start_date);
                row.discount_end_date = Some(d.end_date);
            }
            ProductColumn::Discount(None) => {
                row.discount_percent = None;
                row.discount_start_date = None;
                row.discount_end_date = None;
            }
            ProductColumn::Status(v) => row.status = v.clone(),
            ProductColumn::ArchivedAt(v) => row.archived_at = *v,
            ProductColumn::UpdatedAt(v) => row.updated_at = *v,
        }
    }
}

/// One row of the `outbox_events` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxRow {
    pub event_id: Uuid,
    pub event_type: String,
    pub aggregate_id: String,
    pub payload: JsonValue,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// A pending write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    InsertProduct(ProductRow),
    /// Touches only the listed columns of an existing row.
    UpdateProduct {
        product_id: Uuid,
        columns: Vec<ProductColumn>,
    },
    InsertOutbox(OutboxRow),
}

/// Paging and filtering for the active-product listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveProductQuery {
    pub category: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Store operation error.
///
/// Infrastructure failures only. Callers treat all of these as internal.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("row not found: {0}")]
    MissingRow(String),

    #[error("malformed row: {0}")]
    Malformed(String),

    #[error("backend failure: {0}")]
    Backend(String),
}

/// Row store with an atomic batch write.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn fetch_product(&self, product_id: Uuid) -> Result<Option<ProductRow>, StoreError>;

    /// Active products newest first, plus the total count ignoring paging.
    async fn list_active_products(
        &self,
        query: &ActiveProductQuery,
    ) -> Result<(Vec<ProductRow>, i64), StoreError>;

    /// Apply every op or none of them.
    async fn apply_atomically(&self, ops: Vec<WriteOp>) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> Store for Arc<S>
where
    S: Store + ?Sized,
{
    async fn fetch_product(&self, product_id: Uuid) -> Result<Option<ProductRow>, StoreError> {
        (**self).fetch_product(product_id).await
    }

    async fn list_active_products(
        &self,
        query: &ActiveProductQuery,
    ) -> Result<(Vec<ProductRow>, i64), StoreError> {
        (**self).list_active_products(query).await
    }

    async fn apply_atomically(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        (**self).apply_atomically(ops).await
    }
}
