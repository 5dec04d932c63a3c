use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use catalog_core::Clock;
use catalog_products::{Money, ProductId};

use crate::repository::RepositoryError;
use crate::store::{ActiveProductQuery, ProductRow, Store};

pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Display-ready product.
///
/// Prices are two-decimal strings; timestamps are RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: String,
    pub effective_price: String,
    pub discount_percent: Option<Decimal>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Listing filter. Out-of-range paging values are normalized, never rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListFilter {
    pub category: Option<String>,
    pub page_size: i64,
    pub page_offset: i64,
}

impl ListFilter {
    fn to_query(&self, default_page_size: i64) -> ActiveProductQuery {
        ActiveProductQuery {
            category: self.category.clone().filter(|c| !c.is_empty()),
            limit: if self.page_size <= 0 {
                default_page_size
            } else {
                self.page_size
            },
            offset: self.page_offset.max(0),
        }
    }
}

/// Project a stored row into a view as of `now`.
///
/// The discount is applied only when all discount columns are present and
/// `start <= now < end`. The stored percentage is shown whenever present.
pub fn project(row: &ProductRow, now: DateTime<Utc>) -> ProductView {
    let base_price = Money::new(row.base_price_numerator, row.base_price_denominator);

    let effective_price = match (
        row.discount_percent,
        row.discount_start_date,
        row.discount_end_date,
    ) {
        (Some(percent), Some(start), Some(end)) if start <= now && now < end => {
            base_price.minus(&base_price.percent_of(percent))
        }
        _ => base_price.clone(),
    };

    ProductView {
        id: row.product_id.to_string(),
        name: row.name.clone(),
        description: row.description.clone(),
        category: row.category.clone(),
        base_price: base_price.to_string(),
        effective_price: effective_price.to_string(),
        discount_percent: row.discount_percent,
        status: row.status.clone(),
        created_at: row.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        updated_at: row.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}

/// Product read model over a [`Store`].
#[derive(Clone)]
pub struct ProductReadModel<S> {
    store: S,
    clock: Arc<dyn Clock>,
    default_page_size: i64,
}

impl<S> ProductReadModel<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the page size used when a filter asks for none.
    pub fn with_default_page_size(mut self, page_size: i64) -> Self {
        if page_size > 0 {
            self.default_page_size = page_size;
        }
        self
    }
}

impl<S> ProductReadModel<S>
where
    S: Store,
{
    /// Any product regardless of status.
    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn get_by_id(&self, id: ProductId) -> Result<ProductView, RepositoryError> {
        let row = self
            .store
            .fetch_product(*id.0.as_uuid())
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(project(&row, self.clock.now()))
    }

    /// One page of active products plus the total matching count.
    #[instrument(skip(self, filter), fields(category = ?filter.category), err)]
    pub async fn list(&self, filter: &ListFilter) -> Result<(Vec<ProductView>, i64), RepositoryError> {
        let query = filter.to_query(self.default_page_size);
        let (rows, total) = self.store.list_active_products(&query).await?;

        let now = self.clock.now();
        Ok((rows.iter().map(|r| project(r, now)).collect(), total))
    }
}
