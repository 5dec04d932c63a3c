use std::sync::Arc;

use tracing::instrument;

use catalog_core::{AggregateRoot, Clock};
use catalog_products::{
    Discount, Money, Product, ProductField, ProductId, ProductSnapshot, ProductStatus,
};

use super::RepositoryError;
use crate::store::{DiscountColumns, ProductColumn, ProductRow, Store, WriteOp};

/// Loads products and builds their insert/update ops.
#[derive(Clone)]
pub struct ProductRepository<S> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S> ProductRepository<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Full-row insert for a newly created product.
    pub fn build_insert(&self, product: &Product) -> Result<WriteOp, RepositoryError> {
        Ok(WriteOp::InsertProduct(product_to_row(product)?))
    }

    /// Partial update covering only dirty fields, stamped with `updated_at = now`.
    ///
    /// `None` when nothing is dirty.
    pub fn build_update(&self, product: &Product) -> Result<Option<WriteOp>, RepositoryError> {
        let changes = product.changes();
        if !changes.has_changes() {
            return Ok(None);
        }

        let mut columns = Vec::with_capacity(changes.len() + 1);
        for field in changes.dirty_fields() {
            columns.push(match field {
                ProductField::Name => ProductColumn::Name(product.name().to_string()),
                ProductField::Description => {
                    ProductColumn::Description(product.description().to_string())
                }
                ProductField::Category => ProductColumn::Category(product.category().to_string()),
                ProductField::BasePrice => {
                    let (numerator, denominator) = price_parts(product.base_price())?;
                    ProductColumn::BasePrice {
                        numerator,
                        denominator,
                    }
                }
                ProductField::Discount => {
                    ProductColumn::Discount(product.discount().map(discount_columns))
                }
                ProductField::Status => ProductColumn::Status(product.status().to_string()),
                ProductField::ArchivedAt => ProductColumn::ArchivedAt(product.archived_at()),
            });
        }
        columns.push(ProductColumn::UpdatedAt(self.clock.now()));

        Ok(Some(WriteOp::UpdateProduct {
            product_id: *product.id().0.as_uuid(),
            columns,
        }))
    }
}

impl<S> ProductRepository<S>
where
    S: Store,
{
    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn get_by_id(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let row = self
            .store
            .fetch_product(*id.0.as_uuid())
            .await?
            .ok_or(RepositoryError::NotFound)?;

        product_from_row(row)
    }
}

/// Rebuild a product from its persisted row.
///
/// A stored discount that no longer forms a valid [`Discount`] is dropped.
pub fn product_from_row(row: ProductRow) -> Result<Product, RepositoryError> {
    let status: ProductStatus = row
        .status
        .parse()
        .map_err(|e| RepositoryError::Corrupt(format!("{}: {e}", row.product_id)))?;

    let discount = match (
        row.discount_percent,
        row.discount_start_date,
        row.discount_end_date,
    ) {
        (Some(percent), Some(start), Some(end)) => Discount::new(percent, start, end).ok(),
        _ => None,
    };

    Ok(Product::rehydrate(ProductSnapshot {
        id: ProductId::new(row.product_id.into()),
        name: row.name,
        description: row.description,
        category: row.category,
        base_price: Money::new(row.base_price_numerator, row.base_price_denominator),
        discount,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
        archived_at: row.archived_at,
    }))
}

/// Full persisted row for a product.
pub fn product_to_row(product: &Product) -> Result<ProductRow, RepositoryError> {
    let (numerator, denominator) = price_parts(product.base_price())?;
    let discount = product.discount().map(discount_columns);

    Ok(ProductRow {
        product_id: *product.id().0.as_uuid(),
        name: product.name().to_string(),
        description: product.description().to_string(),
        category: product.category().to_string(),
        base_price_numerator: numerator,
        base_price_denominator: denominator,
        discount_percent: discount.as_ref().map(|d| d.percent),
        discount_start_date: discount.as_ref().map(|d| d.start_date),
        discount_end_date: discount.as_ref().map(|d| d.end_date),
        status: product.status().to_string(),
        created_at: product.created_at(),
        updated_at: product.updated_at(),
        archived_at: product.archived_at(),
    })
}

fn price_parts(price: &Money) -> Result<(i64, i64), RepositoryError> {
    price
        .to_i64_parts()
        .ok_or_else(|| RepositoryError::PriceOutOfRange(price.amount().to_string()))
}

fn discount_columns(discount: &Discount) -> DiscountColumns {
    DiscountColumns {
        percent: discount.percentage(),
        start_date: discount.start_date(),
        end_date: discount.end_date(),
    }
}
