use std::sync::Arc;

use tracing::instrument;

use catalog_core::Clock;

use super::{parse_product_id, AppError};
use crate::read_model::{ListFilter, ProductReadModel, ProductView};
use crate::store::Store;

/// Read-side product operations.
#[derive(Clone)]
pub struct ProductQueries<S> {
    read_model: ProductReadModel<S>,
}

impl<S> ProductQueries<S>
where
    S: Store,
{
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            read_model: ProductReadModel::new(store, clock),
        }
    }

    pub fn with_default_page_size(self, page_size: i64) -> Self {
        Self {
            read_model: self.read_model.with_default_page_size(page_size),
        }
    }

    #[instrument(skip(self), err)]
    pub async fn get_product(&self, product_id: &str) -> Result<ProductView, AppError> {
        let id = parse_product_id(product_id)?;
        Ok(self.read_model.get_by_id(id).await?)
    }

    /// Active products only, newest first.
    #[instrument(skip(self, filter), err)]
    pub async fn list_products(
        &self,
        filter: &ListFilter,
    ) -> Result<(Vec<ProductView>, i64), AppError> {
        Ok(self.read_model.list(filter).await?)
    }
}
