//! Application operations: load, mutate, commit.
//!
//! Each command loads a fresh aggregate, invokes exactly one mutating method,
//! and commits the resulting partial update together with one outbox row per
//! recorded event. Queries read through the read model only.

pub mod commands;
pub mod error;
pub mod queries;

use catalog_products::ProductId;

pub use commands::{ApplyDiscount, CreateProduct, ProductCommands, UpdateProduct};
pub use error::AppError;
pub use queries::ProductQueries;

fn parse_product_id(raw: &str) -> Result<ProductId, AppError> {
    raw.parse()
        .map_err(|e: catalog_core::DomainError| AppError::InvalidId(e.to_string()))
}
