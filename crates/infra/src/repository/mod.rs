//! Repositories: translate between aggregates and store rows/write ops.
//!
//! Reads go straight to the store. Writes are only *built* here and handed to
//! the [`Committer`](crate::committer::Committer) as part of a plan.

pub mod outbox;
pub mod product;

use thiserror::Error;

use crate::store::StoreError;

pub use outbox::{OutboxEntry, OutboxRepository};
pub use product::ProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("product not found")]
    NotFound,

    #[error("price does not fit the persisted form: {0}")]
    PriceOutOfRange(String),

    #[error("corrupt product row: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
