use thiserror::Error;
use tracing::error;

use catalog_core::ErrorClass;
use catalog_events::EventRecordError;
use catalog_products::ProductError;

use crate::repository::RepositoryError;
use crate::store::StoreError;

/// Failure of an application operation.
///
/// Infrastructure details are logged where they are converted and never
/// surfaced through `Display`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] ProductError),

    #[error("product not found")]
    NotFound,

    #[error("invalid product id: {0}")]
    InvalidId(String),

    #[error("internal error")]
    Infrastructure(String),
}

impl AppError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AppError::Domain(e) => e.class(),
            AppError::NotFound => ErrorClass::NotFound,
            AppError::InvalidId(_) => ErrorClass::Validation,
            AppError::Infrastructure(_) => ErrorClass::Internal,
        }
    }

    fn infrastructure(source: impl std::fmt::Display) -> Self {
        let detail = source.to_string();
        error!(error = %detail, "infrastructure failure");
        AppError::Infrastructure(detail)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => AppError::NotFound,
            other => AppError::infrastructure(other),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        AppError::infrastructure(value)
    }
}

impl From<EventRecordError> for AppError {
    fn from(value: EventRecordError) -> Self {
        AppError::infrastructure(value)
    }
}
