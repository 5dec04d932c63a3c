//! Product domain errors.

use thiserror::Error;

use catalog_core::{DomainError, ErrorClass};

/// Failure of a product construction or lifecycle operation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProductError {
    #[error("product name cannot be empty")]
    EmptyName,

    #[error("product category cannot be empty")]
    EmptyCategory,

    #[error("base price must be positive")]
    InvalidPrice,

    #[error("discount percentage must be greater than 0 and at most 100")]
    InvalidDiscountPercent,

    #[error("discount period is invalid")]
    InvalidDiscountPeriod,

    #[error("product is archived")]
    ProductArchived,

    #[error("product is already active")]
    ProductAlreadyActive,

    #[error("product is not active")]
    ProductNotActive,

    #[error("product already has an active discount")]
    ActiveDiscountExists,

    #[error("product has no discount to remove")]
    NoDiscountToRemove,
}

impl ProductError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ProductError::EmptyName
            | ProductError::EmptyCategory
            | ProductError::InvalidPrice
            | ProductError::InvalidDiscountPercent
            | ProductError::InvalidDiscountPeriod => ErrorClass::Validation,
            ProductError::ProductArchived
            | ProductError::ProductAlreadyActive
            | ProductError::ProductNotActive
            | ProductError::ActiveDiscountExists
            | ProductError::NoDiscountToRemove => ErrorClass::StateConflict,
        }
    }
}

impl From<ProductError> for DomainError {
    fn from(value: ProductError) -> Self {
        match value.class() {
            ErrorClass::Validation => DomainError::validation(value.to_string()),
            _ => DomainError::conflict(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_and_conflict_classes() {
        assert_eq!(ProductError::EmptyName.class(), ErrorClass::Validation);
        assert_eq!(ProductError::InvalidDiscountPeriod.class(), ErrorClass::Validation);
        assert_eq!(ProductError::ProductArchived.class(), ErrorClass::StateConflict);
        assert_eq!(ProductError::NoDiscountToRemove.class(), ErrorClass::StateConflict);
    }

    #[test]
    fn converts_into_domain_error() {
        let err: DomainError = ProductError::InvalidPrice.into();
        assert_eq!(err, DomainError::Validation("base price must be positive".to_string()));

        let err: DomainError = ProductError::ProductNotActive.into();
        assert_eq!(err.class(), ErrorClass::StateConflict);
    }
}
