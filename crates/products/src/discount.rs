//! Time-bounded percentage discount.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use catalog_core::ValueObject;

use crate::error::ProductError;

/// Percentage discount valid over the half-open window `[start, end)`.
///
/// Only constructible through [`Discount::new`], so `0 < percentage <= 100`
/// and `end > start` always hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discount {
    percentage: Decimal,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
}

impl ValueObject for Discount {}

impl Discount {
    pub fn new(
        percentage: Decimal,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Self, ProductError> {
        if percentage <= Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
            return Err(ProductError::InvalidDiscountPercent);
        }
        if end_date <= start_date {
            return Err(ProductError::InvalidDiscountPeriod);
        }

        Ok(Self {
            percentage,
            start_date,
            end_date,
        })
    }

    /// `start <= at < end`.
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at && at < self.end_date
    }

    pub fn percentage(&self) -> Decimal {
        self.percentage
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    pub fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }
}
