//! Pricing rules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::money::Money;
use crate::product::Product;

/// Stateless pricing domain service.
#[derive(Debug, Default, Clone, Copy)]
pub struct PricingCalculator;

impl PricingCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Price a customer pays at `now`.
    pub fn effective_price(&self, product: &Product, now: DateTime<Utc>) -> Money {
        product.effective_price(now)
    }

    /// Amount taken off `base` by a `percentage`% discount.
    pub fn discount_amount(&self, base: &Money, percentage: Decimal) -> Money {
        base.percent_of(percentage)
    }
}
