//! Products domain module.
//!
//! Business rules for the product catalog, implemented purely as deterministic
//! domain logic (no IO, no storage). Mutations record dirty fields and pending
//! events on the aggregate; persistence happens elsewhere.

pub mod change_tracker;
pub mod discount;
pub mod error;
pub mod event;
pub mod money;
pub mod pricing;
pub mod product;

pub use change_tracker::ChangeTracker;
pub use discount::Discount;
pub use error::ProductError;
pub use event::{
    DiscountApplied, DiscountRemoved, ProductActivated, ProductCreated, ProductDeactivated,
    ProductEvent, ProductUpdated,
};
pub use money::Money;
pub use pricing::PricingCalculator;
pub use product::{Product, ProductField, ProductId, ProductSnapshot, ProductStatus};
