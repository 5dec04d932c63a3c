//! Product domain events.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use catalog_events::Event;

use crate::product::ProductId;

/// Event: ProductCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
    /// Two-decimal display form of the base price.
    pub base_price: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductUpdated. Carries the post-update name and category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdated {
    pub product_id: ProductId,
    pub name: String,
    pub category: String,
}

/// Event: ProductActivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductActivated {
    pub product_id: ProductId,
}

/// Event: ProductDeactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDeactivated {
    pub product_id: ProductId,
}

/// Event: DiscountApplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountApplied {
    pub product_id: ProductId,
    pub percentage: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Event: DiscountRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRemoved {
    pub product_id: ProductId,
}

/// Closed set of events a product can record.
///
/// Serializes as the inner struct only; the variant is carried separately by
/// [`Event::event_type`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ProductEvent {
    ProductCreated(ProductCreated),
    ProductUpdated(ProductUpdated),
    ProductActivated(ProductActivated),
    ProductDeactivated(ProductDeactivated),
    DiscountApplied(DiscountApplied),
    DiscountRemoved(DiscountRemoved),
}

impl ProductEvent {
    pub fn product_id(&self) -> ProductId {
        match self {
            ProductEvent::ProductCreated(e) => e.product_id,
            ProductEvent::ProductUpdated(e) => e.product_id,
            ProductEvent::ProductActivated(e) => e.product_id,
            ProductEvent::ProductDeactivated(e) => e.product_id,
            ProductEvent::DiscountApplied(e) => e.product_id,
            ProductEvent::DiscountRemoved(e) => e.product_id,
        }
    }
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "product.created",
            ProductEvent::ProductUpdated(_) => "product.updated",
            ProductEvent::ProductActivated(_) => "product.activated",
            ProductEvent::ProductDeactivated(_) => "product.deactivated",
            ProductEvent::DiscountApplied(_) => "discount.applied",
            ProductEvent::DiscountRemoved(_) => "discount.removed",
        }
    }

    fn aggregate_id(&self) -> String {
        self.product_id().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::AggregateId;
    use catalog_events::EventRecord;
    use chrono::TimeZone;

    #[test]
    fn payload_holds_only_declared_fields() {
        let product_id = ProductId::new(AggregateId::new());
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let event = ProductEvent::DiscountApplied(DiscountApplied {
            product_id,
            percentage: Decimal::new(20, 0),
            start_date: start,
            end_date: start + chrono::Duration::days(1),
        });

        let record = EventRecord::from_typed(&event).unwrap();
        assert_eq!(record.event_type(), "discount.applied");
        assert_eq!(record.aggregate_id(), product_id.to_string());

        let payload = record.payload().as_object().unwrap();
        let mut keys: Vec<_> = payload.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["end_date", "percentage", "product_id", "start_date"]);
        assert_eq!(payload["product_id"], serde_json::json!(product_id.to_string()));
    }

    #[test]
    fn marker_events_carry_just_the_id() {
        let product_id = ProductId::new(AggregateId::new());
        for event in [
            ProductEvent::ProductActivated(ProductActivated { product_id }),
            ProductEvent::ProductDeactivated(ProductDeactivated { product_id }),
            ProductEvent::DiscountRemoved(DiscountRemoved { product_id }),
        ] {
            let record = EventRecord::from_typed(&event).unwrap();
            assert_eq!(record.payload().as_object().unwrap().len(), 1);
        }
    }
}
