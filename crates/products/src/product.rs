use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{AggregateId, AggregateRoot, DomainError};

use crate::change_tracker::ChangeTracker;
use crate::discount::Discount;
use crate::error::ProductError;
use crate::event::{
    DiscountApplied, DiscountRemoved, ProductActivated, ProductCreated, ProductDeactivated,
    ProductEvent, ProductUpdated,
};
use crate::money::Money;

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Product status lifecycle.
///
/// `Draft -> Active <-> Inactive`, and any non-archived state `-> Archived` (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Draft,
    Active,
    Inactive,
    Archived,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Draft => "DRAFT",
            ProductStatus::Active => "ACTIVE",
            ProductStatus::Inactive => "INACTIVE",
            ProductStatus::Archived => "ARCHIVED",
        }
    }
}

impl core::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ProductStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(ProductStatus::Draft),
            "ACTIVE" => Ok(ProductStatus::Active),
            "INACTIVE" => Ok(ProductStatus::Inactive),
            "ARCHIVED" => Ok(ProductStatus::Archived),
            other => Err(DomainError::validation(format!("unknown product status '{other}'"))),
        }
    }
}

/// Logical product fields, as tracked for partial updates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductField {
    Name,
    Description,
    Category,
    BasePrice,
    Discount,
    Status,
    ArchivedAt,
}

impl ProductField {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductField::Name => "name",
            ProductField::Description => "description",
            ProductField::Category => "category",
            ProductField::BasePrice => "base_price",
            ProductField::Discount => "discount",
            ProductField::Status => "status",
            ProductField::ArchivedAt => "archived_at",
        }
    }
}

/// Trusted persisted state used to rehydrate a [`Product`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Money,
    pub discount: Option<Discount>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// Aggregate root: Product.
///
/// Every mutating method either fails without touching state, or mutates
/// state, marks the touched fields dirty and records zero or more events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    category: String,
    base_price: Money,
    discount: Option<Discount>,
    status: ProductStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    archived_at: Option<DateTime<Utc>>,
    changes: ChangeTracker<ProductField>,
    events: Vec<ProductEvent>,
}

impl Product {
    /// Create a new draft product and record `ProductCreated`.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        base_price: Money,
        now: DateTime<Utc>,
    ) -> Result<Self, ProductError> {
        let name = name.into();
        let category = category.into();

        if name.is_empty() {
            return Err(ProductError::EmptyName);
        }
        if category.is_empty() {
            return Err(ProductError::EmptyCategory);
        }
        // The persisted form is a reduced i64 numerator/denominator pair.
        if !base_price.is_positive() || base_price.to_i64_parts().is_none() {
            return Err(ProductError::InvalidPrice);
        }

        let created = ProductCreated {
            product_id: id,
            name: name.clone(),
            category: category.clone(),
            base_price: base_price.to_string(),
            occurred_at: now,
        };

        Ok(Self {
            id,
            name,
            description: description.into(),
            category,
            base_price,
            discount: None,
            status: ProductStatus::Draft,
            created_at: now,
            updated_at: now,
            archived_at: None,
            changes: ChangeTracker::new(),
            events: vec![ProductEvent::ProductCreated(created)],
        })
    }

    /// Rebuild from persisted state. No validation, no events.
    pub fn rehydrate(snapshot: ProductSnapshot) -> Self {
        Self {
            id: snapshot.id,
            name: snapshot.name,
            description: snapshot.description,
            category: snapshot.category,
            base_price: snapshot.base_price,
            discount: snapshot.discount,
            status: snapshot.status,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            archived_at: snapshot.archived_at,
            changes: ChangeTracker::new(),
            events: Vec::new(),
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn base_price(&self) -> &Money {
        &self.base_price
    }

    pub fn discount(&self) -> Option<&Discount> {
        self.discount.as_ref()
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archived_at
    }

    pub fn changes(&self) -> &ChangeTracker<ProductField> {
        &self.changes
    }

    /// Update descriptive fields.
    ///
    /// An empty `name` or `category` means "leave unchanged"; `description`
    /// is taken as given. Records `ProductUpdated` only if something changed.
    pub fn update_details(
        &mut self,
        name: &str,
        description: &str,
        category: &str,
    ) -> Result<(), ProductError> {
        self.ensure_not_archived()?;

        let mut changed = false;

        if !name.is_empty() && name != self.name {
            self.name = name.to_string();
            self.changes.mark_dirty(ProductField::Name);
            changed = true;
        }
        if description != self.description {
            self.description = description.to_string();
            self.changes.mark_dirty(ProductField::Description);
            changed = true;
        }
        if !category.is_empty() && category != self.category {
            self.category = category.to_string();
            self.changes.mark_dirty(ProductField::Category);
            changed = true;
        }

        if changed {
            self.events.push(ProductEvent::ProductUpdated(ProductUpdated {
                product_id: self.id,
                name: self.name.clone(),
                category: self.category.clone(),
            }));
        }

        Ok(())
    }

    pub fn activate(&mut self) -> Result<(), ProductError> {
        self.ensure_not_archived()?;
        if self.status == ProductStatus::Active {
            return Err(ProductError::ProductAlreadyActive);
        }

        self.status = ProductStatus::Active;
        self.changes.mark_dirty(ProductField::Status);
        self.events.push(ProductEvent::ProductActivated(ProductActivated {
            product_id: self.id,
        }));
        Ok(())
    }

    pub fn deactivate(&mut self) -> Result<(), ProductError> {
        self.ensure_active()?;

        self.status = ProductStatus::Inactive;
        self.changes.mark_dirty(ProductField::Status);
        self.events.push(ProductEvent::ProductDeactivated(ProductDeactivated {
            product_id: self.id,
        }));
        Ok(())
    }

    /// Terminal transition. Records no event.
    pub fn archive(&mut self, now: DateTime<Utc>) -> Result<(), ProductError> {
        self.ensure_not_archived()?;

        self.status = ProductStatus::Archived;
        self.archived_at = Some(now);
        self.changes.mark_dirty(ProductField::Status);
        self.changes.mark_dirty(ProductField::ArchivedAt);
        Ok(())
    }

    pub fn apply_discount(
        &mut self,
        discount: Discount,
        now: DateTime<Utc>,
    ) -> Result<(), ProductError> {
        self.ensure_active()?;
        if !discount.is_valid_at(now) {
            return Err(ProductError::InvalidDiscountPeriod);
        }
        if self.discount.as_ref().is_some_and(|d| d.is_valid_at(now)) {
            return Err(ProductError::ActiveDiscountExists);
        }

        let applied = DiscountApplied {
            product_id: self.id,
            percentage: discount.percentage(),
            start_date: discount.start_date(),
            end_date: discount.end_date(),
        };
        self.discount = Some(discount);
        self.changes.mark_dirty(ProductField::Discount);
        self.events.push(ProductEvent::DiscountApplied(applied));
        Ok(())
    }

    pub fn remove_discount(&mut self) -> Result<(), ProductError> {
        self.ensure_active()?;
        if self.discount.is_none() {
            return Err(ProductError::NoDiscountToRemove);
        }

        self.discount = None;
        self.changes.mark_dirty(ProductField::Discount);
        self.events.push(ProductEvent::DiscountRemoved(DiscountRemoved {
            product_id: self.id,
        }));
        Ok(())
    }

    /// Base price less any discount valid at `now`.
    pub fn effective_price(&self, now: DateTime<Utc>) -> Money {
        match &self.discount {
            Some(d) if d.is_valid_at(now) => self
                .base_price
                .minus(&self.base_price.percent_of(d.percentage())),
            _ => self.base_price.clone(),
        }
    }

    fn ensure_not_archived(&self) -> Result<(), ProductError> {
        if self.status == ProductStatus::Archived {
            return Err(ProductError::ProductArchived);
        }
        Ok(())
    }

    /// Fails with `ProductArchived` before `ProductNotActive`.
    fn ensure_active(&self) -> Result<(), ProductError> {
        self.ensure_not_archived()?;
        if self.status != ProductStatus::Active {
            return Err(ProductError::ProductNotActive);
        }
        Ok(())
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;
    type Event = ProductEvent;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn pending_events(&self) -> &[Self::Event] {
        &self.events
    }

    fn take_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.events)
    }
}
