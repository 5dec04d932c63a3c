use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use catalog_core::{AggregateRoot, Clock};
use catalog_events::EventRecord;
use catalog_products::{Discount, Money, Product, ProductError, ProductId};

use super::{parse_product_id, AppError};
use crate::committer::{CommitPlan, Committer};
use crate::repository::{OutboxRepository, ProductRepository};
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_numerator: i64,
    pub price_denominator: i64,
}

/// Empty `name` or `category` leaves that field unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProduct {
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyDiscount {
    pub product_id: String,
    pub percentage: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Write-side product operations.
#[derive(Clone)]
pub struct ProductCommands<S> {
    products: ProductRepository<S>,
    outbox: OutboxRepository,
    committer: Committer<S>,
    clock: Arc<dyn Clock>,
}

impl<S> ProductCommands<S>
where
    S: Store + Clone,
{
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            products: ProductRepository::new(store.clone(), clock.clone()),
            outbox: OutboxRepository::new(clock.clone()),
            committer: Committer::new(store),
            clock,
        }
    }

    #[instrument(skip(self, cmd), fields(category = %cmd.category), err)]
    pub async fn create_product(&self, cmd: CreateProduct) -> Result<ProductId, AppError> {
        let mut product = Product::new(
            ProductId::generate(),
            cmd.name,
            cmd.description,
            cmd.category,
            Money::new(cmd.price_numerator, cmd.price_denominator),
            self.clock.now(),
        )?;

        let mut plan = CommitPlan::new();
        plan.push(self.products.build_insert(&product)?);
        self.commit(&mut product, plan).await?;

        let id = product.id_typed();
        info!(product_id = %id, "product created");
        Ok(id)
    }

    #[instrument(skip(self, cmd), fields(product_id = %cmd.product_id), err)]
    pub async fn update_product(&self, cmd: UpdateProduct) -> Result<(), AppError> {
        let id = parse_product_id(&cmd.product_id)?;
        let mut product = self.products.get_by_id(id).await?;

        product.update_details(&cmd.name, &cmd.description, &cmd.category)?;
        if !product.changes().has_changes() {
            debug!("no field changed; skipping commit");
            return Ok(());
        }

        self.save(&mut product).await
    }

    #[instrument(skip(self), err)]
    pub async fn activate_product(&self, product_id: &str) -> Result<(), AppError> {
        self.mutate(product_id, |p, _| p.activate()).await
    }

    #[instrument(skip(self), err)]
    pub async fn deactivate_product(&self, product_id: &str) -> Result<(), AppError> {
        self.mutate(product_id, |p, _| p.deactivate()).await
    }

    #[instrument(skip(self), err)]
    pub async fn archive_product(&self, product_id: &str) -> Result<(), AppError> {
        self.mutate(product_id, |p, now| p.archive(now)).await
    }

    #[instrument(
        skip(self, cmd),
        fields(product_id = %cmd.product_id, percentage = %cmd.percentage),
        err
    )]
    pub async fn apply_discount(&self, cmd: ApplyDiscount) -> Result<(), AppError> {
        let discount = Discount::new(cmd.percentage, cmd.start_date, cmd.end_date)?;
        self.mutate(&cmd.product_id, move |p, now| p.apply_discount(discount, now))
            .await
    }

    #[instrument(skip(self), err)]
    pub async fn remove_discount(&self, product_id: &str) -> Result<(), AppError> {
        self.mutate(product_id, |p, _| p.remove_discount()).await
    }

    async fn mutate<F>(&self, product_id: &str, op: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut Product, DateTime<Utc>) -> Result<(), ProductError> + Send,
    {
        let id = parse_product_id(product_id)?;
        let mut product = self.products.get_by_id(id).await?;

        op(&mut product, self.clock.now())?;
        self.save(&mut product).await
    }

    async fn save(&self, product: &mut Product) -> Result<(), AppError> {
        let mut plan = CommitPlan::new();
        plan.add(self.products.build_update(product)?);
        self.commit(product, plan).await
    }

    /// Append one outbox insert per pending event and apply the plan.
    async fn commit(&self, product: &mut Product, mut plan: CommitPlan) -> Result<(), AppError> {
        for event in product.take_events() {
            let record = EventRecord::from_typed(&event)?;
            plan.push(self.outbox.insert_op(record.into()));
        }

        debug!(
            product_id = %product.id(),
            dirty = ?product.changes().dirty_fields().map(|f| f.as_str()).collect::<Vec<_>>(),
            op_count = plan.len(),
            "committing product changes"
        );
        self.committer.apply(plan).await?;
        Ok(())
    }
}
