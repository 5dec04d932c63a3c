use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use uuid::Uuid;

use super::{ActiveProductQuery, OutboxRow, ProductRow, Store, StoreError, WriteOp};

#[derive(Debug, Default)]
struct Tables {
    products: HashMap<Uuid, ProductRow>,
    outbox: Vec<OutboxRow>,
    outbox_ids: HashSet<Uuid>,
}

/// Inverse of one applied op.
#[derive(Debug)]
enum Undo {
    RemoveProduct(Uuid),
    RestoreProduct(Box<ProductRow>),
    PopOutbox(Uuid),
}

impl Tables {
    fn apply(&mut self, op: WriteOp) -> Result<Undo, StoreError> {
        match op {
            WriteOp::InsertProduct(row) => {
                if self.products.contains_key(&row.product_id) {
                    return Err(StoreError::Duplicate(format!(
                        "product {} already exists",
                        row.product_id
                    )));
                }
                let id = row.product_id;
                self.products.insert(id, row);
                Ok(Undo::RemoveProduct(id))
            }
            WriteOp::UpdateProduct {
                product_id,
                columns,
            } => {
                let row = self
                    .products
                    .get_mut(&product_id)
                    .ok_or_else(|| StoreError::MissingRow(format!("product {product_id}")))?;
                let before = Box::new(row.clone());
                for column in &columns {
                    column.apply_to(row);
                }
                Ok(Undo::RestoreProduct(before))
            }
            WriteOp::InsertOutbox(row) => {
                if !self.outbox_ids.insert(row.event_id) {
                    return Err(StoreError::Duplicate(format!(
                        "outbox event {} already exists",
                        row.event_id
                    )));
                }
                let id = row.event_id;
                self.outbox.push(row);
                Ok(Undo::PopOutbox(id))
            }
        }
    }

    fn undo(&mut self, undo: Undo) {
        match undo {
            Undo::RemoveProduct(id) => {
                self.products.remove(&id);
            }
            Undo::RestoreProduct(row) => {
                self.products.insert(row.product_id, *row);
            }
            Undo::PopOutbox(id) => {
                self.outbox.pop();
                self.outbox_ids.remove(&id);
            }
        }
    }

    /// Apply every op or none. Undo entries are replayed newest first on failure.
    fn apply_all(&mut self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut log = Vec::with_capacity(ops.len());
        for op in ops {
            match self.apply(op) {
                Ok(undo) => log.push(undo),
                Err(err) => {
                    while let Some(undo) = log.pop() {
                        self.undo(undo);
                    }
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}

/// In-memory store.
///
/// Intended for tests/dev. A batch is applied in place under one write lock
/// and rolled back from its undo log if any op fails. Rollback touches only
/// the rows the batch wrote.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    commits: RwLock<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current row for a product, if any.
    pub fn product(&self, product_id: Uuid) -> Option<ProductRow> {
        self.tables
            .read()
            .ok()
            .and_then(|t| t.products.get(&product_id).cloned())
    }

    /// Every outbox row, in insertion order.
    pub fn outbox(&self) -> Vec<OutboxRow> {
        self.tables
            .read()
            .map(|t| t.outbox.clone())
            .unwrap_or_default()
    }

    /// Number of batches applied successfully.
    pub fn commit_count(&self) -> usize {
        self.commits.read().map(|c| *c).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Store for InMemoryStore {
    async fn fetch_product(&self, product_id: Uuid) -> Result<Option<ProductRow>, StoreError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        Ok(tables.products.get(&product_id).cloned())
    }

    async fn list_active_products(
        &self,
        query: &ActiveProductQuery,
    ) -> Result<(Vec<ProductRow>, i64), StoreError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let mut matching: Vec<&ProductRow> = tables
            .products
            .values()
            .filter(|r| r.status == "ACTIVE")
            .filter(|r| query.category.as_deref().is_none_or(|c| r.category == c))
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn apply_atomically(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        tables.apply_all(ops)?;

        let mut commits = self
            .commits
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        *commits += 1;

        Ok(())
    }
}
