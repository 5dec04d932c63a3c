//! Atomic commit of a unit of work.
//!
//! ```text
//! load aggregate -> one mutating method
//!   -> build partial update (if anything is dirty)
//!   -> one outbox insert per pending event
//!   -> Committer::apply (all or nothing)
//! ```

use tracing::{debug, instrument};

use crate::store::{Store, StoreError, WriteOp};

/// Ordered batch of writes for one unit of work.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommitPlan {
    ops: Vec<WriteOp>,
}

impl CommitPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an optional op; `None` is dropped.
    pub fn add(&mut self, op: Option<WriteOp>) -> &mut Self {
        if let Some(op) = op {
            self.ops.push(op);
        }
        self
    }

    pub fn push(&mut self, op: WriteOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Submits a [`CommitPlan`] to the store as one atomic batch.
#[derive(Debug, Clone)]
pub struct Committer<S> {
    store: S,
}

impl<S> Committer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S> Committer<S>
where
    S: Store,
{
    /// Apply every op in the plan or none of them.
    ///
    /// An empty plan succeeds without touching the store.
    #[instrument(skip(self, plan), fields(op_count = plan.len()), err)]
    pub async fn apply(&self, plan: CommitPlan) -> Result<(), StoreError> {
        if plan.is_empty() {
            debug!("empty commit plan; nothing to write");
            return Ok(());
        }

        self.store.apply_atomically(plan.into_ops()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, OutboxRow, ProductColumn};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use uuid::Uuid;

    fn outbox(event_id: Uuid) -> WriteOp {
        WriteOp::InsertOutbox(OutboxRow {
            event_id,
            event_type: "product.activated".to_string(),
            aggregate_id: "p".to_string(),
            payload: serde_json::json!({"product_id": "p"}),
            status: "PENDING".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            processed_at: None,
        })
    }

    #[test]
    fn add_drops_none_and_keeps_order() {
        let mut plan = CommitPlan::new();
        let first = outbox(Uuid::now_v7());
        let second = WriteOp::UpdateProduct {
            product_id: Uuid::now_v7(),
            columns: vec![ProductColumn::Status("ACTIVE".to_string())],
        };

        plan.add(None).add(Some(first.clone())).push(second.clone()).add(None);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.ops(), &[first, second]);
    }

    #[tokio::test]
    async fn empty_plan_never_reaches_store() {
        let store = Arc::new(InMemoryStore::new());
        let committer = Committer::new(store.clone());

        let mut plan = CommitPlan::new();
        plan.add(None);
        committer.apply(plan).await.unwrap();

        assert_eq!(store.commit_count(), 0);
    }

    #[tokio::test]
    async fn non_empty_plan_is_one_batch() {
        let store = Arc::new(InMemoryStore::new());
        let committer = Committer::new(store.clone());

        let mut plan = CommitPlan::new();
        plan.push(outbox(Uuid::now_v7())).push(outbox(Uuid::now_v7()));
        committer.apply(plan).await.unwrap();

        assert_eq!(store.commit_count(), 1);
        assert_eq!(store.outbox().len(), 2);
    }
}
