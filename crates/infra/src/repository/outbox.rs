use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::warn;
use uuid::Uuid;

use catalog_core::Clock;
use catalog_events::EventRecord;

use crate::store::{OutboxRow, WriteOp, OUTBOX_STATUS_PENDING};

/// One event bound for the outbox, with its payload as raw JSON bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxEntry {
    pub event_type: String,
    pub aggregate_id: String,
    pub payload: Vec<u8>,
}

impl From<EventRecord> for OutboxEntry {
    fn from(record: EventRecord) -> Self {
        let payload = record.payload_bytes();
        let (event_type, aggregate_id, _) = record.into_parts();
        Self {
            event_type,
            aggregate_id,
            payload,
        }
    }
}

/// Builds outbox insert ops.
#[derive(Clone)]
pub struct OutboxRepository {
    clock: Arc<dyn Clock>,
}

impl OutboxRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Pending outbox row for `entry`, with a fresh event id.
    ///
    /// A payload that is not valid JSON is stored as `{}`.
    pub fn insert_op(&self, entry: OutboxEntry) -> WriteOp {
        let payload = match serde_json::from_slice::<JsonValue>(&entry.payload) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    event_type = %entry.event_type,
                    aggregate_id = %entry.aggregate_id,
                    error = %e,
                    "outbox payload is not valid JSON; storing empty object"
                );
                JsonValue::Object(Default::default())
            }
        };

        WriteOp::InsertOutbox(OutboxRow {
            event_id: Uuid::now_v7(),
            event_type: entry.event_type,
            aggregate_id: entry.aggregate_id,
            payload,
            status: OUTBOX_STATUS_PENDING.to_string(),
            created_at: self.clock.now(),
            processed_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::FixedClock;
    use chrono::{TimeZone, Utc};

    fn repo() -> OutboxRepository {
        let now = Utc.with_ymd_and_hms(2024, 4, 2, 10, 0, 0).unwrap();
        OutboxRepository::new(Arc::new(FixedClock::new(now)))
    }

    fn entry(payload: &[u8]) -> OutboxEntry {
        OutboxEntry {
            event_type: "product.activated".to_string(),
            aggregate_id: "abc".to_string(),
            payload: payload.to_vec(),
        }
    }

    #[test]
    fn writes_pending_row() {
        let op = repo().insert_op(entry(br#"{"product_id":"abc"}"#));
        match op {
            WriteOp::InsertOutbox(row) => {
                assert_eq!(row.event_type, "product.activated");
                assert_eq!(row.aggregate_id, "abc");
                assert_eq!(row.status, "PENDING");
                assert_eq!(row.payload, serde_json::json!({"product_id": "abc"}));
                assert_eq!(row.created_at, Utc.with_ymd_and_hms(2024, 4, 2, 10, 0, 0).unwrap());
                assert!(row.processed_at.is_none());
            }
            other => panic!("Expected InsertOutbox, got {other:?}"),
        }
    }

    #[test]
    fn invalid_json_becomes_empty_object() {
        match repo().insert_op(entry(b"{not json")) {
            WriteOp::InsertOutbox(row) => assert_eq!(row.payload, serde_json::json!({})),
            other => panic!("Expected InsertOutbox, got {other:?}"),
        }
    }

    #[test]
    fn each_row_gets_its_own_id() {
        let repo = repo();
        let ids: Vec<_> = (0..3)
            .map(|_| match repo.insert_op(entry(b"{}")) {
                WriteOp::InsertOutbox(row) => row.event_id,
                other => panic!("Expected InsertOutbox, got {other:?}"),
            })
            .collect();
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
    }
}
