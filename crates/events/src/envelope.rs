use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::Event;

/// Serialized form of a single domain event, ready to be written to an outbox.
///
/// The payload is a field-named JSON object holding exactly the fields the
/// event type declares. It never contains the whole aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    event_type: String,
    aggregate_id: String,
    payload: JsonValue,
}

#[derive(Debug, Error)]
pub enum EventRecordError {
    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("payload for '{0}' is not a JSON object")]
    NotAnObject(String),
}

impl EventRecord {
    /// Build a record from a typed event, capturing its tag and aggregate id.
    pub fn from_typed<E>(event: &E) -> Result<Self, EventRecordError>
    where
        E: Event + Serialize,
    {
        let payload = serde_json::to_value(event)?;
        if !payload.is_object() {
            return Err(EventRecordError::NotAnObject(event.event_type().to_string()));
        }

        Ok(Self {
            event_type: event.event_type().to_string(),
            aggregate_id: event.aggregate_id(),
            payload,
        })
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn payload(&self) -> &JsonValue {
        &self.payload
    }

    /// Payload encoded as JSON bytes.
    pub fn payload_bytes(&self) -> Vec<u8> {
        // Serializing an in-memory `Value` cannot fail.
        serde_json::to_vec(&self.payload).unwrap_or_else(|_| b"{}".to_vec())
    }

    pub fn into_parts(self) -> (String, String, JsonValue) {
        (self.event_type, self.aggregate_id, self.payload)
    }
}
