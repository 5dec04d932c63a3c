//! Domain events and their serialized outbox form.

pub mod envelope;
pub mod event;

pub use envelope::{EventRecord, EventRecordError};
pub use event::Event;
