//! Aggregate root trait for state-based domain models that record events.

/// Aggregate root marker + minimal interface.
///
/// Aggregates are persisted as current state, not as an event stream. Every
/// mutating method records the events it caused; those are drained exactly
/// once by the persistence step that follows.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Domain event type recorded by this aggregate.
    type Event: Clone + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Events recorded since the aggregate was constructed or loaded.
    fn pending_events(&self) -> &[Self::Event];

    /// Drain recorded events. A second call returns an empty list.
    fn take_events(&mut self) -> Vec<Self::Event>;
}
