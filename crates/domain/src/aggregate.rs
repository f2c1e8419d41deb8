//! Core aggregate and domain event traits.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events are immutable facts describing a state transition that
/// already happened on an aggregate. They are named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name, used for serialization and routing.
    fn event_type(&self) -> &'static str;

    /// Returns the aggregate this event belongs to.
    fn aggregate_id(&self) -> AggregateId;

    /// Returns when the event occurred.
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// Trait for aggregate roots.
///
/// An aggregate root is the unit of consistency: its state changes only
/// through its own event-producing methods. Each mutation records exactly
/// one domain event and immediately applies it, so the in-process view is
/// always consistent with the recorded event history.
pub trait AggregateRoot: Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's unique identifier.
    fn id(&self) -> AggregateId;

    /// Returns the number of events applied to this instance.
    fn version(&self) -> u64;

    /// Applies an event to the aggregate, updating its state.
    ///
    /// Must be pure and deterministic: the same state and event always
    /// produce the same new state, whether applied live or replayed from
    /// stored history. Must not fail — events are facts.
    fn apply(&mut self, event: Self::Event);

    /// Applies multiple events in sequence.
    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }

    /// Returns the events recorded since construction or the last drain.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Drains the recorded events, leaving the aggregate clean.
    ///
    /// Called once the transaction that persisted the aggregate commits.
    fn take_uncommitted_events(&mut self) -> Vec<Self::Event>;
}
