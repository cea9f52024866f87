//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// An aggregate rebuilt by replaying its event stream.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate records and replays.
    type Event: DomainEvent;

    /// Returns the stream identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Number of persisted events applied so far.
    fn version(&self) -> i64;

    /// Mutates state from a single event.
    fn apply(&mut self, event: &Self::Event);

    /// Events recorded since the aggregate was loaded.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// True when nothing has been persisted for this stream yet.
    fn is_new(&self) -> bool {
        self.version() == 0
    }
}
