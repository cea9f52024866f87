//! Event repository abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DomainError;

/// Stored representation of a domain event.
#[derive(Debug, Clone)]
pub struct StoredEvent {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Session stream this event belongs to.
    pub session_id: Uuid,
    /// Event type name for deserialization routing.
    pub event_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// Sequence number within the session stream.
    pub sequence_number: i64,
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

/// Loads and appends session event streams.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Load all events for a session, ordered by sequence number.
    async fn load_events(&self, session_id: Uuid) -> Result<Vec<StoredEvent>, DomainError>;

    /// Append events to a session stream. `expected_version` is the number of
    /// events the caller saw when it loaded the stream; a mismatch yields
    /// `DomainError::ConcurrencyConflict`.
    async fn append_events(
        &self,
        session_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError>;
}
