//! In-process event store for story sessions.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use dreamdirector_core::error::DomainError;
use dreamdirector_core::repository::{EventRepository, StoredEvent};
use uuid::Uuid;

/// Keeps every session stream in memory, guarded by a lock. Appends check
/// the caller's expected version against the stream length.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    streams: RwLock<HashMap<Uuid, Vec<StoredEvent>>>,
}

impl InMemoryEventRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions with at least one event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn session_count(&self) -> Result<usize, DomainError> {
        Ok(self.streams.read().map_err(poisoned)?.len())
    }
}

fn poisoned<T>(_: T) -> DomainError {
    DomainError::Infrastructure("session store lock poisoned".into())
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn load_events(&self, session_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let streams = self.streams.read().map_err(poisoned)?;
        Ok(streams.get(&session_id).cloned().unwrap_or_default())
    }

    #[allow(clippy::cast_possible_wrap)]
    async fn append_events(
        &self,
        session_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        let mut streams = self.streams.write().map_err(poisoned)?;
        let stream = streams.entry(session_id).or_default();
        let actual = stream.len() as i64;
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                session_id,
                expected: expected_version,
                actual,
            });
        }
        stream.extend_from_slice(events);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dreamdirector_test_support::fixed_now;

    fn event(session_id: Uuid, sequence_number: i64) -> StoredEvent {
        StoredEvent {
            event_id: Uuid::new_v4(),
            session_id,
            event_type: "story.started".to_owned(),
            payload: serde_json::json!({}),
            sequence_number,
            correlation_id: Uuid::new_v4(),
            occurred_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn test_append_then_load_returns_stream_in_order() {
        // Arrange
        let repo = InMemoryEventRepository::new();
        let session_id = Uuid::new_v4();

        // Act
        repo.append_events(session_id, 0, &[event(session_id, 1), event(session_id, 2)])
            .await
            .unwrap();
        repo.append_events(session_id, 2, &[event(session_id, 3)])
            .await
            .unwrap();

        // Assert
        let loaded = repo.load_events(session_id).await.unwrap();
        let sequence: Vec<i64> = loaded.iter().map(|e| e.sequence_number).collect();
        assert_eq!(sequence, vec![1, 2, 3]);
        assert_eq!(repo.session_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_stale_expected_version_is_a_conflict() {
        let repo = InMemoryEventRepository::new();
        let session_id = Uuid::new_v4();
        repo.append_events(session_id, 0, &[event(session_id, 1)])
            .await
            .unwrap();

        let result = repo.append_events(session_id, 0, &[event(session_id, 2)]).await;

        assert!(matches!(
            result,
            Err(DomainError::ConcurrencyConflict { expected: 0, actual: 1, .. })
        ));
        assert_eq!(repo.load_events(session_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_session_loads_empty() {
        let repo = InMemoryEventRepository::new();

        assert!(repo.load_events(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
