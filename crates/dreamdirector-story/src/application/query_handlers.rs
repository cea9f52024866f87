//! Query handlers for story sessions.
//!
//! Reconstitutes sessions from stored events and returns read-only views.

use dreamdirector_core::aggregate::AggregateRoot;
use dreamdirector_core::error::DomainError;
use dreamdirector_core::media::MediaKind;
use dreamdirector_core::repository::EventRepository;
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::domain::arc::StoryStage;

/// Media produced for a session, by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MediaCounts {
    /// Images.
    pub images: usize,
    /// Videos.
    pub videos: usize,
    /// Music tracks.
    pub music: usize,
}

/// Read-only view of a story session.
#[derive(Debug, Serialize)]
pub struct StoryStatusView {
    /// The session identifier.
    pub session_id: Uuid,
    /// Genre picked at start.
    pub story_type: Option<&'static str>,
    /// Current scene.
    pub current_scene: String,
    /// Current mood.
    pub current_mood: String,
    /// Characters introduced so far.
    pub characters_present: Vec<String>,
    /// Narrative beats so far.
    pub story_events: usize,
    /// Danger, 1 to 10.
    pub danger_level: u32,
    /// Media generated for this session.
    pub media_generated: MediaCounts,
    /// Coarse progress label.
    pub story_stage: StoryStage,
    /// Choices resolved.
    pub user_choices_made: u32,
    /// Choices still to be made.
    pub choices_remaining: u32,
    /// Whether the finale has happened.
    pub story_complete: bool,
    /// Current version (event count).
    pub version: i64,
}

/// Retrieves the status of a story session.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_story_status(
    session_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<StoryStatusView, DomainError> {
    let stored_events = repo.load_events(session_id).await?;
    if stored_events.is_empty() {
        return Err(DomainError::SessionNotFound(session_id));
    }
    let session = command_handlers::reconstitute(session_id, &stored_events)?;
    Ok(StoryStatusView {
        session_id,
        story_type: session.story_type.map(|t| t.as_str()),
        current_scene: session.current_scene.clone(),
        current_mood: session.current_mood.clone(),
        characters_present: session.characters_present.clone(),
        story_events: session.history.len(),
        danger_level: session.danger_level,
        media_generated: MediaCounts {
            images: session.media(MediaKind::Image).len(),
            videos: session.media(MediaKind::Video).len(),
            music: session.media(MediaKind::Music).len(),
        },
        story_stage: StoryStage::from_event_count(session.history.len()),
        user_choices_made: session.choices_made,
        choices_remaining: session.choices_remaining(),
        story_complete: session.complete,
        version: session.version(),
    })
}

#[cfg(test)]
mod tests {
    use dreamdirector_core::error::DomainError;
    use dreamdirector_core::repository::StoredEvent;
    use uuid::Uuid;

    use crate::application::query_handlers::get_story_status;
    use crate::domain::arc::{ArcTheme, StoryStage};
    use crate::domain::events::{ChoicesPresented, StoryEventKind, StoryStarted};
    use crate::domain::scenario::{self, StoryType};
    use dreamdirector_test_support::{EmptyEventRepository, RecordingEventRepository, fixed_now};

    fn stored(
        session_id: Uuid,
        sequence_number: i64,
        event_type: &str,
        kind: &StoryEventKind,
    ) -> StoredEvent {
        StoredEvent {
            event_id: Uuid::new_v4(),
            session_id,
            event_type: event_type.to_owned(),
            payload: serde_json::to_value(kind).unwrap(),
            sequence_number,
            correlation_id: Uuid::new_v4(),
            occurred_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn test_get_story_status_returns_view_with_state() {
        // Arrange
        let session_id = Uuid::new_v4();
        let (story_type, scenario) = scenario::select("dragon");
        let events = vec![
            stored(
                session_id,
                1,
                "story.started",
                &StoryEventKind::StoryStarted(StoryStarted {
                    request: "dragon".to_owned(),
                    story_type,
                    arc_theme: ArcTheme::Generic,
                    scenario,
                }),
            ),
            stored(
                session_id,
                2,
                "story.choices_presented",
                &StoryEventKind::ChoicesPresented(ChoicesPresented {
                    situation: "You find yourself in a lair. What is your next move?".to_owned(),
                    choices: vec!["a".into(), "b".into(), "c".into()],
                }),
            ),
        ];
        let repo = RecordingEventRepository::new(events);

        // Act
        let view = get_story_status(session_id, &repo).await.unwrap();

        // Assert
        assert_eq!(view.session_id, session_id);
        assert_eq!(view.story_type, Some(StoryType::Fantasy.as_str()));
        assert!(view.current_scene.starts_with("The volcanic lair"));
        assert_eq!(view.current_mood, "mysterious");
        assert_eq!(view.story_events, 2);
        assert_eq!(view.story_stage, StoryStage::Beginning);
        assert_eq!(view.danger_level, 1);
        assert_eq!(view.choices_remaining, 5);
        assert_eq!(view.media_generated.images, 0);
        assert!(!view.story_complete);
        assert_eq!(view.version, 2);
    }

    #[tokio::test]
    async fn test_get_story_status_returns_not_found_when_no_events() {
        let session_id = Uuid::new_v4();

        let result = get_story_status(session_id, &EmptyEventRepository).await;

        assert!(matches!(result, Err(DomainError::SessionNotFound(id)) if id == session_id));
    }

    #[tokio::test]
    async fn test_get_story_status_rejects_corrupt_payload() {
        let session_id = Uuid::new_v4();
        let mut event = stored(
            session_id,
            1,
            "story.started",
            &StoryEventKind::ChoicesPresented(ChoicesPresented {
                situation: String::new(),
                choices: Vec::new(),
            }),
        );
        event.payload = serde_json::json!({"Unknown": {}});

        let repo = RecordingEventRepository::new(vec![event]);
        let result = get_story_status(session_id, &repo).await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
