//! The client state store: one story, the media it produced, and the
//! notifications shown to the player.
//!
//! All changes go through [`StoreState::apply`], so every transition is a
//! single, synchronous step on an exclusively owned value.

use chrono::{DateTime, Utc};
use dreamdirector_core::media::{GeneratedMediaItem, MediaKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry in a turn's narrative progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionEntry {
    /// `choice_result`, `story_continuation`, `new_situation` or `story_climax`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Narrative text.
    pub content: String,
    /// When the backend produced it.
    pub timestamp: DateTime<Utc>,
}

/// The active story, as returned by start-story and make-choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// Backend session to continue.
    pub session_id: Uuid,
    /// Narrative for the latest turn.
    pub narrative: String,
    /// Options for the next choice; empty once complete.
    #[serde(default)]
    pub choices: Vec<String>,
    /// Current scene.
    #[serde(default)]
    pub scene_description: String,
    /// Current mood.
    #[serde(default)]
    pub mood: String,
    /// Backend scene identifier.
    #[serde(default)]
    pub scene_id: String,
    /// Whether the finale has happened.
    #[serde(default)]
    pub story_complete: bool,
    /// What happened during the latest turn.
    #[serde(default)]
    pub story_progression: Vec<ProgressionEntry>,
    /// Choices left before the finale.
    #[serde(default)]
    pub choices_remaining: u32,
    /// Choices made so far.
    #[serde(default)]
    pub current_choice: u32,
    /// Choices in a full story.
    #[serde(default)]
    pub total_choices: u32,
}

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// An action succeeded.
    Success,
    /// An action failed.
    Error,
    /// Neutral information.
    Info,
    /// Something worth attention.
    Warning,
}

/// A transient message for the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Identifier used to dismiss it.
    pub id: Uuid,
    /// Severity.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Text.
    pub message: String,
}

impl Notification {
    /// A notification with a fresh id.
    #[must_use]
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
        }
    }
}

/// Every state transition the store accepts.
#[derive(Debug, Clone)]
pub enum Action {
    /// Replace the current story.
    SetCurrentStory(Story),
    /// Mark a story as in play or not.
    SetStoryActive(bool),
    /// Mark a request as in flight or not.
    SetGenerating(bool),
    /// Append a generated image.
    AddImage(GeneratedMediaItem),
    /// Append a generated video.
    AddVideo(GeneratedMediaItem),
    /// Append a generated music track.
    AddMusic(GeneratedMediaItem),
    /// Drop every video.
    ClearVideos,
    /// Show a notification.
    AddNotification(Notification),
    /// Dismiss a notification.
    RemoveNotification(Uuid),
    /// Return to the initial state, keeping notifications.
    Reset,
}

impl Action {
    /// The append action matching the item's kind.
    #[must_use]
    pub fn add_media(item: GeneratedMediaItem) -> Self {
        match item.kind {
            MediaKind::Image => Self::AddImage(item),
            MediaKind::Video => Self::AddVideo(item),
            MediaKind::Music => Self::AddMusic(item),
        }
    }
}

/// Everything the client knows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    /// The story in play.
    pub current_story: Option<Story>,
    /// Whether a story is in play.
    pub is_story_active: bool,
    /// Whether a request is in flight.
    pub is_generating: bool,
    /// Images, in the order they arrived.
    pub generated_images: Vec<GeneratedMediaItem>,
    /// Videos, in the order they arrived.
    pub generated_videos: Vec<GeneratedMediaItem>,
    /// Music tracks, in the order they arrived.
    pub generated_music: Vec<GeneratedMediaItem>,
    /// Pending notifications, oldest first.
    pub notifications: Vec<Notification>,
}

impl StoreState {
    /// Applies one action.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::SetCurrentStory(story) => self.current_story = Some(story),
            Action::SetStoryActive(active) => self.is_story_active = active,
            Action::SetGenerating(generating) => self.is_generating = generating,
            Action::AddImage(item) => self.generated_images.push(item),
            Action::AddVideo(item) => self.generated_videos.push(item),
            Action::AddMusic(item) => self.generated_music.push(item),
            Action::ClearVideos => self.generated_videos.clear(),
            Action::AddNotification(notification) => self.notifications.push(notification),
            Action::RemoveNotification(id) => self.notifications.retain(|n| n.id != id),
            Action::Reset => {
                let notifications = std::mem::take(&mut self.notifications);
                *self = Self {
                    notifications,
                    ..Self::default()
                };
            }
        }
    }

    /// Media of one kind, oldest first.
    #[must_use]
    pub fn media(&self, kind: MediaKind) -> &[GeneratedMediaItem] {
        match kind {
            MediaKind::Image => &self.generated_images,
            MediaKind::Video => &self.generated_videos,
            MediaKind::Music => &self.generated_music,
        }
    }

    /// Whether a file is already in the store.
    #[must_use]
    pub fn contains_media(&self, kind: MediaKind, filename: &str) -> bool {
        self.media(kind).iter().any(|item| item.filename == filename)
    }

    /// The persistable part of the state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            current_story: self.current_story.clone(),
            is_story_active: self.is_story_active,
            generated_images: self.generated_images.clone(),
            generated_videos: self.generated_videos.clone(),
            generated_music: self.generated_music.clone(),
        }
    }

    /// State restored from a snapshot, with nothing in flight.
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            current_story: snapshot.current_story,
            is_story_active: snapshot.is_story_active,
            generated_images: snapshot.generated_images,
            generated_videos: snapshot.generated_videos,
            generated_music: snapshot.generated_music,
            ..Self::default()
        }
    }
}

/// What survives a restart. Notifications and the generating flag do not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// The story in play.
    pub current_story: Option<Story>,
    /// Whether a story is in play.
    pub is_story_active: bool,
    /// Images.
    #[serde(default)]
    pub generated_images: Vec<GeneratedMediaItem>,
    /// Videos.
    #[serde(default)]
    pub generated_videos: Vec<GeneratedMediaItem>,
    /// Music tracks.
    #[serde(default)]
    pub generated_music: Vec<GeneratedMediaItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use dreamdirector_core::media::media_url;

    fn item(kind: MediaKind, filename: &str) -> GeneratedMediaItem {
        GeneratedMediaItem {
            id: Uuid::new_v4(),
            url: media_url(filename),
            filename: filename.to_owned(),
            kind,
            title: filename.to_owned(),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn story() -> Story {
        Story {
            session_id: Uuid::new_v4(),
            narrative: "Rain hammers the neon.".to_owned(),
            choices: vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
            scene_description: "a rooftop".to_owned(),
            mood: "tense".to_owned(),
            scene_id: "opening_scene".to_owned(),
            story_complete: false,
            story_progression: Vec::new(),
            choices_remaining: 5,
            current_choice: 0,
            total_choices: 5,
        }
    }

    #[test]
    fn test_appended_media_keeps_insertion_order() {
        // Arrange
        let mut state = StoreState::default();
        let names: Vec<String> = (0..6).map(|n| format!("generated_scene_{n}.png")).collect();

        // Act
        for name in names.iter().rev() {
            state.apply(Action::add_media(item(MediaKind::Image, name)));
        }

        // Assert
        let stored: Vec<&str> = state
            .generated_images
            .iter()
            .map(|i| i.filename.as_str())
            .collect();
        let expected: Vec<&str> = names.iter().rev().map(String::as_str).collect();
        assert_eq!(stored, expected);
    }

    #[test]
    fn test_add_media_routes_by_kind() {
        let mut state = StoreState::default();

        state.apply(Action::add_media(item(MediaKind::Video, "generated_video_1.mp4")));
        state.apply(Action::add_media(item(MediaKind::Music, "lyria_final_a_1.wav")));

        assert!(state.generated_images.is_empty());
        assert_eq!(state.generated_videos.len(), 1);
        assert_eq!(state.generated_music.len(), 1);
        assert!(state.contains_media(MediaKind::Music, "lyria_final_a_1.wav"));
    }

    #[test]
    fn test_reset_clears_story_and_media_but_keeps_notifications() {
        // Arrange
        let mut state = StoreState::default();
        let notice = Notification::new(NotificationKind::Info, "hello");
        state.apply(Action::SetCurrentStory(story()));
        state.apply(Action::SetStoryActive(true));
        state.apply(Action::SetGenerating(true));
        state.apply(Action::AddImage(item(MediaKind::Image, "generated_scene_1.png")));
        state.apply(Action::AddVideo(item(MediaKind::Video, "generated_video_1.mp4")));
        state.apply(Action::AddMusic(item(MediaKind::Music, "lyria_final_a_1.wav")));
        state.apply(Action::AddNotification(notice.clone()));

        // Act
        state.apply(Action::Reset);

        // Assert
        assert_eq!(
            state,
            StoreState {
                notifications: vec![notice],
                ..StoreState::default()
            }
        );
    }

    #[test]
    fn test_clear_videos_leaves_other_media() {
        let mut state = StoreState::default();
        state.apply(Action::AddImage(item(MediaKind::Image, "generated_scene_1.png")));
        state.apply(Action::AddVideo(item(MediaKind::Video, "generated_video_1.mp4")));

        state.apply(Action::ClearVideos);

        assert!(state.generated_videos.is_empty());
        assert_eq!(state.generated_images.len(), 1);
    }

    #[test]
    fn test_remove_notification_by_id() {
        let mut state = StoreState::default();
        let first = Notification::new(NotificationKind::Success, "one");
        let second = Notification::new(NotificationKind::Error, "two");
        state.apply(Action::AddNotification(first.clone()));
        state.apply(Action::AddNotification(second.clone()));

        state.apply(Action::RemoveNotification(first.id));

        assert_eq!(state.notifications, vec![second]);
    }

    #[test]
    fn test_snapshot_drops_transient_state() {
        // Arrange
        let mut state = StoreState::default();
        state.apply(Action::SetCurrentStory(story()));
        state.apply(Action::SetStoryActive(true));
        state.apply(Action::SetGenerating(true));
        state.apply(Action::AddNotification(Notification::new(NotificationKind::Info, "x")));

        // Act
        let restored = StoreState::from_snapshot(state.snapshot());

        // Assert
        assert_eq!(restored.current_story, state.current_story);
        assert!(restored.is_story_active);
        assert!(!restored.is_generating);
        assert!(restored.notifications.is_empty());
    }

    #[test]
    fn test_story_deserializes_from_turn_response() {
        let json = serde_json::json!({
            "session_id": Uuid::nil(),
            "narrative": "It begins.",
            "choices": ["A", "B", "C"],
            "scene_description": "a forest",
            "mood": "mysterious",
            "scene_id": "opening_scene",
            "story_complete": false,
            "story_progression": [],
            "choices_remaining": 5,
            "current_choice": 0,
            "total_choices": 5
        });

        let story: Story = serde_json::from_value(json).unwrap();

        assert_eq!(story.choices.len(), 3);
        assert_eq!(story.total_choices, 5);
    }
}
