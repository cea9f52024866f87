//! Domain events for story sessions.

use dreamdirector_core::event::{DomainEvent, EventMetadata};
use dreamdirector_core::media::MediaKind;
use serde::{Deserialize, Serialize};

use super::arc::ArcTheme;
use super::scenario::{Scenario, StoryType};

/// Event type for [`StoryStarted`].
pub const STORY_STARTED_EVENT_TYPE: &str = "story.started";
/// Event type for [`ChoicesPresented`].
pub const CHOICES_PRESENTED_EVENT_TYPE: &str = "story.choices_presented";
/// Event type for [`ChoiceResolved`].
pub const CHOICE_RESOLVED_EVENT_TYPE: &str = "story.choice_resolved";
/// Event type for [`NarrativeContinued`].
pub const NARRATIVE_CONTINUED_EVENT_TYPE: &str = "story.narrative_continued";
/// Event type for [`StoryConcluded`].
pub const STORY_CONCLUDED_EVENT_TYPE: &str = "story.concluded";
/// Event type for [`MediaGenerated`].
pub const MEDIA_GENERATED_EVENT_TYPE: &str = "story.media_generated";

/// Emitted when a player opens a new adventure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryStarted {
    /// The player's own words.
    pub request: String,
    /// Genre picked from the request.
    pub story_type: StoryType,
    /// Escalation script the arc follows.
    pub arc_theme: ArcTheme,
    /// Opening scenario.
    pub scenario: Scenario,
}

/// Emitted when three options are put to the player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoicesPresented {
    /// What the player is facing.
    pub situation: String,
    /// Options A, B and C.
    pub choices: Vec<String>,
}

/// Emitted when the player's choice has been narrated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceResolved {
    /// What the player chose.
    pub choice: String,
    /// Generated consequences.
    pub narrative: String,
}

/// Emitted when the arc escalates to a new scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeContinued {
    /// The new scene.
    pub scene: String,
    /// Escalation narrative.
    pub narrative: String,
    /// Character joining the story.
    pub new_character: Option<String>,
    /// Danger after escalation.
    pub danger_level: u32,
}

/// Emitted once, after the final choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryConcluded {
    /// The choice that ended the story.
    pub final_choice: String,
    /// Summary shown to the player.
    pub completion_message: String,
}

/// Emitted for every file generated on behalf of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaGenerated {
    /// Media kind.
    pub kind: MediaKind,
    /// Stored file name.
    pub filename: String,
}

/// Event payload variants for story sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StoryEventKind {
    /// A new adventure has begun.
    StoryStarted(StoryStarted),
    /// Choices are awaiting the player.
    ChoicesPresented(ChoicesPresented),
    /// A choice has been narrated.
    ChoiceResolved(ChoiceResolved),
    /// The arc moved to a new scene.
    NarrativeContinued(NarrativeContinued),
    /// The finale happened.
    StoryConcluded(StoryConcluded),
    /// A media file was produced.
    MediaGenerated(MediaGenerated),
}

/// Domain event envelope for story sessions.
#[derive(Debug, Clone)]
pub struct StoryEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: StoryEventKind,
}

impl DomainEvent for StoryEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            StoryEventKind::StoryStarted(_) => STORY_STARTED_EVENT_TYPE,
            StoryEventKind::ChoicesPresented(_) => CHOICES_PRESENTED_EVENT_TYPE,
            StoryEventKind::ChoiceResolved(_) => CHOICE_RESOLVED_EVENT_TYPE,
            StoryEventKind::NarrativeContinued(_) => NARRATIVE_CONTINUED_EVENT_TYPE,
            StoryEventKind::StoryConcluded(_) => STORY_CONCLUDED_EVENT_TYPE,
            StoryEventKind::MediaGenerated(_) => MEDIA_GENERATED_EVENT_TYPE,
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("StoryEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
