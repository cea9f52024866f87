//! Aggregate root for a story session.

use dreamdirector_core::aggregate::AggregateRoot;
use dreamdirector_core::clock::Clock;
use dreamdirector_core::error::DomainError;
use dreamdirector_core::event::{DomainEvent, EventMetadata};
use dreamdirector_core::media::MediaKind;
use uuid::Uuid;

use super::arc::{ArcTheme, Beat, MAX_DANGER, STARTING_DANGER, TOTAL_CHOICES};
use super::events::{
    ChoiceResolved, ChoicesPresented, MediaGenerated, NarrativeContinued, StoryConcluded,
    StoryEvent, StoryEventKind, StoryStarted,
};
use super::prompts::{DEFAULT_TONE, StoryContext};
use super::scenario::{Scenario, StoryType};

/// One player's adventure.
#[derive(Debug)]
pub struct StorySession {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Persisted events applied.
    pub(crate) version: i64,
    pub(crate) started: bool,
    pub(crate) complete: bool,
    pub(crate) story_type: Option<StoryType>,
    pub(crate) arc_theme: ArcTheme,
    pub(crate) scenario: Option<Scenario>,
    pub(crate) current_scene: String,
    pub(crate) current_mood: String,
    pub(crate) art_style: String,
    pub(crate) characters_present: Vec<String>,
    /// Narrative beats in order: hook, situations, outcomes, escalations.
    pub(crate) history: Vec<String>,
    pub(crate) danger_level: u32,
    pub(crate) choices_made: u32,
    pub(crate) pending_choices: Vec<String>,
    pub(crate) images: Vec<String>,
    pub(crate) videos: Vec<String>,
    pub(crate) music: Vec<String>,
    uncommitted_events: Vec<StoryEvent>,
}

impl StorySession {
    /// Creates an empty, unstarted session.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            started: false,
            complete: false,
            story_type: None,
            arc_theme: ArcTheme::Generic,
            scenario: None,
            current_scene: String::new(),
            current_mood: DEFAULT_TONE.to_owned(),
            art_style: String::new(),
            characters_present: Vec::new(),
            history: Vec::new(),
            danger_level: STARTING_DANGER,
            choices_made: 0,
            pending_choices: Vec::new(),
            images: Vec::new(),
            videos: Vec::new(),
            music: Vec::new(),
            uncommitted_events: Vec::new(),
        }
    }

    /// Opens the adventure.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the session already started.
    pub fn start(
        &mut self,
        request: &str,
        story_type: StoryType,
        scenario: Scenario,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.started {
            return Err(DomainError::Validation(format!(
                "story session {} has already started",
                self.id
            )));
        }
        let kind = StoryEventKind::StoryStarted(StoryStarted {
            request: request.to_owned(),
            story_type,
            arc_theme: ArcTheme::for_story(story_type, request),
            scenario,
        });
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Puts three options to the player.
    ///
    /// # Errors
    ///
    /// Returns an error if the story is not playable.
    pub fn present_choices(
        &mut self,
        situation: String,
        choices: Vec<String>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_playable()?;
        let kind = StoryEventKind::ChoicesPresented(ChoicesPresented { situation, choices });
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Records the narrated outcome of the player's choice.
    ///
    /// # Errors
    ///
    /// Returns an error if the story is not playable.
    pub fn resolve_choice(
        &mut self,
        choice: String,
        narrative: String,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_playable()?;
        let kind = StoryEventKind::ChoiceResolved(ChoiceResolved { choice, narrative });
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Escalates to the next scripted beat.
    ///
    /// # Errors
    ///
    /// Returns an error if the story is not playable.
    pub fn continue_narrative(
        &mut self,
        beat: Beat,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_playable()?;
        let kind = StoryEventKind::NarrativeContinued(NarrativeContinued {
            scene: beat.scene,
            narrative: beat.narrative,
            new_character: beat.new_character,
            danger_level: beat.danger_level,
        });
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Ends the story.
    ///
    /// # Errors
    ///
    /// Returns an error if the story is not playable.
    pub fn conclude(
        &mut self,
        final_choice: String,
        completion_message: String,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.ensure_playable()?;
        let kind = StoryEventKind::StoryConcluded(StoryConcluded {
            final_choice,
            completion_message,
        });
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Notes a file generated for this session. Allowed after the finale so
    /// the gallery can keep growing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if the session never started.
    pub fn record_media(
        &mut self,
        kind: MediaKind,
        filename: String,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if !self.started {
            return Err(DomainError::SessionNotFound(self.id));
        }
        let kind = StoryEventKind::MediaGenerated(MediaGenerated { kind, filename });
        self.record(kind, correlation_id, clock);
        Ok(())
    }

    /// Provider-facing summary of the story so far.
    #[must_use]
    pub fn context(&self) -> StoryContext<'_> {
        StoryContext {
            scene: &self.current_scene,
            mood: &self.current_mood,
            characters: &self.characters_present,
            events: self.history.len(),
            danger_level: self.danger_level,
            choices_made: self.choices_made,
        }
    }

    /// The last `n` narrative beats, oldest first.
    #[must_use]
    pub fn recent_history(&self, n: usize) -> &[String] {
        &self.history[self.history.len().saturating_sub(n)..]
    }

    /// Files of `kind` generated for this session.
    #[must_use]
    pub fn media(&self, kind: MediaKind) -> &[String] {
        match kind {
            MediaKind::Image => &self.images,
            MediaKind::Video => &self.videos,
            MediaKind::Music => &self.music,
        }
    }

    /// Choices still to be made.
    #[must_use]
    pub fn choices_remaining(&self) -> u32 {
        TOTAL_CHOICES.saturating_sub(self.choices_made)
    }

    /// The end-of-story summary.
    #[must_use]
    pub fn completion_message(&self, finale_video: bool) -> String {
        format!(
            "EPIC STORY COMPLETE!\n\n\
             Your adventure has reached its cinematic conclusion! Through {events} dramatic \
             events, you've shaped a unique story that will be remembered.\n\n\
             Characters met: {characters}\n\
             Major choices made: {choices}\n\
             Media generated: {images} images, {videos} videos, {music} music tracks\n\
             Finale video: {video_status}",
            events = self.history.len() + 1,
            characters = self.characters_present.len(),
            choices = self.choices_made,
            images = self.images.len(),
            videos = self.videos.len(),
            music = self.music.len(),
            video_status = if finale_video { "generated" } else { "unavailable" },
        )
    }

    fn ensure_playable(&self) -> Result<(), DomainError> {
        if !self.started {
            return Err(DomainError::SessionNotFound(self.id));
        }
        if self.complete {
            return Err(DomainError::StoryComplete(self.id));
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    /// Builds the event, applies it to in-memory state and queues it for
    /// persistence. `version` only moves when events are replayed.
    fn record(&mut self, kind: StoryEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let mut event = StoryEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: String::new(),
                session_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        event.metadata.event_type = event.event_type().to_owned();
        self.mutate(&event.kind);
        self.uncommitted_events.push(event);
    }

    fn mutate(&mut self, kind: &StoryEventKind) {
        match kind {
            StoryEventKind::StoryStarted(payload) => {
                self.started = true;
                self.story_type = Some(payload.story_type);
                self.arc_theme = payload.arc_theme;
                self.current_scene.clone_from(&payload.scenario.setting);
                self.current_mood = DEFAULT_TONE.to_owned();
                self.art_style.clone_from(&payload.scenario.visual_style);
                self.danger_level = STARTING_DANGER;
                self.choices_made = 0;
                self.history.push(payload.scenario.hook.clone());
                self.scenario = Some(payload.scenario.clone());
            }
            StoryEventKind::ChoicesPresented(payload) => {
                self.pending_choices.clone_from(&payload.choices);
                self.history.push(payload.situation.clone());
            }
            StoryEventKind::ChoiceResolved(payload) => {
                self.pending_choices.clear();
                self.choices_made += 1;
                self.danger_level = (self.danger_level + 1).min(MAX_DANGER);
                self.history.push(payload.narrative.clone());
            }
            StoryEventKind::NarrativeContinued(payload) => {
                self.current_scene.clone_from(&payload.scene);
                self.danger_level = payload.danger_level;
                if let Some(character) = &payload.new_character
                    && !self.characters_present.contains(character)
                {
                    self.characters_present.push(character.clone());
                }
                self.history.push(payload.narrative.clone());
            }
            StoryEventKind::StoryConcluded(payload) => {
                self.complete = true;
                self.pending_choices.clear();
                self.danger_level = MAX_DANGER;
                self.history.push(payload.completion_message.clone());
            }
            StoryEventKind::MediaGenerated(payload) => match payload.kind {
                MediaKind::Image => self.images.push(payload.filename.clone()),
                MediaKind::Video => self.videos.push(payload.filename.clone()),
                MediaKind::Music => self.music.push(payload.filename.clone()),
            },
        }
    }
}

impl AggregateRoot for StorySession {
    type Event = StoryEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        self.mutate(&event.kind);
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dreamdirector_core::aggregate::AggregateRoot;
    use dreamdirector_core::event::DomainEvent;
    use dreamdirector_test_support::{FixedClock, fixed_now};

    use crate::domain::arc::beat_after;
    use crate::domain::scenario;

    fn started(request: &str) -> StorySession {
        let mut session = StorySession::new(Uuid::new_v4());
        let (story_type, scenario) = scenario::select(request);
        session
            .start(request, story_type, scenario, Uuid::new_v4(), &FixedClock::default())
            .unwrap();
        session
    }

    #[test]
    fn test_start_produces_story_started_event() {
        // Arrange
        let session_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let clock = FixedClock::default();
        let mut session = StorySession::new(session_id);
        let (story_type, scenario) = scenario::select("a detective case");

        // Act
        session
            .start("a detective case", story_type, scenario, correlation_id, &clock)
            .unwrap();

        // Assert
        let events = session.uncommitted_events();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.event_type(), "story.started");
        let meta = event.metadata();
        assert_eq!(meta.event_type, "story.started");
        assert_eq!(meta.session_id, session_id);
        assert_eq!(meta.sequence_number, 1);
        assert_eq!(meta.correlation_id, correlation_id);
        assert_eq!(meta.occurred_at, fixed_now());
        assert!(session.current_scene.starts_with("Neo-Tokyo"));
        assert_eq!(session.arc_theme, ArcTheme::Cyberpunk);
        assert_eq!(session.version(), 0);
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut session = started("forest");
        let (story_type, scenario) = scenario::select("forest");
        let clock = FixedClock::default();

        let result = session.start("forest", story_type, scenario, Uuid::new_v4(), &clock);

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_resolve_choice_counts_choice_and_raises_danger() {
        let mut session = started("forest");

        session
            .resolve_choice(
                "Call out boldly".into(),
                "The grove answers.".into(),
                Uuid::new_v4(),
                &FixedClock::default(),
            )
            .unwrap();

        assert_eq!(session.choices_made, 1);
        assert_eq!(session.danger_level, 2);
        assert_eq!(session.choices_remaining(), 4);
        assert_eq!(session.uncommitted_events()[1].metadata.sequence_number, 2);
    }

    #[test]
    fn test_continue_narrative_moves_scene_and_adds_character_once() {
        let mut session = started("forest");
        let clock = FixedClock::default();
        let beat = beat_after(ArcTheme::Forest, 2, &session.current_scene).unwrap();

        session
            .continue_narrative(beat.clone(), Uuid::new_v4(), &clock)
            .unwrap();
        session
            .continue_narrative(beat, Uuid::new_v4(), &clock)
            .unwrap();

        assert!(session.current_scene.starts_with("The Shadowrealm"));
        assert_eq!(session.characters_present.len(), 1);
        assert_eq!(session.danger_level, 7);
    }

    #[test]
    fn test_unstarted_session_is_not_playable() {
        let mut session = StorySession::new(Uuid::new_v4());

        let clock = FixedClock::default();

        let result = session.resolve_choice("x".into(), "y".into(), Uuid::new_v4(), &clock);

        assert!(matches!(result, Err(DomainError::SessionNotFound(_))));
    }

    #[test]
    fn test_concluded_story_rejects_choices_but_accepts_media() {
        let mut session = started("dragon");
        let clock = FixedClock::default();
        session
            .conclude("Choose wisdom".into(), "The end".into(), Uuid::new_v4(), &clock)
            .unwrap();

        let choice = session.resolve_choice("again".into(), "n".into(), Uuid::new_v4(), &clock);
        let media = session.record_media(
            MediaKind::Video,
            "generated_video_1.mp4".into(),
            Uuid::new_v4(),
            &clock,
        );

        assert!(matches!(choice, Err(DomainError::StoryComplete(_))));
        assert!(media.is_ok());
        assert_eq!(session.media(MediaKind::Video), ["generated_video_1.mp4"]);
        assert_eq!(session.danger_level, MAX_DANGER);
    }

    #[test]
    fn test_apply_replays_state_and_counts_version() {
        let source = started("forest");
        let mut replayed = StorySession::new(source.id);

        for event in source.uncommitted_events() {
            replayed.apply(event);
        }

        assert_eq!(replayed.version(), 1);
        assert!(replayed.uncommitted_events().is_empty());
        assert_eq!(replayed.current_scene, source.current_scene);
        assert_eq!(replayed.recent_history(5).len(), 1);
    }
}
