//! Command handlers for story sessions.
//!
//! Each handler loads the session, drives the generative providers, records
//! what happened on the aggregate and appends the resulting events. Provider
//! calls never hold the session store; concurrent commands on one session
//! surface as `DomainError::ConcurrencyConflict` at append time.

use chrono::{DateTime, Utc};
use dreamdirector_core::aggregate::AggregateRoot;
use dreamdirector_core::clock::Clock;
use dreamdirector_core::error::DomainError;
use dreamdirector_core::event::{DomainEvent, EventMetadata};
use dreamdirector_core::media::{MediaKind, MediaStore, media_url};
use dreamdirector_core::provider::{ProviderError, ProviderSet};
use dreamdirector_core::repository::{EventRepository, StoredEvent};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::aggregates::StorySession;
use crate::domain::arc::{TOTAL_CHOICES, beat_after, is_final_choice};
use crate::domain::commands::{GenerateMedia, MakeChoice, StartStory};
use crate::domain::events::{StoryEvent, StoryEventKind};
use crate::domain::prompts::{self, DEFAULT_TONE};
use crate::domain::scenario;

/// Art direction for media requested outside any session.
pub const DEFAULT_ART_STYLE: &str = "cinematic realism with atmospheric lighting";

/// Recent beats quoted back to the text provider.
const HISTORY_WINDOW: usize = 3;

/// Filenames returned with a media generation response.
const RECENT_FILES: usize = 5;

/// One entry of the step-by-step story log returned after a choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionEntry {
    /// `choice_result`, `story_continuation`, `new_situation` or `story_climax`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Narrative text.
    pub content: String,
    /// When the entry was produced.
    pub timestamp: DateTime<Utc>,
}

/// The story as shown to the player after a start or a choice.
#[derive(Debug, Clone, Serialize)]
pub struct StoryTurnView {
    /// Session to pass back with the next choice.
    pub session_id: Uuid,
    /// Narrative for this turn.
    pub narrative: String,
    /// Options for the next choice; empty once the story is complete.
    pub choices: Vec<String>,
    /// Current scene.
    pub scene_description: String,
    /// Current mood.
    pub mood: String,
    /// `opening_scene`, `scene_{n}` or `finale`.
    pub scene_id: String,
    /// Whether the finale has happened.
    pub story_complete: bool,
    /// What happened during this turn, in order.
    pub story_progression: Vec<ProgressionEntry>,
    /// Choices still to be made.
    pub choices_remaining: u32,
    /// Choices made so far.
    pub current_choice: u32,
    /// Choices per adventure.
    pub total_choices: u32,
}

/// Outcome of an on-demand media generation.
#[derive(Debug, Clone, Serialize)]
pub struct MediaGenerationView {
    /// Always `success`; failures are errors.
    pub status: &'static str,
    /// What was requested.
    pub requested: MediaKind,
    /// What was produced; a video request may yield an image.
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// How the file was produced.
    pub method: &'static str,
    /// Human-readable summary.
    pub message: String,
    /// Stored file name.
    pub filename: String,
    /// Where the file is served.
    pub url: String,
    /// Files of the produced kind in the library.
    pub total_files: usize,
    /// The most recent files of the produced kind, oldest first.
    pub all_files: Vec<String>,
}

fn to_stored_event(event: &StoryEvent) -> StoredEvent {
    let meta = event.metadata();
    StoredEvent {
        event_id: meta.event_id,
        session_id: meta.session_id,
        event_type: event.event_type().to_owned(),
        payload: event.to_payload(),
        sequence_number: meta.sequence_number,
        correlation_id: meta.correlation_id,
        occurred_at: meta.occurred_at,
    }
}

/// Reconstitutes a `StorySession` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    session_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<StorySession, DomainError> {
    let mut session = StorySession::new(session_id);
    for stored in existing_events {
        let kind: StoryEventKind =
            serde_json::from_value(stored.payload.clone()).map_err(|e| {
                DomainError::Infrastructure(format!("event deserialization failed: {e}"))
            })?;
        let event = StoryEvent {
            metadata: EventMetadata {
                event_id: stored.event_id,
                event_type: stored.event_type.clone(),
                session_id: stored.session_id,
                sequence_number: stored.sequence_number,
                correlation_id: stored.correlation_id,
                occurred_at: stored.occurred_at,
            },
            kind,
        };
        session.apply(&event);
    }
    Ok(session)
}

/// Loads a session that must already exist.
async fn load_session(
    session_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<StorySession, DomainError> {
    let existing_events = repo.load_events(session_id).await?;
    if existing_events.is_empty() {
        return Err(DomainError::SessionNotFound(session_id));
    }
    reconstitute(session_id, &existing_events)
}

async fn persist(session: &StorySession, repo: &dyn EventRepository) -> Result<(), DomainError> {
    let stored_events: Vec<StoredEvent> = session
        .uncommitted_events()
        .iter()
        .map(to_stored_event)
        .collect();
    if stored_events.is_empty() {
        return Ok(());
    }
    repo.append_events(session.id, session.version(), &stored_events)
        .await
}

/// Calls the provider for `kind` and stores the returned bytes.
async fn render(
    kind: MediaKind,
    prompt: &str,
    label: &str,
    providers: &ProviderSet,
    media: &dyn MediaStore,
) -> Result<String, DomainError> {
    let asset = match kind {
        MediaKind::Image => providers.image.generate_image(prompt).await,
        MediaKind::Video => providers.video.generate_video(prompt).await,
        MediaKind::Music => providers.music.generate_music(prompt).await,
    }?;
    if asset.bytes.is_empty() {
        return Err(ProviderError::Empty.into());
    }
    media.save(kind, label, &asset.bytes).await
}

/// Everything a story beat needs to render media.
struct Crew<'a> {
    providers: &'a ProviderSet,
    media: &'a dyn MediaStore,
    clock: &'a dyn Clock,
    correlation_id: Uuid,
}

impl Crew<'_> {
    /// Renders media for a story beat. Failures are logged and swallowed;
    /// a story never stalls on a missing picture.
    async fn shoot(
        &self,
        session: &mut StorySession,
        kind: MediaKind,
        prompt: &str,
        label: &str,
    ) -> bool {
        match render(kind, prompt, label, self.providers, self.media).await {
            Ok(filename) => {
                info!(session_id = %session.id, %kind, %filename, "media generated");
                match session.record_media(kind, filename, self.correlation_id, self.clock) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(
                            session_id = %session.id,
                            %kind,
                            error = %e,
                            "media recording failed"
                        );
                        false
                    }
                }
            }
            Err(e) => {
                warn!(session_id = %session.id, %kind, error = %e, "media generation failed");
                false
            }
        }
    }
}

/// Asks the text provider for three choices, filling gaps from the
/// scenario's defaults.
async fn next_choices(
    session: &StorySession,
    situation: &str,
    providers: &ProviderSet,
) -> Vec<String> {
    let prompt = prompts::choice_prompt(&session.context(), situation);
    let response = match providers.text.generate_text(&prompt).await {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(
                session_id = %session.id,
                error = %e,
                "choice generation failed, using scenario defaults"
            );
            None
        }
    };
    let fallback = session
        .scenario
        .as_ref()
        .map(|s| s.choices.clone())
        .unwrap_or_default();
    prompts::choices_or_fallback(response.as_deref(), &fallback)
}

/// Handles the `StartStory` command: selects the scenario, renders the
/// establishing shot, presents the first choices and persists the session.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank request, or a repository
/// error if the session cannot be stored.
pub async fn handle_start_story(
    command: &StartStory,
    providers: &ProviderSet,
    media: &dyn MediaStore,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<StoryTurnView, DomainError> {
    let request = command.request.trim();
    if request.is_empty() {
        return Err(DomainError::Validation("story request must not be empty".into()));
    }

    let existing_events = repo.load_events(command.session_id).await?;
    let mut session = reconstitute(command.session_id, &existing_events)?;

    let (story_type, scenario) = scenario::select(request);
    info!(
        session_id = %command.session_id,
        story_type = story_type.as_str(),
        title = %scenario.title,
        "starting story"
    );
    let hook = scenario.hook.clone();
    let details = scenario.characters.join(", ");
    session.start(request, story_type, scenario, command.correlation_id, clock)?;

    let establishing = prompts::establishing_image_prompt(
        &session.current_scene,
        &session.current_mood,
        &details,
        &session.art_style,
    );
    let crew = Crew {
        providers,
        media,
        clock,
        correlation_id: command.correlation_id,
    };
    crew.shoot(&mut session, MediaKind::Image, &establishing, "opening")
        .await;

    let situation = prompts::situation(&session.current_scene);
    let choices = next_choices(&session, &situation, providers).await;
    session.present_choices(situation.clone(), choices.clone(), command.correlation_id, clock)?;

    persist(&session, repo).await?;

    Ok(StoryTurnView {
        session_id: session.id,
        narrative: format!("{hook} {situation}"),
        choices,
        scene_description: session.current_scene.clone(),
        mood: session.current_mood.clone(),
        scene_id: "opening_scene".to_owned(),
        story_complete: false,
        story_progression: Vec::new(),
        choices_remaining: session.choices_remaining(),
        current_choice: session.choices_made,
        total_choices: TOTAL_CHOICES,
    })
}

/// Handles the `MakeChoice` command: narrates the outcome, then either
/// escalates the arc and presents new choices or plays the finale.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank choice,
/// `DomainError::SessionNotFound` for an unknown session,
/// `DomainError::StoryComplete` once the finale has happened, or a
/// repository error if the session cannot be stored.
pub async fn handle_make_choice(
    command: &MakeChoice,
    providers: &ProviderSet,
    media: &dyn MediaStore,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<StoryTurnView, DomainError> {
    let choice = command.choice.trim();
    if choice.is_empty() {
        return Err(DomainError::Validation("choice must not be empty".into()));
    }

    let mut session = load_session(command.session_id, repo).await?;
    if session.complete {
        return Err(DomainError::StoryComplete(session.id));
    }

    let prompt = prompts::outcome_prompt(
        &session.context(),
        session.recent_history(HISTORY_WINDOW),
        choice,
    );
    let narrative = match providers.text.generate_text(&prompt).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_owned(),
        Ok(_) => prompts::fallback_outcome(choice, &session.current_scene),
        Err(e) => {
            warn!(
                session_id = %session.id,
                error = %e,
                "outcome generation failed, using fallback narrative"
            );
            prompts::fallback_outcome(choice, &session.current_scene)
        }
    };

    let outcome_image =
        prompts::outcome_image_prompt(choice, &session.current_scene, &session.art_style);
    let crew = Crew {
        providers,
        media,
        clock,
        correlation_id: command.correlation_id,
    };
    crew.shoot(&mut session, MediaKind::Image, &outcome_image, "outcome")
        .await;

    session.resolve_choice(choice.to_owned(), narrative.clone(), command.correlation_id, clock)?;
    let mut story_progression = vec![ProgressionEntry {
        kind: "choice_result",
        content: narrative.clone(),
        timestamp: clock.now(),
    }];

    let view = if is_final_choice(session.choices_made) {
        let climax = play_finale(&mut session, choice, &crew).await?;
        story_progression.push(climax);
        StoryTurnView {
            session_id: session.id,
            narrative,
            choices: Vec::new(),
            scene_description: format!("{} - FINALE", session.current_scene),
            mood: session.current_mood.clone(),
            scene_id: "finale".to_owned(),
            story_complete: true,
            story_progression,
            choices_remaining: 0,
            current_choice: session.choices_made,
            total_choices: TOTAL_CHOICES,
        }
    } else {
        if let Some(beat) =
            beat_after(session.arc_theme, session.choices_made, &session.current_scene)
        {
            story_progression.push(ProgressionEntry {
                kind: "story_continuation",
                content: beat.narrative.clone(),
                timestamp: clock.now(),
            });
            session.continue_narrative(beat, command.correlation_id, clock)?;
        }

        let situation = prompts::situation(&session.current_scene);
        let choices = next_choices(&session, &situation, providers).await;
        session.present_choices(situation.clone(), choices.clone(), command.correlation_id, clock)?;
        story_progression.push(ProgressionEntry {
            kind: "new_situation",
            content: situation,
            timestamp: clock.now(),
        });

        StoryTurnView {
            session_id: session.id,
            narrative,
            choices,
            scene_description: session.current_scene.clone(),
            mood: session.current_mood.clone(),
            scene_id: format!("scene_{}", session.choices_made),
            story_complete: false,
            story_progression,
            choices_remaining: session.choices_remaining(),
            current_choice: session.choices_made,
            total_choices: TOTAL_CHOICES,
        }
    };

    persist(&session, repo).await?;
    info!(
        session_id = %session.id,
        choices_made = session.choices_made,
        story_complete = view.story_complete,
        "choice resolved"
    );
    Ok(view)
}

/// Finale video, a backup still and the closing track, then the
/// completion message.
async fn play_finale(
    session: &mut StorySession,
    final_choice: &str,
    crew: &Crew<'_>,
) -> Result<ProgressionEntry, DomainError> {
    let scene = session.current_scene.clone();
    let art_style = session.art_style.clone();

    let video_prompt = prompts::climax_video_prompt(final_choice, &scene, &art_style);
    let finale_video = crew
        .shoot(session, MediaKind::Video, &video_prompt, "finale")
        .await;

    let backup_prompt = prompts::establishing_image_prompt(
        &scene,
        "climactic",
        &format!("Final confrontation: {final_choice}"),
        &art_style,
    );
    crew.shoot(session, MediaKind::Image, &backup_prompt, "finale")
        .await;

    let music_prompt = prompts::music_prompt(&scene, "dramatic");
    crew.shoot(session, MediaKind::Music, &music_prompt, "finale")
        .await;

    let completion_message = session.completion_message(finale_video);
    let climax = ProgressionEntry {
        kind: "story_climax",
        content: completion_message.clone(),
        timestamp: crew.clock.now(),
    };
    session.conclude(
        final_choice.to_owned(),
        completion_message,
        crew.correlation_id,
        crew.clock,
    )?;
    Ok(climax)
}

/// Handles the `GenerateMedia` command. Video falls back to a cinematic
/// still when the video provider fails.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank prompt,
/// `DomainError::SessionNotFound` for an unknown session,
/// `DomainError::Provider` when the final generation attempt fails, or a
/// storage error.
pub async fn handle_generate_media(
    command: &GenerateMedia,
    providers: &ProviderSet,
    media: &dyn MediaStore,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<MediaGenerationView, DomainError> {
    let prompt = command.prompt.trim();
    if prompt.is_empty() {
        return Err(DomainError::Validation("media prompt must not be empty".into()));
    }
    let tone = match command.emotional_tone.trim() {
        "" => DEFAULT_TONE,
        tone => tone,
    };

    let mut session = match command.session_id {
        Some(id) => Some(load_session(id, repo).await?),
        None => None,
    };
    let art_style = session
        .as_ref()
        .map_or(DEFAULT_ART_STYLE, |s| s.art_style.as_str())
        .to_owned();

    let (kind, method, filename) = match command.kind {
        MediaKind::Image => {
            let full = prompts::establishing_image_prompt(prompt, tone, "", &art_style);
            let filename = render(MediaKind::Image, &full, "custom", providers, media).await?;
            (MediaKind::Image, "image_generation", filename)
        }
        MediaKind::Music => {
            let full = prompts::music_prompt(prompt, tone);
            let filename = render(MediaKind::Music, &full, "custom", providers, media).await?;
            (MediaKind::Music, "music_generation", filename)
        }
        MediaKind::Video => {
            let full = prompts::direct_video_prompt(&format!("{prompt}. Style: {art_style}"), tone);
            match render(MediaKind::Video, &full, "custom", providers, media).await {
                Ok(filename) => (MediaKind::Video, "direct_video_generation", filename),
                Err(e) => {
                    warn!(error = %e, "video generation failed, falling back to image");
                    let still = prompts::establishing_image_prompt(
                        prompt,
                        tone,
                        "Cinematic key frame",
                        &art_style,
                    );
                    let filename =
                        render(MediaKind::Image, &still, "custom", providers, media).await?;
                    (MediaKind::Image, "fallback_to_image", filename)
                }
            }
        }
    };
    info!(requested = %command.kind, produced = %kind, %filename, "media generated on demand");

    if let Some(session) = session.as_mut() {
        session.record_media(kind, filename.clone(), command.correlation_id, clock)?;
        persist(session, repo).await?;
    }

    let files = media.list(kind).await?;
    let recent = files[files.len().saturating_sub(RECENT_FILES)..].to_vec();
    let message = if kind == command.kind {
        format!("{} generated successfully", capitalize(kind.as_str()))
    } else {
        "Generated a cinematic image because video generation is unavailable".to_owned()
    };

    Ok(MediaGenerationView {
        status: "success",
        requested: command.kind,
        kind,
        method,
        message,
        url: media_url(&filename),
        filename,
        total_files: files.len(),
        all_files: recent,
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
