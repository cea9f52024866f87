//! Runs user actions against the backend and folds the results into the
//! store.
//!
//! Every action follows one shape: mark the store as generating, make a
//! single request, record the result and a notification, clear the flag and
//! save a snapshot. A failed request leaves the story and media untouched.

use std::sync::Arc;
use std::time::Duration;

use dreamdirector_core::clock::Clock;
use dreamdirector_core::media::{GeneratedMediaItem, MediaKind, media_url};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::{ApiClient, MediaFiles};
use crate::config::MEDIA_REFRESH_DELAYS;
use crate::error::ClientError;
use crate::persistence::SnapshotStore;
use crate::store::{Action, Notification, NotificationKind, StoreState};

/// Tone used for on-demand media when no story sets one.
const DEFAULT_TONE: &str = "mysterious";

/// Owns the store and drives it from user actions.
pub struct Director {
    state: StoreState,
    api: ApiClient,
    snapshots: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    refresh_delays: Vec<Duration>,
    refresh_tx: mpsc::UnboundedSender<MediaFiles>,
    refresh_rx: mpsc::UnboundedReceiver<MediaFiles>,
}

impl std::fmt::Debug for Director {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Director")
            .field("state", &self.state)
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}

impl Director {
    /// Restores the saved snapshot, if any. An unreadable snapshot is
    /// logged and ignored.
    pub async fn open(
        api: ApiClient,
        snapshots: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let state = match snapshots.load().await {
            Ok(Some(snapshot)) => {
                info!("restored saved story");
                StoreState::from_snapshot(snapshot)
            }
            Ok(None) => StoreState::default(),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable snapshot");
                StoreState::default()
            }
        };
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        Self {
            state,
            api,
            snapshots,
            clock,
            refresh_delays: MEDIA_REFRESH_DELAYS.to_vec(),
            refresh_tx,
            refresh_rx,
        }
    }

    /// Replaces the delays used for background media refreshes. No delays
    /// means no background refresh.
    #[must_use]
    pub fn with_refresh_delays(mut self, delays: Vec<Duration>) -> Self {
        self.refresh_delays = delays;
        self
    }

    /// Current store state.
    #[must_use]
    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// The backend client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Starts a new story. Blank input does nothing and returns `false`.
    ///
    /// # Errors
    ///
    /// Returns the request's `ClientError` after posting an error
    /// notification.
    pub async fn start_story(&mut self, prompt: &str) -> Result<bool, ClientError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(false);
        }

        self.dispatch(Action::SetGenerating(true));
        let outcome = match self.api.start_story(prompt).await {
            Ok(story) => {
                info!(session_id = %story.session_id, "story started");
                let message = format!("Your story begins in {}", story.scene_description);
                self.dispatch(Action::SetCurrentStory(story));
                self.dispatch(Action::SetStoryActive(true));
                self.notify(NotificationKind::Success, message);
                self.schedule_refresh();
                Ok(true)
            }
            Err(e) => Err(self.fail(e)),
        };
        self.finish().await;
        outcome
    }

    /// Sends the player's choice. Blank input, or no story in play, does
    /// nothing and returns `false`.
    ///
    /// # Errors
    ///
    /// Returns the request's `ClientError` after posting an error
    /// notification.
    pub async fn make_choice(&mut self, choice: &str) -> Result<bool, ClientError> {
        let choice = choice.trim();
        if choice.is_empty() {
            return Ok(false);
        }
        let Some((session_id, complete)) = self
            .state
            .current_story
            .as_ref()
            .map(|s| (s.session_id, s.story_complete))
        else {
            self.notify(NotificationKind::Warning, "Start a story first");
            return Ok(false);
        };
        if complete {
            self.notify(NotificationKind::Info, "This story is complete. Start a new one!");
            return Ok(false);
        }

        self.dispatch(Action::SetGenerating(true));
        let outcome = match self.api.make_choice(session_id, choice).await {
            Ok(story) => {
                let message = if story.story_complete {
                    "Your story is complete!".to_owned()
                } else {
                    format!(
                        "Choice {} of {} made",
                        story.current_choice, story.total_choices
                    )
                };
                self.dispatch(Action::SetCurrentStory(story));
                self.notify(NotificationKind::Success, message);
                self.schedule_refresh();
                Ok(true)
            }
            Err(e) => Err(self.fail(e)),
        };
        self.finish().await;
        outcome
    }

    /// Generates one media file, styled after the story in play when there
    /// is one. Blank input does nothing and returns `false`.
    ///
    /// # Errors
    ///
    /// Returns the request's `ClientError` after posting an error
    /// notification.
    pub async fn generate_media(
        &mut self,
        kind: MediaKind,
        prompt: &str,
    ) -> Result<bool, ClientError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(false);
        }
        let story = self.state.current_story.as_ref();
        let session_id = story.map(|s| s.session_id);
        let tone = story
            .map(|s| s.mood.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_TONE.to_owned());

        self.dispatch(Action::SetGenerating(true));
        let outcome = match self.api.generate_media(kind, prompt, &tone, session_id).await {
            Ok(media) => {
                if !self.state.contains_media(media.kind, &media.filename) {
                    let item = GeneratedMediaItem {
                        id: Uuid::new_v4(),
                        url: media.url,
                        filename: media.filename,
                        kind: media.kind,
                        title: prompt.to_owned(),
                        timestamp: self.clock.now(),
                    };
                    self.dispatch(Action::add_media(item));
                }
                let severity = if media.kind == media.requested {
                    NotificationKind::Success
                } else {
                    NotificationKind::Warning
                };
                self.notify(severity, media.message);
                Ok(true)
            }
            Err(e) => Err(self.fail(e)),
        };
        self.finish().await;
        outcome
    }

    /// Fetches the backend's media list now and appends anything new.
    /// Returns how many items were added.
    ///
    /// # Errors
    ///
    /// Returns the request's `ClientError` after posting an error
    /// notification.
    pub async fn refresh_media(&mut self) -> Result<usize, ClientError> {
        match self.api.media_files().await {
            Ok(files) => {
                let added = self.merge_media(&files);
                self.save().await;
                Ok(added)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Applies media lists delivered by background refreshes. Returns how
    /// many items were added.
    pub async fn apply_pending_refreshes(&mut self) -> usize {
        let mut added = 0;
        while let Ok(files) = self.refresh_rx.try_recv() {
            added += self.merge_media(&files);
        }
        if added > 0 {
            self.save().await;
        }
        added
    }

    /// Drops every video from the gallery.
    pub async fn clear_videos(&mut self) {
        self.dispatch(Action::ClearVideos);
        self.save().await;
    }

    /// Returns to a blank slate and removes the saved snapshot.
    pub async fn reset(&mut self) {
        self.dispatch(Action::Reset);
        if let Err(e) = self.snapshots.clear().await {
            warn!(error = %e, "failed to remove snapshot");
        }
        self.notify(NotificationKind::Info, "Story reset");
    }

    /// Removes and returns all pending notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        let pending = self.state.notifications.clone();
        for notification in &pending {
            self.dispatch(Action::RemoveNotification(notification.id));
        }
        pending
    }

    fn dispatch(&mut self, action: Action) {
        self.state.apply(action);
    }

    fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.dispatch(Action::AddNotification(Notification::new(kind, message)));
    }

    fn fail(&mut self, error: ClientError) -> ClientError {
        warn!(error = %error, "request failed");
        self.notify(NotificationKind::Error, error.user_message());
        error
    }

    async fn finish(&mut self) {
        self.dispatch(Action::SetGenerating(false));
        self.save().await;
    }

    async fn save(&self) {
        if let Err(e) = self.snapshots.save(&self.state.snapshot()).await {
            warn!(error = %e, "failed to save snapshot");
        }
    }

    fn merge_media(&mut self, files: &MediaFiles) -> usize {
        let mut added = 0;
        for kind in MediaKind::ALL {
            for filename in files.of(kind) {
                if self.state.contains_media(kind, filename) {
                    continue;
                }
                let item = GeneratedMediaItem {
                    id: Uuid::new_v4(),
                    url: media_url(filename),
                    filename: filename.clone(),
                    kind,
                    title: title_for(kind, filename),
                    timestamp: self.clock.now(),
                };
                self.dispatch(Action::add_media(item));
                added += 1;
            }
        }
        added
    }

    fn schedule_refresh(&self) {
        if self.refresh_delays.is_empty() {
            return;
        }
        let api = self.api.clone();
        let delays = self.refresh_delays.clone();
        let tx = self.refresh_tx.clone();
        tokio::spawn(async move {
            for delay in delays {
                tokio::time::sleep(delay).await;
                match api.media_files().await {
                    Ok(files) => {
                        if tx.send(files).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(error = %e, "background media refresh failed"),
                }
            }
        });
    }
}

/// `generated_scene_20260115_100000.png` becomes `Image 20260115_100000`.
fn title_for(kind: MediaKind, filename: &str) -> String {
    let stem = filename
        .strip_prefix(kind.file_prefix())
        .unwrap_or(filename);
    let stem = stem.rsplit_once('.').map_or(stem, |(stem, _)| stem);
    let label = match kind {
        MediaKind::Image => "Image",
        MediaKind::Video => "Video",
        MediaKind::Music => "Music",
    };
    format!("{label} {stem}")
}
