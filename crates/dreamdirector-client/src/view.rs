//! Terminal views and command parsing.

use std::fmt::Write as _;

use dreamdirector_core::media::MediaKind;

use crate::api::ApiClient;
use crate::store::{Notification, NotificationKind, StoreState, Story};

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Story prompt.
    #[default]
    Home,
    /// Narrative and choices.
    Story,
    /// Generated media.
    Gallery,
    /// About DreamDirector.
    About,
}

/// A line typed by the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `new <prompt>`: start a story.
    New(String),
    /// `1`, `2` or `3`: pick a listed choice.
    Pick(usize),
    /// Any other text while a story is in play: a free-form choice.
    Choose(String),
    /// `image|video|music <prompt>`.
    Generate(MediaKind, String),
    /// `gallery`.
    Gallery,
    /// `story`.
    Story,
    /// `refresh`: fetch the media list now.
    Refresh,
    /// `clear-videos`.
    ClearVideos,
    /// `reset`.
    Reset,
    /// `about`.
    About,
    /// `help`.
    Help,
    /// `quit` or `exit`.
    Quit,
    /// Nothing typed.
    Empty,
}

impl Command {
    /// Parses one input line.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));
        match word.to_ascii_lowercase().as_str() {
            "" => Self::Empty,
            "new" | "start" => Self::New(rest.to_owned()),
            "image" => Self::Generate(MediaKind::Image, rest.to_owned()),
            "video" => Self::Generate(MediaKind::Video, rest.to_owned()),
            "music" => Self::Generate(MediaKind::Music, rest.to_owned()),
            "gallery" if rest.is_empty() => Self::Gallery,
            "story" if rest.is_empty() => Self::Story,
            "refresh" if rest.is_empty() => Self::Refresh,
            "clear-videos" if rest.is_empty() => Self::ClearVideos,
            "reset" if rest.is_empty() => Self::Reset,
            "about" if rest.is_empty() => Self::About,
            "help" | "?" if rest.is_empty() => Self::Help,
            "quit" | "exit" if rest.is_empty() => Self::Quit,
            "1" | "2" | "3" if rest.is_empty() => Self::Pick(word.parse().unwrap_or(1)),
            _ => Self::Choose(line.to_owned()),
        }
    }
}

/// The choice text for a `Pick`, if the story offers it.
#[must_use]
pub fn picked_choice(story: &Story, index: usize) -> Option<&str> {
    index
        .checked_sub(1)
        .and_then(|i| story.choices.get(i))
        .map(String::as_str)
}

/// Renders `screen` for the current state.
#[must_use]
pub fn render(screen: Screen, state: &StoreState, api: &ApiClient) -> String {
    match screen {
        Screen::Home => render_home(state),
        Screen::Story => match &state.current_story {
            Some(story) => render_story(story),
            None => render_home(state),
        },
        Screen::Gallery => render_gallery(state, api),
        Screen::About => render_about(),
    }
}

fn render_home(state: &StoreState) -> String {
    let mut out = String::from("DREAMDIRECTOR\nDescribe the story you want to live.\n\n");
    out.push_str("  new <your story idea>\n");
    if state.is_story_active {
        out.push_str("  story    return to your adventure\n");
    }
    out.push_str("  gallery  browse generated media\n  about    what this is\n");
    out
}

/// The narrative, what happened this turn, and the numbered choices.
#[must_use]
pub fn render_story(story: &Story) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", story.scene_description);
    let _ = writeln!(
        out,
        "Mood: {}  |  Choice {}/{}",
        story.mood, story.current_choice, story.total_choices
    );
    out.push('\n');
    let _ = writeln!(out, "{}", story.narrative);
    for entry in story
        .story_progression
        .iter()
        .filter(|e| e.kind != "choice_result")
    {
        let _ = writeln!(out, "\n{}", entry.content);
    }
    out.push('\n');
    if story.story_complete {
        out.push_str(
            "THE END. Type `new <idea>` for another story \
             or `gallery` to relive this one.\n",
        );
    } else {
        for (i, choice) in story.choices.iter().enumerate() {
            let _ = writeln!(out, "  {}. {choice}", i + 1);
        }
        let _ = writeln!(
            out,
            "\n{} choices remaining. Pick 1-3 or type your own.",
            story.choices_remaining
        );
    }
    out
}

fn render_gallery(state: &StoreState, api: &ApiClient) -> String {
    let mut out = String::from("GALLERY\n");
    for (heading, kind) in [
        ("Images", MediaKind::Image),
        ("Videos", MediaKind::Video),
        ("Music", MediaKind::Music),
    ] {
        let items = state.media(kind);
        let _ = writeln!(out, "\n{heading} ({})", items.len());
        if items.is_empty() {
            out.push_str("  nothing yet\n");
        }
        for item in items {
            let _ = writeln!(out, "  {}  {}", item.title, api.absolute_url(&item.url));
        }
    }
    out
}

fn render_about() -> String {
    String::from(
        "ABOUT\n\
         DreamDirector turns a one-line idea into a five-choice adventure. \
         A story model writes each scene, and image, video and music models \
         illustrate it. Every file lands in the gallery.\n",
    )
}

/// Help text listing every command.
#[must_use]
pub fn render_help() -> String {
    String::from(
        "Commands:\n\
         \x20 new <prompt>            start a story\n\
         \x20 1 | 2 | 3 | <text>      make a choice\n\
         \x20 image|video|music <p>   generate media\n\
         \x20 story | gallery | about switch view\n\
         \x20 refresh                 fetch new media now\n\
         \x20 clear-videos | reset    clear videos / everything\n\
         \x20 quit\n",
    )
}

/// One line per notification.
#[must_use]
pub fn render_notifications(notifications: &[Notification]) -> String {
    notifications
        .iter()
        .map(|n| {
            let tag = match n.kind {
                NotificationKind::Success => "ok",
                NotificationKind::Error => "error",
                NotificationKind::Info => "info",
                NotificationKind::Warning => "warning",
            };
            format!("[{tag}] {}\n", n.message)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn story(complete: bool) -> Story {
        Story {
            session_id: Uuid::nil(),
            narrative: "The dragon wakes.".to_owned(),
            choices: if complete {
                Vec::new()
            } else {
                vec!["Run".to_owned(), "Hide".to_owned(), "Talk".to_owned()]
            },
            scene_description: "a dragon's lair".to_owned(),
            mood: "tense".to_owned(),
            scene_id: "scene_2".to_owned(),
            story_complete: complete,
            story_progression: Vec::new(),
            choices_remaining: 3,
            current_choice: 2,
            total_choices: 5,
        }
    }

    #[test]
    fn test_parse_recognises_commands() {
        assert_eq!(
            Command::parse("new a haunted lighthouse"),
            Command::New("a haunted lighthouse".into())
        );
        assert_eq!(Command::parse(" 2 "), Command::Pick(2));
        assert_eq!(
            Command::parse("MUSIC rain"),
            Command::Generate(MediaKind::Music, "rain".into())
        );
        assert_eq!(Command::parse("gallery"), Command::Gallery);
        assert_eq!(Command::parse(""), Command::Empty);
        assert_eq!(Command::parse("quit"), Command::Quit);
    }

    #[test]
    fn test_parse_treats_other_text_as_a_choice() {
        assert_eq!(
            Command::parse("reset the trap quietly"),
            Command::Choose("reset the trap quietly".into())
        );
        assert_eq!(Command::parse("4"), Command::Choose("4".into()));
    }

    #[test]
    fn test_picked_choice_is_one_based() {
        let story = story(false);

        assert_eq!(picked_choice(&story, 1), Some("Run"));
        assert_eq!(picked_choice(&story, 3), Some("Talk"));
        assert_eq!(picked_choice(&story, 0), None);
        assert_eq!(picked_choice(&story, 4), None);
    }

    #[test]
    fn test_render_story_numbers_choices() {
        let out = render_story(&story(false));

        assert!(out.contains("== a dragon's lair =="));
        assert!(out.contains("  2. Hide"));
        assert!(out.contains("3 choices remaining"));
    }

    #[test]
    fn test_render_complete_story_has_no_choices() {
        let out = render_story(&story(true));

        assert!(out.contains("THE END"));
        assert!(!out.contains("1."));
    }

    #[test]
    fn test_render_gallery_uses_absolute_urls() {
        let mut state = StoreState::default();
        state.apply(crate::store::Action::AddImage(dreamdirector_core::media::GeneratedMediaItem {
            id: Uuid::nil(),
            url: "/api/media/generated_scene_1.png".to_owned(),
            filename: "generated_scene_1.png".to_owned(),
            kind: MediaKind::Image,
            title: "Opening".to_owned(),
            timestamp: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
        }));
        let api = ApiClient::new("http://localhost:8000");

        let out = render(Screen::Gallery, &state, &api);

        assert!(out.contains("Images (1)"));
        assert!(out.contains("http://localhost:8000/api/media/generated_scene_1.png"));
        assert!(out.contains("Videos (0)"));
    }
}
