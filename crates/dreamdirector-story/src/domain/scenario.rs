//! Opening scenarios, picked from keywords in the player's story request.

use serde::{Deserialize, Serialize};

/// Broad genre of an adventure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryType {
    /// Neon noir in Neo-Tokyo.
    Cyberpunk,
    /// Dragons and ancient magic.
    Fantasy,
    /// Enchanted forests.
    Mystical,
    /// Anything else; the setting is built from the request itself.
    Adventure,
}

impl StoryType {
    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StoryType::Cyberpunk => "cyberpunk",
            StoryType::Fantasy => "fantasy",
            StoryType::Mystical => "mystical",
            StoryType::Adventure => "adventure",
        }
    }
}

/// The world an adventure opens in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Display title.
    pub title: String,
    /// Where the story opens; becomes the first scene.
    pub setting: String,
    /// The opening line of narrative.
    pub hook: String,
    /// Notable characters of the world.
    pub characters: Vec<String>,
    /// Art direction carried into every image and video prompt.
    pub visual_style: String,
    /// Musical motifs for the soundtrack.
    pub music_themes: Vec<String>,
    /// Choices offered when the text provider cannot supply any.
    pub choices: Vec<String>,
}

struct Template {
    title: &'static str,
    setting: &'static str,
    hook: &'static str,
    characters: &'static [&'static str],
    visual_style: &'static str,
    music_themes: &'static [&'static str],
    choices: &'static [&'static str],
}

impl Template {
    fn build(&self) -> Scenario {
        Scenario {
            title: self.title.to_owned(),
            setting: self.setting.to_owned(),
            hook: self.hook.to_owned(),
            characters: owned(self.characters),
            visual_style: self.visual_style.to_owned(),
            music_themes: owned(self.music_themes),
            choices: owned(self.choices),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

const CYBERPUNK_NOIR: Template = Template {
    title: "Cyberpunk Detective Noir",
    setting: "Neo-Tokyo 2087: A rain-soaked metropolis where corporate zaibatsus control reality through neural implants",
    hook: "You're a rogue detective investigating the mysterious 'Serpent's Eye' conspiracy in the digital underground",
    characters: &[
        "Kira Nakamura - Cybernetic hacker with secrets",
        "Director Sato - Corporate overseer with hidden agenda",
    ],
    visual_style: "cyberpunk noir with neon highlights and atmospheric rain",
    music_themes: &["Synthwave noir", "Corporate tension", "Underground resistance"],
    choices: &[
        "Infiltrate the corporate tower",
        "Meet with underground contacts",
        "Investigate the abandoned subway",
    ],
};

const ENCHANTED_FOREST: Template = Template {
    title: "Enchanted Forest Mystery",
    setting: "An ancient forest where magic flows through twisted trees and glowing flowers",
    hook: "You discover a hidden grove where a mysterious figure guards the Pool of Fates",
    characters: &[
        "Fate Weaver - Ancient guardian with cryptic wisdom",
        "Flickering Flame - Playful forest spirit",
    ],
    visual_style: "mystical fantasy with ethereal lighting and magical particles",
    music_themes: &["Mystical forest ambience", "Ancient magic", "Ethereal wonder"],
    choices: &[
        "Approach the guardian peacefully",
        "Observe from the shadows",
        "Call out boldly",
    ],
};

const DRAGONS_LAIR: Template = Template {
    title: "Dragon's Lair Confrontation",
    setting: "The volcanic lair of an ancient dragon filled with treasures and dangerous magic",
    hook: "The dragon offers you a choice: great power or great wisdom, but not both",
    characters: &[
        "Pyraxis the Ancient - Wise but dangerous dragon",
        "Echo - Dragon's mysterious companion",
    ],
    visual_style: "epic fantasy with dramatic fire lighting and volcanic atmosphere",
    music_themes: &["Epic orchestral drama", "Dragon's ancient power", "Volcanic ambience"],
    choices: &["Accept the power", "Choose wisdom", "Propose an alternative"],
};

/// Picks the scenario for a story request.
///
/// Keywords are checked in priority order: `cyberpunk`/`detective`, then
/// `fantasy`/`knight`/`dragon`, then `forest`/`magic`. Anything else gets a
/// custom adventure whose setting quotes the request.
#[must_use]
pub fn select(request: &str) -> (StoryType, Scenario) {
    let lower = request.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if mentions(&["cyberpunk", "detective"]) {
        (StoryType::Cyberpunk, CYBERPUNK_NOIR.build())
    } else if mentions(&["fantasy", "knight", "dragon"]) {
        (StoryType::Fantasy, DRAGONS_LAIR.build())
    } else if mentions(&["forest", "magic"]) {
        (StoryType::Mystical, ENCHANTED_FOREST.build())
    } else {
        (StoryType::Adventure, custom(request))
    }
}

fn custom(request: &str) -> Scenario {
    Scenario {
        title: "Custom Adventure".to_owned(),
        setting: format!("An immersive world based on: {request}"),
        hook: "Your adventure begins with an intriguing mystery that draws you in...".to_owned(),
        characters: vec!["Mysterious Guide".to_owned(), "Helpful Ally".to_owned()],
        visual_style: "cinematic realism with atmospheric lighting".to_owned(),
        music_themes: vec![
            "Adventure atmosphere".to_owned(),
            "Mystery and discovery".to_owned(),
        ],
        choices: vec![
            "Investigate boldly".to_owned(),
            "Proceed cautiously".to_owned(),
            "Seek allies first".to_owned(),
        ],
    }
}
