//! The scripted five-choice story arc.
//!
//! Every adventure runs for exactly [`TOTAL_CHOICES`] player choices. After
//! each of the first four resolutions the story escalates through a beat
//! that moves the scene, raises the danger level and sometimes introduces a
//! character. The fifth resolution triggers the climax instead.

use serde::{Deserialize, Serialize};

use super::scenario::StoryType;

/// Player choices per adventure.
pub const TOTAL_CHOICES: u32 = 5;

/// Danger ceiling; a finished story always sits here.
pub const MAX_DANGER: u32 = 10;

/// Danger level when an adventure opens.
pub const STARTING_DANGER: u32 = 1;

/// Which escalation script an adventure follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcTheme {
    /// Resistance, corporate tower, neural network, the Serpent's Eye core.
    Cyberpunk,
    /// Throne room, abyssal depths, timestream, the fall.
    Atlantis,
    /// Clearing, Shadowrealm, World Tree, cosmic loom.
    Forest,
    /// Escalation phrased around whatever the current scene is.
    Generic,
}

impl ArcTheme {
    /// Chooses the script once, when the adventure starts. The request text
    /// is consulted because the scripted scenes that follow no longer
    /// mention the original genre.
    #[must_use]
    pub fn for_story(story_type: StoryType, request: &str) -> Self {
        match story_type {
            StoryType::Cyberpunk => ArcTheme::Cyberpunk,
            StoryType::Mystical => ArcTheme::Forest,
            StoryType::Fantasy => ArcTheme::Generic,
            StoryType::Adventure if request.to_lowercase().contains("atlantis") => {
                ArcTheme::Atlantis
            }
            StoryType::Adventure => ArcTheme::Generic,
        }
    }
}

/// One escalation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beat {
    /// Scene the story moves to.
    pub scene: String,
    /// Narrative describing the escalation.
    pub narrative: String,
    /// Character who joins the scene, if any.
    pub new_character: Option<String>,
    /// Danger level after the beat.
    pub danger_level: u32,
}

/// Danger after the beat that follows choice `choices_made`.
#[must_use]
pub fn danger_after_beat(choices_made: u32) -> u32 {
    (3 + choices_made.saturating_mul(2)).min(MAX_DANGER)
}

/// Whether the climax follows the choice just resolved.
#[must_use]
pub fn is_final_choice(choices_made: u32) -> bool {
    choices_made >= TOTAL_CHOICES
}

/// The beat that follows resolving choice number `choices_made` (1-based),
/// or `None` when no escalation applies (before the first choice, or once
/// the climax is due).
#[must_use]
pub fn beat_after(theme: ArcTheme, choices_made: u32, current_scene: &str) -> Option<Beat> {
    let (scene, narrative, new_character) = match (choices_made, theme) {
        (1, ArcTheme::Cyberpunk) => (
            "A hidden underground resistance hideout beneath Neo-Tokyo".to_owned(),
            "Your actions have triggered corporate attention. You've been contacted by the underground resistance and brought to their secret base. The stakes have escalated - they reveal the Serpent's Eye conspiracy goes deeper than anyone imagined.",
            None,
        ),
        (1, ArcTheme::Atlantis) => (
            "The ancient Atlantean throne room with mystical technology".to_owned(),
            "Your exploration has awakened something ancient. The ruins have led you to a massive throne room where Atlantean technology still hums with power. Ancient guardians stir, and you realize you've stumbled into something far greater than a simple exploration.",
            None,
        ),
        (1, ArcTheme::Forest) => (
            "A mystical clearing where reality bends and magic flows freely".to_owned(),
            "Your choice has opened a path deeper into the enchanted realm. You now stand in a clearing where the very air shimmers with magic, and you can see portals to other realms flickering in and out of existence.",
            None,
        ),
        (1, ArcTheme::Generic) => (
            format!("A deeper, more dangerous part of {current_scene}"),
            "Your actions have consequences. The situation has evolved, and you find yourself facing unexpected challenges that will test your resolve.",
            None,
        ),
        (2, ArcTheme::Cyberpunk) => (
            "The corporate zaibatsu tower's executive floors".to_owned(),
            "The resistance mission has brought you into the heart of enemy territory. You're now infiltrating the highest levels of the corporate tower, where reality itself can be manipulated through neural networks. Corporate agents are closing in.",
            Some("Director Sato - Corporate AI Overlord"),
        ),
        (2, ArcTheme::Atlantis) => (
            "The abyssal depths where ancient leviathans guard Atlantean secrets".to_owned(),
            "The throne room revealed a path to the deepest ocean trenches. Here, massive sea creatures that have lived since Atlantis fell guard the most powerful artifacts. You must prove yourself worthy or face their ancient wrath.",
            Some("Tidal Guardian - Ancient Atlantean Protector"),
        ),
        (2, ArcTheme::Forest) => (
            "The Shadowrealm where dark magic and light magic clash eternally".to_owned(),
            "Your magical exploration has drawn you into the Shadowrealm, a dimension where the battle between light and dark magic rages eternally. Here, your choices will determine which side of the cosmic balance you support.",
            Some("Shadow Weaver - Keeper of Dark Mysteries"),
        ),
        (2, ArcTheme::Generic) => (
            format!("A completely new location connected to {current_scene}"),
            "Your journey has taken an unexpected turn. You've discovered a new realm connected to your adventure, where new allies and enemies await.",
            None,
        ),
        (3, ArcTheme::Cyberpunk) => (
            "The digital realm inside the neural network itself".to_owned(),
            "You've jacked directly into the corporate neural network. Reality is now digital - you exist as data, fighting AI constructs in a realm where thoughts become weapons and memories can be rewritten. The final confrontation with the AI overlord approaches.",
            None,
        ),
        (3, ArcTheme::Atlantis) => (
            "The timestream portal chamber where past and future Atlantis collide".to_owned(),
            "The leviathans' test has opened a temporal rift. You can now see Atlantis in its prime and witness its fall. You have the power to change history itself, but doing so could unravel reality.",
            None,
        ),
        (3, ArcTheme::Forest) => (
            "The World Tree's crown where cosmic forces converge".to_owned(),
            "Your choices in the Shadowrealm have earned you passage to the World Tree's crown. Here, at the nexus of all realities, you can reshape the fundamental forces of nature itself. But cosmic entities watch your every move.",
            None,
        ),
        (3, ArcTheme::Generic) => (
            format!("The climactic confrontation arising from {current_scene}"),
            "The ultimate challenge reveals itself. Everything you've done has led to this pivotal moment where your choices will determine not just your fate, but the fate of all involved.",
            None,
        ),
        (4, ArcTheme::Cyberpunk) => (
            "The core of the Serpent's Eye AI system - reality's command center".to_owned(),
            "You've reached the heart of the conspiracy. The Serpent's Eye is revealed to be a quantum AI that controls reality itself through neural manipulation. One final choice will determine whether humanity remains free or becomes permanently enslaved to artificial intelligence.",
            None,
        ),
        (4, ArcTheme::Atlantis) => (
            "The moment of Atlantis's original fall - you can change everything".to_owned(),
            "You stand at the exact moment of Atlantis's destruction. With the power you've gained, you can prevent the fall of the greatest civilization ever known. But doing so might prevent humanity from ever learning to protect itself from such power.",
            None,
        ),
        (4, ArcTheme::Forest) => (
            "The cosmic loom where reality's threads can be rewoven".to_owned(),
            "At the World Tree's peak, you've found the cosmic loom that weaves the threads of reality itself. You can reshape the natural order, restore balance to magic, or claim ultimate power. The cosmic forces await your final decision.",
            None,
        ),
        (4, ArcTheme::Generic) => (
            format!("The ultimate threshold of {current_scene}"),
            "You stand at the ultimate threshold. Your journey has brought you to a point where a single choice will reshape everything. The final moment of truth has arrived.",
            None,
        ),
        _ => return None,
    };

    Some(Beat {
        scene,
        narrative: narrative.to_owned(),
        new_character: new_character.map(str::to_owned),
        danger_level: danger_after_beat(choices_made),
    })
}

/// Coarse progress label derived from the number of story events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryStage {
    /// Fewer than three events.
    Beginning,
    /// Three to seven events.
    Middle,
    /// Eight or more events.
    Climax,
}

impl StoryStage {
    /// Stage for a history of `events` entries.
    #[must_use]
    pub fn from_event_count(events: usize) -> Self {
        match events {
            0..3 => StoryStage::Beginning,
            3..8 => StoryStage::Middle,
            _ => StoryStage::Climax,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_danger_rises_by_two_per_choice_and_caps() {
        assert_eq!(danger_after_beat(1), 5);
        assert_eq!(danger_after_beat(3), 9);
        assert_eq!(danger_after_beat(4), MAX_DANGER);
        assert_eq!(danger_after_beat(40), MAX_DANGER);
    }

    #[test]
    fn test_no_beat_before_first_choice_or_at_climax() {
        assert!(beat_after(ArcTheme::Forest, 0, "x").is_none());
        assert!(beat_after(ArcTheme::Forest, TOTAL_CHOICES, "x").is_none());
    }

    #[test]
    fn test_generic_beat_quotes_current_scene() {
        let beat = beat_after(ArcTheme::Generic, 1, "the old lighthouse").unwrap();

        assert_eq!(beat.scene, "A deeper, more dangerous part of the old lighthouse");
        assert_eq!(beat.danger_level, 5);
        assert!(beat.new_character.is_none());
    }

    #[test]
    fn test_second_cyberpunk_beat_introduces_director() {
        let beat = beat_after(ArcTheme::Cyberpunk, 2, "ignored").unwrap();

        assert_eq!(
            beat.new_character.as_deref(),
            Some("Director Sato - Corporate AI Overlord")
        );
        assert_eq!(beat.scene, "The corporate zaibatsu tower's executive floors");
    }

    #[test]
    fn test_theme_follows_story_type_and_atlantis_requests() {
        assert_eq!(
            ArcTheme::for_story(StoryType::Mystical, "forest"),
            ArcTheme::Forest
        );
        assert_eq!(
            ArcTheme::for_story(StoryType::Adventure, "Sunken ATLANTIS"),
            ArcTheme::Atlantis
        );
        assert_eq!(
            ArcTheme::for_story(StoryType::Fantasy, "dragon"),
            ArcTheme::Generic
        );
    }

    #[test]
    fn test_stage_boundaries() {
        assert_eq!(StoryStage::from_event_count(2), StoryStage::Beginning);
        assert_eq!(StoryStage::from_event_count(3), StoryStage::Middle);
        assert_eq!(StoryStage::from_event_count(7), StoryStage::Middle);
        assert_eq!(StoryStage::from_event_count(8), StoryStage::Climax);
    }

    #[test]
    fn test_final_choice_is_the_fifth() {
        assert!(!is_final_choice(4));
        assert!(is_final_choice(5));
    }
}
