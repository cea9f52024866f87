//! Prompt construction for every provider call, and parsing of the text
//! provider's choice lists.

use super::arc::TOTAL_CHOICES;

/// Colour direction shared by every image prompt.
pub const COLOR_PALETTE: &str = "rich atmospheric lighting with dramatic shadows";

/// Tone used when a caller does not name one.
pub const DEFAULT_TONE: &str = "mysterious";

/// What the text provider is told about the story so far.
#[derive(Debug, Clone)]
pub struct StoryContext<'a> {
    /// Current scene.
    pub scene: &'a str,
    /// Current mood.
    pub mood: &'a str,
    /// Characters on stage.
    pub characters: &'a [String],
    /// Story events so far.
    pub events: usize,
    /// Danger level, 1 to 10.
    pub danger_level: u32,
    /// Choices already resolved.
    pub choices_made: u32,
}

/// Situation text for a fresh choice moment.
#[must_use]
pub fn situation(scene: &str) -> String {
    format!("You find yourself in {scene}. What is your next move?")
}

/// Prompt asking for three labelled choices.
#[must_use]
pub fn choice_prompt(ctx: &StoryContext<'_>, situation: &str) -> String {
    let characters = if ctx.characters.is_empty() {
        "None".to_owned()
    } else {
        ctx.characters.join(", ")
    };
    format!(
        "You are generating player choices for an interactive story.\n\n\
         CURRENT STORY SITUATION: {situation}\n\
         SCENE: {scene}\n\
         MOOD: {mood}\n\
         CHARACTERS PRESENT: {characters}\n\
         STORY PROGRESS: {events} events completed\n\
         DANGER LEVEL: {danger}/10\n\
         USER CHOICES MADE: {made}/{TOTAL_CHOICES}\n\n\
         Generate exactly 3 choices in this format:\n\
         A: [specific action for this situation]\n\
         B: [different specific action for this situation]\n\
         C: [third specific action for this situation]\n\n\
         Make each choice specific to the current scene, leading to a different \
         narrative path, and matching the story's tone and setting.",
        scene = ctx.scene,
        mood = ctx.mood,
        events = ctx.events,
        danger = ctx.danger_level,
        made = ctx.choices_made,
    )
}

/// Prompt asking for the consequences of the player's choice.
#[must_use]
pub fn outcome_prompt(ctx: &StoryContext<'_>, recent: &[String], choice: &str) -> String {
    let history = if recent.is_empty() {
        "Beginning of adventure".to_owned()
    } else {
        recent.join(" | ")
    };
    format!(
        "CURRENT SITUATION: You are in {scene}\n\
         STORY PROGRESS: {made}/{TOTAL_CHOICES} choices made so far\n\
         DANGER LEVEL: {danger}/10\n\
         RECENT HISTORY: {history}\n\n\
         USER CHOSE OPTION: {choice}\n\n\
         Generate a dramatic narrative outcome showing what immediately happens as a \
         result of this choice, how the situation evolves, and what new challenges or \
         opportunities arise.\n\
         Write 2-3 sentences of compelling narrative specific to this context and choice.",
        scene = ctx.scene,
        made = ctx.choices_made,
        danger = ctx.danger_level,
    )
}

/// Narrative used when the text provider cannot describe an outcome.
#[must_use]
pub fn fallback_outcome(choice: &str, scene: &str) -> String {
    format!(
        "Your choice to {choice} has immediate consequences in {scene}. \
         The situation evolves as you face the results of your decision."
    )
}

/// Wide establishing shot of a location.
#[must_use]
pub fn establishing_image_prompt(
    location: &str,
    mood: &str,
    details: &str,
    art_style: &str,
) -> String {
    format!(
        "Establishing shot: {location} with {mood} atmosphere. {details}\n\
         Characters: Epic environment focus\n\
         Style: {art_style}, {COLOR_PALETTE}\n\
         Cinematic establishing shot, wide angle, environmental storytelling, 4K quality"
    )
}

/// Single frame showing the result of an action.
#[must_use]
pub fn outcome_image_prompt(action: &str, context: &str, art_style: &str) -> String {
    format!("Result: {action} in {context}, {art_style}, dramatic moment")
}

/// Free-standing video clip.
#[must_use]
pub fn direct_video_prompt(prompt: &str, tone: &str) -> String {
    format!(
        "{prompt}\n\n\
         Cinematic direction: Smooth camera movement, atmospheric lighting, \
         dynamic scene transitions, fantasy cinematography, 8-second sequence, \
         professional film quality, {tone} atmosphere"
    )
}

/// The finale clip.
#[must_use]
pub fn climax_video_prompt(final_choice: &str, scene: &str, art_style: &str) -> String {
    format!(
        "EPIC FINALE: {final_choice}\n\
         Ultimate climactic confrontation in {scene}\n\
         Cinematic masterpiece, dramatic crescendo, ultimate resolution, \
         {art_style} with maximum dramatic impact"
    )
}

/// Music prompt: a base atmosphere picked from scene keywords, coloured by
/// the emotional tone.
#[must_use]
pub fn music_prompt(scene_context: &str, tone: &str) -> String {
    let lower = scene_context.to_lowercase();
    let has_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));
    let cyber_words = ["neo-tokyo", "cyberpunk", "corporate", "neural"];

    let base = if has_any(&cyber_words)
        || has_any(&["zaibatsus", "metropolis", "neon", "detective", "rain-soaked"])
    {
        "Cyberpunk synthwave atmosphere with electronic beats"
    } else if has_any(&["dragon", "fantasy"]) {
        "Epic fantasy orchestral with mystical elements"
    } else if has_any(&["forest"]) {
        "Mystical forest ambience with ethereal tones"
    } else if has_any(&["dungeon"]) {
        "Dark atmospheric dungeon ambience"
    } else if has_any(&["space", "adventure", "sci-fi"]) {
        "Epic space adventure orchestral score"
    } else {
        "Atmospheric cinematic score"
    };

    let modifier = match tone {
        "mysterious" => Some("mysterious and ethereal"),
        "tense" if has_any(&cyber_words) => Some("building tension with electronic undertones"),
        "tense" => Some("building tension and suspense"),
        "dramatic" => Some("epic and dramatic crescendo"),
        "peaceful" => Some("serene and calming"),
        "action" => Some("intense and driving rhythm"),
        "relief" => Some("hopeful and uplifting"),
        "determination" => Some("resolute and inspiring"),
        "urgent" => Some("urgent and intense"),
        _ => None,
    };

    match modifier {
        Some(m) => format!("{base} with {m} elements"),
        None => base.to_owned(),
    }
}

/// Extracts the `A:`, `B:` and `C:` lines from a provider response.
///
/// Leading list markers and markdown emphasis are ignored, and `A)` / `A.`
/// are accepted as well. Missing options come back as `None`.
#[must_use]
pub fn parse_choices(text: &str) -> [Option<String>; 3] {
    let mut parsed: [Option<String>; 3] = [None, None, None];
    for line in text.lines() {
        let line = line
            .trim()
            .trim_start_matches(['*', '-', '#', ' '])
            .trim_start();
        let mut chars = line.chars();
        let (Some(label), Some(sep)) = (chars.next(), chars.next()) else {
            continue;
        };
        let slot = match label.to_ascii_uppercase() {
            'A' => 0,
            'B' => 1,
            'C' => 2,
            _ => continue,
        };
        if !matches!(sep, ':' | ')' | '.') {
            continue;
        }
        let choice = chars
            .as_str()
            .trim()
            .trim_start_matches(['*', ' '])
            .trim_end_matches('*')
            .trim();
        if !choice.is_empty() && parsed[slot].is_none() {
            parsed[slot] = Some(choice.to_owned());
        }
    }
    parsed
}

/// Parsed choices with gaps filled from `fallback`.
#[must_use]
pub fn choices_or_fallback(text: Option<&str>, fallback: &[String]) -> Vec<String> {
    let parsed = text.map_or([None, None, None], parse_choices);
    parsed
        .into_iter()
        .enumerate()
        .map(|(i, choice)| {
            choice.unwrap_or_else(|| fallback.get(i).cloned().unwrap_or_default())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(characters: &'a [String]) -> StoryContext<'a> {
        StoryContext {
            scene: "a flooded archive",
            mood: "tense",
            characters,
            events: 4,
            danger_level: 3,
            choices_made: 2,
        }
    }

    #[test]
    fn test_parse_choices_reads_labelled_lines() {
        let text = "Here you go:\nA: Swim for the door\nB: Climb the shelves\nC: Call for help";

        let parsed = parse_choices(text);

        assert_eq!(parsed[0].as_deref(), Some("Swim for the door"));
        assert_eq!(parsed[1].as_deref(), Some("Climb the shelves"));
        assert_eq!(parsed[2].as_deref(), Some("Call for help"));
    }

    #[test]
    fn test_parse_choices_tolerates_markdown_and_other_separators() {
        let text = "**A:** Bold move\n- B) Careful move\n  c. quiet move";

        let parsed = parse_choices(text);

        assert_eq!(parsed[0].as_deref(), Some("Bold move"));
        assert_eq!(parsed[1].as_deref(), Some("Careful move"));
        assert_eq!(parsed[2].as_deref(), Some("quiet move"));
    }

    #[test]
    fn test_parse_choices_ignores_words_starting_with_labels() {
        let parsed = parse_choices("Another day\nBe careful\nA: Go");

        assert_eq!(parsed[0].as_deref(), Some("Go"));
        assert!(parsed[1].is_none());
        assert!(parsed[2].is_none());
    }

    #[test]
    fn test_choices_or_fallback_fills_missing_slots() {
        let fallback = vec!["one".to_owned(), "two".to_owned(), "three".to_owned()];

        let choices = choices_or_fallback(Some("B: middle road"), &fallback);

        assert_eq!(choices, vec!["one", "middle road", "three"]);
    }

    #[test]
    fn test_choices_or_fallback_without_response_uses_fallback() {
        let fallback = vec!["one".to_owned(), "two".to_owned(), "three".to_owned()];

        assert_eq!(choices_or_fallback(None, &fallback), fallback);
    }

    #[test]
    fn test_choice_prompt_lists_characters_and_progress() {
        let characters = vec!["Kira".to_owned(), "Sato".to_owned()];

        let prompt = choice_prompt(&ctx(&characters), "Water rises.");

        assert!(prompt.contains("CURRENT STORY SITUATION: Water rises."));
        assert!(prompt.contains("CHARACTERS PRESENT: Kira, Sato"));
        assert!(prompt.contains("USER CHOICES MADE: 2/5"));
    }

    #[test]
    fn test_outcome_prompt_marks_beginning_without_history() {
        let prompt = outcome_prompt(&ctx(&[]), &[], "open the vault");

        assert!(prompt.contains("RECENT HISTORY: Beginning of adventure"));
        assert!(prompt.contains("USER CHOSE OPTION: open the vault"));
    }

    #[test]
    fn test_music_prompt_combines_base_and_tone() {
        assert_eq!(
            music_prompt("Neo-Tokyo rooftops", "tense"),
            "Cyberpunk synthwave atmosphere with electronic beats with building tension with electronic undertones elements"
        );
        assert_eq!(
            music_prompt("An ancient forest", "peaceful"),
            "Mystical forest ambience with ethereal tones with serene and calming elements"
        );
        assert_eq!(music_prompt("a quiet kitchen", "wistful"), "Atmospheric cinematic score");
    }
}
