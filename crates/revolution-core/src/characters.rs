//! Character moods, dialogue and reactions.
//!
//! Nothing here mutates state. Emotions and dialogue are derived on demand
//! from metrics, flags and relationships; reaction lines are chosen for
//! large metric swings and written to the journal by the session.

use core::fmt;
use core::str::FromStr;

use rand::Rng;
use revolution_state::GameState;
use revolution_types::{Character, Emotion, Flag, Metric, UnknownKey};

/// Display name of a character.
pub const fn display_name(character: Character) -> &'static str {
    match character {
        Character::Napoleon => "Napoleon",
        Character::Snowball => "Snowball",
        Character::Boxer => "Boxer",
        Character::Squealer => "Squealer",
        Character::Animals => "The Animals",
    }
}

/// A character's mood, derived from the state.
pub fn emotion(character: Character, state: &GameState) -> Emotion {
    let m = |metric| state.metric(metric);
    match character {
        Character::Napoleon => {
            if m(Metric::Security) > 80 {
                Emotion::Happy
            } else if m(Metric::Loyalty) < 30 {
                Emotion::Angry
            } else if m(Metric::Corruption) > 70 {
                Emotion::Scheming
            } else {
                Emotion::Neutral
            }
        }
        Character::Snowball => {
            if state.flag_set(Flag::WindmillBuilt) {
                Emotion::Frustrated
            } else if state.flag_set(Flag::PurgesCompleted) {
                Emotion::Determined
            } else {
                Emotion::Neutral
            }
        }
        Character::Boxer => {
            if state.flag_set(Flag::BoxerInjured) {
                Emotion::Injured
            } else if m(Metric::Fatigue) > 60 {
                Emotion::Tired
            } else if state.relationship(Character::Boxer) > 70 {
                Emotion::Happy
            } else {
                Emotion::Determined
            }
        }
        Character::Squealer => {
            if m(Metric::HistoricalTruth) < 40 {
                Emotion::Nervous
            } else if m(Metric::Corruption) > 60 {
                Emotion::Lying
            } else {
                Emotion::Persuasive
            }
        }
        Character::Animals => {
            if m(Metric::Rations) < 20 {
                Emotion::Starving
            } else if m(Metric::Loyalty) < 20 {
                Emotion::Rebellious
            } else if m(Metric::Loyalty) > 70 {
                Emotion::Happy
            } else {
                Emotion::Neutral
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Dialogue
// ---------------------------------------------------------------------------

/// A subject the player can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Snowball's windmill.
    Windmill,
    /// Food distribution.
    Rations,
    /// The Seven Commandments.
    Commandments,
    /// The revolution itself.
    Revolution,
}

impl Topic {
    /// Every topic.
    pub const ALL: [Self; 4] = [
        Self::Windmill,
        Self::Rations,
        Self::Commandments,
        Self::Revolution,
    ];

    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Windmill => "windmill",
            Self::Rations => "rations",
            Self::Commandments => "commandments",
            Self::Revolution => "revolution",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownKey {
                kind: "topic",
                key: s.to_owned(),
            })
    }
}

/// What a character says when spoken to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialogue {
    /// Who is speaking.
    pub character: Character,
    /// Lines, in order.
    pub lines: Vec<String>,
    /// Mood while speaking.
    pub emotion: Emotion,
    /// Overall relationship with the player.
    pub relationship: i32,
    /// Topic raised, if any.
    pub topic: Option<Topic>,
}

/// Build a character's dialogue from the state.
///
/// State-dependent lines come first, then topic lines. A character with
/// nothing specific to say falls back to their stock lines.
pub fn dialogue(character: Character, topic: Option<Topic>, state: &GameState) -> Dialogue {
    let mut lines: Vec<String> = contextual_lines(character, state)
        .into_iter()
        .map(str::to_owned)
        .collect();
    if let Some(topic) = topic {
        lines.extend(topic_line(character, topic).map(str::to_owned));
    }
    if lines.is_empty() {
        lines = stock_lines(character)
            .iter()
            .map(|l| (*l).to_owned())
            .collect();
    }
    Dialogue {
        character,
        lines,
        emotion: emotion(character, state),
        relationship: state.relationship(character),
        topic,
    }
}

fn contextual_lines(character: Character, state: &GameState) -> Vec<&'static str> {
    let m = |metric| state.metric(metric);
    let candidates: Vec<(bool, &'static str)> = match character {
        Character::Napoleon => vec![
            (m(Metric::Corruption) > 70, "Leadership requires certain... privileges."),
            (m(Metric::Security) > 60, "The dogs ensure stability."),
            (m(Metric::Loyalty) < 30, "Discontent will not be tolerated."),
        ],
        Character::Snowball => vec![
            (state.flag_set(Flag::WindmillBuilt), "At least they built my windmill... poorly."),
            (state.flag_set(Flag::PurgesCompleted), "The purges prove Napoleon's tyranny."),
        ],
        Character::Boxer => vec![
            (state.flag_set(Flag::BoxerInjured), "My leg... it hurts, but I can still work."),
            (m(Metric::Fatigue) > 50, "I'm tired, but the revolution needs me."),
            (m(Metric::Loyalty) > 80, "The animals are happy. That's what matters."),
        ],
        Character::Squealer => vec![
            (m(Metric::HistoricalTruth) < 50, "The commandments have always been as they are now."),
            (m(Metric::Corruption) > 50, "Leadership sacrifices are misunderstood as corruption."),
        ],
        Character::Animals => vec![
            (m(Metric::Rations) < 30, "We're hungry... when will the rations increase?"),
            (m(Metric::Loyalty) < 40, "This isn't what Old Major promised..."),
            (m(Metric::HistoricalTruth) < 60, "I remember the commandments differently..."),
        ],
    };
    candidates
        .into_iter()
        .filter_map(|(holds, line)| holds.then_some(line))
        .collect()
}

const fn topic_line(character: Character, topic: Topic) -> Option<&'static str> {
    match (topic, character) {
        (Topic::Windmill, Character::Napoleon) => Some("The windmill was my idea, of course."),
        (Topic::Windmill, Character::Snowball) => {
            Some("My windmill designs were perfect! Napoleon ruined them!")
        }
        (Topic::Windmill, Character::Boxer) => Some("I helped build it with my own hooves."),
        (Topic::Windmill, Character::Animals) => {
            Some("The windmill work was hard, but necessary.")
        }
        (Topic::Rations, Character::Napoleon) => {
            Some("Rations are allocated according to need and contribution.")
        }
        (Topic::Rations, Character::Squealer) => {
            Some("Statistical analysis shows improved nutrition despite appearances.")
        }
        (Topic::Rations, Character::Animals) => Some("We remember when there was more food..."),
        (Topic::Rations, Character::Boxer) => Some("I don't need much. Others need it more."),
        (Topic::Commandments, Character::Squealer) => {
            Some("The commandments have been clarified, not changed.")
        }
        (Topic::Commandments, Character::Napoleon) => {
            Some("Rules must evolve with circumstances.")
        }
        (Topic::Commandments, Character::Animals) => {
            Some("I could have sworn it said something different...")
        }
        (Topic::Commandments, Character::Snowball) => {
            Some("The original commandments have been corrupted!")
        }
        (Topic::Revolution, Character::Napoleon) => {
            Some("The revolution is secure under my leadership.")
        }
        (Topic::Revolution, Character::Snowball) => {
            Some("The true revolution has been betrayed.")
        }
        (Topic::Revolution, Character::Boxer) => Some("I fight for the revolution every day."),
        (Topic::Revolution, Character::Animals) => Some("Was it all for this?"),
        _ => None,
    }
}

const fn stock_lines(character: Character) -> &'static [&'static str] {
    match character {
        Character::Napoleon => &[
            "The farm is prospering under my leadership.",
            "Discipline is necessary for the revolution to succeed.",
            "Snowball was a traitor from the beginning.",
            "The dogs are for your protection, comrades.",
        ],
        Character::Snowball => &[
            "My windmill plans would have brought electricity to all!",
            "Napoleon has betrayed the revolution's principles.",
            "Education is key to preventing tyranny.",
            "The animals must understand their rights.",
        ],
        Character::Boxer => &[
            "I will work harder!",
            "Napoleon is always right.",
            "The farm is my home.",
            "My strength is for the revolution.",
        ],
        Character::Squealer => &[
            "Comrades, let me explain the recent decisions...",
            "The rations reduction is actually an increase, mathematically speaking.",
            "Historical records show Napoleon's wisdom.",
            "Trust in the leadership, comrades.",
        ],
        Character::Animals => &[
            "Four legs good, two legs bad!",
            "We're hungry...",
            "The windmill would have helped.",
            "Remember Old Major's dream?",
        ],
    }
}

// ---------------------------------------------------------------------------
// Reactions
// ---------------------------------------------------------------------------

/// A journal line reacting to a large metric swing.
///
/// Only loyalty, rations and security draw reactions, and only when
/// `|delta| >= threshold`.
pub fn reaction_line<R: Rng + ?Sized>(
    metric: Metric,
    delta: i32,
    threshold: i32,
    rng: &mut R,
) -> Option<&'static str> {
    if delta == 0 || delta.unsigned_abs() < threshold.unsigned_abs() {
        return None;
    }
    let lines: [&'static str; 2] = match (metric, delta > 0) {
        (Metric::Loyalty, true) => ["The animals seem more hopeful today.", "Morale is improving!"],
        (Metric::Loyalty, false) => [
            "Grumblings can be heard in the barn.",
            "The animals look despondent.",
        ],
        (Metric::Rations, true) => [
            "The food stores look plentiful.",
            "Animals eat with satisfaction.",
        ],
        (Metric::Rations, false) => [
            "Empty troughs echo in the barn.",
            "Hungry eyes watch the food stores.",
        ],
        (Metric::Security, true) => [
            "The dogs patrol with renewed vigor.",
            "Security is tight today.",
        ],
        (Metric::Security, false) => ["The dogs seem distracted.", "Security appears lax."],
        _ => return None,
    };
    lines.get(rng.random_range(0..lines.len())).copied()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use revolution_types::RelationshipSource;

    use super::*;

    fn state(pairs: &[(Metric, i32)]) -> GameState {
        GameState::new(&pairs.iter().copied().collect())
    }

    #[test]
    fn napoleon_mood_follows_priority() {
        let secure = state(&[(Metric::Security, 85), (Metric::Loyalty, 10)]);
        assert_eq!(emotion(Character::Napoleon, &secure), Emotion::Happy);
        let restless = state(&[(Metric::Security, 50), (Metric::Loyalty, 10)]);
        assert_eq!(emotion(Character::Napoleon, &restless), Emotion::Angry);
        let corrupt = state(&[(Metric::Corruption, 75)]);
        assert_eq!(emotion(Character::Napoleon, &corrupt), Emotion::Scheming);
    }

    #[test]
    fn boxer_is_happy_when_close_to_player() {
        let mut state = state(&[(Metric::Fatigue, 20)]);
        assert_eq!(emotion(Character::Boxer, &state), Emotion::Determined);
        state.adjust_relationship(
            Character::Boxer,
            RelationshipSource::Dialogue,
            25,
            &mut Vec::new(),
        );
        assert_eq!(emotion(Character::Boxer, &state), Emotion::Happy);
    }

    #[test]
    fn animals_starve_before_rebelling() {
        let grim = state(&[(Metric::Rations, 10), (Metric::Loyalty, 10)]);
        assert_eq!(emotion(Character::Animals, &grim), Emotion::Starving);
        let angry = state(&[(Metric::Rations, 50), (Metric::Loyalty, 10)]);
        assert_eq!(emotion(Character::Animals, &angry), Emotion::Rebellious);
    }

    #[test]
    fn dialogue_prefers_context_then_topic() {
        let hungry = state(&[(Metric::Rations, 20), (Metric::HistoricalTruth, 90)]);
        let talk = dialogue(Character::Animals, Some(Topic::Rations), &hungry);
        assert_eq!(
            talk.lines,
            [
                "We're hungry... when will the rations increase?",
                "We remember when there was more food...",
            ]
        );
        assert_eq!(talk.emotion, Emotion::Neutral);
        assert_eq!(talk.relationship, 50);

        let calm = state(&[(Metric::Corruption, 10), (Metric::Security, 40)]);
        let talk = dialogue(Character::Napoleon, None, &calm);
        assert_eq!(talk.lines.len(), 4);
        assert_eq!(talk.lines[0], "The farm is prospering under my leadership.");
    }

    #[test]
    fn topic_parses_case_insensitively() {
        assert_eq!("Windmill".parse::<Topic>().unwrap(), Topic::Windmill);
        assert!("weather".parse::<Topic>().is_err());
    }

    #[test]
    fn reactions_need_a_large_swing_on_tracked_metrics() {
        let mut rng = StdRng::seed_from_u64(9);
        assert!(reaction_line(Metric::Loyalty, 14, 15, &mut rng).is_none());
        assert!(reaction_line(Metric::Innovation, 40, 15, &mut rng).is_none());
        let line = reaction_line(Metric::Rations, -15, 15, &mut rng).unwrap();
        assert!(line.contains("troughs") || line.contains("Hungry"));
    }
}
