//! Enumeration types for the Revolution narrative engine.
//!
//! The metric, flag, character and ending sets are fixed and small. Every
//! enum here parses from its serialized name so that string input (content
//! tables, debug hooks, the command loop) is rejected at the edge when it
//! names something that does not exist.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Error returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey {
    /// Which enumeration the lookup targeted (e.g. `"metric"`).
    pub kind: &'static str,
    /// The key that failed to parse.
    pub key: String,
}

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.key)
    }
}

impl std::error::Error for UnknownKey {}

/// Implements `as_str`, `Display` and `FromStr` over a fixed `ALL` table.
macro_rules! keyed_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $key:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The serialized name of this variant.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $key),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownKey;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| UnknownKey {
                        kind: $kind,
                        key: s.to_owned(),
                    })
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// A bounded numeric game metric.
///
/// Every metric holds an integer in `[Metric::MIN, Metric::MAX]` and is
/// clamped after each mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum Metric {
    /// How loyal the animals are to the leadership.
    Loyalty,
    /// Food available to the farm.
    Rations,
    /// Strength of the dogs and the leadership's grip.
    Security,
    /// How far the pigs have drifted from the revolution.
    Corruption,
    /// Technical progress on the farm.
    Innovation,
    /// How accurately the farm remembers its own history.
    HistoricalTruth,
    /// Accumulated exhaustion of the working animals.
    Fatigue,
}

impl Metric {
    /// Lowest value any metric can hold.
    pub const MIN: i32 = 0;
    /// Highest value any metric can hold.
    pub const MAX: i32 = 100;

    /// Clamp a raw value into the metric range.
    pub const fn clamp(value: i32) -> i32 {
        if value < Self::MIN {
            Self::MIN
        } else if value > Self::MAX {
            Self::MAX
        } else {
            value
        }
    }
}

keyed_enum!(Metric, "metric", {
    Loyalty => "loyalty",
    Rations => "rations",
    Security => "security",
    Corruption => "corruption",
    Innovation => "innovation",
    HistoricalTruth => "historicalTruth",
    Fatigue => "fatigue",
});

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// A persistent story fact set by decision resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum Flag {
    /// The windmill has been completed.
    WindmillBuilt,
    /// The purges have been carried out.
    PurgesCompleted,
    /// The commandments on the barn wall were rewritten.
    CommandmentsRevised,
    /// Boxer was spared from the knacker.
    BoxerSaved,
    /// Boxer is injured.
    BoxerInjured,
    /// The humans were invited onto the farm.
    HumanVisitors,
    /// The dogs have been trained (value names the training).
    DogsTrained,
}

keyed_enum!(Flag, "flag", {
    WindmillBuilt => "windmillBuilt",
    PurgesCompleted => "purgesCompleted",
    CommandmentsRevised => "commandmentsRevised",
    BoxerSaved => "boxerSaved",
    BoxerInjured => "boxerInjured",
    HumanVisitors => "humanVisitors",
    DogsTrained => "dogsTrained",
});

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// A season in the farm's annual cycle. One season passes per turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Season {
    /// Planting season; the year begins here.
    Spring,
    /// Long working days.
    Summer,
    /// Harvest.
    Autumn,
    /// Scarcity; the year ends here.
    Winter,
}

impl Season {
    /// The season that follows this one.
    pub const fn next(self) -> Self {
        match self {
            Self::Spring => Self::Summer,
            Self::Summer => Self::Autumn,
            Self::Autumn => Self::Winter,
            Self::Winter => Self::Spring,
        }
    }
}

keyed_enum!(Season, "season", {
    Spring => "Spring",
    Summer => "Summer",
    Autumn => "Autumn",
    Winter => "Winter",
});

// ---------------------------------------------------------------------------
// Characters and relationships
// ---------------------------------------------------------------------------

/// A character whose relationship with the player is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Character {
    /// The ruling boar.
    Napoleon,
    /// The exiled visionary.
    Snowball,
    /// The loyal cart-horse.
    Boxer,
    /// Napoleon's mouthpiece.
    Squealer,
    /// The farm animals as a body.
    Animals,
}

keyed_enum!(Character, "character", {
    Napoleon => "napoleon",
    Snowball => "snowball",
    Boxer => "boxer",
    Squealer => "squealer",
    Animals => "animals",
});

/// Where a relationship adjustment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum RelationshipSource {
    /// Conversation with the character.
    Dialogue,
    /// Something that happened at a location.
    Location,
    /// A resolved decision option.
    Decision,
}

keyed_enum!(RelationshipSource, "relationship source", {
    Dialogue => "dialogue",
    Location => "location",
    Decision => "decision",
});

/// A character's displayed mood, derived from game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Emotion {
    /// No strong feeling.
    Neutral,
    /// Content.
    Happy,
    /// Angry.
    Angry,
    /// Plotting.
    Scheming,
    /// Thwarted.
    Frustrated,
    /// Resolved to act.
    Determined,
    /// Hurt.
    Injured,
    /// Worn out.
    Tired,
    /// Anxious.
    Nervous,
    /// Spreading falsehoods.
    Lying,
    /// Talking the crowd round.
    Persuasive,
    /// Without food.
    Starving,
    /// On the edge of revolt.
    Rebellious,
}

keyed_enum!(Emotion, "emotion", {
    Neutral => "neutral",
    Happy => "happy",
    Angry => "angry",
    Scheming => "scheming",
    Frustrated => "frustrated",
    Determined => "determined",
    Injured => "injured",
    Tired => "tired",
    Nervous => "nervous",
    Lying => "lying",
    Persuasive => "persuasive",
    Starving => "starving",
    Rebellious => "rebellious",
});

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// A place on the farm the player can visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Location {
    /// The great barn where the animals gather.
    Barn,
    /// Snowball's windmill.
    Windmill,
    /// The wall bearing the Seven Commandments.
    Commandments,
    /// The fields where the animals labour.
    Fields,
    /// The former human residence, now the pigs' quarters.
    Farmhouse,
}

keyed_enum!(Location, "location", {
    Barn => "barn",
    Windmill => "windmill",
    Commandments => "commandments",
    Fields => "fields",
    Farmhouse => "farmhouse",
});

// ---------------------------------------------------------------------------
// Decisions and endings
// ---------------------------------------------------------------------------

/// The broad class of a decision, used for history statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum DecisionCategory {
    /// One of the five story epochs.
    Epoch,
    /// A recurring decision offered once per season-visit.
    Seasonal,
    /// A conditional decision offered at most once per game.
    Special,
}

keyed_enum!(DecisionCategory, "decision category", {
    Epoch => "epoch",
    Seasonal => "seasonal",
    Special => "special",
});

/// A terminal state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum Ending {
    /// The revolution kept its promise.
    Utopia,
    /// The pigs became the new masters.
    CycleOfTyranny,
    /// The farm withered.
    Stagnation,
    /// Boxer's sacrifice sparked a second uprising.
    MartyrRevolt,
    /// The farm survived, compromised. The fallback ending.
    CompromisedSurvival,
}

keyed_enum!(Ending, "ending", {
    Utopia => "UTOPIA",
    CycleOfTyranny => "CYCLE_OF_TYRANNY",
    Stagnation => "STAGNATION",
    MartyrRevolt => "MARTYR_REVOLT",
    CompromisedSurvival => "COMPROMISED_SURVIVAL",
});

/// Severity of a non-blocking notice surfaced to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// Something went wrong but play continues.
    Warning,
    /// An unrecoverable error was caught at the outer boundary.
    Error,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn metric_serializes_camel_case() {
        let json = serde_json::to_string(&Metric::HistoricalTruth).unwrap();
        assert_eq!(json, "\"historicalTruth\"");
        let back: Metric = serde_json::from_str("\"historicalTruth\"").unwrap();
        assert_eq!(back, Metric::HistoricalTruth);
    }

    #[test]
    fn metric_parse_rejects_unknown_key() {
        assert_eq!("Loyalty".parse::<Metric>().unwrap(), Metric::Loyalty);
        let err = "happiness".parse::<Metric>().unwrap_err();
        assert_eq!(err.kind, "metric");
        assert_eq!(err.key, "happiness");
        assert_eq!(err.to_string(), "unknown metric: happiness");
    }

    #[test]
    fn clamp_bounds_values() {
        assert_eq!(Metric::clamp(-20), 0);
        assert_eq!(Metric::clamp(55), 55);
        assert_eq!(Metric::clamp(130), 100);
    }

    #[test]
    fn season_cycles() {
        let mut season = Season::Spring;
        for _ in 0..4 {
            season = season.next();
        }
        assert_eq!(season, Season::Spring);
        assert_eq!(Season::Winter.next(), Season::Spring);
    }

    #[test]
    fn ending_uses_screaming_names() {
        let json = serde_json::to_string(&Ending::CycleOfTyranny).unwrap();
        assert_eq!(json, "\"CYCLE_OF_TYRANNY\"");
        assert_eq!(
            "martyr_revolt".parse::<Ending>().unwrap(),
            Ending::MartyrRevolt
        );
    }

    #[test]
    fn every_table_matches_serde_names() {
        for flag in Flag::ALL {
            let json = serde_json::to_string(flag).unwrap();
            assert_eq!(json, format!("\"{}\"", flag.as_str()));
        }
        for location in Location::ALL {
            let json = serde_json::to_string(location).unwrap();
            assert_eq!(json, format!("\"{}\"", location.as_str()));
        }
    }
}
