//! Records and snapshot types for the Revolution narrative engine.
//!
//! Content records ([`DecisionRecord`], [`SceneRecord`],
//! [`EndingDefinition`]) are immutable once loaded. Runtime records
//! ([`TimeState`], [`DelayedEffect`], the history entries) are owned by the
//! engine and copied out through accessors. [`GameSnapshot`] bundles all
//! mutable state for persistence.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    Character, DecisionCategory, Ending, Flag, Location, Metric, RelationshipSource, Season,
};
use crate::ids::{DecisionId, Epoch, OptionId, SceneId};

/// Signed per-metric deltas.
pub type MetricDeltas = BTreeMap<Metric, i32>;

// ---------------------------------------------------------------------------
// Requirements
// ---------------------------------------------------------------------------

/// The value a flag holds: a plain boolean or a short variant name
/// (e.g. `dogsTrained: guard`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export, export_to = "bindings/")]
pub enum FlagValue {
    /// Boolean story fact.
    Bool(bool),
    /// Named variant of a story fact.
    Variant(String),
}

impl FlagValue {
    /// Whether the value counts as set. Variants always do.
    pub const fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Variant(_) => true,
        }
    }
}

impl Default for FlagValue {
    fn default() -> Self {
        Self::Bool(false)
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl core::fmt::Display for FlagValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Variant(v) => f.write_str(v),
        }
    }
}

/// Inclusive bounds a metric must satisfy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MetricBound {
    /// Minimum value, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_least: Option<i32>,
    /// Maximum value, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_most: Option<i32>,
}

impl MetricBound {
    /// A bound requiring `value >= min`.
    pub const fn at_least(min: i32) -> Self {
        Self {
            at_least: Some(min),
            at_most: None,
        }
    }

    /// A bound requiring `value <= max`.
    pub const fn at_most(max: i32) -> Self {
        Self {
            at_least: None,
            at_most: Some(max),
        }
    }

    /// Whether `value` lies inside the bound.
    pub const fn holds(self, value: i32) -> bool {
        let above = match self.at_least {
            Some(min) => value >= min,
            None => true,
        };
        let below = match self.at_most {
            Some(max) => value <= max,
            None => true,
        };
        above && below
    }
}

/// Conjunctive predicate over metrics and flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Requirements {
    /// Metric bounds that must all hold.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<Metric, MetricBound>,
    /// Flags that must equal the given value. An unset flag reads `false`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub flags: BTreeMap<Flag, FlagValue>,
}

impl Requirements {
    /// Whether there is nothing to check.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.flags.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// A follow-up effect that fires some turns after an option resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DelayedSpec {
    /// Type tag describing the follow-up (e.g. `WindmillCompletion`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Turns to wait after resolution.
    pub delay: u32,
    /// Metric deltas applied when the effect fires.
    #[serde(default)]
    pub effects: MetricDeltas,
    /// Whether the follow-up represents a success.
    #[serde(default)]
    pub success: bool,
}

/// One selectable option of a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DecisionOption {
    /// Option identifier, unique within its decision.
    pub id: OptionId,
    /// Short label.
    pub title: String,
    /// Longer explanation.
    #[serde(default)]
    pub description: String,
    /// Deltas paid for choosing this option.
    #[serde(default)]
    pub costs: MetricDeltas,
    /// Deltas gained by choosing this option.
    #[serde(default)]
    pub benefits: MetricDeltas,
    /// Optional follow-up effect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delayed: Option<DelayedSpec>,
    /// Flags set on resolution.
    #[serde(default)]
    pub flags: BTreeMap<Flag, FlagValue>,
    /// Relationship deltas applied under the `decision` source.
    #[serde(default)]
    pub relationships: BTreeMap<Character, i32>,
    /// Gate on choosing this option.
    #[serde(default)]
    pub requirements: Requirements,
    /// Journal line recorded when the option resolves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

/// When and how a decision is offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DecisionKind {
    /// A story epoch, triggered once at a fixed year and season.
    Epoch {
        /// Epoch number.
        epoch: Epoch,
        /// Trigger year.
        year: u32,
        /// Trigger season.
        season: Season,
    },
    /// Offered once per visit of its season.
    Seasonal {
        /// The season that offers it.
        season: Season,
    },
    /// Offered while its predicate holds, at most once per game.
    Special {
        /// Predicate over the state.
        offer_when: Requirements,
        /// Earliest year the decision can appear.
        #[serde(default)]
        min_year: Option<u32>,
    },
}

/// An immutable decision definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DecisionRecord {
    /// Decision identifier.
    pub id: DecisionId,
    /// Heading shown to the player.
    pub title: String,
    /// Situation summary.
    #[serde(default)]
    pub description: String,
    /// Longer framing text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    /// Offering rule.
    pub kind: DecisionKind,
    /// Options in display order.
    pub options: Vec<DecisionOption>,
}

impl DecisionRecord {
    /// Broad class of the decision.
    pub const fn category(&self) -> DecisionCategory {
        match self.kind {
            DecisionKind::Epoch { .. } => DecisionCategory::Epoch,
            DecisionKind::Seasonal { .. } => DecisionCategory::Seasonal,
            DecisionKind::Special { .. } => DecisionCategory::Special,
        }
    }

    /// The epoch this decision belongs to, if any.
    pub const fn epoch(&self) -> Option<Epoch> {
        match self.kind {
            DecisionKind::Epoch { epoch, .. } => Some(epoch),
            _ => None,
        }
    }

    /// Look up an option by id.
    pub fn option(&self, id: &str) -> Option<&DecisionOption> {
        self.options.iter().find(|o| o.id.as_str() == id)
    }
}

// ---------------------------------------------------------------------------
// Scenes and endings
// ---------------------------------------------------------------------------

/// Calendar gate on an authored scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SceneTrigger {
    /// Required year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    /// Required season.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<Season>,
}

/// A unit of narrative presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SceneRecord {
    /// Scene identifier.
    pub id: SceneId,
    /// Heading.
    pub title: String,
    /// Narrative text.
    pub text: String,
    /// Names of the characters on stage.
    #[serde(default)]
    pub characters: Vec<String>,
    /// Background key for the renderer.
    #[serde(default)]
    pub background: String,
    /// Mood key for music selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    /// Presentation effect keys.
    #[serde(default)]
    pub effects: Vec<String>,
    /// Epoch this scene introduces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<Epoch>,
    /// Ending this scene presents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ending: Option<Ending>,
    /// Gate checked by an unforced start.
    #[serde(default)]
    pub requirements: Requirements,
    /// Calendar gate used when listing available scenes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<SceneTrigger>,
    /// Scene suggested to follow this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<SceneId>,
    /// Whether the scene was synthesized rather than authored.
    #[serde(default)]
    pub generated: bool,
}

/// A terminal state and its entry predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EndingDefinition {
    /// Which ending.
    pub id: Ending,
    /// Heading.
    pub title: String,
    /// Scene presented when the ending is reached.
    pub scene: SceneId,
    /// Predicate; ignored for the default ending.
    #[serde(default)]
    pub requirements: Requirements,
    /// Fallback when no other ending matches.
    #[serde(default)]
    pub is_default: bool,
}

// ---------------------------------------------------------------------------
// Runtime state
// ---------------------------------------------------------------------------

/// Calendar and epoch progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TimeState {
    /// Year, starting at 1.
    pub year: u32,
    /// Current season.
    pub season: Season,
    /// Turns elapsed. One turn is one season.
    pub turn: u64,
    /// Epoch waiting for its decision, if any.
    pub current_epoch: Option<Epoch>,
    /// Epochs whose decision has resolved.
    pub epochs_completed: BTreeSet<Epoch>,
}

impl Default for TimeState {
    fn default() -> Self {
        Self {
            year: 1,
            season: Season::Spring,
            turn: 0,
            current_epoch: None,
            epochs_completed: BTreeSet::new(),
        }
    }
}

/// A registered follow-up effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DelayedEffect {
    /// Type tag copied from the option.
    pub kind: String,
    /// Deltas applied when it fires.
    pub effects: MetricDeltas,
    /// Turn the option resolved on.
    pub registered_at: u64,
    /// Turn the effect fires on.
    pub fires_at: u64,
    /// Success marker copied from the option.
    pub success: bool,
    /// Set once fired.
    pub applied: bool,
}

/// One resolved decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DecisionHistoryEntry {
    /// The decision.
    pub decision_id: DecisionId,
    /// The chosen option.
    pub option_id: OptionId,
    /// Class of the decision.
    pub category: DecisionCategory,
    /// Season it resolved in.
    pub season: Season,
    /// Year it resolved in.
    pub year: u32,
    /// Turn it resolved on.
    pub turn: u64,
    /// Wall-clock time of resolution.
    pub recorded_at: DateTime<Utc>,
}

/// One presented scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SceneHistoryEntry {
    /// The scene.
    pub scene_id: SceneId,
    /// Season at presentation.
    pub season: Season,
    /// Year at presentation.
    pub year: u32,
    /// Turn at presentation.
    pub turn: u64,
    /// Wall-clock time of presentation.
    pub recorded_at: DateTime<Utc>,
}

/// One move between locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LocationVisit {
    /// Where the player came from.
    pub from: Location,
    /// Where the player went.
    pub to: Location,
    /// Turn of the move.
    pub turn: u64,
}

/// A line in the narrative journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct JournalLine {
    /// Turn the line was written on.
    pub turn: u64,
    /// The text.
    pub text: String,
}

/// Per-character relationship sources.
pub type RelationshipTable = BTreeMap<Character, BTreeMap<RelationshipSource, i32>>;

/// Serializable copy of all mutable game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameSnapshot {
    /// Metric values.
    pub metrics: BTreeMap<Metric, i32>,
    /// Flags that have been set.
    pub flags: BTreeMap<Flag, FlagValue>,
    /// Relationship sources per character.
    pub relationships: RelationshipTable,
    /// Calendar and epoch progress.
    pub time: TimeState,
    /// Delayed effects that have not fired.
    pub pending_effects: Vec<DelayedEffect>,
    /// Current location.
    pub location: Location,
    /// Locations visited so far.
    pub visited_locations: BTreeSet<Location>,
    /// Resolved decisions, oldest first.
    pub decision_history: Vec<DecisionHistoryEntry>,
    /// Presented scenes, oldest first.
    pub scene_history: Vec<SceneHistoryEntry>,
    /// Location moves, oldest first.
    pub location_history: Vec<LocationVisit>,
    /// Journal, oldest first.
    pub journal: Vec<JournalLine>,
    /// Turn on which the seasonal decision was last resolved.
    pub seasonal_resolved_turn: Option<u64>,
    /// Special decisions already resolved.
    pub specials_resolved: BTreeSet<DecisionId>,
    /// Ending reached, if the game is over.
    pub ending: Option<Ending>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn metric_bound_is_inclusive() {
        let bound = MetricBound {
            at_least: Some(20),
            at_most: Some(40),
        };
        assert!(bound.holds(20));
        assert!(bound.holds(40));
        assert!(!bound.holds(19));
        assert!(!bound.holds(41));
        assert!(MetricBound::default().holds(0));
    }

    #[test]
    fn flag_value_parses_bool_or_variant() {
        let flags: BTreeMap<Flag, FlagValue> =
            serde_json::from_str(r#"{"boxerSaved": true, "dogsTrained": "guard"}"#).unwrap();
        assert_eq!(flags.get(&Flag::BoxerSaved), Some(&FlagValue::Bool(true)));
        assert_eq!(
            flags.get(&Flag::DogsTrained),
            Some(&FlagValue::Variant("guard".to_owned()))
        );
        assert!(FlagValue::Variant("companion".to_owned()).is_truthy());
        assert!(!FlagValue::default().is_truthy());
    }

    #[test]
    fn decision_kind_is_internally_tagged() {
        let kind: DecisionKind =
            serde_json::from_str(r#"{"type": "epoch", "epoch": 2, "year": 2, "season": "Autumn"}"#)
                .unwrap();
        assert!(matches!(
            kind,
            DecisionKind::Epoch {
                epoch,
                year: 2,
                season: Season::Autumn,
            } if epoch.number() == 2
        ));
    }

    #[test]
    fn unknown_metric_key_fails_to_parse() {
        let result: Result<MetricDeltas, _> = serde_json::from_str(r#"{"happiness": 5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn default_time_starts_in_first_spring() {
        let time = TimeState::default();
        assert_eq!(time.year, 1);
        assert_eq!(time.season, Season::Spring);
        assert_eq!(time.turn, 0);
        assert!(time.current_epoch.is_none());
    }
}
