//! Notification payloads.
//!
//! One struct per notification kind, wrapped by [`GameEvent`] for
//! consumers that want a single stream.

use std::collections::BTreeMap;

use revolution_types::{
    Character, DecisionId, DecisionRecord, Ending, Epoch, Flag, FlagValue, Location, Metric,
    MetricDeltas, NoticeLevel, OptionId, RelationshipSource, SceneRecord, Season, TimeState,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A metric took a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MetricChanged {
    /// The metric.
    pub metric: Metric,
    /// Value before the change.
    pub old_value: i32,
    /// Value after clamping.
    pub new_value: i32,
    /// `new_value - old_value`.
    pub delta: i32,
}

/// The calendar advanced one season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SeasonChanged {
    /// New season.
    pub season: Season,
    /// New year.
    pub year: u32,
    /// New turn.
    pub turn: u64,
}

/// Availability annotation for one option of an offered decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OptionAvailability {
    /// The option.
    pub option_id: OptionId,
    /// Whether its requirements currently hold.
    pub available: bool,
}

/// A decision was offered to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DecisionStarted {
    /// The decision.
    pub decision: DecisionRecord,
    /// Availability of each option, in display order.
    pub options: Vec<OptionAvailability>,
}

/// A decision resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DecisionCompleted {
    /// The decision.
    pub decision_id: DecisionId,
    /// The chosen option.
    pub option_id: OptionId,
    /// Metric changes the choice caused.
    pub changes: Vec<MetricChanged>,
    /// Flags the choice set.
    pub flags: BTreeMap<Flag, FlagValue>,
}

/// A scene became current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SceneStarted {
    /// The scene.
    pub scene: SceneRecord,
}

/// A story epoch became current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EpochTriggered {
    /// The epoch.
    pub epoch: Epoch,
    /// Year of the trigger.
    pub year: u32,
    /// Season of the trigger.
    pub season: Season,
}

/// The game reached its final boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EndgameTriggered {
    /// The resolved ending.
    pub ending: Ending,
    /// Metric values at the end.
    pub metrics: BTreeMap<Metric, i32>,
    /// Flags at the end.
    pub flags: BTreeMap<Flag, FlagValue>,
    /// Calendar at the end.
    pub time: TimeState,
}

/// A relationship source changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RelationshipChanged {
    /// The character.
    pub character: Character,
    /// Which source moved.
    pub source: RelationshipSource,
    /// Requested delta.
    pub delta: i32,
    /// Source value after clamping.
    pub source_value: i32,
    /// Overall value after the change.
    pub overall: i32,
}

/// The player moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LocationChanged {
    /// New location.
    pub location: Location,
    /// Previous location.
    pub previous: Location,
}

/// A delayed effect fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DelayedEffectFired {
    /// Type tag of the effect.
    pub kind: String,
    /// Deltas it applied.
    pub effects: MetricDeltas,
    /// Turn it fired on.
    pub turn: u64,
}

/// A line was added to the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct JournalEntryAdded {
    /// The text.
    pub text: String,
    /// Turn it was written on.
    pub turn: u64,
}

/// State was replaced from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StateRestored {
    /// Turn of the restored state.
    pub turn: u64,
}

/// A non-blocking message for the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Message text.
    pub message: String,
}

/// Any notification the engine publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GameEvent {
    /// See [`MetricChanged`].
    MetricChanged(MetricChanged),
    /// See [`SeasonChanged`].
    SeasonChanged(SeasonChanged),
    /// See [`DecisionStarted`].
    DecisionStarted(DecisionStarted),
    /// See [`DecisionCompleted`].
    DecisionCompleted(DecisionCompleted),
    /// See [`SceneStarted`].
    SceneStarted(SceneStarted),
    /// See [`EpochTriggered`].
    EpochTriggered(EpochTriggered),
    /// See [`EndgameTriggered`].
    EndgameTriggered(EndgameTriggered),
    /// See [`RelationshipChanged`].
    RelationshipChanged(RelationshipChanged),
    /// See [`LocationChanged`].
    LocationChanged(LocationChanged),
    /// See [`DelayedEffectFired`].
    DelayedEffectFired(DelayedEffectFired),
    /// See [`JournalEntryAdded`].
    JournalEntry(JournalEntryAdded),
    /// See [`StateRestored`].
    StateRestored(StateRestored),
    /// See [`Notice`].
    Notice(Notice),
}

impl GameEvent {
    /// Stable kind name, matching the serialized `type` tag.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MetricChanged(_) => "metric_changed",
            Self::SeasonChanged(_) => "season_changed",
            Self::DecisionStarted(_) => "decision_started",
            Self::DecisionCompleted(_) => "decision_completed",
            Self::SceneStarted(_) => "scene_started",
            Self::EpochTriggered(_) => "epoch_triggered",
            Self::EndgameTriggered(_) => "endgame_triggered",
            Self::RelationshipChanged(_) => "relationship_changed",
            Self::LocationChanged(_) => "location_changed",
            Self::DelayedEffectFired(_) => "delayed_effect_fired",
            Self::JournalEntry(_) => "journal_entry",
            Self::StateRestored(_) => "state_restored",
            Self::Notice(_) => "notice",
        }
    }
}
