//! Shared type definitions for the Revolution narrative engine.
//!
//! This crate is the single source of truth for the types used across the
//! workspace. Types defined here flow downstream to `TypeScript` via
//! `ts-rs` for the browser front end.
//!
//! # Modules
//!
//! - [`ids`] -- Typed identifiers for decisions, options, scenes and epochs
//! - [`enums`] -- Metrics, flags, seasons, characters, locations, endings
//! - [`structs`] -- Content records, runtime records and the game snapshot

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    Character, DecisionCategory, Emotion, Ending, Flag, Location, Metric, NoticeLevel,
    RelationshipSource, Season, UnknownKey,
};
pub use ids::{DecisionId, Epoch, OptionId, SceneId};
pub use structs::{
    DecisionHistoryEntry, DecisionKind, DecisionOption, DecisionRecord, DelayedEffect,
    DelayedSpec, EndingDefinition, FlagValue, GameSnapshot, JournalLine, LocationVisit,
    MetricBound, MetricDeltas, RelationshipTable, Requirements, SceneHistoryEntry, SceneRecord,
    SceneTrigger, TimeState,
};
