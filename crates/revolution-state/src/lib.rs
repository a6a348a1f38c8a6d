//! Bounded game state and effect resolution.
//!
//! Metrics are integers clamped to `[0, 100]` after every write. Flags are
//! write-only story facts. Relationships are averaged over their sources.
//! All of it mutates only through [`EffectResolver`] or the narrow entry
//! points on [`GameState`], and every mutation publishes to an
//! [`revolution_events::EventSink`] before returning.
//!
//! # Modules
//!
//! - [`metrics`] -- [`MetricStore`], the seven bounded metrics
//! - [`flags`] -- [`FlagSet`], story flags
//! - [`relationships`] -- [`RelationshipBook`], per-source character affinity
//! - [`state`] -- [`GameState`] bundle and requirement checks
//! - [`resolver`] -- [`EffectResolver`], decision resolution and delayed effects
//! - [`error`] -- [`ResolveError`] and [`Unmet`]

pub mod error;
pub mod flags;
pub mod metrics;
pub mod relationships;
pub mod resolver;
pub mod state;

pub use error::{ResolveError, Unmet};
pub use flags::FlagSet;
pub use metrics::{DEFAULT_METRIC_VALUE, MetricStore};
pub use relationships::{NEUTRAL_AFFINITY, RelationshipBook};
pub use resolver::{EffectResolver, FiredEffect, Resolution};
pub use state::GameState;
