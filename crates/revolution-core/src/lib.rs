//! Game clock, decisions, narrative scheduling and orchestration for the
//! Revolution narrative engine.
//!
//! This crate owns the season cycle that drives the game: advance the
//! calendar, fire delayed effects, queue the season's scene, trigger
//! epochs, offer decisions, and resolve the ending at the final boundary.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `revolution-config.yaml` into
//!   strongly-typed structs.
//! - [`content`] -- Embedded decision, scene and ending tables.
//! - [`clock`] -- [`GameClock`], seasons, years and the epoch trigger table.
//! - [`catalog`] -- [`DecisionCatalog`] and decision availability.
//! - [`scenes`] -- [`SceneCatalog`], authored and generated scenes.
//! - [`scheduler`] -- [`NarrativeScheduler`], the serialized scene queue.
//! - [`ending`] -- [`EndingResolver`], priority-ordered ending selection.
//! - [`locations`] -- Farm locations, access rules and arrival events.
//! - [`characters`] -- Emotions, dialogue and journal reactions.
//! - [`random_events`] -- Weather, sickness and other random events.
//! - [`journal`] -- Bounded narrative journal.
//! - [`history`] -- Decision, scene and location history.
//! - [`session`] -- [`GameSession`], the owned game state and its entry points.
//! - [`game`] -- [`Game`], the shared handle driving the scheduler and saves.

pub mod catalog;
pub mod characters;
pub mod clock;
pub mod config;
pub mod content;
pub mod ending;
pub mod game;
pub mod history;
pub mod journal;
pub mod locations;
pub mod random_events;
pub mod scenes;
pub mod scheduler;
pub mod session;

pub use catalog::DecisionCatalog;
pub use clock::{ClockError, GameClock, SeasonAdvance};
pub use config::{ConfigError, GameConfig};
pub use content::ContentError;
pub use ending::EndingResolver;
pub use game::Game;
pub use scenes::SceneCatalog;
pub use scheduler::{NarrativeScheduler, SceneRequest, ScenePresenter};
pub use session::{
    ChoiceOutcome, GameSession, LocationOutcome, SceneCue, SessionError, TickSummary,
};
