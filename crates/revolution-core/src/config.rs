//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `revolution-config.yaml` at the
//! project root. Every section and field has a default, so an empty file
//! (or no file at all) yields a playable game.

use std::collections::BTreeMap;
use std::path::Path;

use revolution_types::{Metric, Season};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// Parsed values are inconsistent.
    #[error("invalid config: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `revolution-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameConfig {
    /// Calendar bounds and seed.
    #[serde(default)]
    pub game: GameSection,

    /// Initial metric values.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Scene scheduling.
    #[serde(default)]
    pub narrative: NarrativeConfig,

    /// Random event and location event odds.
    #[serde(default)]
    pub events: EventsConfig,

    /// Journal bounds.
    #[serde(default)]
    pub journal: JournalConfig,

    /// Save storage.
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `REVOLUTION_SAVE_DIR` overrides `persistence.save_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are inconsistent.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are inconsistent.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.persistence.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game.start_year == 0 {
            return Err(ConfigError::Invalid {
                reason: "game.start_year must be at least 1".to_owned(),
            });
        }
        if self.game.final_year < self.game.start_year {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "game.final_year ({}) is before game.start_year ({})",
                    self.game.final_year, self.game.start_year
                ),
            });
        }
        for (name, chance) in [
            ("events.random_event_chance", self.events.random_event_chance),
            ("events.memory_scene_chance", self.events.memory_scene_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(ConfigError::Invalid {
                    reason: format!("{name} must be within 0.0..=1.0, got {chance}"),
                });
            }
        }
        if self.narrative.scene_history_cap == 0 {
            return Err(ConfigError::Invalid {
                reason: "narrative.scene_history_cap must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// Calendar bounds and seed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameSection {
    /// Random seed for generated scenes and events.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Year the game starts in.
    #[serde(default = "default_start_year")]
    pub start_year: u32,

    /// Year of the final boundary.
    #[serde(default = "default_final_year")]
    pub final_year: u32,

    /// Season of the final boundary.
    #[serde(default = "default_final_season")]
    pub final_season: Season,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            start_year: default_start_year(),
            final_year: default_final_year(),
            final_season: default_final_season(),
        }
    }
}

/// Initial metric values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetricsConfig {
    /// Starting value per metric. Missing metrics start at 50.
    #[serde(default = "default_initial_metrics")]
    pub initial: BTreeMap<Metric, i32>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            initial: default_initial_metrics(),
        }
    }
}

/// Scene scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NarrativeConfig {
    /// Pause after each presented scene.
    #[serde(default = "default_inter_scene_gap_ms")]
    pub inter_scene_gap_ms: u64,

    /// Delay before an authored seasonal scene.
    #[serde(default = "default_season_scene_delay_ms")]
    pub season_scene_delay_ms: u64,

    /// Delay before a generated seasonal scene.
    #[serde(default = "default_generated_scene_delay_ms")]
    pub generated_scene_delay_ms: u64,

    /// Delay before an epoch scene.
    #[serde(default = "default_epoch_scene_delay_ms")]
    pub epoch_scene_delay_ms: u64,

    /// Delay before a location scene.
    #[serde(default = "default_location_scene_delay_ms")]
    pub location_scene_delay_ms: u64,

    /// Delay before a memory scene.
    #[serde(default = "default_memory_scene_delay_ms")]
    pub memory_scene_delay_ms: u64,

    /// Maximum scene history entries kept.
    #[serde(default = "default_scene_history_cap")]
    pub scene_history_cap: usize,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            inter_scene_gap_ms: default_inter_scene_gap_ms(),
            season_scene_delay_ms: default_season_scene_delay_ms(),
            generated_scene_delay_ms: default_generated_scene_delay_ms(),
            epoch_scene_delay_ms: default_epoch_scene_delay_ms(),
            location_scene_delay_ms: default_location_scene_delay_ms(),
            memory_scene_delay_ms: default_memory_scene_delay_ms(),
            scene_history_cap: default_scene_history_cap(),
        }
    }
}

/// Random event and location event odds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventsConfig {
    /// Chance of a random event after each season advance.
    #[serde(default = "default_random_event_chance")]
    pub random_event_chance: f64,

    /// Chance the barn triggers the massacre memory.
    #[serde(default = "default_memory_scene_chance")]
    pub memory_scene_chance: f64,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            random_event_chance: default_random_event_chance(),
            memory_scene_chance: default_memory_scene_chance(),
        }
    }
}

/// Journal bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JournalConfig {
    /// Maximum journal lines kept.
    #[serde(default = "default_journal_max_entries")]
    pub max_entries: usize,

    /// Absolute delta on loyalty, rations or security that triggers a
    /// character reaction line.
    #[serde(default = "default_reaction_threshold")]
    pub reaction_threshold: i32,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            max_entries: default_journal_max_entries(),
            reaction_threshold: default_reaction_threshold(),
        }
    }
}

/// Save storage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// Directory holding save files.
    #[serde(default = "default_save_dir")]
    pub save_dir: String,

    /// Key prefix for slot records.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Autosave to slot 0 after each season.
    #[serde(default = "default_true")]
    pub autosave: bool,
}

impl PersistenceConfig {
    /// Override values from environment variables.
    ///
    /// - `REVOLUTION_SAVE_DIR` overrides `save_dir`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("REVOLUTION_SAVE_DIR") {
            self.save_dir = val;
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            key_prefix: default_key_prefix(),
            autosave: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    1945
}

const fn default_start_year() -> u32 {
    1
}

const fn default_final_year() -> u32 {
    6
}

const fn default_final_season() -> Season {
    Season::Winter
}

fn default_initial_metrics() -> BTreeMap<Metric, i32> {
    BTreeMap::from([
        (Metric::Loyalty, 60),
        (Metric::Rations, 50),
        (Metric::Security, 40),
        (Metric::Corruption, 10),
        (Metric::Innovation, 20),
        (Metric::HistoricalTruth, 90),
        (Metric::Fatigue, 10),
    ])
}

const fn default_inter_scene_gap_ms() -> u64 {
    3000
}

const fn default_season_scene_delay_ms() -> u64 {
    1000
}

const fn default_generated_scene_delay_ms() -> u64 {
    500
}

const fn default_epoch_scene_delay_ms() -> u64 {
    500
}

const fn default_location_scene_delay_ms() -> u64 {
    300
}

const fn default_memory_scene_delay_ms() -> u64 {
    500
}

const fn default_scene_history_cap() -> usize {
    50
}

const fn default_random_event_chance() -> f64 {
    0.3
}

const fn default_memory_scene_chance() -> f64 {
    0.3
}

const fn default_journal_max_entries() -> usize {
    200
}

const fn default_reaction_threshold() -> i32 {
    15
}

fn default_save_dir() -> String {
    "saves".to_owned()
}

fn default_key_prefix() -> String {
    revolution_db::DEFAULT_KEY_PREFIX.to_owned()
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_owned()
}
