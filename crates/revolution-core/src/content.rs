//! Built-in content tables.
//!
//! Decisions, scenes and endings ship as YAML under `content/` and are
//! compiled into the binary. Parsing goes through the typed records, so an
//! unknown metric or flag key fails here rather than at resolution time.

use revolution_types::{DecisionRecord, EndingDefinition, SceneRecord};

const DECISIONS_YAML: &str = include_str!("../content/decisions.yaml");
const SCENES_YAML: &str = include_str!("../content/scenes.yaml");
const ENDINGS_YAML: &str = include_str!("../content/endings.yaml");

/// Errors that can occur when loading content tables.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// A table failed to parse.
    #[error("failed to parse {table} content: {source}")]
    Yaml {
        /// Which table (`decisions`, `scenes`, `endings`).
        table: &'static str,
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A table parsed but is inconsistent.
    #[error("invalid {table} content: {reason}")]
    Invalid {
        /// Which table.
        table: &'static str,
        /// What is wrong.
        reason: String,
    },
}

/// Parse a decision table.
///
/// # Errors
///
/// Returns [`ContentError::Yaml`] if the YAML does not match the record shape.
pub fn parse_decisions(yaml: &str) -> Result<Vec<DecisionRecord>, ContentError> {
    serde_yml::from_str(yaml).map_err(|source| ContentError::Yaml {
        table: "decisions",
        source,
    })
}

/// Parse a scene table.
///
/// # Errors
///
/// Returns [`ContentError::Yaml`] if the YAML does not match the record shape.
pub fn parse_scenes(yaml: &str) -> Result<Vec<SceneRecord>, ContentError> {
    serde_yml::from_str(yaml).map_err(|source| ContentError::Yaml {
        table: "scenes",
        source,
    })
}

/// Parse an ending table.
///
/// # Errors
///
/// Returns [`ContentError::Yaml`] if the YAML does not match the record shape.
pub fn parse_endings(yaml: &str) -> Result<Vec<EndingDefinition>, ContentError> {
    serde_yml::from_str(yaml).map_err(|source| ContentError::Yaml {
        table: "endings",
        source,
    })
}

/// The built-in decision table.
///
/// # Errors
///
/// Returns [`ContentError`] if the embedded table is malformed.
pub fn builtin_decisions() -> Result<Vec<DecisionRecord>, ContentError> {
    parse_decisions(DECISIONS_YAML)
}

/// The built-in scene table.
///
/// # Errors
///
/// Returns [`ContentError`] if the embedded table is malformed.
pub fn builtin_scenes() -> Result<Vec<SceneRecord>, ContentError> {
    parse_scenes(SCENES_YAML)
}

/// The built-in ending table.
///
/// # Errors
///
/// Returns [`ContentError`] if the embedded table is malformed.
pub fn builtin_endings() -> Result<Vec<EndingDefinition>, ContentError> {
    parse_endings(ENDINGS_YAML)
}
