//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure that can end the process. Errors
//! raised by individual commands are reported to the player and do not
//! reach this type.

use revolution_core::{ConfigError, SessionError};
use revolution_db::DbError;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The game session could not be built.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: SessionError,
    },

    /// The save directory could not be opened.
    #[error("save store error: {source}")]
    Store {
        /// The underlying storage error.
        #[from]
        source: DbError,
    },

    /// Reading player input failed.
    #[error("input error: {source}")]
    Input {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
