//! Error types for the persistence layer.
//!
//! All errors are propagated via [`DbError`], which wraps the underlying
//! I/O and JSON errors with the key or slot involved.

/// Errors that can occur while saving or loading.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being read or written.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A key was not found in the store.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// A slot number outside the allowed set.
    #[error("Invalid save slot: {0} (allowed: 0, 1-5, 9)")]
    InvalidSlot(u8),
}
