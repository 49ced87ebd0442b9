//! Error types for the npcchat core library.

use thiserror::Error;

/// Top-level error type for all core operations.
#[derive(Error, Debug)]
pub enum ChatError {
    /// A message record is missing a field, has the wrong shape, or carries
    /// a timestamp that cannot be parsed.
    #[error("Malformed input at record {index}: {reason}")]
    MalformedInput {
        /// Zero-based position of the offending record in the input array.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The input document itself is not a JSON array of records.
    #[error("Malformed input document: {0}")]
    MalformedDocument(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChatError {
    /// Whether this error came from the message input rather than config or I/O.
    #[must_use]
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MalformedInput { .. } | Self::MalformedDocument(_))
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, ChatError>;
