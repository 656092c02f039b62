//! Error types for the training loop

use thiserror::Error;

use crate::ActionId;

/// Core error type for training-loop operations
#[derive(Error, Debug)]
pub enum RLError {
    /// Environment-related errors
    #[error("Environment error: {0}")]
    Environment(String),

    /// Mission could not be started within the retry budget
    #[error("Error starting mission after {attempts} attempts: {message}")]
    MissionStart {
        /// Number of start attempts made
        attempts: usize,
        /// Message of the last start failure
        message: String,
    },

    /// Training was attempted before any transition was recorded
    #[error("Insufficient replay data: memory is empty")]
    InsufficientData,

    /// Model query or training failure
    #[error("Model error: {0}")]
    Model(String),

    /// Invalid action
    #[error("Invalid action: {0}")]
    InvalidAction(ActionId),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl RLError {
    /// Whether this error must abort the whole process rather than a single episode.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissionStart { .. })
    }
}

/// Result type alias for training-loop operations
pub type Result<T> = std::result::Result<T, RLError>;
