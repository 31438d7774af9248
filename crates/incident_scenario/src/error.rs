//! Error types for scenario loading and rule resolution.

use thiserror::Error;

/// Errors that can occur while loading a scenario or resolving its rules.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing required field.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A road rule is present but cannot be read as a number.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: String,
        /// Reason why the value was rejected.
        reason: String,
    },

    /// Scenario structure is valid JSON but has the wrong shape.
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates an invalid-value error for the given field.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for scenario operations.
pub type Result<T> = std::result::Result<T, Error>;
