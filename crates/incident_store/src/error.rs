//! Error types for persistence.

use thiserror::Error;

/// Errors that can occur while reading or writing the run database.
#[derive(Debug, Error)]
pub enum Error {
    /// Referenced scenario does not exist.
    #[error("scenario with ID {0} does not exist")]
    ScenarioNotFound(i64),

    /// Caller passed an unusable argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Scenario data could not be resolved.
    #[error(transparent)]
    Scenario(#[from] incident_scenario::Error),

    /// SQLite error.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, Error>;
