//! Error types for rule evaluation and reporting.

use thiserror::Error;

/// Errors that can occur during rule evaluation or report rendering.
#[derive(Debug, Error)]
pub enum Error {
    /// Road rules are missing or not numeric. Raised before any event is read.
    #[error("configuration error: {0}")]
    Config(#[from] incident_scenario::Error),

    /// Report could not be serialized.
    #[error("failed to render report: {0}")]
    Render(String),
}

/// Result type alias for rule operations.
pub type Result<T> = std::result::Result<T, Error>;
