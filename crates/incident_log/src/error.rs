//! Error types for log parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing a driving log.
#[derive(Debug, Error)]
pub enum Error {
    /// Timestamp is not `M:SS` or `M:SS.s`, or is out of range.
    #[error("invalid time format: {0}")]
    InvalidTimestamp(String),

    /// Event type is not one of the known kinds.
    #[error("unknown event type: {0}")]
    UnknownEvent(String),

    /// A log line is malformed.
    #[error("line {line}: {reason}")]
    Line {
        /// 1-based line number.
        line: usize,
        /// Reason for the failure.
        reason: String,
    },

    /// An error inside a specific log file.
    #[error("error in log file '{}': {source}", .path.display())]
    InFile {
        /// Path of the log file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<Error>,
    },

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a line error.
    pub fn line(line: usize, reason: impl Into<String>) -> Self {
        Self::Line {
            line,
            reason: reason.into(),
        }
    }

    /// Returns the 1-based line number this error refers to, if any.
    #[must_use]
    pub fn line_number(&self) -> Option<usize> {
        match self {
            Self::Line { line, .. } => Some(*line),
            Self::InFile { source, .. } => source.line_number(),
            _ => None,
        }
    }
}

/// Result type alias for log operations.
pub type Result<T> = std::result::Result<T, Error>;
