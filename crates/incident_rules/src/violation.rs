//! Violation records.

use crate::time::format_time;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single rule violation.
///
/// Serializes with exactly the keys `type`, `time` and `details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Which rule was broken.
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    /// When it happened, as `MM:SS.s`.
    pub time: String,
    /// Human-readable explanation.
    pub details: String,
}

/// The rules a driver can break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    /// Faster than the effective speed limit.
    Speeding,
    /// Left a stop sign before the required wait elapsed.
    RollingStop,
    /// Following distance below the minimum.
    Tailgating,
    /// Changed lanes while following too closely.
    UnsafeLaneChange,
}

/// Error returned when parsing an unknown violation type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownViolationKind(pub String);

impl fmt::Display for UnknownViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown violation type: {}", self.0)
    }
}

impl std::error::Error for UnknownViolationKind {}

impl Violation {
    /// Creates a violation with an already formatted timestamp.
    #[must_use]
    pub fn new(kind: ViolationKind, time: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            kind,
            time: time.into(),
            details: details.into(),
        }
    }

    /// Creates a violation at the given number of seconds.
    #[must_use]
    pub fn at(kind: ViolationKind, seconds: f64, details: impl Into<String>) -> Self {
        Self::new(kind, format_time(seconds), details)
    }
}

impl ViolationKind {
    /// All violation kinds.
    pub const ALL: [Self; 4] = [
        Self::Speeding,
        Self::RollingStop,
        Self::Tailgating,
        Self::UnsafeLaneChange,
    ];

    /// Returns the report keyword for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Speeding => "SPEEDING",
            Self::RollingStop => "ROLLING_STOP",
            Self::Tailgating => "TAILGATING",
            Self::UnsafeLaneChange => "UNSAFE_LANE_CHANGE",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViolationKind {
    type Err = UnknownViolationKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownViolationKind(s.to_string()))
    }
}
