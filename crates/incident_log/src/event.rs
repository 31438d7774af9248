//! Driving-event model.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A timestamped driving event.
///
/// The argument is kept as the raw token from the log; numeric kinds are
/// parsed lazily so that malformed telemetry can be skipped downstream
/// instead of failing the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Seconds since the start of the run.
    pub time: f64,
    /// Event kind.
    pub kind: EventKind,
    /// Raw argument (speed, distance, direction, or empty).
    pub argument: String,
}

/// The kinds of event a driving log can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// Vehicle speed in mph.
    Speed,
    /// Distance to the vehicle ahead in meters.
    FollowDistance,
    /// Lane change, `LEFT` or `RIGHT`.
    LaneChange,
    /// A stop sign came into view.
    StopSignDetected,
}

impl Event {
    /// Creates a new event.
    #[must_use]
    pub fn new(time: f64, kind: EventKind, argument: impl Into<String>) -> Self {
        Self {
            time,
            kind,
            argument: argument.into(),
        }
    }

    /// Creates a `SPEED` event.
    #[must_use]
    pub fn speed(time: f64, mph: impl Into<String>) -> Self {
        Self::new(time, EventKind::Speed, mph)
    }

    /// Creates a `FOLLOW_DISTANCE` event.
    #[must_use]
    pub fn follow_distance(time: f64, meters: impl Into<String>) -> Self {
        Self::new(time, EventKind::FollowDistance, meters)
    }

    /// Creates a `LANE_CHANGE` event.
    #[must_use]
    pub fn lane_change(time: f64, direction: impl Into<String>) -> Self {
        Self::new(time, EventKind::LaneChange, direction)
    }

    /// Creates a `STOP_SIGN_DETECTED` event.
    #[must_use]
    pub fn stop_sign(time: f64) -> Self {
        Self::new(time, EventKind::StopSignDetected, "")
    }

    /// Parses the argument as a float, if it is one.
    #[must_use]
    pub fn numeric_argument(&self) -> Option<f64> {
        self.argument.trim().parse().ok()
    }
}

impl EventKind {
    /// All event kinds, in log-keyword order.
    pub const ALL: [Self; 4] = [
        Self::Speed,
        Self::FollowDistance,
        Self::LaneChange,
        Self::StopSignDetected,
    ];

    /// Returns the log keyword for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Speed => "SPEED",
            Self::FollowDistance => "FOLLOW_DISTANCE",
            Self::LaneChange => "LANE_CHANGE",
            Self::StopSignDetected => "STOP_SIGN_DETECTED",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownEvent(s.to_string()))
    }
}
