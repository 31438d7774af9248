//! Driving-log parsing.
//!
//! # Log Format
//!
//! ```text
//! # comments and blank lines are ignored
//! 0:00.0 SPEED 28.5
//! 0:01.5 FOLLOW_DISTANCE 6.2
//! 0:03 LANE_CHANGE LEFT
//! 0:07.0 STOP_SIGN_DETECTED
//! ```

use crate::error::{Error, Result};
use crate::event::{Event, EventKind};
use std::path::Path;
use tracing::{debug, info};

/// Converts a timestamp like `M:SS` or `M:SS.s` into seconds.
///
/// # Errors
///
/// Returns [`Error::InvalidTimestamp`] if the string is not exactly one
/// `minutes:seconds` pair, minutes are not a non-negative integer, or seconds
/// fall outside `[0, 60)`.
///
/// # Example
///
/// ```rust
/// use incident_log::parse_time;
///
/// assert!((parse_time("0:05").unwrap() - 5.0).abs() < 1e-9);
/// assert!((parse_time("1:02.5").unwrap() - 62.5).abs() < 1e-9);
/// ```
pub fn parse_time(ts: &str) -> Result<f64> {
    let invalid = || Error::InvalidTimestamp(ts.to_string());

    let (minutes, seconds) = ts.split_once(':').ok_or_else(invalid)?;
    if seconds.contains(':') {
        return Err(invalid());
    }

    let minutes: u32 = minutes.trim().parse().map_err(|_| invalid())?;
    let seconds: f64 = seconds.trim().parse().map_err(|_| invalid())?;

    if !seconds.is_finite() || !(0.0..60.0).contains(&seconds) {
        return Err(invalid());
    }

    Ok(f64::from(minutes) * 60.0 + seconds)
}

/// Parses a single log line.
///
/// Returns `Ok(None)` for blank lines and `#` comments.
///
/// # Errors
///
/// Returns [`Error::Line`] describing what is wrong with the line.
pub fn parse_line(line_num: usize, line: &str) -> Result<Option<Event>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(Error::line(line_num, "expected 'TIMESTAMP EVENT_TYPE [ARGUMENT]'"));
    }

    let time = parse_time(parts[0]).map_err(|e| Error::line(line_num, e.to_string()))?;
    let kind: EventKind = parts[1]
        .parse()
        .map_err(|e: Error| Error::line(line_num, e.to_string()))?;

    let argument = match kind {
        EventKind::Speed | EventKind::FollowDistance => {
            if parts.len() != 3 {
                return Err(Error::line(
                    line_num,
                    format!("{kind} requires a numeric argument"),
                ));
            }
            if parts[2].parse::<f64>().is_err() {
                return Err(Error::line(
                    line_num,
                    format!("invalid numeric value: {}", parts[2]),
                ));
            }
            parts[2]
        }
        EventKind::LaneChange => {
            if parts.len() != 3 || !matches!(parts[2], "LEFT" | "RIGHT") {
                return Err(Error::line(
                    line_num,
                    "LANE_CHANGE requires 'LEFT' or 'RIGHT'",
                ));
            }
            parts[2]
        }
        EventKind::StopSignDetected => {
            if parts.len() != 2 {
                return Err(Error::line(
                    line_num,
                    "STOP_SIGN_DETECTED takes no arguments",
                ));
            }
            ""
        }
    };

    Ok(Some(Event::new(time, kind, argument)))
}

/// Parses every event in a log, in file order.
///
/// Events are not sorted; ordering is the rule engine's concern.
///
/// # Errors
///
/// Returns the first malformed line's error.
pub fn parse_log(content: &str) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if let Some(event) = parse_line(idx + 1, line)? {
            events.push(event);
        }
    }
    debug!("Parsed {} events", events.len());
    Ok(events)
}

/// Reads and parses a log file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, or an [`Error::InFile`]
/// wrapping the first malformed line.
pub fn read_log(path: impl AsRef<Path>) -> Result<Vec<Event>> {
    let path = path.as_ref();
    info!("Reading driving log {}", path.display());

    let content = std::fs::read_to_string(path)?;
    parse_log(&content).map_err(|e| Error::InFile {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}
