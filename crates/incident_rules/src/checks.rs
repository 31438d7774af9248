//! Individual rule checks.
//!
//! Each check is a pure comparison against one threshold. State such as the
//! last follow distance or a pending stop sign is owned by the engine.

use crate::engine::EPSILON;
use crate::violation::{Violation, ViolationKind};

/// Checks a speed reading against the effective limit.
pub fn check_speeding(time: f64, speed: f64, limit: f64) -> Option<Violation> {
    (speed > limit + EPSILON).then(|| {
        Violation::at(
            ViolationKind::Speeding,
            time,
            format!("{speed:.1} mph in {limit:.0} mph zone"),
        )
    })
}

/// Checks how long the vehicle waited at a stop sign before moving off.
pub fn check_rolling_stop(time: f64, waited: f64, required: f64) -> Option<Violation> {
    (waited < required - EPSILON).then(|| {
        Violation::at(
            ViolationKind::RollingStop,
            time,
            format!("Stopped {waited:.1}s; required {required:.1}s"),
        )
    })
}

/// Checks a follow-distance reading.
pub fn check_tailgating(time: f64, distance: f64, minimum: f64) -> Option<Violation> {
    (distance < minimum - EPSILON).then(|| {
        Violation::at(
            ViolationKind::Tailgating,
            time,
            format!("{distance:.1} m < {minimum:.1} m"),
        )
    })
}

/// Checks a lane change against the most recent follow distance.
///
/// `last_distance` is infinite until a distance has been observed, which
/// never trips the check.
pub fn check_lane_change(time: f64, last_distance: f64, minimum: f64) -> Option<Violation> {
    (last_distance < minimum - EPSILON).then(|| {
        Violation::at(
            ViolationKind::UnsafeLaneChange,
            time,
            format!("follow {last_distance:.1} m < {minimum:.1} m"),
        )
    })
}
