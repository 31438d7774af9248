//! Road-rule violation detection for driving logs.
//!
//! The engine makes a single forward pass over a driving log and reports
//! every rule the vehicle broke, ordered by formatted time.
//!
//! # Rules Checked
//!
//! - **Speeding**: speed above the global limit, lowered by every speed zone
//! - **Rolling stop**: moving again before the required stop-sign wait elapsed
//! - **Tailgating**: following distance below the configured minimum
//! - **Unsafe lane change**: changing lanes while the last distance was too short
//!
//! # Example
//!
//! ```rust,ignore
//! use incident_rules::{detect_violations, make_report};
//!
//! let violations = detect_violations(&scenario, events)?;
//! let report = make_report(&scenario, violations);
//! println!("{}", report.total_violations);
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod checks;
pub mod engine;
pub mod error;
pub mod report;
pub mod time;
pub mod violation;

pub use engine::{detect_violations, RuleEngine, EPSILON, MOVING_SPEED_MPH};
pub use error::{Error, Result};
pub use report::{make_report, Report, ReportFormat};
pub use time::format_time;
pub use violation::{UnknownViolationKind, Violation, ViolationKind};
