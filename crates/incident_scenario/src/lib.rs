//! Scenario model and loading for the incident analyzer.
//!
//! This crate provides:
//! - The typed scenario model (road rules, speed zones)
//! - Numeric resolution of raw road rules into a [`RuleSet`]
//! - JSON scenario loading with required-field validation
//!
//! # Example
//!
//! ```rust,ignore
//! use incident_scenario::load_scenario;
//!
//! let scenario = load_scenario("scenarios/school_zone.json")?;
//! let rules = scenario.rule_set()?;
//! assert!(rules.max_speed > 0.0);
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod loader;
pub mod model;

pub use error::{Error, Result};
pub use loader::{load_scenario, parse_scenario};
pub use model::{RuleSet, Scenario, SpeedZone, REQUIRED_RULES};
