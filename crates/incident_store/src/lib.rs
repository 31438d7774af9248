//! SQLite persistence for analyzer runs.
//!
//! Stores deduplicated rule sets, registered scenarios with their speed
//! zones, and every violation a run produced.
//!
//! # Example
//!
//! ```rust,ignore
//! use incident_store::Store;
//!
//! let mut store = Store::open("runs.sqlite")?;
//! let rule_id = store.upsert_ruleset(&rules)?;
//! let scenario_id = store.register_scenario(&NewScenario::from_scenario(&scenario, path, rule_id))?;
//! store.save_report(scenario_id, &report.violations)?;
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod schema;
pub mod store;

pub use error::{Error, Result};
pub use store::{NewScenario, RecentViolation, Store};
