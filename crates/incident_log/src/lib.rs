//! Driving-event log parsing for the incident analyzer.
//!
//! This crate provides:
//! - The [`Event`] model consumed by the rule engine
//! - Timestamp parsing (`M:SS` / `M:SS.s`)
//! - Line-oriented log parsing with per-line validation
//!
//! # Example
//!
//! ```rust,ignore
//! use incident_log::read_log;
//!
//! let events = read_log("runs/downtown.log")?;
//! for event in &events {
//!     println!("{} {}", event.time, event.kind);
//! }
//! ```

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod event;
pub mod reader;

pub use error::{Error, Result};
pub use event::{Event, EventKind};
pub use reader::{parse_line, parse_log, parse_time, read_log};
