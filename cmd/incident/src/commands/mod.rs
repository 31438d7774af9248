//! Subcommand implementations.

pub mod analyze;
pub mod query;
