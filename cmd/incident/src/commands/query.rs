//! Database query commands.

use anyhow::{Context, Result};
use incident_rules::ViolationKind;
use incident_store::Store;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Prints violation counts for the `runs` most recent runs.
pub fn summary(db: &Path, runs: usize) -> Result<()> {
    let store = open(db)?;
    let counts = store
        .summary(runs)
        .with_context(|| "Failed to summarize runs")?;
    print_json(&counts)
}

/// Prints every violation of one type for a scenario.
pub fn by_type(db: &Path, scenario_id: i64, kind: &str) -> Result<()> {
    let kind: ViolationKind = kind
        .parse()
        .with_context(|| "TYPE must be one of SPEEDING, ROLLING_STOP, TAILGATING, UNSAFE_LANE_CHANGE")?;
    let store = open(db)?;
    let violations = store
        .violations_by_type(scenario_id, kind)
        .with_context(|| format!("Failed to query {kind} violations for scenario {scenario_id}"))?;
    print_json(&violations)
}

/// Prints the most recently saved violations.
pub fn recent(db: &Path, limit: usize) -> Result<()> {
    let store = open(db)?;
    let violations = store
        .recent_violations(limit)
        .with_context(|| "Failed to query recent violations")?;
    print_json(&violations)
}

fn open(db: &Path) -> Result<Store> {
    if !db.exists() {
        anyhow::bail!("Database not found: {}", db.display());
    }
    debug!("Opening database {}", db.display());
    Store::open(db).with_context(|| format!("Failed to open database: {}", db.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).with_context(|| "Failed to encode output")?;
    println!("{json}");
    Ok(())
}
