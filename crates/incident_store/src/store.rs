//! Run database.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use incident_rules::{Violation, ViolationKind};
use incident_scenario::{RuleSet, Scenario, SpeedZone};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::schema;

/// Tolerance used when matching an existing rule set.
const RULE_TOLERANCE: f64 = 1e-9;

/// SQLite-backed store for analyzer runs.
pub struct Store {
    conn: Connection,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.conn.path())
            .finish_non_exhaustive()
    }
}

/// A scenario about to be registered.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScenario {
    /// Scenario name.
    pub name: String,
    /// Scenario description.
    pub description: String,
    /// Path the scenario was loaded from.
    pub source_file: String,
    /// Rule set the scenario runs under.
    pub rule_id: i64,
    /// Declared speed zones.
    pub speed_zones: Vec<SpeedZone>,
}

/// A violation joined with the scenario it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentViolation {
    /// Owning scenario ID.
    pub scenario_id: i64,
    /// Owning scenario name.
    pub scenario_name: String,
    /// Violation time (`MM:SS.s`).
    pub time: String,
    /// Violation kind.
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    /// Violation details.
    pub details: String,
}

impl NewScenario {
    /// Describes a loaded scenario for registration.
    #[must_use]
    pub fn from_scenario(scenario: &Scenario, source_file: impl Into<String>, rule_id: i64) -> Self {
        Self {
            name: scenario.display_name().to_string(),
            description: scenario.description.clone().unwrap_or_default(),
            source_file: source_file.into(),
            rule_id,
            speed_zones: scenario.speed_zones.clone(),
        }
    }
}

impl Store {
    /// Opens (or creates) a database file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        info!("Opening run database {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        schema::apply(&conn)?;
        Ok(Self { conn })
    }

    /// Returns the ID of a rule set with identical thresholds, inserting one if needed.
    ///
    /// # Errors
    ///
    /// Returns an error on database failure.
    pub fn upsert_ruleset(&self, rules: &RuleSet) -> Result<i64> {
        let existing = self
            .conn
            .query_row(
                "SELECT rule_id FROM ruleset
                 WHERE abs(max_speed - ?1) < ?4
                   AND abs(min_follow_distance - ?2) < ?4
                   AND abs(stop_sign_wait - ?3) < ?4
                 ORDER BY rule_id
                 LIMIT 1",
                params![
                    rules.max_speed,
                    rules.min_follow_distance,
                    rules.stop_sign_wait,
                    RULE_TOLERANCE
                ],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(rule_id) = existing {
            debug!(rule_id, "Reusing existing rule set");
            return Ok(rule_id);
        }

        self.conn.execute(
            "INSERT INTO ruleset (max_speed, min_follow_distance, stop_sign_wait)
             VALUES (?1, ?2, ?3)",
            params![rules.max_speed, rules.min_follow_distance, rules.stop_sign_wait],
        )?;
        let rule_id = self.conn.last_insert_rowid();
        debug!(rule_id, "Inserted rule set");
        Ok(rule_id)
    }

    /// Registers a scenario and its speed zones in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule set does not exist, a zone limit is not
    /// numeric, or the insert fails.
    pub fn register_scenario(&mut self, scenario: &NewScenario) -> Result<i64> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO scenario (name, description, source_file, rule_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                scenario.name,
                scenario.description,
                scenario.source_file,
                scenario.rule_id,
                now()
            ],
        )?;
        let scenario_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO speed_zone (scenario_id, start_mile, end_mile, speed_limit)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for zone in &scenario.speed_zones {
                stmt.execute(params![
                    scenario_id,
                    zone.start_mile,
                    zone.end_mile,
                    zone.limit()?
                ])?;
            }
        }

        tx.commit()?;
        info!(scenario_id, name = %scenario.name, "Registered scenario");
        Ok(scenario_id)
    }

    /// Saves a run's violations in one transaction.
    ///
    /// An empty list is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScenarioNotFound`] for an unknown scenario.
    pub fn save_report(&mut self, scenario_id: i64, violations: &[Violation]) -> Result<()> {
        if violations.is_empty() {
            return Ok(());
        }
        self.ensure_scenario(scenario_id)?;

        let created_at = now();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO violation (scenario_id, tstamp, type, details, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for v in violations {
                stmt.execute(params![
                    scenario_id,
                    v.time,
                    v.kind.as_str(),
                    v.details,
                    created_at
                ])?;
            }
        }
        tx.commit()?;

        info!(scenario_id, count = violations.len(), "Saved violations");
        Ok(())
    }

    /// Returns violation counts by type for one scenario.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScenarioNotFound`] for an unknown scenario.
    pub fn violation_counts(&self, scenario_id: i64) -> Result<BTreeMap<String, i64>> {
        self.ensure_scenario(scenario_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT type, COUNT(*) FROM violation
             WHERE scenario_id = ?1
             GROUP BY type",
        )?;
        let rows = stmt.query_map(params![scenario_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Returns violation counts by type across the `runs` most recent scenarios.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `runs` is zero.
    pub fn summary(&self, runs: usize) -> Result<BTreeMap<String, i64>> {
        let runs = positive_limit("runs", runs)?;
        let mut stmt = self.conn.prepare(
            "SELECT type, COUNT(*) FROM violation
             WHERE scenario_id IN (
                 SELECT scenario_id FROM scenario
                 ORDER BY created_at DESC, scenario_id DESC
                 LIMIT ?1
             )
             GROUP BY type",
        )?;
        let rows = stmt.query_map(params![runs], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Returns every violation of one kind for a scenario, in time order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScenarioNotFound`] for an unknown scenario.
    pub fn violations_by_type(&self, scenario_id: i64, kind: ViolationKind) -> Result<Vec<Violation>> {
        self.ensure_scenario(scenario_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT tstamp, details FROM violation
             WHERE scenario_id = ?1 AND type = ?2
             ORDER BY tstamp, violation_id",
        )?;
        let rows = stmt.query_map(params![scenario_id, kind.as_str()], |row| {
            Ok(Violation::new(kind, row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Returns the most recently saved violations across all scenarios.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `limit` is zero.
    pub fn recent_violations(&self, limit: usize) -> Result<Vec<RecentViolation>> {
        let limit = positive_limit("limit", limit)?;
        let mut stmt = self.conn.prepare(
            "SELECT v.scenario_id, s.name, v.tstamp, v.type, v.details
             FROM violation v
             JOIN scenario s ON v.scenario_id = s.scenario_id
             ORDER BY v.created_at DESC, v.violation_id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(RecentViolation {
                scenario_id: row.get(0)?,
                scenario_name: row.get(1)?,
                time: row.get(2)?,
                kind: kind_column(row, 3)?,
                details: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    fn ensure_scenario(&self, scenario_id: i64) -> Result<()> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM scenario WHERE scenario_id = ?1",
                params![scenario_id],
                |_| Ok(()),
            )
            .optional()?;
        found.ok_or(Error::ScenarioNotFound(scenario_id))
    }
}

fn kind_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<ViolationKind> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn positive_limit(name: &str, value: usize) -> Result<i64> {
    if value == 0 {
        return Err(Error::InvalidArgument(format!("{name} must be a positive integer")));
    }
    i64::try_from(value).map_err(|_| Error::InvalidArgument(format!("{name} is too large")))
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
