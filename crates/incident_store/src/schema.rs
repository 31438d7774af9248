//! Database schema.

use rusqlite::Connection;

use crate::error::Result;

/// Applies connection pragmas and creates every table that is missing.
pub fn apply(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS ruleset (
            rule_id             INTEGER PRIMARY KEY AUTOINCREMENT,
            max_speed           REAL NOT NULL,
            min_follow_distance REAL NOT NULL,
            stop_sign_wait      REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS scenario (
            scenario_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            source_file TEXT NOT NULL DEFAULT '',
            rule_id     INTEGER NOT NULL REFERENCES ruleset(rule_id),
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS speed_zone (
            zone_id     INTEGER PRIMARY KEY AUTOINCREMENT,
            scenario_id INTEGER NOT NULL REFERENCES scenario(scenario_id) ON DELETE CASCADE,
            start_mile  REAL NOT NULL,
            end_mile    REAL NOT NULL,
            speed_limit REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS violation (
            violation_id INTEGER PRIMARY KEY AUTOINCREMENT,
            scenario_id  INTEGER NOT NULL REFERENCES scenario(scenario_id) ON DELETE CASCADE,
            tstamp       TEXT NOT NULL,
            type         TEXT NOT NULL,
            details      TEXT NOT NULL,
            created_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_violation_scenario ON violation(scenario_id);
        CREATE INDEX IF NOT EXISTS idx_violation_type ON violation(scenario_id, type);
        CREATE INDEX IF NOT EXISTS idx_scenario_created ON scenario(created_at);
        ",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        apply(&conn).unwrap();
        apply(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('ruleset', 'scenario', 'speed_zone', 'violation')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 4);
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        apply(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO violation (scenario_id, tstamp, type, details, created_at)
             VALUES (42, '00:01.0', 'SPEEDING', 'x', 'now')",
            [],
        );
        assert!(result.is_err());
    }
}
