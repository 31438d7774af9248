//! Report assembly.

use crate::error::{Error, Result};
use crate::violation::{Violation, ViolationKind};
use incident_scenario::Scenario;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Output format for rendered reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Pretty-printed JSON (default).
    #[default]
    Json,
    /// YAML.
    Yaml,
}

/// The result of analyzing one driving log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Scenario name, or `"Unnamed"`.
    pub scenario: String,
    /// Violations in time order.
    pub violations: Vec<Violation>,
    /// Number of violations.
    pub total_violations: usize,
}

/// Builds a report for a scenario from its detected violations.
#[must_use]
pub fn make_report(scenario: &Scenario, violations: Vec<Violation>) -> Report {
    Report {
        scenario: scenario.display_name().to_string(),
        total_violations: violations.len(),
        violations,
    }
}

impl Report {
    /// Returns the number of violations of each kind.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<ViolationKind, usize> {
        let mut counts = BTreeMap::new();
        for v in &self.violations {
            *counts.entry(v.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Renders the report in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|e| Error::Render(e.to_string()))
            }
            ReportFormat::Yaml => {
                serde_yaml::to_string(self).map_err(|e| Error::Render(e.to_string()))
            }
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown report format: {other}. Use 'json' or 'yaml'.")),
        }
    }
}
