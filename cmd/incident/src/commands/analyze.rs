//! Analyze command implementation.

use anyhow::{Context, Result};
use incident_rules::{detect_violations, make_report, Report, ReportFormat};
use incident_store::{NewScenario, Store};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Arguments for the analyze command.
pub struct AnalyzeArgs {
    /// Scenario JSON path.
    pub scenario: PathBuf,
    /// Driving log path.
    pub logfile: PathBuf,
    /// Optional database to persist the run into.
    pub db: Option<PathBuf>,
    /// Report output path.
    pub output: PathBuf,
    /// Report format name.
    pub format: String,
}

/// Runs the analyze command and returns the written report.
pub fn run(args: &AnalyzeArgs) -> Result<Report> {
    let format: ReportFormat = args.format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    info!("Analyzing log: {}", args.logfile.display());
    info!("Against scenario: {}", args.scenario.display());

    let scenario = incident_scenario::load_scenario(&args.scenario)
        .with_context(|| format!("Failed to load scenario: {}", args.scenario.display()))?;

    let events = incident_log::read_log(&args.logfile)
        .with_context(|| format!("Failed to read log: {}", args.logfile.display()))?;
    info!("Parsed {} events", events.len());

    let violations =
        detect_violations(&scenario, &events).with_context(|| "Failed to evaluate road rules")?;
    let report = make_report(&scenario, violations);

    for (kind, count) in report.counts() {
        warn!("{kind}: {count}");
    }
    info!(
        "Scenario '{}': {} violation(s)",
        report.scenario, report.total_violations
    );

    let rendered = report
        .render(format)
        .with_context(|| "Failed to render report")?;
    fs::write(&args.output, rendered)
        .with_context(|| format!("Failed to write report: {}", args.output.display()))?;
    info!("Report written to: {}", args.output.display());

    if let Some(db) = &args.db {
        let mut store = Store::open(db)
            .with_context(|| format!("Failed to open database: {}", db.display()))?;
        let rules = scenario
            .rule_set()
            .with_context(|| "Failed to resolve road rules")?;
        let rule_id = store
            .upsert_ruleset(&rules)
            .with_context(|| "Failed to save rule set")?;
        let scenario_id = store
            .register_scenario(&NewScenario::from_scenario(
                &scenario,
                args.scenario.display().to_string(),
                rule_id,
            ))
            .with_context(|| "Failed to register scenario")?;
        store
            .save_report(scenario_id, &report.violations)
            .with_context(|| "Failed to save violations")?;
        info!("Run saved as scenario {scenario_id}");
    }

    Ok(report)
}
