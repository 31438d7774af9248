//! Incident CLI - road-rule violations from driving logs.
//!
//! Commands:
//! - `incident analyze` - Check a driving log against a scenario
//! - `incident summary` - Violation counts for the most recent runs
//! - `incident by-type` - Violations of one type for a run
//! - `incident recent` - Most recently saved violations

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "incident")]
#[command(about = "Road-rule violation analyzer for driving logs")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a driving log against a scenario
    Analyze {
        /// Path to scenario JSON
        scenario: PathBuf,

        /// Path to driving log
        logfile: PathBuf,

        /// SQLite database to persist the run into
        #[arg(long)]
        db: Option<PathBuf>,

        /// Output path for the report
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Report format (json or yaml)
        #[arg(short, long, default_value = "json")]
        format: String,
    },

    /// Print violation counts for the N most recent runs
    Summary {
        /// Number of runs to include
        runs: usize,

        /// SQLite database
        #[arg(long)]
        db: PathBuf,
    },

    /// List violations of a given type for a scenario ID
    ByType {
        /// Scenario ID
        scenario_id: i64,

        /// Violation type (SPEEDING, ROLLING_STOP, TAILGATING, UNSAFE_LANE_CHANGE)
        #[arg(value_name = "TYPE")]
        kind: String,

        /// SQLite database
        #[arg(long)]
        db: PathBuf,
    },

    /// List the most recently saved violations
    Recent {
        /// Maximum number of violations
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// SQLite database
        #[arg(long)]
        db: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            scenario,
            logfile,
            db,
            output,
            format,
        } => commands::analyze::run(&commands::analyze::AnalyzeArgs {
            scenario,
            logfile,
            db,
            output,
            format,
        })
        .map(|_| ()),
        Commands::Summary { runs, db } => commands::query::summary(&db, runs),
        Commands::ByType {
            scenario_id,
            kind,
            db,
        } => commands::query::by_type(&db, scenario_id, &kind),
        Commands::Recent { limit, db } => commands::query::recent(&db, limit),
    }
}
