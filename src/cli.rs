//! Command-line interface for the scenario driver

use clap::Parser;
use std::path::PathBuf;

/// Class combat AI scenario driver
#[derive(Parser, Debug)]
#[command(name = "classai")]
#[command(about = "Runs scripted encounters against the class AI core")]
#[command(version)]
pub struct Args {
    /// Scenario JSON file to run
    #[arg(long, value_name = "SCENARIO_FILE")]
    pub scenario: PathBuf,

    /// Override the scenario's tick count
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Override the scenario's tick length in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Override the scenario's random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the run report as JSON to this path
    #[arg(long, value_name = "REPORT_PATH")]
    pub output: Option<PathBuf>,

    /// Write the full decision log as JSON to this path
    #[arg(long, value_name = "LOG_PATH")]
    pub log: Option<PathBuf>,

    /// Tracing filter, e.g. "info" or "classai=debug" (overrides settings.ron)
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
