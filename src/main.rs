//! classai - scenario driver for the class combat AI core
//!
//! Loads a scenario file, runs every bot through the scripted encounter,
//! and prints a summary. Exit code 1 on any scenario or I/O error.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use classai::cli;
use classai::headless::{run_scenario, Scenario};
use classai::settings::DriverSettings;

fn main() -> ExitCode {
    let args = cli::parse_args();
    let settings = DriverSettings::load();

    let filter = args
        .log_filter
        .clone()
        .unwrap_or_else(|| settings.log_filter.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut scenario = match Scenario::load_from_file(&args.scenario) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(ticks) = args.ticks {
        scenario.ticks = ticks;
    }
    if let Some(tick_ms) = args.tick_ms {
        scenario.tick_ms = tick_ms;
    }
    if let Some(seed) = args.seed {
        scenario.seed = Some(seed);
    }
    // Overrides can break invariants the file satisfied.
    if let Err(e) = scenario.validate() {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    let report = match run_scenario(&scenario, args.log.as_deref()) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "Scenario '{}' finished after {} ticks ({} ms, seed {}).",
        report.scenario, report.ticks_run, report.elapsed_ms, report.seed
    );
    println!(
        "  Group: {} alive / {}; enemies alive: {}",
        report.bots_alive,
        report.bots.len(),
        report.enemies_alive
    );
    for bot in &report.bots {
        println!(
            "  {} ({} {}): {} casts, {} moves, {} pet orders, {}",
            bot.name,
            bot.spec.unwrap_or("undetected"),
            bot.class,
            bot.casts,
            bot.moves,
            bot.pet_orders,
            if bot.survived {
                format!("{:.0} hp", bot.final_health)
            } else {
                "dead".to_string()
            }
        );
    }

    if let Some(mut path) = args.output {
        if path.is_relative() && path.parent() == Some(std::path::Path::new("")) {
            if let Some(dir) = &settings.output_dir {
                path = dir.join(path);
            }
        }
        let json = match serde_json::to_string_pretty(&report) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("error: failed to serialize report: {e}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = std::fs::write(&path, json) {
            eprintln!("error: failed to write report to {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
        println!("Report saved to: {}", path.display());
    }

    ExitCode::SUCCESS
}
