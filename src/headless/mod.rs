//! Headless scenario driver
//!
//! Runs scripted encounters against the decision core without a real host
//! attached, suitable for automated testing and batch analysis.
//!
//! ## Usage
//!
//! ```bash
//! classai --scenario demos/scenarios/tank_and_spank.json --output report.json
//! ```
//!
//! ## Scenario files
//!
//! ```json
//! {
//!   "name": "duel",
//!   "seed": 7,
//!   "bots": [{"name": "arms", "class": "Warrior"}],
//!   "enemies": [{"name": "dummy", "health": 30000}]
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::{Scenario, ScenarioError};
pub use runner::{run_scenario, BotReport, RunReport};
