//! classai - per-tick class combat AI core for MMO player bots
//!
//! The host hands each bot a read-only snapshot of the world once per tick;
//! the core answers with at most one decision: cast, move, or pet order.
//! All state the core keeps between ticks (cooldowns, resources, tracked
//! effects) is advisory and reconciled against the next snapshot.
//!
//! This library exposes the core modules for the driver binary and tests.

pub mod abilities;
pub mod classes;
pub mod cli;
pub mod combat;
pub mod config;
pub mod decision;
pub mod headless;
pub mod healing;
pub mod host;
pub mod settings;
pub mod talents;
pub mod threat;

// Re-export commonly used types
pub use classes::{Class, ClassAi, SpecId};
pub use combat::{DecisionKind, DecisionLog, RotationPhase};
pub use config::CoreConfig;
pub use headless::{run_scenario, Scenario};
pub use host::{Decision, Guid, SpellId, TickContext, UnitView};
