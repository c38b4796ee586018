//! Combat bookkeeping
//!
//! The per-bot state the decision layer consults and updates:
//! - Resource pools (mana/rage/energy, combo-point style secondaries, runes)
//! - Ability cooldowns, charges, and the shared global cooldown
//! - Applied status effects with pandemic refresh math
//! - Rotation phase classification
//! - Decision logging

pub mod cooldowns;
pub mod effects;
pub mod log;
pub mod phases;
pub mod resources;

pub use cooldowns::{CooldownBook, GCD_MS};
pub use effects::{Effect, EffectBook, Periodic};
pub use log::{DecisionEntry, DecisionKind, DecisionLog};
pub use phases::{select_phase, PhaseInputs, PhaseParams, RotationPhase};
pub use resources::{Cost, DualPool, Gain, PowerPool, ResourceState, RuneKind, RuneSet};
