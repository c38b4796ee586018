//! Core configuration
//!
//! Tunables shared by every bot. Loaded from scenario files or left at
//! defaults; validated before a run starts so a bad file fails loudly
//! instead of producing a bot that never acts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("heal_range must be positive, got {0}")]
    BadHealRange(f32),
    #[error("urgency_pct must be within (0, 100], got {0}")]
    BadUrgencyPct(f32),
    #[error("emergency_frac must be within (0, 1), got {0}")]
    BadEmergencyFrac(f32),
    #[error("execute_frac must be within (0, 1), got {0}")]
    BadExecuteFrac(f32),
    #[error("aoe_min must be at least 2, got {0}")]
    BadAoeMin(usize),
    #[error("action_timeout_ms must be positive, got {0}")]
    BadActionTimeout(u64),
}

/// Tunables for the decision core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Maximum range at which healers consider allies
    pub heal_range: f32,
    /// Health percentage below which an ally counts as urgent
    pub urgency_pct: f32,
    /// Own health fraction at or below which the Emergency phase wins
    pub emergency_frac: f32,
    /// Target health fraction at or below which the Execute phase wins
    pub execute_frac: f32,
    /// Clustered enemy count at or above which the AoE phase wins
    pub aoe_min: usize,
    /// Combat time under which the Opening phase holds
    pub opening_ms: u64,
    /// How long a requested cast may go unobserved before it counts as failed
    pub action_timeout_ms: u64,
    /// Emit per-tick decision traces at debug level
    pub trace_decisions: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            heal_range: 40.0,
            urgency_pct: 70.0,
            emergency_frac: 0.30,
            execute_frac: 0.20,
            aoe_min: 3,
            opening_ms: 4_000,
            action_timeout_ms: 3_000,
            trace_decisions: false,
        }
    }
}

impl CoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heal_range <= 0.0 {
            return Err(ConfigError::BadHealRange(self.heal_range));
        }
        if self.urgency_pct <= 0.0 || self.urgency_pct > 100.0 {
            return Err(ConfigError::BadUrgencyPct(self.urgency_pct));
        }
        if self.emergency_frac <= 0.0 || self.emergency_frac >= 1.0 {
            return Err(ConfigError::BadEmergencyFrac(self.emergency_frac));
        }
        if self.execute_frac <= 0.0 || self.execute_frac >= 1.0 {
            return Err(ConfigError::BadExecuteFrac(self.execute_frac));
        }
        if self.aoe_min < 2 {
            return Err(ConfigError::BadAoeMin(self.aoe_min));
        }
        if self.action_timeout_ms == 0 {
            return Err(ConfigError::BadActionTimeout(self.action_timeout_ms));
        }
        Ok(())
    }
}
