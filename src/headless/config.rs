//! Scenario files
//!
//! A scenario is a JSON description of one scripted encounter: the bot
//! group, the enemies, the tick cadence, and any scripted damage. Loaded
//! and validated up front so a bad file fails before the run starts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classes::{Class, SpecId};
use crate::config::{ConfigError, CoreConfig};
use crate::host::GroupRole;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scenario JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("bad core config: {0}")]
    Config(#[from] ConfigError),
    #[error("scenario needs at least one bot")]
    NoBots,
    #[error("scenario needs at least one enemy")]
    NoEnemies,
    #[error("tick_ms must be positive")]
    BadTickMs,
    #[error("ticks must be positive")]
    BadTicks,
    #[error("duplicate unit name '{0}'")]
    DuplicateName(String),
    #[error("scripted event targets unknown unit '{0}'")]
    UnknownEventTarget(String),
    #[error("spec '{spec}' does not belong to class '{class}' (bot '{bot}')")]
    SpecClassMismatch {
        bot: String,
        class: String,
        spec: String,
    },
}

/// One bot in the scenario's group (team 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSpec {
    pub name: String,
    pub class: Class,
    /// Forced specialization; omitted means the class's first spec.
    #[serde(default)]
    pub spec: Option<SpecId>,
    #[serde(default)]
    pub role: GroupRole,
    #[serde(default)]
    pub position: [f32; 3],
}

/// One scripted enemy (team 2). Enemies only auto-attack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpec {
    pub name: String,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "default_enemy_health")]
    pub health: f32,
    #[serde(default = "default_swing_damage")]
    pub swing_damage: f32,
}

/// Scripted damage landing on a named unit at a fixed run time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageEvent {
    pub at_ms: u64,
    pub target: String,
    pub amount: f32,
}

/// A complete scripted encounter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Seed for deterministic reproduction; omitted means a fresh seed.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default)]
    pub core: CoreConfig,
    pub bots: Vec<BotSpec>,
    pub enemies: Vec<EnemySpec>,
    #[serde(default)]
    pub events: Vec<DamageEvent>,
}

fn default_tick_ms() -> u64 {
    200
}

fn default_ticks() -> u64 {
    300
}

fn default_enemy_health() -> f32 {
    30_000.0
}

fn default_swing_damage() -> f32 {
    150.0
}

impl Scenario {
    pub fn load_from_file(path: &Path) -> Result<Self, ScenarioError> {
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = serde_json::from_str(&contents)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.bots.is_empty() {
            return Err(ScenarioError::NoBots);
        }
        if self.enemies.is_empty() {
            return Err(ScenarioError::NoEnemies);
        }
        if self.tick_ms == 0 {
            return Err(ScenarioError::BadTickMs);
        }
        if self.ticks == 0 {
            return Err(ScenarioError::BadTicks);
        }
        self.core.validate()?;

        let mut names = std::collections::HashSet::new();
        for name in self
            .bots
            .iter()
            .map(|b| &b.name)
            .chain(self.enemies.iter().map(|e| &e.name))
        {
            if !names.insert(name.as_str()) {
                return Err(ScenarioError::DuplicateName(name.clone()));
            }
        }

        for bot in &self.bots {
            if let Some(spec) = bot.spec {
                if spec.class() != bot.class {
                    return Err(ScenarioError::SpecClassMismatch {
                        bot: bot.name.clone(),
                        class: bot.class.name().to_string(),
                        spec: spec.name().to_string(),
                    });
                }
            }
        }

        for event in &self.events {
            if !names.contains(event.target.as_str()) {
                return Err(ScenarioError::UnknownEventTarget(event.target.clone()));
            }
        }
        Ok(())
    }
}
