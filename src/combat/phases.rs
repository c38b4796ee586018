//! Rotation Phases
//!
//! Coarse combat-state classification shared by every spec. Phases bias
//! which action tiers a rotation reaches for; they never gate hard rules
//! like interrupts or survival cooldowns, which outrank phases entirely.

use serde::{Deserialize, Serialize};

/// Where a bot believes the fight currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationPhase {
    /// First seconds of combat; openers and setup abilities.
    Opening,
    /// DoT/debuff groundwork is incomplete (disease-style specs).
    DiseaseApplication,
    /// Default sustained rotation.
    Steady,
    /// Major offensive cooldowns are rolling or about to be used.
    Burst,
    /// Enough clustered enemies to switch to area abilities.
    AoE,
    /// Target is low enough for execute-range abilities.
    Execute,
    /// Own survival overrides damage output.
    Emergency,
}

impl RotationPhase {
    pub fn name(&self) -> &'static str {
        match self {
            RotationPhase::Opening => "opening",
            RotationPhase::DiseaseApplication => "disease_application",
            RotationPhase::Steady => "steady",
            RotationPhase::Burst => "burst",
            RotationPhase::AoE => "aoe",
            RotationPhase::Execute => "execute",
            RotationPhase::Emergency => "emergency",
        }
    }
}

impl std::fmt::Display for RotationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Thresholds that drive phase selection. Specs tweak these per kit.
#[derive(Debug, Clone, Copy)]
pub struct PhaseParams {
    /// Own health fraction at or below which Emergency wins.
    pub emergency_frac: f32,
    /// Target health fraction at or below which Execute wins.
    pub execute_frac: f32,
    /// Clustered enemy count at or above which AoE wins.
    pub aoe_min: usize,
    /// Combat time under which Opening holds.
    pub opening_ms: u64,
}

impl Default for PhaseParams {
    fn default() -> Self {
        Self {
            emergency_frac: 0.30,
            execute_frac: 0.20,
            aoe_min: 3,
            opening_ms: 4000,
        }
    }
}

/// Inputs to phase selection, gathered once per tick by the spec core.
#[derive(Debug, Clone, Copy)]
pub struct PhaseInputs {
    pub own_health_frac: f32,
    pub target_health_frac: Option<f32>,
    pub clustered_enemies: usize,
    pub burst_ready: bool,
    pub combat_elapsed_ms: u64,
}

/// Pick the phase for this tick. Precedence is fixed: survival first,
/// then execute, then area pressure, then burst, then the opener window.
pub fn select_phase(params: &PhaseParams, inputs: &PhaseInputs) -> RotationPhase {
    if inputs.own_health_frac <= params.emergency_frac {
        return RotationPhase::Emergency;
    }
    if let Some(frac) = inputs.target_health_frac {
        if frac <= params.execute_frac {
            return RotationPhase::Execute;
        }
    }
    if inputs.clustered_enemies >= params.aoe_min {
        return RotationPhase::AoE;
    }
    if inputs.burst_ready {
        return RotationPhase::Burst;
    }
    if inputs.combat_elapsed_ms < params.opening_ms {
        return RotationPhase::Opening;
    }
    RotationPhase::Steady
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy_inputs() -> PhaseInputs {
        PhaseInputs {
            own_health_frac: 1.0,
            target_health_frac: Some(0.9),
            clustered_enemies: 1,
            burst_ready: false,
            combat_elapsed_ms: 30_000,
        }
    }

    #[test]
    fn test_steady_is_the_fallback() {
        let phase = select_phase(&PhaseParams::default(), &healthy_inputs());
        assert_eq!(phase, RotationPhase::Steady);
    }

    #[test]
    fn test_emergency_outranks_everything() {
        let mut inputs = healthy_inputs();
        inputs.own_health_frac = 0.25;
        inputs.target_health_frac = Some(0.10);
        inputs.clustered_enemies = 5;
        inputs.burst_ready = true;
        let phase = select_phase(&PhaseParams::default(), &inputs);
        assert_eq!(phase, RotationPhase::Emergency);
    }

    #[test]
    fn test_execute_outranks_aoe_and_burst() {
        let mut inputs = healthy_inputs();
        inputs.target_health_frac = Some(0.15);
        inputs.clustered_enemies = 5;
        inputs.burst_ready = true;
        let phase = select_phase(&PhaseParams::default(), &inputs);
        assert_eq!(phase, RotationPhase::Execute);
    }

    #[test]
    fn test_aoe_requires_minimum_cluster() {
        let mut inputs = healthy_inputs();
        inputs.clustered_enemies = 2;
        assert_eq!(
            select_phase(&PhaseParams::default(), &inputs),
            RotationPhase::Steady
        );
        inputs.clustered_enemies = 3;
        assert_eq!(
            select_phase(&PhaseParams::default(), &inputs),
            RotationPhase::AoE
        );
    }

    #[test]
    fn test_opening_window_closes() {
        let mut inputs = healthy_inputs();
        inputs.combat_elapsed_ms = 3999;
        assert_eq!(
            select_phase(&PhaseParams::default(), &inputs),
            RotationPhase::Opening
        );
        inputs.combat_elapsed_ms = 4000;
        assert_eq!(
            select_phase(&PhaseParams::default(), &inputs),
            RotationPhase::Steady
        );
    }

    #[test]
    fn test_no_target_skips_execute() {
        let mut inputs = healthy_inputs();
        inputs.target_health_frac = None;
        inputs.burst_ready = true;
        let phase = select_phase(&PhaseParams::default(), &inputs);
        assert_eq!(phase, RotationPhase::Burst);
    }
}
