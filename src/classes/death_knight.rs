//! Death knight specializations: Blood tanking, Frost and Unholy damage.
//!
//! All three run on [`RuneSet`]. Blood is queue-driven with a taunt step
//! ahead of the rotation; Frost branches its priority on the weapon loadout
//! and converts procs at commit time; Unholy opens with a two-step disease
//! machine before handing control to its queue.

use crate::abilities::{self, AbilityInfo};
use crate::classes::spec_core::{MeleeCore, SpecMetrics, TankCore};
use crate::classes::Controls;
use crate::combat::{Cost, RotationPhase, RuneSet};
use crate::config::CoreConfig;
use crate::decision::{
    gate, resolve, ActionCandidate, ActionQueue, ActionTier, PolicyCtx, RotationPolicy,
};
use crate::host::{Decision, Guid, PetOrder, TickContext, UnitView, WeaponProfile};
use crate::threat;

/// Rime makes the next Howling Blast rune-free; selection and commit use
/// this shadow entry while the proc is up.
const HOWLING_BLAST_FREE: AbilityInfo = AbilityInfo {
    cost: Cost::Free,
    ..abilities::HOWLING_BLAST
};

/// Sudden Doom discounts the next Death Coil to nothing.
const DEATH_COIL_FREE: AbilityInfo = AbilityInfo {
    cost: Cost::Free,
    ..abilities::DEATH_COIL
};

fn rime_up(ctx: &PolicyCtx) -> bool {
    ctx.self_buff_active(abilities::RIME_AURA)
}

fn killing_machine_up(ctx: &PolicyCtx) -> bool {
    ctx.self_buff_active(abilities::KILLING_MACHINE_AURA)
}

fn sudden_doom_up(ctx: &PolicyCtx) -> bool {
    ctx.self_buff_active(abilities::SUDDEN_DOOM_AURA)
}

// ============================================================================
// Blood
// ============================================================================

pub struct Blood {
    tank: TankCore<RuneSet>,
    policy: RotationPolicy,
}

impl Blood {
    pub fn new(config: &CoreConfig) -> Self {
        let queue = ActionQueue::new(vec![
            ActionCandidate::new(&abilities::DEATH_PACT, ActionTier::Emergency, |ctx| {
                ctx.my_health_frac() < 0.20
            }),
            ActionCandidate::new(&abilities::ICEBOUND_FORTITUDE, ActionTier::Emergency, |ctx| {
                ctx.my_health_frac() < 0.25
            }),
            ActionCandidate::new(&abilities::VAMPIRIC_BLOOD, ActionTier::Critical, |ctx| {
                ctx.my_health_frac() < 0.30
            }),
            ActionCandidate::new(&abilities::DANCING_RUNE_WEAPON, ActionTier::Critical, |ctx| {
                ctx.my_health_frac() < 0.50
            }),
            ActionCandidate::new(&abilities::DEATH_GRIP, ActionTier::Critical, |ctx| {
                matches!(ctx.target_distance(), Some(d) if (10.0..=30.0).contains(&d))
            }),
            ActionCandidate::new(&abilities::DEATH_STRIKE, ActionTier::High, |ctx| {
                ctx.my_health_frac() < 0.60
            }),
            ActionCandidate::new(&abilities::BONE_SHIELD, ActionTier::High, |ctx| {
                ctx.self_buff_stacks(abilities::BONE_SHIELD.id) == 0
            }),
            ActionCandidate::new(&abilities::PLAGUE_STRIKE, ActionTier::High, |ctx| {
                ctx.target_needs_refresh(abilities::BLOOD_PLAGUE_AURA, 21_000)
            }),
            ActionCandidate::new(&abilities::BLOOD_BOIL, ActionTier::Medium, |ctx| {
                ctx.enemies_near_target(10.0) >= 2
            }),
            ActionCandidate::new(&abilities::HEART_STRIKE, ActionTier::Medium, |_| true),
            ActionCandidate::new(&abilities::DEATH_COIL, ActionTier::Low, |ctx| {
                ctx.resource.fraction() >= 0.6
            }),
            ActionCandidate::new(&abilities::HORN_OF_WINTER, ActionTier::Low, |ctx| {
                !ctx.self_buff_active(abilities::HORN_OF_WINTER.id)
            }),
        ]);
        Self {
            tank: TankCore::new(RuneSet::new(100.0, false), config),
            policy: RotationPolicy::queue_only(queue),
        }
    }

    pub fn update(
        &mut self,
        ctx: &TickContext,
        me: &UnitView,
        target: Option<&UnitView>,
        dt_ms: u64,
        config: &CoreConfig,
        controls: Controls,
    ) -> Option<Decision> {
        self.tank.core.pre_tick(ctx, me, dt_ms);
        if controls.incapacitated {
            return None;
        }
        if !me.in_combat {
            return self.upkeep(ctx, me, config, controls);
        }
        let burst = self
            .tank
            .core
            .cooldowns
            .is_ready(abilities::DANCING_RUNE_WEAPON.id, ctx.now_ms);
        self.tank.core.compute_phase(ctx, me, target, burst);

        if !controls.silenced {
            // Peeling for group members comes before our own rotation.
            if let Some(decision) = self.taunt_step(ctx, me, config) {
                return Some(decision);
            }
            let picked = {
                let pctx = self.tank.core.policy_ctx(ctx, me, target, config);
                self.policy.decide(&pctx)
            };
            if let Some(decision) = picked {
                self.tank
                    .core
                    .commit_decision(me.guid, &decision, ctx.now_ms);
                return Some(decision);
            }
        }
        if controls.rooted {
            return None;
        }
        self.tank.close_in(me, target?)
    }

    /// Dark Command goes to whichever enemy is beating on a soft group
    /// member, not to the current tanking target.
    fn taunt_step(
        &mut self,
        ctx: &TickContext,
        me: &UnitView,
        config: &CoreConfig,
    ) -> Option<Decision> {
        let enemy = threat::taunt_candidate(ctx, me, abilities::DARK_COMMAND.range)?;
        let view = ctx.unit(enemy)?;
        let castable = {
            let pctx = self.tank.core.policy_ctx(ctx, me, Some(view), config);
            gate::can_cast(&pctx, &abilities::DARK_COMMAND)
        };
        if !castable {
            return None;
        }
        self.tank
            .core
            .commit(me.guid, &abilities::DARK_COMMAND, Some(enemy), ctx.now_ms);
        Some(Decision::Cast {
            ability: abilities::DARK_COMMAND.id,
            target: enemy,
        })
    }

    fn upkeep(
        &mut self,
        ctx: &TickContext,
        me: &UnitView,
        config: &CoreConfig,
        controls: Controls,
    ) -> Option<Decision> {
        if controls.silenced {
            return None;
        }
        let chosen = {
            let pctx = self.tank.core.policy_ctx(ctx, me, None, config);
            let wants: [(&'static AbilityInfo, bool); 2] = [
                (
                    &abilities::BONE_SHIELD,
                    pctx.self_buff_stacks(abilities::BONE_SHIELD.id) == 0,
                ),
                (
                    &abilities::HORN_OF_WINTER,
                    !pctx.self_buff_active(abilities::HORN_OF_WINTER.id),
                ),
            ];
            wants
                .into_iter()
                .find(|(info, wanted)| *wanted && gate::can_cast(&pctx, info))
                .and_then(|(info, _)| resolve(&pctx, info))
        };
        let decision = chosen?;
        self.tank
            .core
            .commit_decision(me.guid, &decision, ctx.now_ms);
        Some(decision)
    }

    pub fn enter_combat(&mut self, now_ms: u64) {
        self.tank.core.enter_combat(now_ms);
        self.policy.reset();
    }

    pub fn leave_combat(&mut self) {
        self.tank.core.leave_combat();
        self.policy.reset();
    }

    pub fn in_combat(&self) -> bool {
        self.tank.core.in_combat()
    }

    pub fn phase(&self) -> RotationPhase {
        self.tank.core.phase
    }

    pub fn metrics(&self) -> &SpecMetrics {
        &self.tank.core.metrics
    }
}

// ============================================================================
// Frost
// ============================================================================

pub struct Frost {
    melee: MeleeCore<RuneSet>,
    policy: RotationPolicy,
}

impl Frost {
    pub fn new(config: &CoreConfig) -> Self {
        let queue = ActionQueue::new(vec![
            ActionCandidate::new(&abilities::MIND_FREEZE, ActionTier::Critical, |ctx| {
                ctx.target_casting_interruptible()
            }),
            // Procs are consumed the tick they are seen.
            ActionCandidate::new(&abilities::OBLITERATE, ActionTier::Critical, killing_machine_up),
            ActionCandidate::new(&HOWLING_BLAST_FREE, ActionTier::Critical, rime_up),
            ActionCandidate::new(&abilities::FROST_STRIKE, ActionTier::High, |ctx| {
                ctx.resource.fraction() >= 0.8
            }),
            ActionCandidate::new(&abilities::OBLITERATE, ActionTier::High, |_| true),
            // Dual-wield favors Frost Strike over Howling Blast; two-handers
            // flip the pair.
            ActionCandidate::new(&abilities::FROST_STRIKE, ActionTier::High, |ctx| {
                ctx.me.weapons == WeaponProfile::DualWield
            }),
            ActionCandidate::new(&abilities::HOWLING_BLAST, ActionTier::High, |_| true),
            ActionCandidate::new(&abilities::FROST_STRIKE, ActionTier::High, |_| true),
            ActionCandidate::new(&abilities::EMPOWER_RUNE_WEAPON, ActionTier::Medium, |ctx| {
                ctx.resource.runes_ready(ctx.now_ms) <= 1
            }),
            ActionCandidate::new(&abilities::HORN_OF_WINTER, ActionTier::Low, |ctx| {
                !ctx.self_buff_active(abilities::HORN_OF_WINTER.id)
            }),
        ]);
        Self {
            melee: MeleeCore::new(RuneSet::new(100.0, true), config, true),
            policy: RotationPolicy::queue_only(queue),
        }
    }

    pub fn update(
        &mut self,
        ctx: &TickContext,
        me: &UnitView,
        target: Option<&UnitView>,
        dt_ms: u64,
        config: &CoreConfig,
        controls: Controls,
    ) -> Option<Decision> {
        self.melee.core.pre_tick(ctx, me, dt_ms);
        if controls.incapacitated {
            return None;
        }
        if !me.in_combat {
            return self.upkeep(ctx, me, config, controls);
        }
        let burst = self
            .melee
            .core
            .cooldowns
            .is_ready(abilities::EMPOWER_RUNE_WEAPON.id, ctx.now_ms);
        self.melee.core.compute_phase(ctx, me, target, burst);

        if !controls.silenced {
            let (picked, rime) = {
                let pctx = self.melee.core.policy_ctx(ctx, me, target, config);
                (self.policy.decide(&pctx), rime_up(&pctx))
            };
            if let Some(decision) = picked {
                self.commit(me.guid, &decision, rime, ctx.now_ms);
                return Some(decision);
            }
        }
        if controls.rooted {
            return None;
        }
        self.melee.chase(me, target?)
    }

    fn commit(&mut self, me: Guid, decision: &Decision, rime: bool, now_ms: u64) {
        match decision {
            Decision::Cast { ability, target }
                if *ability == abilities::HOWLING_BLAST.id && rime =>
            {
                self.melee
                    .core
                    .commit(me, &HOWLING_BLAST_FREE, Some(*target), now_ms);
            }
            Decision::Cast { ability, .. } if *ability == abilities::EMPOWER_RUNE_WEAPON.id => {
                self.melee.core.commit_decision(me, decision, now_ms);
                self.melee.core.resource.refresh_all(now_ms);
            }
            _ => self.melee.core.commit_decision(me, decision, now_ms),
        }
    }

    fn upkeep(
        &mut self,
        ctx: &TickContext,
        me: &UnitView,
        config: &CoreConfig,
        controls: Controls,
    ) -> Option<Decision> {
        if controls.silenced {
            return None;
        }
        let chosen = {
            let pctx = self.melee.core.policy_ctx(ctx, me, None, config);
            if !pctx.self_buff_active(abilities::HORN_OF_WINTER.id)
                && gate::can_cast(&pctx, &abilities::HORN_OF_WINTER)
            {
                resolve(&pctx, &abilities::HORN_OF_WINTER)
            } else {
                None
            }
        };
        let decision = chosen?;
        self.melee
            .core
            .commit_decision(me.guid, &decision, ctx.now_ms);
        Some(decision)
    }

    pub fn enter_combat(&mut self, now_ms: u64) {
        self.melee.core.enter_combat(now_ms);
        self.policy.reset();
    }

    pub fn leave_combat(&mut self) {
        self.melee.core.leave_combat();
        self.policy.reset();
    }

    pub fn in_combat(&self) -> bool {
        self.melee.core.in_combat()
    }

    pub fn phase(&self) -> RotationPhase {
        self.melee.core.phase
    }

    pub fn metrics(&self) -> &SpecMetrics {
        &self.melee.core.metrics
    }
}

// ============================================================================
// Unholy
// ============================================================================

/// Opening sub-phase: both diseases go up in a fixed order before the
/// normal priority list runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiseasePhase {
    BloodPlagueFirst,
    FrostFeverSecond,
    DiseasesApplied,
}

pub struct Unholy {
    melee: MeleeCore<RuneSet>,
    policy: RotationPolicy,
    diseases: DiseasePhase,
}

impl Unholy {
    pub fn new(config: &CoreConfig) -> Self {
        let queue = ActionQueue::new(vec![
            ActionCandidate::new(&abilities::MIND_FREEZE, ActionTier::Critical, |ctx| {
                ctx.target_casting_interruptible()
            }),
            ActionCandidate::new(&DEATH_COIL_FREE, ActionTier::Critical, sudden_doom_up),
            ActionCandidate::new(&abilities::RAISE_DEAD, ActionTier::High, |ctx| {
                ctx.pet().is_none()
            }),
            ActionCandidate::new(&abilities::PESTILENCE, ActionTier::High, |ctx| {
                ctx.enemies_near_target(10.0) >= 2
                    && ctx.target_has(abilities::BLOOD_PLAGUE_AURA)
                    && ctx.target_has(abilities::FROST_FEVER_AURA)
            }),
            ActionCandidate::new(&abilities::PLAGUE_STRIKE, ActionTier::High, |ctx| {
                ctx.target_needs_refresh(abilities::BLOOD_PLAGUE_AURA, 21_000)
            }),
            ActionCandidate::new(&abilities::ICY_TOUCH, ActionTier::High, |ctx| {
                ctx.target_needs_refresh(abilities::FROST_FEVER_AURA, 21_000)
            }),
            ActionCandidate::new(&abilities::DEATH_AND_DECAY, ActionTier::High, |ctx| {
                ctx.phase == RotationPhase::AoE
            }),
            // Execute for this kit is Death Coil pressure, not a new button.
            ActionCandidate::new(&abilities::DEATH_COIL, ActionTier::High, |ctx| {
                matches!(ctx.target_health_frac(), Some(f) if f < 0.35)
            }),
            ActionCandidate::new(&abilities::SUMMON_GARGOYLE, ActionTier::Medium, |ctx| {
                ctx.target_has(abilities::BLOOD_PLAGUE_AURA)
                    && ctx.target_has(abilities::FROST_FEVER_AURA)
                    && ctx.resource.fraction() >= 0.6
            }),
            ActionCandidate::new(&abilities::SCOURGE_STRIKE, ActionTier::Medium, |_| true),
            ActionCandidate::new(&abilities::DEATH_COIL, ActionTier::Low, |ctx| {
                ctx.resource.fraction() >= 0.8
            }),
            ActionCandidate::new(&abilities::HORN_OF_WINTER, ActionTier::Low, |ctx| {
                !ctx.self_buff_active(abilities::HORN_OF_WINTER.id)
            }),
        ]);
        Self {
            melee: MeleeCore::new(RuneSet::new(100.0, false), config, true),
            policy: RotationPolicy::queue_only(queue),
            diseases: DiseasePhase::BloodPlagueFirst,
        }
    }

    pub fn update(
        &mut self,
        ctx: &TickContext,
        me: &UnitView,
        target: Option<&UnitView>,
        dt_ms: u64,
        config: &CoreConfig,
        controls: Controls,
    ) -> Option<Decision> {
        self.melee.core.pre_tick(ctx, me, dt_ms);
        if controls.incapacitated {
            return None;
        }
        if !me.in_combat {
            return self.upkeep(ctx, me, config, controls);
        }
        let target = target?;
        // Gargoyle rides its own queue predicate; phase-level burst would
        // shadow the post-disease Steady transition.
        self.melee.core.compute_phase(ctx, me, Some(target), false);

        if self.diseases != DiseasePhase::DiseasesApplied {
            self.melee.core.phase = RotationPhase::DiseaseApplication;
            if !controls.silenced {
                if let Some(decision) = self.disease_step(ctx, me, target, config) {
                    return Some(decision);
                }
            }
            if self.diseases != DiseasePhase::DiseasesApplied {
                if controls.rooted {
                    return None;
                }
                return self.melee.chase(me, target);
            }
            // Both diseases confirmed this tick; fall through to the queue.
            self.melee.core.phase = RotationPhase::Steady;
        }
        // The opener ends with the second disease, not on the clock.
        if self.melee.core.phase == RotationPhase::Opening {
            self.melee.core.phase = RotationPhase::Steady;
        }

        if !controls.silenced {
            let (picked, doom) = {
                let pctx = self.melee.core.policy_ctx(ctx, me, Some(target), config);
                (self.policy.decide(&pctx), sudden_doom_up(&pctx))
            };
            if let Some(decision) = picked {
                self.commit(me.guid, &decision, doom, ctx.now_ms);
                return Some(decision);
            }
        }
        if let Some(pet) = ctx.pet_of(me.guid) {
            if pet.target != Some(target.guid) {
                let order = Decision::Pet(PetOrder::Attack(target.guid));
                self.melee.core.commit_decision(me.guid, &order, ctx.now_ms);
                return Some(order);
            }
        }
        if controls.rooted {
            return None;
        }
        self.melee.chase(me, target)
    }

    /// One step of the opening machine. Advances on cast issue, or skips
    /// ahead when the host already shows the disease ticking.
    fn disease_step(
        &mut self,
        ctx: &TickContext,
        me: &UnitView,
        target: &UnitView,
        config: &CoreConfig,
    ) -> Option<Decision> {
        let (info, aura, next): (&'static AbilityInfo, _, _) = match self.diseases {
            DiseasePhase::BloodPlagueFirst => (
                &abilities::PLAGUE_STRIKE,
                abilities::BLOOD_PLAGUE_AURA,
                DiseasePhase::FrostFeverSecond,
            ),
            DiseasePhase::FrostFeverSecond => (
                &abilities::ICY_TOUCH,
                abilities::FROST_FEVER_AURA,
                DiseasePhase::DiseasesApplied,
            ),
            DiseasePhase::DiseasesApplied => return None,
        };
        let step = {
            let pctx = self.melee.core.policy_ctx(ctx, me, Some(target), config);
            if pctx.target_has(aura) {
                None
            } else if gate::can_cast(&pctx, info) {
                resolve(&pctx, info)
            } else {
                return None;
            }
        };
        match step {
            Some(decision) => {
                self.melee.core.commit(me.guid, info, Some(target.guid), ctx.now_ms);
                self.diseases = next;
                Some(decision)
            }
            None => {
                // Already present; advance and try the following step now.
                self.diseases = next;
                self.disease_step(ctx, me, target, config)
            }
        }
    }

    fn commit(&mut self, me: Guid, decision: &Decision, doom: bool, now_ms: u64) {
        match decision {
            Decision::Cast { ability, target } if *ability == abilities::DEATH_COIL.id && doom => {
                self.melee
                    .core
                    .commit(me, &DEATH_COIL_FREE, Some(*target), now_ms);
            }
            _ => self.melee.core.commit_decision(me, decision, now_ms),
        }
    }

    fn upkeep(
        &mut self,
        ctx: &TickContext,
        me: &UnitView,
        config: &CoreConfig,
        controls: Controls,
    ) -> Option<Decision> {
        if controls.silenced {
            return None;
        }
        let chosen = {
            let pctx = self.melee.core.policy_ctx(ctx, me, None, config);
            let wants: [(&'static AbilityInfo, bool); 2] = [
                (&abilities::RAISE_DEAD, pctx.pet().is_none()),
                (
                    &abilities::HORN_OF_WINTER,
                    !pctx.self_buff_active(abilities::HORN_OF_WINTER.id),
                ),
            ];
            wants
                .into_iter()
                .find(|(info, wanted)| *wanted && gate::can_cast(&pctx, info))
                .and_then(|(info, _)| resolve(&pctx, info))
        };
        let decision = chosen?;
        self.melee
            .core
            .commit_decision(me.guid, &decision, ctx.now_ms);
        Some(decision)
    }

    pub fn enter_combat(&mut self, now_ms: u64) {
        self.melee.core.enter_combat(now_ms);
        self.policy.reset();
        self.diseases = DiseasePhase::BloodPlagueFirst;
    }

    pub fn leave_combat(&mut self) {
        self.melee.core.leave_combat();
        self.policy.reset();
        self.diseases = DiseasePhase::BloodPlagueFirst;
    }

    pub fn in_combat(&self) -> bool {
        self.melee.core.in_combat()
    }

    pub fn phase(&self) -> RotationPhase {
        self.melee.core.phase
    }

    pub fn metrics(&self) -> &SpecMetrics {
        &self.melee.core.metrics
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use glam::Vec3;

    use super::*;
    use crate::combat::ResourceState;
    use crate::decision::testbed;
    use crate::host::{AuraSeen, ControlEffect, GroupRole, SpellId};

    fn dk_unit(guid: Guid, team: u8, position: Vec3) -> UnitView {
        let mut u = testbed::unit(guid, team, position);
        u.in_combat = true;
        u
    }

    fn aura(effect: SpellId, caster: Guid) -> AuraSeen {
        AuraSeen {
            effect,
            remaining_ms: 10_000,
            stacks: 1,
            caster: Some(caster),
            control: ControlEffect::None,
            dispellable: None,
        }
    }

    #[test]
    fn test_blood_opening_grip_shield_plague() {
        let config = CoreConfig::default();
        let mut blood = Blood::new(&config);
        blood.enter_combat(1_000);

        let me = Guid(1);
        let enemy = Guid(100);
        let auras: HashMap<Guid, Vec<AuraSeen>> = HashMap::new();

        // Tick 1: target 25yd out, gap-close with Death Grip.
        let mut units = HashMap::new();
        units.insert(me, dk_unit(me, 1, Vec3::ZERO));
        units.insert(enemy, dk_unit(enemy, 2, Vec3::new(25.0, 0.0, 0.0)));
        let ctx = TickContext {
            now_ms: 1_000,
            units: &units,
            auras: &auras,
        };
        let d = blood.update(
            &ctx,
            &units[&me],
            Some(&units[&enemy]),
            100,
            &config,
            Controls::default(),
        );
        assert_eq!(
            d.and_then(|d| d.ability()),
            Some(abilities::DEATH_GRIP.id),
            "opener at range should be the gap closer"
        );

        // Tick 2: in melee now, Bone Shield is still down.
        let mut units = HashMap::new();
        units.insert(me, dk_unit(me, 1, Vec3::new(21.0, 0.0, 0.0)));
        units.insert(enemy, dk_unit(enemy, 2, Vec3::new(25.0, 0.0, 0.0)));
        let ctx = TickContext {
            now_ms: 3_000,
            units: &units,
            auras: &auras,
        };
        let d = blood.update(
            &ctx,
            &units[&me],
            Some(&units[&enemy]),
            2_000,
            &config,
            Controls::default(),
        );
        assert_eq!(d.and_then(|d| d.ability()), Some(abilities::BONE_SHIELD.id));

        // Tick 3: shield booked internally, Blood Plague still missing.
        let ctx = TickContext {
            now_ms: 5_000,
            units: &units,
            auras: &auras,
        };
        let d = blood.update(
            &ctx,
            &units[&me],
            Some(&units[&enemy]),
            2_000,
            &config,
            Controls::default(),
        );
        assert_eq!(
            d.and_then(|d| d.ability()),
            Some(abilities::PLAGUE_STRIKE.id)
        );
    }

    #[test]
    fn test_blood_taunts_the_enemy_on_the_healer() {
        let config = CoreConfig::default();
        let mut blood = Blood::new(&config);
        blood.enter_combat(1_000);

        let me = Guid(1);
        let healer = Guid(2);
        let tanked = Guid(100);
        let loose = Guid(101);

        let mut units = HashMap::new();
        let mut tank_view = dk_unit(me, 1, Vec3::ZERO);
        tank_view.role = GroupRole::MainTank;
        tank_view.target = Some(tanked);
        let mut healer_view = dk_unit(healer, 1, Vec3::new(10.0, 0.0, 0.0));
        healer_view.role = GroupRole::Healer;
        let mut tanked_view = dk_unit(tanked, 2, Vec3::new(3.0, 0.0, 0.0));
        tanked_view.target = Some(me);
        let mut loose_view = dk_unit(loose, 2, Vec3::new(8.0, 0.0, 0.0));
        loose_view.target = Some(healer);
        units.insert(me, tank_view);
        units.insert(healer, healer_view);
        units.insert(tanked, tanked_view);
        units.insert(loose, loose_view);
        let auras = HashMap::new();
        let ctx = TickContext {
            now_ms: 2_000,
            units: &units,
            auras: &auras,
        };

        let d = blood.update(
            &ctx,
            &units[&me],
            Some(&units[&tanked]),
            100,
            &config,
            Controls::default(),
        );
        assert_eq!(
            d,
            Some(Decision::Cast {
                ability: abilities::DARK_COMMAND.id,
                target: loose,
            }),
            "taunt should divert to the enemy on the healer"
        );
    }

    #[test]
    fn test_frost_consumes_killing_machine_with_obliterate() {
        let config = CoreConfig::default();
        let mut frost = Frost::new(&config);
        frost.enter_combat(1_000);

        let me = Guid(1);
        let enemy = Guid(100);
        let mut units = HashMap::new();
        units.insert(me, dk_unit(me, 1, Vec3::ZERO));
        units.insert(enemy, dk_unit(enemy, 2, Vec3::new(3.0, 0.0, 0.0)));
        let mut auras = HashMap::new();
        auras.insert(me, vec![aura(abilities::KILLING_MACHINE_AURA, me)]);
        let ctx = TickContext {
            now_ms: 1_000,
            units: &units,
            auras: &auras,
        };

        let d = frost.update(
            &ctx,
            &units[&me],
            Some(&units[&enemy]),
            100,
            &config,
            Controls::default(),
        );
        assert_eq!(d.and_then(|d| d.ability()), Some(abilities::OBLITERATE.id));
    }

    #[test]
    fn test_frost_rime_howling_blast_spends_no_rune() {
        let config = CoreConfig::default();
        let mut frost = Frost::new(&config);
        frost.enter_combat(1_000);

        let me = Guid(1);
        let enemy = Guid(100);
        let mut units = HashMap::new();
        let mut me_view = dk_unit(me, 1, Vec3::ZERO);
        me_view.power = 0.0; // no runic power banked yet
        units.insert(me, me_view);
        units.insert(enemy, dk_unit(enemy, 2, Vec3::new(10.0, 0.0, 0.0)));
        let mut auras = HashMap::new();
        auras.insert(me, vec![aura(abilities::RIME_AURA, me)]);
        let ctx = TickContext {
            now_ms: 1_000,
            units: &units,
            auras: &auras,
        };

        let d = frost.update(
            &ctx,
            &units[&me],
            Some(&units[&enemy]),
            100,
            &config,
            Controls::default(),
        );
        assert_eq!(
            d.and_then(|d| d.ability()),
            Some(abilities::HOWLING_BLAST.id)
        );
        assert_eq!(
            frost.melee.core.resource.total_ready(1_000),
            6,
            "the proc should make the blast rune-free"
        );
    }

    #[test]
    fn test_frost_empower_rune_weapon_when_starved() {
        let config = CoreConfig::default();
        let mut frost = Frost::new(&config);
        frost.enter_combat(1_000);

        // Burn five of six runes ahead of the tick.
        let spent = frost.melee.core.resource.pay(
            &Cost::Runes {
                blood: 2,
                frost: 2,
                unholy: 1,
            },
            900,
        );
        assert!(spent);

        let me = Guid(1);
        let enemy = Guid(100);
        let mut units = HashMap::new();
        let mut me_view = dk_unit(me, 1, Vec3::ZERO);
        me_view.power = 0.0;
        units.insert(me, me_view);
        units.insert(enemy, dk_unit(enemy, 2, Vec3::new(3.0, 0.0, 0.0)));
        let auras = HashMap::new();
        let ctx = TickContext {
            now_ms: 1_000,
            units: &units,
            auras: &auras,
        };

        let d = frost.update(
            &ctx,
            &units[&me],
            Some(&units[&enemy]),
            100,
            &config,
            Controls::default(),
        );
        assert_eq!(
            d.and_then(|d| d.ability()),
            Some(abilities::EMPOWER_RUNE_WEAPON.id)
        );
        assert_eq!(
            frost.melee.core.resource.total_ready(1_001),
            6,
            "all slots should come back at commit"
        );
        assert_eq!(frost.melee.core.resource.runic_power.current, 25.0);
    }

    #[test]
    fn test_unholy_disease_machine_order() {
        let config = CoreConfig::default();
        let mut unholy = Unholy::new(&config);
        unholy.enter_combat(1_000);

        let me = Guid(1);
        let enemy = Guid(100);
        let auras: HashMap<Guid, Vec<AuraSeen>> = HashMap::new();
        let mut units = HashMap::new();
        units.insert(me, dk_unit(me, 1, Vec3::ZERO));
        units.insert(enemy, dk_unit(enemy, 2, Vec3::new(3.0, 0.0, 0.0)));

        let ctx = TickContext {
            now_ms: 1_000,
            units: &units,
            auras: &auras,
        };
        let d = unholy.update(
            &ctx,
            &units[&me],
            Some(&units[&enemy]),
            100,
            &config,
            Controls::default(),
        );
        assert_eq!(
            d.and_then(|d| d.ability()),
            Some(abilities::PLAGUE_STRIKE.id)
        );
        assert_eq!(unholy.phase(), RotationPhase::DiseaseApplication);

        let ctx = TickContext {
            now_ms: 3_000,
            units: &units,
            auras: &auras,
        };
        let d = unholy.update(
            &ctx,
            &units[&me],
            Some(&units[&enemy]),
            2_000,
            &config,
            Controls::default(),
        );
        assert_eq!(d.and_then(|d| d.ability()), Some(abilities::ICY_TOUCH.id));

        // Both diseases booked: the queue takes over and the first order of
        // business is getting the ghoul out.
        let ctx = TickContext {
            now_ms: 5_000,
            units: &units,
            auras: &auras,
        };
        let d = unholy.update(
            &ctx,
            &units[&me],
            Some(&units[&enemy]),
            2_000,
            &config,
            Controls::default(),
        );
        assert_eq!(d.and_then(|d| d.ability()), Some(abilities::RAISE_DEAD.id));
        assert_eq!(unholy.phase(), RotationPhase::Steady);
    }

    #[test]
    fn test_unholy_sudden_doom_coil_is_free() {
        let config = CoreConfig::default();
        let mut unholy = Unholy::new(&config);
        unholy.enter_combat(1_000);
        unholy.diseases = DiseasePhase::DiseasesApplied;

        let me = Guid(1);
        let enemy = Guid(100);
        let mut units = HashMap::new();
        let mut me_view = dk_unit(me, 1, Vec3::ZERO);
        me_view.power = 0.0; // proc or not, there is no runic power to spend
        units.insert(me, me_view);
        units.insert(enemy, dk_unit(enemy, 2, Vec3::new(10.0, 0.0, 0.0)));
        let mut auras = HashMap::new();
        auras.insert(me, vec![aura(abilities::SUDDEN_DOOM_AURA, me)]);
        // Host still shows both diseases so the refresh candidates stay quiet.
        auras.entry(enemy).or_insert_with(Vec::new).extend([
            aura(abilities::BLOOD_PLAGUE_AURA, me),
            aura(abilities::FROST_FEVER_AURA, me),
        ]);
        let ctx = TickContext {
            now_ms: 2_000,
            units: &units,
            auras: &auras,
        };

        let d = unholy.update(
            &ctx,
            &units[&me],
            Some(&units[&enemy]),
            100,
            &config,
            Controls::default(),
        );
        assert_eq!(d.and_then(|d| d.ability()), Some(abilities::DEATH_COIL.id));
    }

    #[test]
    fn test_incapacitated_bot_does_nothing() {
        let config = CoreConfig::default();
        let mut blood = Blood::new(&config);
        blood.enter_combat(1_000);

        let me = Guid(1);
        let enemy = Guid(100);
        let mut units = HashMap::new();
        units.insert(me, dk_unit(me, 1, Vec3::ZERO));
        units.insert(enemy, dk_unit(enemy, 2, Vec3::new(25.0, 0.0, 0.0)));
        let auras = HashMap::new();
        let ctx = TickContext {
            now_ms: 1_000,
            units: &units,
            auras: &auras,
        };

        let d = blood.update(
            &ctx,
            &units[&me],
            Some(&units[&enemy]),
            100,
            &config,
            Controls {
                incapacitated: true,
                ..Controls::default()
            },
        );
        assert_eq!(d, None);
    }
}
