//! Arms warrior: rage-funded melee priority with a charge opener.
//!
//! Rage has no passive regen; Charge front-loads some and the host grants
//! the rest from swings, so the queue leans on cheap strikes and pools
//! before Slam. Overpower rides the Taste for Blood proc and only gets a
//! look once Mortal Strike is cooling down.

use crate::abilities;
use crate::classes::spec_core::{MeleeCore, SpecMetrics};
use crate::classes::Controls;
use crate::combat::{PowerPool, RotationPhase};
use crate::config::CoreConfig;
use crate::decision::{
    gate, resolve, ActionCandidate, ActionQueue, ActionTier, RotationPolicy,
};
use crate::host::{Decision, PowerKind, TickContext, UnitView};

const RAGE_MAX: f32 = 100.0;
/// Charge needs a running start.
const CHARGE_MIN_RANGE: f32 = 8.0;
const SWEEP_RADIUS: f32 = 8.0;
/// Slam is a dump and waits until rage is pooled past this.
const SLAM_POOL_FRAC: f32 = 0.5;

pub struct Arms {
    melee: MeleeCore<PowerPool>,
    policy: RotationPolicy,
}

impl Arms {
    pub fn new(config: &CoreConfig) -> Self {
        let queue = ActionQueue::new(vec![
            ActionCandidate::new(
                &abilities::ENRAGED_REGENERATION,
                ActionTier::Emergency,
                |ctx| ctx.my_health_frac() <= ctx.config.emergency_frac,
            ),
            ActionCandidate::new(&abilities::PUMMEL, ActionTier::Critical, |ctx| {
                ctx.target_casting_interruptible()
            }),
            ActionCandidate::new(&abilities::CHARGE, ActionTier::Critical, |ctx| {
                matches!(ctx.target_distance(), Some(d) if d > CHARGE_MIN_RANGE)
            }),
            ActionCandidate::new(&abilities::REND, ActionTier::High, |ctx| {
                ctx.target_needs_refresh(abilities::REND.id, 15_000)
            }),
            ActionCandidate::new(&abilities::EXECUTE, ActionTier::High, |ctx| {
                ctx.phase == RotationPhase::Execute
            }),
            ActionCandidate::new(&abilities::MORTAL_STRIKE, ActionTier::High, |_| true),
            ActionCandidate::new(&abilities::OVERPOWER, ActionTier::High, |ctx| {
                ctx.self_buff_active(abilities::TASTE_FOR_BLOOD_AURA)
            }),
            ActionCandidate::new(&abilities::SWEEPING_STRIKES, ActionTier::Medium, |ctx| {
                ctx.enemies_near_target(SWEEP_RADIUS) >= 2
                    && !ctx.self_buff_active(abilities::SWEEPING_STRIKES.id)
            }),
            ActionCandidate::new(&abilities::BLADESTORM, ActionTier::Medium, |ctx| {
                ctx.phase == RotationPhase::AoE
            }),
            ActionCandidate::new(&abilities::SLAM, ActionTier::Medium, |ctx| {
                ctx.resource.fraction() >= SLAM_POOL_FRAC
            }),
            ActionCandidate::new(&abilities::BATTLE_SHOUT, ActionTier::Low, |ctx| {
                !ctx.self_buff_active(abilities::BATTLE_SHOUT.id)
            }),
        ]);
        Self {
            melee: MeleeCore::new(PowerPool::new(PowerKind::Rage, RAGE_MAX, 0.0), config, true),
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
        self.melee.core.compute_phase(ctx, me, target, false);

        if !controls.silenced {
            let picked = {
                let pctx = self.melee.core.policy_ctx(ctx, me, target, config);
                self.policy.decide(&pctx)
            };
            if let Some(decision) = picked {
                self.melee
                    .core
                    .commit_decision(me.guid, &decision, ctx.now_ms);
                return Some(decision);
            }
        }
        if controls.rooted {
            return None;
        }
        self.melee.chase(me, target?)
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
            let wants = [(
                &abilities::BATTLE_SHOUT,
                !pctx.self_buff_active(abilities::BATTLE_SHOUT.id),
            )];
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
