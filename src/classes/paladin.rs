//! Holy paladin: triage healing on a tiered queue.
//!
//! Holy Shock doubles as the emergency instant and the holy power builder;
//! Word of Glory spends the bank on whoever the scorer likes. Beacon stays
//! on the main tank and Judgment only happens when nobody needs the mana.

use crate::abilities;
use crate::classes::spec_core::{HealerCore, SpecMetrics};
use crate::classes::Controls;
use crate::combat::{DualPool, PowerPool, RotationPhase};
use crate::config::CoreConfig;
use crate::decision::{ActionCandidate, ActionQueue, ActionTier, PolicyCtx, RotationPolicy};
use crate::healing;
use crate::host::{Decision, PowerKind, TickContext, UnitView};

const MANA_MAX: f32 = 22_000.0;
const MANA_REGEN_PER_SEC: f32 = 300.0;
const HOLY_POWER_CAP: u8 = 5;

/// Below this an ally gets Lay on Hands.
const LAY_ON_HANDS_PCT: f32 = 10.0;
/// Below this the shock stops being a builder and becomes the rescue.
const EMERGENCY_SHOCK_PCT: f32 = 25.0;
/// Light of Dawn's effective spread around the caster.
const DAWN_RADIUS: f32 = 15.0;
const DAWN_INJURED_PCT: f32 = 80.0;
const FLASH_PCT: f32 = 85.0;
/// Everyone at or above this and the healer is allowed to judge.
const IDLE_DPS_PCT: f32 = 90.0;

fn tank_missing_beacon(ctx: &PolicyCtx) -> bool {
    match ctx.world.main_tank(ctx.me) {
        Some(tank) => !ctx.unit_has(tank.guid, abilities::BEACON_OF_LIGHT.id),
        None => false,
    }
}

pub struct Holy {
    healer: HealerCore<DualPool>,
    policy: RotationPolicy,
}

impl Holy {
    pub fn new(config: &CoreConfig) -> Self {
        let queue = ActionQueue::new(vec![
            ActionCandidate::new(&abilities::LAY_ON_HANDS, ActionTier::Emergency, |ctx| {
                healing::dying_ally(ctx, LAY_ON_HANDS_PCT).is_some()
            }),
            ActionCandidate::new(&abilities::HOLY_SHOCK, ActionTier::Emergency, |ctx| {
                healing::dying_ally(ctx, EMERGENCY_SHOCK_PCT).is_some()
            }),
            ActionCandidate::new(&abilities::WORD_OF_GLORY, ActionTier::Critical, |ctx| {
                healing::urgent_ally(ctx).is_some()
            }),
            ActionCandidate::new(&abilities::CLEANSE, ActionTier::Critical, |ctx| {
                healing::dispellable_ally(ctx).is_some()
            }),
            ActionCandidate::new(
                &abilities::BEACON_OF_LIGHT,
                ActionTier::High,
                tank_missing_beacon,
            ),
            ActionCandidate::new(&abilities::LIGHT_OF_DAWN, ActionTier::High, |ctx| {
                healing::allies_below_within(ctx, DAWN_INJURED_PCT, ctx.me.position, DAWN_RADIUS)
                    >= ctx.config.aoe_min
            }),
            ActionCandidate::new(&abilities::HOLY_SHOCK, ActionTier::High, |ctx| {
                healing::pick_heal_target(ctx).is_some()
            }),
            ActionCandidate::new(&abilities::HOLY_LIGHT, ActionTier::Medium, |ctx| {
                healing::urgent_ally(ctx).is_some()
            }),
            ActionCandidate::new(&abilities::FLASH_OF_LIGHT, ActionTier::Medium, |ctx| {
                !healing::injured_allies(ctx, FLASH_PCT).is_empty()
            }),
            ActionCandidate::new(&abilities::JUDGMENT, ActionTier::Low, |ctx| {
                ctx.world.group_of(ctx.me).all(|u| u.health_pct() >= IDLE_DPS_PCT)
            }),
        ]);
        let pool = DualPool::new(
            PowerPool::new(PowerKind::Mana, MANA_MAX, MANA_REGEN_PER_SEC),
            HOLY_POWER_CAP,
        );
        Self {
            healer: HealerCore::new(pool, config),
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
        self.healer.core.pre_tick(ctx, me, dt_ms);
        if controls.incapacitated {
            return None;
        }
        if !me.in_combat {
            return self.upkeep(ctx, me, config, controls);
        }
        self.healer.core.compute_phase(ctx, me, target, false);

        if !controls.silenced {
            let picked = {
                let pctx = self.healer.core.policy_ctx(ctx, me, target, config);
                self.policy.decide(&pctx)
            };
            if let Some(decision) = picked {
                self.healer
                    .core
                    .commit_decision(me.guid, &decision, ctx.now_ms);
                return Some(decision);
            }
        }
        if controls.rooted {
            return None;
        }
        self.healer.follow_group(ctx, me, config.heal_range)
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
            let pctx = self.healer.core.policy_ctx(ctx, me, None, config);
            let wants = [(&abilities::BEACON_OF_LIGHT, tank_missing_beacon(&pctx))];
            wants
                .into_iter()
                .find(|(info, wanted)| *wanted && crate::decision::gate::can_cast(&pctx, info))
                .and_then(|(info, _)| crate::decision::resolve(&pctx, info))
        };
        let decision = chosen?;
        self.healer
            .core
            .commit_decision(me.guid, &decision, ctx.now_ms);
        Some(decision)
    }

    pub fn enter_combat(&mut self, now_ms: u64) {
        self.healer.core.enter_combat(now_ms);
        self.policy.reset();
    }

    pub fn leave_combat(&mut self) {
        self.healer.core.leave_combat();
        self.policy.reset();
    }

    pub fn in_combat(&self) -> bool {
        self.healer.core.in_combat()
    }

    pub fn phase(&self) -> RotationPhase {
        self.healer.core.phase
    }

    pub fn metrics(&self) -> &SpecMetrics {
        &self.healer.core.metrics
    }
}
