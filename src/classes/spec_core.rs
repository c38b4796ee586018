//! Shared plumbing every specialization is built on.
//!
//! [`SpecCore`] bundles the per-bot trackers (resource, cooldowns, effects,
//! phase) behind one pre-tick/commit pair so the per-spec files only describe
//! rotation policy. The four archetype wrappers add the positioning behavior
//! that differs between tanks, melee, casters, and healers.

use glam::Vec3;

use crate::abilities::{self, AbilityInfo, ApplyTo, MELEE_RANGE};
use crate::combat::{
    select_phase, CooldownBook, EffectBook, PhaseInputs, PhaseParams, ResourceState, RotationPhase,
};
use crate::config::CoreConfig;
use crate::decision::{PolicyCtx, ResourceView};
use crate::host::{Decision, Guid, TickContext, UnitView};

/// Radius used when counting enemies packed around the current target.
pub const CLUSTER_RADIUS: f32 = 10.0;

/// Per-combat counters, reset on combat start.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecMetrics {
    pub casts: u64,
    pub moves: u64,
    pub pet_orders: u64,
}

// ============================================================================
// Spec core
// ============================================================================

/// Tracker bundle for one specialization.
#[derive(Debug)]
pub struct SpecCore<R: ResourceState> {
    pub resource: R,
    pub cooldowns: CooldownBook,
    pub effects: EffectBook,
    pub phase: RotationPhase,
    pub metrics: SpecMetrics,
    params: PhaseParams,
    combat_started_at: Option<u64>,
}

impl<R: ResourceState> SpecCore<R> {
    pub fn new(resource: R, config: &CoreConfig) -> Self {
        Self {
            resource,
            cooldowns: CooldownBook::default(),
            effects: EffectBook::new(),
            phase: RotationPhase::Steady,
            metrics: SpecMetrics::default(),
            params: PhaseParams {
                emergency_frac: config.emergency_frac,
                execute_frac: config.execute_frac,
                aoe_min: config.aoe_min,
                opening_ms: config.opening_ms,
            },
            combat_started_at: None,
        }
    }

    /// Tracker housekeeping that must run before any selection query:
    /// regenerate before spend checks, sweep before pandemic checks.
    pub fn pre_tick(&mut self, ctx: &TickContext, me: &UnitView, dt_ms: u64) {
        let now = ctx.now_ms;
        self.resource.regenerate(now, dt_ms, me.in_combat);
        self.resource.reconcile(me.power);
        self.effects.sweep(now, ctx);
        self.effects.reconcile(ctx, me.guid, now);
    }

    /// Recompute the rotation phase from this tick's snapshot.
    pub fn compute_phase(
        &mut self,
        ctx: &TickContext,
        me: &UnitView,
        target: Option<&UnitView>,
        burst_ready: bool,
    ) -> RotationPhase {
        let inputs = PhaseInputs {
            own_health_frac: me.health_frac(),
            target_health_frac: target.map(|t| t.health_frac()),
            clustered_enemies: target
                .map(|t| ctx.enemies_within(me, t.position, CLUSTER_RADIUS))
                .unwrap_or(0),
            burst_ready,
            combat_elapsed_ms: self.combat_elapsed(ctx.now_ms),
        };
        self.phase = select_phase(&self.params, &inputs);
        self.phase
    }

    /// Book the consequences of an issued cast: cooldown, global cooldown,
    /// resource cost and gain, and any aura the catalog says it applies.
    /// The host confirms the real effects on later ticks; the trackers
    /// reconcile then.
    pub fn commit(&mut self, me: Guid, info: &AbilityInfo, target: Option<Guid>, now_ms: u64) {
        if info.cooldown_ms > 0 {
            self.cooldowns
                .trigger(info.id, info.cooldown_ms, info.charges, now_ms);
        }
        if info.gcd {
            self.cooldowns.arm_gcd(now_ms);
        }
        let _ = self.resource.pay(&info.cost, now_ms);
        self.resource.apply_gain(&info.gain);
        if let Some(applied) = info.applies {
            let on = match applied.on {
                ApplyTo::Caster => Some(me),
                ApplyTo::Target => target,
            };
            if let Some(unit) = on {
                match applied.periodic {
                    Some(per_tick) => self.effects.apply_periodic(
                        unit,
                        applied.effect,
                        applied.base_ms,
                        per_tick,
                        now_ms,
                    ),
                    None => self.effects.apply(
                        unit,
                        applied.effect,
                        applied.base_ms,
                        applied.stacks,
                        now_ms,
                    ),
                }
            }
        }
        self.metrics.casts += 1;
    }

    /// Commit whatever a decision implies, looking cast details up in the
    /// catalog. Specs with proc-discounted casts intercept before this.
    pub fn commit_decision(&mut self, me: Guid, decision: &Decision, now_ms: u64) {
        match decision {
            Decision::Cast { ability, target } => {
                if let Some(info) = abilities::find(*ability) {
                    self.commit(me, info, Some(*target), now_ms);
                }
            }
            Decision::CastAt { ability, .. } => {
                if let Some(info) = abilities::find(*ability) {
                    self.commit(me, info, None, now_ms);
                }
            }
            Decision::Move { .. } => self.metrics.moves += 1,
            Decision::Pet(_) => self.metrics.pet_orders += 1,
        }
    }

    pub fn enter_combat(&mut self, now_ms: u64) {
        self.combat_started_at = Some(now_ms);
        self.phase = RotationPhase::Opening;
        self.metrics = SpecMetrics::default();
    }

    pub fn leave_combat(&mut self) {
        self.combat_started_at = None;
        self.phase = RotationPhase::Steady;
        self.resource.on_combat_end();
        self.effects.clear();
    }

    pub fn in_combat(&self) -> bool {
        self.combat_started_at.is_some()
    }

    pub fn combat_elapsed(&self, now_ms: u64) -> u64 {
        self.combat_started_at
            .map(|t| now_ms.saturating_sub(t))
            .unwrap_or(0)
    }

    /// Assemble the borrowed view the decision engines read. Borrows the
    /// core alone, so the caller's policy stays free to tick mutably.
    pub fn policy_ctx<'a>(
        &'a self,
        ctx: &'a TickContext<'a>,
        me: &'a UnitView,
        target: Option<&'a UnitView>,
        config: &'a CoreConfig,
    ) -> PolicyCtx<'a>
    where
        &'a R: Into<ResourceView<'a>>,
    {
        PolicyCtx {
            world: ctx,
            me,
            target,
            now_ms: ctx.now_ms,
            phase: self.phase,
            cooldowns: &self.cooldowns,
            effects: &self.effects,
            resource: (&self.resource).into(),
            config,
        }
    }
}

// ============================================================================
// Positioning
// ============================================================================

/// Move toward `target` until standing `want` yards out. `None` when already
/// close enough.
pub fn melee_chase(me: &UnitView, target: &UnitView, want: f32) -> Option<Decision> {
    let d = me.distance_to(target.position);
    if d <= want {
        return None;
    }
    let dir = (target.position - me.position) / d;
    Some(Decision::Move {
        to: target.position - dir * want,
    })
}

/// The point `gap` yards directly behind a unit, from its reported facing.
pub fn behind_point(target: &UnitView, gap: f32) -> Vec3 {
    let forward = Vec3::new(target.facing.sin(), 0.0, target.facing.cos());
    target.position - forward * gap
}

/// Unit vector pointing from `target` toward `me`, falling back to `me`'s
/// own facing when the two positions coincide.
fn away_from(me: &UnitView, target: &UnitView) -> Vec3 {
    let away = (me.position - target.position).normalize_or_zero();
    if away == Vec3::ZERO {
        Vec3::new(me.facing.sin(), 0.0, me.facing.cos())
    } else {
        away
    }
}

// ============================================================================
// Archetypes
// ============================================================================

/// Tank archetype: hold the target in melee and soak its attention.
#[derive(Debug)]
pub struct TankCore<R: ResourceState> {
    pub core: SpecCore<R>,
}

impl<R: ResourceState> TankCore<R> {
    pub fn new(resource: R, config: &CoreConfig) -> Self {
        Self {
            core: SpecCore::new(resource, config),
        }
    }

    /// Close to just inside melee range, square to the target.
    pub fn close_in(&self, me: &UnitView, target: &UnitView) -> Option<Decision> {
        melee_chase(me, target, MELEE_RANGE * 0.8)
    }
}

/// Melee damage archetype: stay on the target, flank when it is tanked.
#[derive(Debug)]
pub struct MeleeCore<R: ResourceState> {
    pub core: SpecCore<R>,
    /// Reposition behind the target while it is attacking someone else.
    pub attack_from_behind: bool,
}

impl<R: ResourceState> MeleeCore<R> {
    pub fn new(resource: R, config: &CoreConfig, attack_from_behind: bool) -> Self {
        Self {
            core: SpecCore::new(resource, config),
            attack_from_behind,
        }
    }

    pub fn chase(&self, me: &UnitView, target: &UnitView) -> Option<Decision> {
        let want = MELEE_RANGE * 0.8;
        if self.attack_from_behind && target.target.is_some() && target.target != Some(me.guid) {
            let goal = behind_point(target, want);
            if me.distance_to(goal) <= 1.0 {
                return None;
            }
            return Some(Decision::Move { to: goal });
        }
        melee_chase(me, target, want)
    }
}

/// Ranged damage archetype: hold near max effective range, never inside the
/// dead zone where the ranged kit cannot fire.
#[derive(Debug)]
pub struct RangedCore<R: ResourceState> {
    pub core: SpecCore<R>,
    pub hold_range: f32,
    pub dead_zone: f32,
}

impl<R: ResourceState> RangedCore<R> {
    pub fn new(resource: R, config: &CoreConfig, hold_range: f32, dead_zone: f32) -> Self {
        Self {
            core: SpecCore::new(resource, config),
            hold_range,
            dead_zone,
        }
    }

    pub fn reposition(&self, me: &UnitView, target: &UnitView) -> Option<Decision> {
        let d = me.distance_to(target.position);
        if d < self.dead_zone {
            let goal = target.position + away_from(me, target) * (self.dead_zone + 2.0);
            return Some(Decision::Move { to: goal });
        }
        if d > self.hold_range {
            let dir = (target.position - me.position) / d;
            return Some(Decision::Move {
                to: target.position - dir * (self.hold_range * 0.9),
            });
        }
        None
    }
}

/// Healer archetype: anchor on the group rather than on an enemy.
#[derive(Debug)]
pub struct HealerCore<R: ResourceState> {
    pub core: SpecCore<R>,
}

impl<R: ResourceState> HealerCore<R> {
    pub fn new(resource: R, config: &CoreConfig) -> Self {
        Self {
            core: SpecCore::new(resource, config),
        }
    }

    /// Keep the main tank (or whoever is lowest) inside comfortable heal
    /// range; healers drift after the group, never after enemies.
    pub fn follow_group(
        &self,
        ctx: &TickContext,
        me: &UnitView,
        heal_range: f32,
    ) -> Option<Decision> {
        let anchor = ctx
            .main_tank(me)
            .or_else(|| ctx.lowest_ally(me))
            .filter(|u| u.guid != me.guid)?;
        let d = me.distance_to(anchor.position);
        if d <= heal_range * 0.8 {
            return None;
        }
        let dir = (anchor.position - me.position) / d;
        Some(Decision::Move {
            to: anchor.position - dir * (heal_range * 0.6),
        })
    }

    /// True when nobody in the group needs attention, freeing the healer to
    /// contribute damage.
    pub fn all_above(&self, ctx: &TickContext, me: &UnitView, pct: f32) -> bool {
        ctx.group_of(me).all(|u| u.health_pct() >= pct)
    }
}
