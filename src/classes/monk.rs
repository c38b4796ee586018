//! Windwalker monk: energy/chi melee with a fixed opener.
//!
//! The opener is the only sequenced part (two Tiger Palms into Rising Sun
//! Kick), so it lives on a small tree gated to the opening phase; when the
//! gate closes the tree steps aside and the tiered queue runs the fight.

use crate::abilities;
use crate::classes::spec_core::{MeleeCore, SpecMetrics};
use crate::classes::Controls;
use crate::combat::{DualPool, PowerPool, RotationPhase};
use crate::config::CoreConfig;
use crate::decision::tree::{cast, gated, repeat, seq};
use crate::decision::{
    ActionCandidate, ActionQueue, ActionTier, PolicyOrder, RotationPolicy,
};
use crate::host::{Decision, PowerKind, TickContext, UnitView};

const ENERGY_MAX: f32 = 100.0;
const ENERGY_REGEN_PER_SEC: f32 = 10.0;
const CHI_CAP: u8 = 5;
/// Touch of Death finishes targets at or below this fraction.
const TOUCH_FRAC: f32 = 0.15;
const SPIN_RADIUS: f32 = 8.0;
/// Tiger Palm is skipped above this to keep the bank from overcapping.
const CHI_POOL_CEILING: u8 = 3;

pub struct Windwalker {
    melee: MeleeCore<DualPool>,
    policy: RotationPolicy,
}

impl Windwalker {
    pub fn new(config: &CoreConfig) -> Self {
        let opener = gated(
            "opening",
            |ctx| ctx.phase == RotationPhase::Opening,
            seq(
                "palm palm kick",
                vec![
                    repeat(2, cast(&abilities::TIGER_PALM)),
                    cast(&abilities::RISING_SUN_KICK),
                ],
            ),
        );
        let queue = ActionQueue::new(vec![
            ActionCandidate::new(&abilities::FORTIFYING_BREW, ActionTier::Emergency, |ctx| {
                ctx.my_health_frac() <= ctx.config.emergency_frac
            }),
            ActionCandidate::new(&abilities::SPEAR_HAND_STRIKE, ActionTier::Critical, |ctx| {
                ctx.target_casting_interruptible()
            }),
            ActionCandidate::new(&abilities::TOUCH_OF_DEATH, ActionTier::High, |ctx| {
                matches!(ctx.target_health_frac(), Some(f) if f <= TOUCH_FRAC)
            }),
            ActionCandidate::new(&abilities::FISTS_OF_FURY, ActionTier::High, |_| true),
            ActionCandidate::new(&abilities::RISING_SUN_KICK, ActionTier::High, |_| true),
            ActionCandidate::new(&abilities::SPINNING_CRANE_KICK, ActionTier::Medium, |ctx| {
                ctx.world
                    .enemies_within(ctx.me, ctx.me.position, SPIN_RADIUS)
                    >= ctx.config.aoe_min
            }),
            ActionCandidate::new(&abilities::BLACKOUT_KICK, ActionTier::Medium, |_| true),
            ActionCandidate::new(&abilities::TIGER_PALM, ActionTier::Low, |ctx| {
                ctx.resource.secondary() <= CHI_POOL_CEILING
            }),
        ]);
        let pool = DualPool::new(
            PowerPool::new(PowerKind::Energy, ENERGY_MAX, ENERGY_REGEN_PER_SEC),
            CHI_CAP,
        );
        Self {
            melee: MeleeCore::new(pool, config, true),
            policy: RotationPolicy::with_tree(PolicyOrder::TreeFirst, queue, opener),
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
        if controls.incapacitated || !me.in_combat {
            return None;
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

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use glam::Vec3;

    use super::*;
    use crate::combat::ResourceState;
    use crate::decision::testbed;
    use crate::host::{AuraSeen, CastSeen, Guid};

    const ME: Guid = Guid(1);
    const ENEMY: Guid = Guid(100);

    fn monk_unit(guid: Guid, team: u8, position: Vec3) -> UnitView {
        let mut u = testbed::unit(guid, team, position);
        u.in_combat = true;
        u
    }

    fn duel() -> HashMap<Guid, UnitView> {
        let mut units = HashMap::new();
        units.insert(ME, monk_unit(ME, 1, Vec3::ZERO));
        units.insert(ENEMY, monk_unit(ENEMY, 2, Vec3::new(3.0, 0.0, 0.0)));
        units
    }

    fn tick(
        ww: &mut Windwalker,
        units: &HashMap<Guid, UnitView>,
        now_ms: u64,
        config: &CoreConfig,
    ) -> Option<Decision> {
        let auras: HashMap<Guid, Vec<AuraSeen>> = HashMap::new();
        let ctx = TickContext {
            now_ms,
            units,
            auras: &auras,
        };
        ww.update(
            &ctx,
            &units[&ME],
            Some(&units[&ENEMY]),
            100,
            config,
            Controls::default(),
        )
    }

    #[test]
    fn test_opener_is_palm_palm_kick() {
        let config = CoreConfig::default();
        let mut ww = Windwalker::new(&config);
        ww.enter_combat(1_000);

        let units = duel();
        let d = tick(&mut ww, &units, 1_000, &config);
        assert_eq!(d.and_then(|d| d.ability()), Some(abilities::TIGER_PALM.id));
        let d = tick(&mut ww, &units, 3_000, &config);
        assert_eq!(d.and_then(|d| d.ability()), Some(abilities::TIGER_PALM.id));
        let d = tick(&mut ww, &units, 4_500, &config);
        assert_eq!(
            d.and_then(|d| d.ability()),
            Some(abilities::RISING_SUN_KICK.id)
        );
        assert_eq!(
            ww.melee.core.resource.secondary(),
            2,
            "two palms in, one kick out"
        );
    }

    #[test]
    fn test_fists_of_fury_heads_the_steady_priority() {
        let config = CoreConfig::default();
        let mut ww = Windwalker::new(&config);
        ww.enter_combat(1_000);
        ww.melee.core.resource.set_secondary(4);

        let units = duel();
        let d = tick(&mut ww, &units, 6_000, &config);
        assert_eq!(
            d.and_then(|d| d.ability()),
            Some(abilities::FISTS_OF_FURY.id)
        );
        assert_eq!(ww.melee.core.resource.secondary(), 1);
    }

    #[test]
    fn test_touch_of_death_finishes_low_targets() {
        let config = CoreConfig::default();
        let mut ww = Windwalker::new(&config);
        ww.enter_combat(1_000);

        let mut units = duel();
        units.get_mut(&ENEMY).unwrap().health = 140.0;
        let d = tick(&mut ww, &units, 6_000, &config);
        assert_eq!(
            d.and_then(|d| d.ability()),
            Some(abilities::TOUCH_OF_DEATH.id)
        );
    }

    #[test]
    fn test_spinning_crane_kick_in_a_pack() {
        let config = CoreConfig::default();
        let mut ww = Windwalker::new(&config);
        ww.enter_combat(1_000);
        ww.melee.core.resource.set_secondary(2);
        ww.melee
            .core
            .cooldowns
            .trigger(abilities::FISTS_OF_FURY.id, 24_000, 1, 5_900);
        ww.melee
            .core
            .cooldowns
            .trigger(abilities::RISING_SUN_KICK.id, 10_000, 1, 5_900);

        let mut units = duel();
        units.insert(Guid(101), monk_unit(Guid(101), 2, Vec3::new(4.0, 2.0, 0.0)));
        units.insert(Guid(102), monk_unit(Guid(102), 2, Vec3::new(2.0, 4.0, 0.0)));

        let d = tick(&mut ww, &units, 6_000, &config);
        assert_eq!(
            d.and_then(|d| d.ability()),
            Some(abilities::SPINNING_CRANE_KICK.id)
        );
    }

    #[test]
    fn test_tiger_palm_rebuilds_an_empty_bank() {
        let config = CoreConfig::default();
        let mut ww = Windwalker::new(&config);
        ww.enter_combat(1_000);

        let units = duel();
        let d = tick(&mut ww, &units, 6_000, &config);
        assert_eq!(d.and_then(|d| d.ability()), Some(abilities::TIGER_PALM.id));
        assert_eq!(ww.melee.core.resource.secondary(), 2);
    }

    #[test]
    fn test_interrupt_outranks_damage() {
        let config = CoreConfig::default();
        let mut ww = Windwalker::new(&config);
        ww.enter_combat(1_000);
        ww.melee.core.resource.set_secondary(4);

        let mut units = duel();
        units.get_mut(&ENEMY).unwrap().casting = Some(CastSeen {
            spell: abilities::HEALING_WAVE.id,
            target: Some(ENEMY),
            remaining_ms: 1_500,
            interruptible: true,
            is_heal: true,
        });
        let d = tick(&mut ww, &units, 6_000, &config);
        assert_eq!(
            d.and_then(|d| d.ability()),
            Some(abilities::SPEAR_HAND_STRIKE.id)
        );
    }
}
