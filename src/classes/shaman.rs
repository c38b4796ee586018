//! Restoration shaman: totem emergencies, Earth Shield upkeep, and area
//! healing aimed at injured clusters.
//!
//! Healing Rain leads the area path because its placement query already
//! demands a real cluster; Chain Heal mops up while the rain cools down and
//! Riptide carries single-target upkeep.

use crate::abilities;
use crate::classes::spec_core::{HealerCore, SpecMetrics};
use crate::classes::Controls;
use crate::combat::{PowerPool, RotationPhase};
use crate::config::CoreConfig;
use crate::decision::{
    gate, resolve, ActionCandidate, ActionQueue, ActionTier, PolicyCtx, RotationPolicy,
};
use crate::healing;
use crate::host::{Decision, PowerKind, TickContext, UnitView};

const MANA_MAX: f32 = 25_000.0;
const MANA_REGEN_PER_SEC: f32 = 500.0;

/// Group average below this drops Spirit Link.
const SPIRIT_LINK_FRAC: f32 = 0.35;
/// Group average below this drops Healing Tide.
const TIDE_FRAC: f32 = 0.50;
const SURGE_PCT: f32 = 25.0;
/// Earth Shield is refreshed once the host shows less than this remaining.
const SHIELD_REFRESH_MS: u64 = 60_000;
const IDLE_PCT: f32 = 90.0;

fn tank_needs_earth_shield(ctx: &PolicyCtx) -> bool {
    let Some(tank) = ctx.world.main_tank(ctx.me) else {
        return false;
    };
    match ctx
        .world
        .aura_remaining(tank.guid, abilities::EARTH_SHIELD.id)
    {
        Some(remaining) => remaining < SHIELD_REFRESH_MS,
        None => !ctx
            .effects
            .is_active(tank.guid, abilities::EARTH_SHIELD.id, ctx.now_ms),
    }
}

pub struct Restoration {
    healer: HealerCore<PowerPool>,
    policy: RotationPolicy,
}

impl Restoration {
    pub fn new(config: &CoreConfig) -> Self {
        let queue = ActionQueue::new(vec![
            ActionCandidate::new(
                &abilities::SPIRIT_LINK_TOTEM,
                ActionTier::Emergency,
                |ctx| healing::group_health_avg_frac(ctx) < SPIRIT_LINK_FRAC,
            ),
            ActionCandidate::new(
                &abilities::HEALING_TIDE_TOTEM,
                ActionTier::Emergency,
                |ctx| healing::group_health_avg_frac(ctx) < TIDE_FRAC,
            ),
            ActionCandidate::new(&abilities::HEALING_SURGE, ActionTier::Critical, |ctx| {
                healing::dying_ally(ctx, SURGE_PCT).is_some()
            }),
            ActionCandidate::new(&abilities::WIND_SHEAR, ActionTier::Critical, |ctx| {
                ctx.target_casting_interruptible()
            }),
            ActionCandidate::new(&abilities::PURIFY_SPIRIT, ActionTier::Critical, |ctx| {
                healing::dispellable_ally(ctx).is_some()
            }),
            ActionCandidate::new(
                &abilities::EARTH_SHIELD,
                ActionTier::High,
                tank_needs_earth_shield,
            ),
            ActionCandidate::new(&abilities::HEALING_RAIN, ActionTier::High, |ctx| {
                healing::pick_heal_position(ctx, abilities::HEALING_RAIN.range).is_some()
            }),
            ActionCandidate::new(&abilities::CHAIN_HEAL, ActionTier::High, |ctx| {
                healing::pick_cluster_ally(ctx, abilities::CHAIN_HEAL.range).is_some()
            }),
            ActionCandidate::new(&abilities::RIPTIDE, ActionTier::High, |ctx| {
                healing::pick_heal_target(ctx).is_some()
            }),
            ActionCandidate::new(&abilities::HEALING_WAVE, ActionTier::Medium, |ctx| {
                healing::urgent_ally(ctx).is_some()
            }),
            ActionCandidate::new(&abilities::LIGHTNING_BOLT, ActionTier::Low, |ctx| {
                ctx.world.group_of(ctx.me).all(|u| u.health_pct() >= IDLE_PCT)
            }),
        ]);
        Self {
            healer: HealerCore::new(
                PowerPool::new(PowerKind::Mana, MANA_MAX, MANA_REGEN_PER_SEC),
                config,
            ),
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
            let wants = [(&abilities::EARTH_SHIELD, tank_needs_earth_shield(&pctx))];
            wants
                .into_iter()
                .find(|(info, wanted)| *wanted && gate::can_cast(&pctx, info))
                .and_then(|(info, _)| resolve(&pctx, info))
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

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use glam::Vec3;

    use super::*;
    use crate::decision::testbed;
    use crate::host::{AuraSeen, CastSeen, ControlEffect, GroupRole, Guid};

    const ME: Guid = Guid(1);
    const TANK: Guid = Guid(2);
    const ENEMY: Guid = Guid(100);

    fn resto_unit(guid: Guid, team: u8, position: Vec3) -> UnitView {
        let mut u = testbed::unit(guid, team, position);
        u.in_combat = true;
        if guid == ME {
            u.role = GroupRole::Healer;
            u.power_kind = PowerKind::Mana;
            u.power = MANA_MAX;
            u.max_power = MANA_MAX;
        }
        u
    }

    fn earth_shield(remaining_ms: u64) -> AuraSeen {
        AuraSeen {
            effect: abilities::EARTH_SHIELD.id,
            remaining_ms,
            stacks: 9,
            caster: Some(ME),
            control: ControlEffect::None,
            dispellable: None,
        }
    }

    fn tick(
        resto: &mut Restoration,
        units: &HashMap<Guid, UnitView>,
        auras: &HashMap<Guid, Vec<AuraSeen>>,
        target: Option<Guid>,
        now_ms: u64,
        config: &CoreConfig,
    ) -> Option<Decision> {
        let ctx = TickContext {
            now_ms,
            units,
            auras,
        };
        resto.update(
            &ctx,
            &units[&ME],
            target.and_then(|g| units.get(&g)),
            100,
            config,
            Controls::default(),
        )
    }

    #[test]
    fn test_healing_rain_lands_on_the_cluster() {
        let config = CoreConfig::default();
        let mut resto = Restoration::new(&config);
        resto.enter_combat(1_000);

        let mut units = HashMap::new();
        units.insert(ME, resto_unit(ME, 1, Vec3::ZERO));
        // Four injured allies packed within a few yards of each other.
        for (i, x) in [20.0, 22.0, 24.0, 26.0].iter().enumerate() {
            let guid = Guid(2 + i as u64);
            let mut ally = resto_unit(guid, 1, Vec3::new(*x, 0.0, 0.0));
            ally.health = 700.0;
            units.insert(guid, ally);
        }
        let auras = HashMap::new();

        let d = tick(&mut resto, &units, &auras, None, 1_000, &config);
        assert_eq!(
            d,
            Some(Decision::CastAt {
                ability: abilities::HEALING_RAIN.id,
                position: Vec3::new(20.0, 0.0, 0.0),
            }),
            "the rain goes to the cluster centroid"
        );
    }

    #[test]
    fn test_totems_scale_with_group_damage() {
        let config = CoreConfig::default();

        // Everyone at 30%: the group is collapsing.
        let mut resto = Restoration::new(&config);
        resto.enter_combat(1_000);
        let mut units = HashMap::new();
        let mut me = resto_unit(ME, 1, Vec3::ZERO);
        me.health = 300.0;
        units.insert(ME, me);
        for i in 0..3u64 {
            let guid = Guid(2 + i);
            let mut ally = resto_unit(guid, 1, Vec3::new(5.0 + i as f32, 0.0, 0.0));
            ally.health = 300.0;
            units.insert(guid, ally);
        }
        let auras = HashMap::new();
        let d = tick(&mut resto, &units, &auras, None, 1_000, &config);
        assert_eq!(
            d.and_then(|d| d.ability()),
            Some(abilities::SPIRIT_LINK_TOTEM.id)
        );

        // Everyone at 45%: rough, but not link-worthy.
        let mut resto = Restoration::new(&config);
        resto.enter_combat(1_000);
        for unit in units.values_mut() {
            unit.health = 450.0;
        }
        let d = tick(&mut resto, &units, &auras, None, 1_000, &config);
        assert_eq!(
            d.and_then(|d| d.ability()),
            Some(abilities::HEALING_TIDE_TOTEM.id)
        );
    }

    #[test]
    fn test_earth_shield_applied_and_refreshed() {
        let config = CoreConfig::default();
        let mut resto = Restoration::new(&config);
        resto.enter_combat(1_000);

        let mut units = HashMap::new();
        units.insert(ME, resto_unit(ME, 1, Vec3::ZERO));
        let mut tank = resto_unit(TANK, 1, Vec3::new(10.0, 0.0, 0.0));
        tank.role = GroupRole::MainTank;
        units.insert(TANK, tank);

        // No shield at all.
        let auras = HashMap::new();
        let d = tick(&mut resto, &units, &auras, None, 1_000, &config);
        assert_eq!(
            d,
            Some(Decision::Cast {
                ability: abilities::EARTH_SHIELD.id,
                target: TANK,
            })
        );

        // Shield worn down: refresh it.
        let mut resto = Restoration::new(&config);
        resto.enter_combat(1_000);
        let mut auras = HashMap::new();
        auras.insert(TANK, vec![earth_shield(30_000)]);
        let d = tick(&mut resto, &units, &auras, None, 1_000, &config);
        assert_eq!(d.and_then(|d| d.ability()), Some(abilities::EARTH_SHIELD.id));

        // Fresh shield: nothing to do but drift closer.
        let mut resto = Restoration::new(&config);
        resto.enter_combat(1_000);
        let mut auras = HashMap::new();
        auras.insert(TANK, vec![earth_shield(500_000)]);
        let d = tick(&mut resto, &units, &auras, None, 1_000, &config);
        assert_eq!(d, None, "healthy group, shielded tank, nothing to heal");
    }

    #[test]
    fn test_riptide_covers_a_lone_injury() {
        let config = CoreConfig::default();
        let mut resto = Restoration::new(&config);
        resto.enter_combat(1_000);

        let mut units = HashMap::new();
        units.insert(ME, resto_unit(ME, 1, Vec3::ZERO));
        let mut tank = resto_unit(TANK, 1, Vec3::new(10.0, 0.0, 0.0));
        tank.role = GroupRole::MainTank;
        tank.health = 600.0;
        units.insert(TANK, tank);
        let mut auras = HashMap::new();
        auras.insert(TANK, vec![earth_shield(500_000)]);

        let d = tick(&mut resto, &units, &auras, None, 1_000, &config);
        assert_eq!(
            d,
            Some(Decision::Cast {
                ability: abilities::RIPTIDE.id,
                target: TANK,
            })
        );
    }

    #[test]
    fn test_wind_shear_interrupts_the_enemy_cast() {
        let config = CoreConfig::default();
        let mut resto = Restoration::new(&config);
        resto.enter_combat(1_000);

        let mut units = HashMap::new();
        units.insert(ME, resto_unit(ME, 1, Vec3::ZERO));
        let mut enemy = resto_unit(ENEMY, 2, Vec3::new(15.0, 0.0, 0.0));
        enemy.casting = Some(CastSeen {
            spell: abilities::HEALING_WAVE.id,
            target: Some(ENEMY),
            remaining_ms: 1_800,
            interruptible: true,
            is_heal: true,
        });
        units.insert(ENEMY, enemy);
        let auras = HashMap::new();

        let d = tick(&mut resto, &units, &auras, Some(ENEMY), 1_000, &config);
        assert_eq!(d.and_then(|d| d.ability()), Some(abilities::WIND_SHEAR.id));
    }

    #[test]
    fn test_lightning_bolt_when_nothing_needs_healing() {
        let config = CoreConfig::default();
        let mut resto = Restoration::new(&config);
        resto.enter_combat(1_000);

        let mut units = HashMap::new();
        units.insert(ME, resto_unit(ME, 1, Vec3::ZERO));
        let mut tank = resto_unit(TANK, 1, Vec3::new(10.0, 0.0, 0.0));
        tank.role = GroupRole::MainTank;
        units.insert(TANK, tank);
        units.insert(ENEMY, resto_unit(ENEMY, 2, Vec3::new(15.0, 0.0, 0.0)));
        let mut auras = HashMap::new();
        auras.insert(TANK, vec![earth_shield(500_000)]);

        let d = tick(&mut resto, &units, &auras, Some(ENEMY), 1_000, &config);
        assert_eq!(
            d.and_then(|d| d.ability()),
            Some(abilities::LIGHTNING_BOLT.id)
        );
    }
}
