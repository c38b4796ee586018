//! Destruction warlock: shard economy on a behavior tree.
//!
//! Incinerate and Conflagrate feed soul shards, Chaos Bolt and Rain of Fire
//! spend them. Most of the kit is hard casts, so the tree's leaves carry the
//! in-flight tracking; the imp is re-summoned out of combat and kept on the
//! bot's target in combat.

use crate::abilities;
use crate::classes::spec_core::{RangedCore, SpecMetrics};
use crate::classes::Controls;
use crate::combat::{DualPool, PowerPool, RotationPhase};
use crate::config::CoreConfig;
use crate::decision::tree::{cast, check, gated, sel, seq};
use crate::decision::{gate, resolve, ActionQueue, PolicyOrder, RotationPolicy};
use crate::host::{Decision, PetOrder, PowerKind, TickContext, UnitView};

const MANA_MAX: f32 = 20_000.0;
const MANA_REGEN_PER_SEC: f32 = 300.0;
const SHARD_CAP: u8 = 5;
const HOLD_RANGE: f32 = 35.0;
/// Shards kept in reserve before Rain of Fire is worth the dump.
const RAIN_SHARDS: u8 = 3;

pub struct Destruction {
    ranged: RangedCore<DualPool>,
    policy: RotationPolicy,
}

impl Destruction {
    pub fn new(config: &CoreConfig) -> Self {
        let tree = sel(
            "destruction",
            vec![
                gated(
                    "resolve when dying",
                    |ctx| ctx.my_health_frac() <= ctx.config.emergency_frac,
                    cast(&abilities::UNENDING_RESOLVE),
                ),
                seq(
                    "resummon imp",
                    vec![
                        check("pet missing", |ctx| ctx.pet().is_none()),
                        cast(&abilities::SUMMON_IMP),
                    ],
                ),
                gated(
                    "immolate upkeep",
                    |ctx| ctx.target_needs_refresh(abilities::IMMOLATE.id, 15_000),
                    cast(&abilities::IMMOLATE),
                ),
                cast(&abilities::CONFLAGRATE),
                gated(
                    "burn the kill",
                    |ctx| {
                        matches!(ctx.target_health_frac(), Some(f) if f <= ctx.config.execute_frac)
                    },
                    cast(&abilities::SHADOWBURN),
                ),
                gated(
                    "rain on packs",
                    |ctx| {
                        ctx.phase == RotationPhase::AoE
                            && ctx.resource.secondary() >= RAIN_SHARDS
                    },
                    cast(&abilities::RAIN_OF_FIRE),
                ),
                cast(&abilities::CHAOS_BOLT),
                cast(&abilities::INCINERATE),
            ],
        );
        let pool = DualPool::new(
            PowerPool::new(PowerKind::Mana, MANA_MAX, MANA_REGEN_PER_SEC),
            SHARD_CAP,
        );
        Self {
            ranged: RangedCore::new(pool, config, HOLD_RANGE, 0.0),
            policy: RotationPolicy::with_tree(PolicyOrder::TreeFirst, ActionQueue::new(vec![]), tree),
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
        self.ranged.core.pre_tick(ctx, me, dt_ms);
        if controls.incapacitated {
            return None;
        }
        if !me.in_combat {
            return self.upkeep(ctx, me, config, controls);
        }
        self.ranged.core.compute_phase(ctx, me, target, false);

        if !controls.silenced {
            let picked = {
                let pctx = self.ranged.core.policy_ctx(ctx, me, target, config);
                self.policy.decide(&pctx)
            };
            if let Some(decision) = picked {
                self.ranged
                    .core
                    .commit_decision(me.guid, &decision, ctx.now_ms);
                return Some(decision);
            }
        }
        if let (Some(target), Some(pet)) = (target, ctx.pet_of(me.guid)) {
            if pet.target != Some(target.guid) {
                let order = Decision::Pet(PetOrder::Attack(target.guid));
                self.ranged.core.commit_decision(me.guid, &order, ctx.now_ms);
                return Some(order);
            }
        }
        if controls.rooted {
            return None;
        }
        self.ranged.reposition(me, target?)
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
            let pctx = self.ranged.core.policy_ctx(ctx, me, None, config);
            let wants = [(&abilities::SUMMON_IMP, pctx.pet().is_none())];
            wants
                .into_iter()
                .find(|(info, wanted)| *wanted && gate::can_cast(&pctx, info))
                .and_then(|(info, _)| resolve(&pctx, info))
        };
        let decision = chosen?;
        self.ranged
            .core
            .commit_decision(me.guid, &decision, ctx.now_ms);
        Some(decision)
    }

    pub fn enter_combat(&mut self, now_ms: u64) {
        self.ranged.core.enter_combat(now_ms);
        self.policy.reset();
    }

    pub fn leave_combat(&mut self) {
        self.ranged.core.leave_combat();
        self.policy.reset();
    }

    pub fn in_combat(&self) -> bool {
        self.ranged.core.in_combat()
    }

    pub fn phase(&self) -> RotationPhase {
        self.ranged.core.phase
    }

    pub fn metrics(&self) -> &SpecMetrics {
        &self.ranged.core.metrics
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use glam::Vec3;

    use super::*;
    use crate::combat::ResourceState;
    use crate::decision::testbed;
    use crate::host::{AuraSeen, CastSeen, ControlEffect, Guid};

    const ME: Guid = Guid(1);
    const ENEMY: Guid = Guid(100);
    const IMP: Guid = Guid(7);

    fn lock_unit(guid: Guid, team: u8, position: Vec3) -> UnitView {
        let mut u = testbed::unit(guid, team, position);
        u.in_combat = true;
        if guid == ME {
            u.power_kind = PowerKind::Mana;
            u.power = MANA_MAX;
            u.max_power = MANA_MAX;
        }
        u
    }

    fn duel_with_imp() -> HashMap<Guid, UnitView> {
        let mut units = HashMap::new();
        units.insert(ME, lock_unit(ME, 1, Vec3::ZERO));
        units.insert(ENEMY, lock_unit(ENEMY, 2, Vec3::new(25.0, 0.0, 0.0)));
        let mut imp = lock_unit(IMP, 1, Vec3::new(2.0, 0.0, 0.0));
        imp.owner = Some(ME);
        imp.target = Some(ENEMY);
        units.insert(IMP, imp);
        units
    }

    fn immolate_up(auras: &mut HashMap<Guid, Vec<AuraSeen>>) {
        auras.insert(
            ENEMY,
            vec![AuraSeen {
                effect: abilities::IMMOLATE.id,
                remaining_ms: 12_000,
                stacks: 1,
                caster: Some(ME),
                control: ControlEffect::None,
                dispellable: None,
            }],
        );
    }

    fn tick(
        lock: &mut Destruction,
        units: &HashMap<Guid, UnitView>,
        auras: &HashMap<Guid, Vec<AuraSeen>>,
        now_ms: u64,
        config: &CoreConfig,
    ) -> Option<Decision> {
        let ctx = TickContext {
            now_ms,
            units,
            auras,
        };
        lock.update(
            &ctx,
            &units[&ME],
            Some(&units[&ENEMY]),
            100,
            config,
            Controls::default(),
        )
    }

    #[test]
    fn test_missing_imp_is_resummoned_first() {
        let config = CoreConfig::default();
        let mut lock = Destruction::new(&config);
        lock.enter_combat(1_000);

        let mut units = duel_with_imp();
        units.remove(&IMP);
        let auras = HashMap::new();

        let d = tick(&mut lock, &units, &auras, 1_000, &config);
        assert_eq!(d.and_then(|d| d.ability()), Some(abilities::SUMMON_IMP.id));
    }

    #[test]
    fn test_immolate_applied_when_missing() {
        let config = CoreConfig::default();
        let mut lock = Destruction::new(&config);
        lock.enter_combat(1_000);

        let units = duel_with_imp();
        let auras = HashMap::new();

        let d = tick(&mut lock, &units, &auras, 1_000, &config);
        assert_eq!(d.and_then(|d| d.ability()), Some(abilities::IMMOLATE.id));
    }

    #[test]
    fn test_conflagrate_follows_a_rolling_immolate() {
        let config = CoreConfig::default();
        let mut lock = Destruction::new(&config);
        lock.enter_combat(1_000);

        let units = duel_with_imp();
        let mut auras = HashMap::new();
        immolate_up(&mut auras);

        let d = tick(&mut lock, &units, &auras, 1_000, &config);
        assert_eq!(d.and_then(|d| d.ability()), Some(abilities::CONFLAGRATE.id));
        assert_eq!(
            lock.ranged.core.resource.secondary(),
            1,
            "conflagrate banks a shard"
        );
    }

    #[test]
    fn test_chaos_bolt_spends_two_shards() {
        let config = CoreConfig::default();
        let mut lock = Destruction::new(&config);
        lock.enter_combat(1_000);
        lock.ranged.core.resource.set_secondary(2);
        // Both conflagrate charges already spent.
        lock.ranged
            .core
            .cooldowns
            .trigger(abilities::CONFLAGRATE.id, 12_000, 2, 900);
        lock.ranged
            .core
            .cooldowns
            .trigger(abilities::CONFLAGRATE.id, 12_000, 2, 900);

        let units = duel_with_imp();
        let mut auras = HashMap::new();
        immolate_up(&mut auras);

        let d = tick(&mut lock, &units, &auras, 1_000, &config);
        assert_eq!(d.and_then(|d| d.ability()), Some(abilities::CHAOS_BOLT.id));
        assert_eq!(lock.ranged.core.resource.secondary(), 0);
    }

    #[test]
    fn test_rain_of_fire_lands_on_the_pack() {
        let config = CoreConfig::default();
        let mut lock = Destruction::new(&config);
        lock.enter_combat(1_000);
        lock.ranged.core.resource.set_secondary(3);
        lock.ranged
            .core
            .cooldowns
            .trigger(abilities::CONFLAGRATE.id, 12_000, 2, 900);
        lock.ranged
            .core
            .cooldowns
            .trigger(abilities::CONFLAGRATE.id, 12_000, 2, 900);

        let mut units = duel_with_imp();
        units.insert(
            Guid(101),
            lock_unit(Guid(101), 2, Vec3::new(27.0, 0.0, 0.0)),
        );
        units.insert(
            Guid(102),
            lock_unit(Guid(102), 2, Vec3::new(25.0, 3.0, 0.0)),
        );
        let mut auras = HashMap::new();
        immolate_up(&mut auras);

        let d = tick(&mut lock, &units, &auras, 1_000, &config);
        assert_eq!(
            d,
            Some(Decision::CastAt {
                ability: abilities::RAIN_OF_FIRE.id,
                position: units[&ENEMY].position,
            })
        );
        assert_eq!(lock.phase(), RotationPhase::AoE);
    }

    #[test]
    fn test_unending_resolve_when_low() {
        let config = CoreConfig::default();
        let mut lock = Destruction::new(&config);
        lock.enter_combat(1_000);

        let mut units = duel_with_imp();
        units.get_mut(&ME).unwrap().health = 250.0;
        let auras = HashMap::new();

        let d = tick(&mut lock, &units, &auras, 1_000, &config);
        assert_eq!(
            d.and_then(|d| d.ability()),
            Some(abilities::UNENDING_RESOLVE.id)
        );
    }

    #[test]
    fn test_idle_pet_is_sicced_while_casting() {
        let config = CoreConfig::default();
        let mut lock = Destruction::new(&config);
        lock.enter_combat(1_000);

        let mut units = duel_with_imp();
        units.get_mut(&IMP).unwrap().target = None;
        units.get_mut(&ME).unwrap().casting = Some(CastSeen {
            spell: abilities::INCINERATE.id,
            target: Some(ENEMY),
            remaining_ms: 1_200,
            interruptible: true,
            is_heal: false,
        });
        let mut auras = HashMap::new();
        immolate_up(&mut auras);

        let d = tick(&mut lock, &units, &auras, 1_000, &config);
        assert_eq!(d, Some(Decision::Pet(PetOrder::Attack(ENEMY))));
    }
}
