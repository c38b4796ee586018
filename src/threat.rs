//! Threat assistance
//!
//! Stateless queries over the host's threat tables: tanks use them to drive
//! taunts, damage specs to see how close they are to pulling aggro. Threat
//! values live on enemy unit views; this module only reads them.

use crate::host::{Guid, TickContext, UnitView};

/// The group member at the top of an enemy's threat table.
pub fn top_threat(enemy: &UnitView) -> Option<Guid> {
    enemy
        .threat
        .iter()
        .max_by(|(ga, ta), (gb, tb)| {
            ta.partial_cmp(tb)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(gb.cmp(ga))
        })
        .map(|(guid, _)| *guid)
}

/// A member's threat against an enemy; zero when untracked.
pub fn threat_of(enemy: &UnitView, member: Guid) -> f32 {
    enemy
        .threat
        .iter()
        .find(|(g, _)| *g == member)
        .map(|(_, t)| *t)
        .unwrap_or(0.0)
}

/// Whether a tank has lost (or never had) the top threat slot on an enemy.
/// With no threat table reported, the enemy's current target decides.
pub fn is_losing_aggro(enemy: &UnitView, tank: Guid) -> bool {
    match top_threat(enemy) {
        Some(top) => top != tank,
        None => enemy.target != Some(tank),
    }
}

/// An enemy within `range` that is attacking a non-tank group member.
/// Enemies are scanned in guid order so repeated queries agree.
pub fn taunt_candidate(world: &TickContext, me: &UnitView, range: f32) -> Option<Guid> {
    let mut enemies: Vec<&UnitView> = world.enemies_of(me).collect();
    enemies.sort_by_key(|e| e.guid);
    for enemy in enemies {
        if me.distance_to(enemy.position) > range {
            continue;
        }
        let Some(victim) = enemy.target else { continue };
        let victim_is_soft = world
            .group_of(me)
            .any(|u| u.guid == victim && !u.role.is_tank());
        if victim_is_soft {
            return Some(enemy.guid);
        }
    }
    None
}

/// Ratio of a damage dealer's threat to the tank's on one enemy. An
/// untracked tank with a tracked attacker reads as infinite.
pub fn over_threat_ratio(enemy: &UnitView, dps: Guid, tank: Guid) -> f32 {
    let dps_threat = threat_of(enemy, dps);
    let tank_threat = threat_of(enemy, tank);
    if tank_threat <= 0.0 {
        if dps_threat > 0.0 {
            return f32::INFINITY;
        }
        return 0.0;
    }
    dps_threat / tank_threat
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use glam::Vec3;

    use super::*;
    use crate::host::{GroupRole, TickContext};

    fn world_units() -> HashMap<Guid, UnitView> {
        let mut units = HashMap::new();
        let mut tank = crate::decision::testbed::unit(Guid(1), 1, Vec3::ZERO);
        tank.role = GroupRole::MainTank;
        units.insert(Guid(1), tank);
        units.insert(
            Guid(2),
            crate::decision::testbed::unit(Guid(2), 1, Vec3::ZERO),
        );
        let mut enemy = crate::decision::testbed::unit(Guid(100), 2, Vec3::new(5.0, 0.0, 0.0));
        enemy.threat = vec![(Guid(1), 1000.0), (Guid(2), 400.0)];
        enemy.target = Some(Guid(1));
        units.insert(Guid(100), enemy);
        units
    }

    #[test]
    fn test_top_threat_and_ratio() {
        let units = world_units();
        let enemy = units.get(&Guid(100)).unwrap();
        assert_eq!(top_threat(enemy), Some(Guid(1)));
        assert!(!is_losing_aggro(enemy, Guid(1)));
        let ratio = over_threat_ratio(enemy, Guid(2), Guid(1));
        assert!((ratio - 0.4).abs() < 0.001);
    }

    #[test]
    fn test_losing_aggro_when_dps_overtakes() {
        let mut units = world_units();
        units.get_mut(&Guid(100)).unwrap().threat = vec![(Guid(1), 300.0), (Guid(2), 900.0)];
        let enemy = units.get(&Guid(100)).unwrap();
        assert!(is_losing_aggro(enemy, Guid(1)));
        assert_eq!(top_threat(enemy), Some(Guid(2)));
    }

    #[test]
    fn test_taunt_candidate_only_for_soft_targets() {
        let mut units = world_units();
        let auras = HashMap::new();

        // Enemy on the tank: nothing to taunt.
        {
            let world = TickContext {
                now_ms: 0,
                units: &units,
                auras: &auras,
            };
            let me = world.unit(Guid(1)).unwrap();
            assert_eq!(taunt_candidate(&world, me, 30.0), None);
        }

        // Enemy turns to the dps: taunt it.
        units.get_mut(&Guid(100)).unwrap().target = Some(Guid(2));
        let world = TickContext {
            now_ms: 0,
            units: &units,
            auras: &auras,
        };
        let me = world.unit(Guid(1)).unwrap();
        assert_eq!(taunt_candidate(&world, me, 30.0), Some(Guid(100)));
    }

    #[test]
    fn test_taunt_candidate_respects_range() {
        let mut units = world_units();
        units.get_mut(&Guid(100)).unwrap().target = Some(Guid(2));
        units.get_mut(&Guid(100)).unwrap().position = Vec3::new(50.0, 0.0, 0.0);
        let auras = HashMap::new();
        let world = TickContext {
            now_ms: 0,
            units: &units,
            auras: &auras,
        };
        let me = world.unit(Guid(1)).unwrap();
        assert_eq!(taunt_candidate(&world, me, 30.0), None);
    }

    #[test]
    fn test_untracked_tank_reads_infinite_ratio() {
        let mut units = world_units();
        units.get_mut(&Guid(100)).unwrap().threat = vec![(Guid(2), 100.0)];
        let enemy = units.get(&Guid(100)).unwrap();
        assert_eq!(over_threat_ratio(enemy, Guid(2), Guid(1)), f32::INFINITY);
        assert_eq!(over_threat_ratio(enemy, Guid(3), Guid(1)), 0.0);
    }
}
