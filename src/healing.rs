//! Healing target selection
//!
//! Stateless scoring shared by every healer spec, and also used to aim
//! defensive externals. Nothing here caches between ticks; each query walks
//! the snapshot's group list.
//!
//! The score is `(deficit * role_weight * distance_factor) + 10 * dispel`,
//! discounted 30% when another healer is already mid-cast on the ally,
//! boosted 20% for the main tank, plus up to 5 points of threat pressure.

use glam::Vec3;
use smallvec::SmallVec;

use crate::abilities::{CLEANSE, PURIFY_SPIRIT};
use crate::decision::PolicyCtx;
use crate::host::{DispelSchool, GroupRole, Guid, UnitView};

/// Scoring inputs for one ally, assembled from the snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealingPriority {
    pub health_deficit: f32,
    pub role_priority: f32,
    pub distance_factor: f32,
    pub has_incoming_heals: bool,
    pub dispellable_count: u32,
    /// Share of living enemies currently targeting the ally, in [0, 1].
    pub threat_factor: f32,
    pub is_main_tank: bool,
}

impl HealingPriority {
    pub fn score(&self) -> f32 {
        let mut score = self.health_deficit * self.role_priority * self.distance_factor
            + 10.0 * self.dispellable_count as f32;
        if self.has_incoming_heals {
            score *= 0.7;
        }
        if self.is_main_tank {
            score *= 1.2;
        }
        score + self.threat_factor * 5.0
    }

    /// Build the scoring inputs for `ally` as seen by `ctx.me`.
    pub fn assess(ctx: &PolicyCtx, ally: &UnitView) -> Self {
        let distance = ctx.me.distance_to(ally.position);
        let distance_factor = (1.0 - distance / ctx.config.heal_range).clamp(0.0, 1.0);

        let has_incoming_heals = ctx.world.group_of(ctx.me).any(|u| {
            u.guid != ctx.me.guid
                && u.casting
                    .map(|c| c.is_heal && c.target == Some(ally.guid))
                    .unwrap_or(false)
        });

        let schools = dispel_schools(ctx.me);
        let dispellable_count = ctx
            .world
            .auras_on(ally.guid)
            .iter()
            .filter(|a| a.dispellable.map(|s| schools.contains(&s)).unwrap_or(false))
            .count() as u32;

        let enemy_total = ctx.world.enemies_of(ctx.me).count();
        let threat_factor = if enemy_total == 0 {
            0.0
        } else {
            let on_ally = ctx
                .world
                .enemies_of(ctx.me)
                .filter(|e| e.target == Some(ally.guid))
                .count();
            (on_ally as f32 / enemy_total as f32).clamp(0.0, 1.0)
        };

        Self {
            health_deficit: ally.health_deficit(),
            role_priority: ally.role.heal_weight(),
            distance_factor,
            has_incoming_heals,
            dispellable_count,
            threat_factor,
            is_main_tank: ally.role == GroupRole::MainTank,
        }
    }
}

/// The dispel schools this unit's kit can remove.
pub fn dispel_schools(me: &UnitView) -> SmallVec<[DispelSchool; 4]> {
    let mut schools = SmallVec::new();
    if me.knows(CLEANSE.id) {
        schools.push(DispelSchool::Magic);
        schools.push(DispelSchool::Poison);
        schools.push(DispelSchool::Disease);
    }
    if me.knows(PURIFY_SPIRIT.id) {
        if !schools.contains(&DispelSchool::Magic) {
            schools.push(DispelSchool::Magic);
        }
        schools.push(DispelSchool::Curse);
    }
    schools
}

/// One scored ally from [`injured_allies`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredAlly {
    pub guid: Guid,
    pub score: f32,
    pub health_pct: f32,
}

/// Group members in heal range below `min_hp_pct`, best score first.
/// Ties resolve by guid so repeated queries in one tick agree.
pub fn injured_allies(ctx: &PolicyCtx, min_hp_pct: f32) -> SmallVec<[ScoredAlly; 8]> {
    let mut scored: SmallVec<[ScoredAlly; 8]> = ctx
        .world
        .group_of(ctx.me)
        .filter(|u| u.health_pct() < min_hp_pct)
        .filter(|u| ctx.me.distance_to(u.position) <= ctx.config.heal_range)
        .map(|u| ScoredAlly {
            guid: u.guid,
            score: HealingPriority::assess(ctx, u).score(),
            health_pct: u.health_pct(),
        })
        .collect();
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.guid.cmp(&b.guid))
    });
    scored
}

/// Best-scored ally missing any health at all.
pub fn pick_heal_target(ctx: &PolicyCtx) -> Option<Guid> {
    injured_allies(ctx, 100.0).first().map(|a| a.guid)
}

/// Best-scored ally below the urgency threshold.
pub fn urgent_ally(ctx: &PolicyCtx) -> Option<Guid> {
    injured_allies(ctx, ctx.config.urgency_pct)
        .first()
        .map(|a| a.guid)
}

/// The single worst-off ally below `pct`, for last-resort heals.
pub fn dying_ally(ctx: &PolicyCtx, pct: f32) -> Option<Guid> {
    injured_allies(ctx, pct)
        .iter()
        .min_by(|a, b| {
            a.health_pct
                .partial_cmp(&b.health_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.guid.cmp(&b.guid))
        })
        .map(|a| a.guid)
}

/// Whether an ally carries a debuff this bot can remove.
pub fn needs_dispel(ctx: &PolicyCtx, ally: Guid) -> bool {
    let schools = dispel_schools(ctx.me);
    ctx.world
        .auras_on(ally)
        .iter()
        .any(|a| a.dispellable.map(|s| schools.contains(&s)).unwrap_or(false))
}

/// Best-scored ally that has something to dispel.
pub fn dispellable_ally(ctx: &PolicyCtx) -> Option<Guid> {
    injured_allies(ctx, 101.0)
        .iter()
        .find(|a| needs_dispel(ctx, a.guid))
        .map(|a| a.guid)
}

/// Count group members below `pct` health within `radius` of a position.
pub fn allies_below_within(ctx: &PolicyCtx, pct: f32, origin: Vec3, radius: f32) -> usize {
    ctx.world
        .group_of(ctx.me)
        .filter(|u| u.health_pct() < pct && u.distance_to(origin) <= radius)
        .count()
}

/// Mean group health fraction, for raid cooldown triggers.
pub fn group_health_avg_frac(ctx: &PolicyCtx) -> f32 {
    let mut sum = 0.0;
    let mut count = 0;
    for u in ctx.world.group_of(ctx.me) {
        sum += u.health_frac();
        count += 1;
    }
    if count == 0 {
        1.0
    } else {
        sum / count as f32
    }
}

/// The injured ally at the densest injured cluster: for each candidate,
/// count injured allies (itself included) within half the heal's range; the
/// highest count wins, ties broken by summed health deficit then guid.
pub fn pick_cluster_ally(ctx: &PolicyCtx, range: f32) -> Option<Guid> {
    cluster_centroid(ctx, range, 3)
}

/// Ground position for an area heal, at the cluster centroid ally.
pub fn pick_heal_position(ctx: &PolicyCtx, range: f32) -> Option<Vec3> {
    let guid = cluster_centroid(ctx, range, 3)?;
    ctx.world.unit(guid).map(|u| u.position)
}

fn cluster_centroid(ctx: &PolicyCtx, range: f32, min_targets: usize) -> Option<Guid> {
    let injured: Vec<&UnitView> = ctx
        .world
        .group_of(ctx.me)
        .filter(|u| u.health_pct() < 100.0)
        .filter(|u| ctx.me.distance_to(u.position) <= range)
        .collect();

    let cluster_radius = range / 2.0;
    let mut best: Option<(Guid, usize, f32)> = None;
    for candidate in &injured {
        let nearby: Vec<&&UnitView> = injured
            .iter()
            .filter(|u| u.distance_to(candidate.position) <= cluster_radius)
            .collect();
        let count = nearby.len();
        let deficit_sum: f32 = nearby.iter().map(|u| u.health_deficit()).sum();
        let better = match best {
            None => true,
            Some((bg, bc, bd)) => {
                count > bc
                    || (count == bc && deficit_sum > bd)
                    || (count == bc && deficit_sum == bd && candidate.guid < bg)
            }
        };
        if better {
            best = Some((candidate.guid, count, deficit_sum));
        }
    }
    best.filter(|(_, count, _)| *count >= min_targets)
        .map(|(guid, _, _)| guid)
}

/// Projected health fraction after `seconds`: current, plus the HoT ticks
/// we know we have rolling, minus the host's recent damage intake estimate.
pub fn predict_health(ctx: &PolicyCtx, ally: Guid, seconds: f32) -> f32 {
    let Some(unit) = ctx.world.unit(ally) else {
        return 0.0;
    };
    if unit.max_health <= 0.0 {
        return 0.0;
    }
    let window_ms = (seconds * 1000.0) as u64;
    let incoming_hots = ctx
        .effects
        .periodic_healing_within(ally, window_ms, ctx.now_ms);
    let incoming_damage = unit.recent_damage_per_sec * seconds;
    ((unit.health + incoming_hots - incoming_damage) / unit.max_health).clamp(0.0, 1.0)
}
