//! Decision layer
//!
//! Turns one tick's snapshot into at most one action. Two engines share the
//! same gate logic: a tiered action queue (first passing candidate wins) and
//! a behavior tree for specs whose rotations carry multi-step state. A spec
//! wires either or both into a [`RotationPolicy`].

pub mod queue;
pub mod tree;

use crate::abilities::{AbilityInfo, ActionCategory, TargetKind};
use crate::combat::{CooldownBook, Cost, DualPool, EffectBook, PowerPool, ResourceState, RotationPhase, RuneSet};
use crate::config::CoreConfig;
use crate::healing;
use crate::host::{Decision, Guid, SpellId, TickContext, UnitView};

pub use queue::{ActionCandidate, ActionQueue, ActionTier};
pub use tree::{Node, Status, TreeCtx};

/// Candidate and node predicates are plain functions over the tick context.
pub type Pred = fn(&PolicyCtx) -> bool;

/// Borrowed view of a spec's resource pool for gate checks and predicates.
#[derive(Clone, Copy)]
pub enum ResourceView<'a> {
    Simple(&'a PowerPool),
    Dual(&'a DualPool),
    Runes(&'a RuneSet),
}

impl ResourceView<'_> {
    pub fn fraction(&self) -> f32 {
        match self {
            ResourceView::Simple(p) => p.fraction(),
            ResourceView::Dual(p) => p.fraction(),
            ResourceView::Runes(r) => r.fraction(),
        }
    }

    pub fn secondary(&self) -> u8 {
        match self {
            ResourceView::Simple(p) => p.secondary(),
            ResourceView::Dual(p) => p.secondary(),
            ResourceView::Runes(r) => r.secondary(),
        }
    }

    pub fn can_pay(&self, cost: &Cost, now_ms: u64) -> bool {
        match self {
            ResourceView::Simple(p) => p.can_pay(cost, now_ms),
            ResourceView::Dual(p) => p.can_pay(cost, now_ms),
            ResourceView::Runes(r) => r.can_pay(cost, now_ms),
        }
    }

    /// Ready runes across all slots; zero for non-rune resources.
    pub fn runes_ready(&self, now_ms: u64) -> usize {
        match self {
            ResourceView::Runes(r) => r.total_ready(now_ms),
            _ => 0,
        }
    }
}

impl<'a> From<&'a PowerPool> for ResourceView<'a> {
    fn from(pool: &'a PowerPool) -> Self {
        ResourceView::Simple(pool)
    }
}

impl<'a> From<&'a DualPool> for ResourceView<'a> {
    fn from(pool: &'a DualPool) -> Self {
        ResourceView::Dual(pool)
    }
}

impl<'a> From<&'a RuneSet> for ResourceView<'a> {
    fn from(runes: &'a RuneSet) -> Self {
        ResourceView::Runes(runes)
    }
}

/// Everything a predicate or gate may look at for one tick.
pub struct PolicyCtx<'a> {
    pub world: &'a TickContext<'a>,
    pub me: &'a UnitView,
    pub target: Option<&'a UnitView>,
    pub now_ms: u64,
    pub phase: RotationPhase,
    pub cooldowns: &'a CooldownBook,
    pub effects: &'a EffectBook,
    pub resource: ResourceView<'a>,
    pub config: &'a CoreConfig,
}

impl PolicyCtx<'_> {
    pub fn my_health_frac(&self) -> f32 {
        self.me.health_frac()
    }

    pub fn target_guid(&self) -> Option<Guid> {
        self.target.map(|t| t.guid)
    }

    pub fn target_health_frac(&self) -> Option<f32> {
        self.target.map(|t| t.health_frac())
    }

    pub fn target_distance(&self) -> Option<f32> {
        self.target.map(|t| self.me.distance_to(t.position))
    }

    pub fn target_in_range(&self, range: f32) -> bool {
        self.target_distance().map(|d| d <= range).unwrap_or(false)
    }

    pub fn enemies_near_target(&self, radius: f32) -> usize {
        match self.target {
            Some(t) => self.world.enemies_within(self.me, t.position, radius),
            None => 0,
        }
    }

    /// Active on any unit, whether we applied it or the host observed it.
    pub fn unit_has(&self, guid: Guid, effect: SpellId) -> bool {
        self.effects.is_active(guid, effect, self.now_ms) || self.world.has_aura(guid, effect)
    }

    pub fn self_buff_active(&self, effect: SpellId) -> bool {
        self.unit_has(self.me.guid, effect)
    }

    pub fn self_buff_stacks(&self, effect: SpellId) -> u32 {
        let host = self.world.aura_stacks(self.me.guid, effect);
        if host > 0 {
            return host;
        }
        self.effects.stacks(self.me.guid, effect, self.now_ms)
    }

    /// Active on the current target, from either bookkeeping source.
    pub fn target_has(&self, effect: SpellId) -> bool {
        match self.target {
            Some(t) => self.unit_has(t.guid, effect),
            None => false,
        }
    }

    pub fn target_needs_refresh(&self, effect: SpellId, base_ms: u64) -> bool {
        let Some(t) = self.target else { return false };
        if self.effects.is_active(t.guid, effect, self.now_ms) {
            let window = (base_ms as f64 * 0.3) as u64;
            return self.effects.needs_refresh(t.guid, effect, window, self.now_ms);
        }
        // Not in our book: missing unless the host shows it.
        !self.world.has_aura(t.guid, effect)
    }

    pub fn target_casting_interruptible(&self) -> bool {
        self.target
            .and_then(|t| t.casting.as_ref())
            .map(|c| c.interruptible)
            .unwrap_or(false)
    }

    pub fn pet(&self) -> Option<&UnitView> {
        self.world.pet_of(self.me.guid)
    }
}

// ============================================================================
// Cast gate
// ============================================================================

/// Shared pre-cast checks. Both decision engines refuse an ability that
/// fails here, so predicates only need to express rotation intent.
pub mod gate {
    use super::*;

    pub fn can_cast(ctx: &PolicyCtx, info: &AbilityInfo) -> bool {
        if ctx.me.casting.is_some() {
            return false;
        }
        // An empty spellbook means the host did not fill one in for this
        // view; a filled one silently rejects ranks the bot never learned.
        if !ctx.me.known_spells.is_empty() && !ctx.me.knows(info.id) {
            return false;
        }
        if !ctx.cooldowns.is_ready(info.id, ctx.now_ms) {
            return false;
        }
        if info.gcd && !ctx.cooldowns.gcd_ready(ctx.now_ms) {
            return false;
        }
        if !ctx.resource.can_pay(&info.cost, ctx.now_ms) {
            return false;
        }
        target_ok(ctx, info)
    }

    fn target_ok(ctx: &PolicyCtx, info: &AbilityInfo) -> bool {
        match info.target {
            TargetKind::Hostile | TargetKind::GroundHostile => match ctx.target {
                Some(t) => {
                    t.alive && (info.range <= 0.0 || ctx.me.distance_to(t.position) <= info.range)
                }
                None => false,
            },
            TargetKind::SelfOnly => true,
            // Recipient existence is checked at resolution; predicates
            // express who should receive the heal.
            TargetKind::Ally | TargetKind::ClusterAlly | TargetKind::GroundAlly => true,
            TargetKind::MainTank => ctx.world.main_tank(ctx.me).is_some(),
        }
    }
}

/// Map a gated ability to a concrete decision, resolving its recipient.
pub fn resolve(ctx: &PolicyCtx, info: &'static AbilityInfo) -> Option<Decision> {
    let decision = match info.target {
        TargetKind::Hostile => Decision::Cast {
            ability: info.id,
            target: ctx.target?.guid,
        },
        TargetKind::SelfOnly => Decision::Cast {
            ability: info.id,
            target: ctx.me.guid,
        },
        TargetKind::Ally => {
            // Dispels go to whoever carries the debuff. A critically low
            // ally pre-empts the scored pick for everything else.
            let recipient = if info.category == ActionCategory::Utility {
                healing::dispellable_ally(ctx)
            } else {
                healing::dying_ally(ctx, ctx.config.emergency_frac * 100.0)
                    .or_else(|| healing::pick_heal_target(ctx))
            };
            Decision::Cast {
                ability: info.id,
                target: recipient?,
            }
        }
        TargetKind::MainTank => Decision::Cast {
            ability: info.id,
            target: ctx.world.main_tank(ctx.me)?.guid,
        },
        TargetKind::ClusterAlly => Decision::Cast {
            ability: info.id,
            target: healing::pick_cluster_ally(ctx, info.range)?,
        },
        TargetKind::GroundAlly => Decision::CastAt {
            ability: info.id,
            position: healing::pick_heal_position(ctx, info.range)?,
        },
        TargetKind::GroundHostile => Decision::CastAt {
            ability: info.id,
            position: ctx.target?.position,
        },
    };
    Some(decision)
}

// ============================================================================
// Rotation policy
// ============================================================================

/// Which engine gets the first say each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyOrder {
    QueueFirst,
    TreeFirst,
}

/// A spec's wired-up decision engines.
pub struct RotationPolicy {
    order: PolicyOrder,
    queue: ActionQueue,
    tree: Option<Box<dyn Node>>,
}

impl RotationPolicy {
    pub fn queue_only(queue: ActionQueue) -> Self {
        Self {
            order: PolicyOrder::QueueFirst,
            queue,
            tree: None,
        }
    }

    pub fn with_tree(order: PolicyOrder, queue: ActionQueue, tree: Box<dyn Node>) -> Self {
        Self {
            order,
            queue,
            tree: Some(tree),
        }
    }

    /// Pick this tick's action, if any.
    pub fn decide(&mut self, ctx: &PolicyCtx) -> Option<Decision> {
        match self.order {
            PolicyOrder::TreeFirst => {
                if let Some(tree) = self.tree.as_mut() {
                    let mut tctx = TreeCtx::new(ctx);
                    let status = tree.tick(&mut tctx);
                    if tctx.decision.is_some() {
                        return tctx.decision;
                    }
                    // A running tree is waiting on something in flight;
                    // cutting in with queue actions would fight it.
                    if status == Status::Running {
                        return None;
                    }
                }
                self.queue_decision(ctx)
            }
            PolicyOrder::QueueFirst => {
                if let Some(decision) = self.queue_decision(ctx) {
                    return Some(decision);
                }
                if let Some(tree) = self.tree.as_mut() {
                    let mut tctx = TreeCtx::new(ctx);
                    tree.tick(&mut tctx);
                    return tctx.decision;
                }
                None
            }
        }
    }

    fn queue_decision(&self, ctx: &PolicyCtx) -> Option<Decision> {
        let candidate = self.queue.select(ctx)?;
        resolve(ctx, candidate.info)
    }

    /// Abandon tree progress, for combat transitions.
    pub fn reset(&mut self) {
        if let Some(tree) = self.tree.as_mut() {
            tree.reset();
        }
    }
}
