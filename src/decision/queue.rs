//! Tiered action queue
//!
//! A flat priority list: candidates are attempted from the top tier down and
//! the first one whose predicate and cast gate both pass wins the tick.
//! Candidates in the same tier keep their registration order, so a spec's
//! tie-break policy is simply the order it lists them in.

use crate::abilities::{ActionCategory, AbilityInfo};

use super::{gate, PolicyCtx, Pred};

/// Priority tiers, attempted top-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionTier {
    /// Survival; own or ally death is imminent
    Emergency,
    /// Must happen now (interrupts, taunts, repositioning casts)
    Critical,
    /// Core rotation pieces that outrank fillers
    High,
    /// Standard rotation
    Medium,
    /// Fillers and upkeep
    Low,
}

impl ActionTier {
    pub fn name(&self) -> &'static str {
        match self {
            ActionTier::Emergency => "emergency",
            ActionTier::Critical => "critical",
            ActionTier::High => "high",
            ActionTier::Medium => "medium",
            ActionTier::Low => "low",
        }
    }
}

/// One entry in the queue: an ability, its tier, and the rotation condition
/// under which it should fire.
pub struct ActionCandidate {
    pub info: &'static AbilityInfo,
    pub tier: ActionTier,
    pub when: Pred,
}

impl ActionCandidate {
    pub fn new(info: &'static AbilityInfo, tier: ActionTier, when: Pred) -> Self {
        Self { info, tier, when }
    }

    pub fn category(&self) -> ActionCategory {
        self.info.category
    }
}

/// The assembled queue for one spec.
pub struct ActionQueue {
    candidates: Vec<ActionCandidate>,
}

impl ActionQueue {
    /// Build the queue. The sort is stable, so entries sharing a tier stay
    /// in the order the spec registered them.
    pub fn new(mut candidates: Vec<ActionCandidate>) -> Self {
        candidates.sort_by_key(|c| c.tier);
        Self { candidates }
    }

    /// First candidate that wants to fire and is actually castable.
    pub fn select(&self, ctx: &PolicyCtx) -> Option<&ActionCandidate> {
        self.candidates
            .iter()
            .find(|c| (c.when)(ctx) && gate::can_cast(ctx, c.info))
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
