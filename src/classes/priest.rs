//! Shadow priest: DoT upkeep, insanity banking, and the voidform loop.
//!
//! The rotation is tree-driven because its heart is multi-step: bank
//! insanity to the entry threshold, channel Void Eruption, then live in the
//! voidform selector until the aura falls off. Mind Blast and Mind Flay are
//! real cast times, so leaves suspend [`Running`] while the host channels.

use crate::abilities;
use crate::classes::spec_core::{RangedCore, SpecMetrics};
use crate::classes::Controls;
use crate::combat::{DualPool, PowerPool, ResourceState, RotationPhase};
use crate::config::CoreConfig;
use crate::decision::tree::{cast, check, gated, sel, seq};
use crate::decision::{gate, resolve, ActionQueue, PolicyCtx, PolicyOrder, RotationPolicy};
use crate::host::{Decision, Guid, PowerKind, TickContext, UnitView};

/// Insanity at which spenders are worth pressing.
const INSANITY_SPEND: u8 = 50;
/// Insanity required before Void Eruption is allowed to fire.
const VOIDFORM_ENTRY: u8 = 60;

const MANA_MAX: f32 = 20_000.0;
const MANA_REGEN_PER_SEC: f32 = 250.0;
const HOLD_RANGE: f32 = 35.0;

fn in_voidform(ctx: &PolicyCtx) -> bool {
    ctx.self_buff_active(abilities::VOIDFORM_AURA)
}

pub struct Shadow {
    ranged: RangedCore<DualPool>,
    policy: RotationPolicy,
}

impl Shadow {
    pub fn new(config: &CoreConfig) -> Self {
        let tree = sel(
            "shadow",
            vec![
                gated(
                    "disperse when dying",
                    |ctx| ctx.my_health_frac() <= ctx.config.emergency_frac,
                    cast(&abilities::DISPERSION),
                ),
                gated(
                    "interrupt",
                    |ctx| ctx.target_casting_interruptible(),
                    cast(&abilities::SILENCE),
                ),
                gated(
                    "restore shadowform",
                    |ctx| !ctx.self_buff_active(abilities::SHADOWFORM.id),
                    cast(&abilities::SHADOWFORM),
                ),
                gated(
                    "voidform loop",
                    in_voidform,
                    sel(
                        "void spenders",
                        vec![
                            cast(&abilities::VOID_BOLT),
                            gated(
                                "dump insanity",
                                |ctx| ctx.resource.secondary() >= INSANITY_SPEND,
                                cast(&abilities::DEVOURING_PLAGUE),
                            ),
                            cast(&abilities::MIND_FLAY),
                        ],
                    ),
                ),
                seq(
                    "enter voidform",
                    vec![
                        check("insanity banked", |ctx| {
                            ctx.resource.secondary() >= VOIDFORM_ENTRY && !in_voidform(ctx)
                        }),
                        cast(&abilities::VOID_ERUPTION),
                    ],
                ),
                gated(
                    "vampiric touch upkeep",
                    |ctx| ctx.target_needs_refresh(abilities::VAMPIRIC_TOUCH.id, 21_000),
                    cast(&abilities::VAMPIRIC_TOUCH),
                ),
                gated(
                    "shadow word pain upkeep",
                    |ctx| ctx.target_needs_refresh(abilities::SHADOW_WORD_PAIN.id, 16_000),
                    cast(&abilities::SHADOW_WORD_PAIN),
                ),
                gated(
                    "execute",
                    |ctx| {
                        matches!(ctx.target_health_frac(), Some(f) if f <= ctx.config.execute_frac)
                    },
                    cast(&abilities::SHADOW_WORD_DEATH),
                ),
                // Outside voidform the bank is for Void Eruption; spend only
                // while that entry is still on cooldown.
                gated(
                    "spend while eruption is down",
                    |ctx| {
                        ctx.resource.secondary() >= INSANITY_SPEND
                            && !ctx
                                .cooldowns
                                .is_ready(abilities::VOID_ERUPTION.id, ctx.now_ms)
                    },
                    cast(&abilities::DEVOURING_PLAGUE),
                ),
                sel(
                    "filler",
                    vec![cast(&abilities::MIND_BLAST), cast(&abilities::MIND_FLAY)],
                ),
            ],
        );
        let pool = DualPool::new(
            PowerPool::new(PowerKind::Mana, MANA_MAX, MANA_REGEN_PER_SEC),
            100,
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
        let burst = self.ranged.core.resource.secondary() >= VOIDFORM_ENTRY
            && self
                .ranged
                .core
                .cooldowns
                .is_ready(abilities::VOID_ERUPTION.id, ctx.now_ms);
        self.ranged.core.compute_phase(ctx, me, target, burst);

        if !controls.silenced {
            let picked = {
                let pctx = self.ranged.core.policy_ctx(ctx, me, target, config);
                self.policy.decide(&pctx)
            };
            if let Some(decision) = picked {
                self.commit(me.guid, &decision, ctx.now_ms);
                return Some(decision);
            }
        }
        if controls.rooted {
            return None;
        }
        self.ranged.reposition(me, target?)
    }

    fn commit(&mut self, me: Guid, decision: &Decision, now_ms: u64) {
        self.ranged.core.commit_decision(me, decision, now_ms);
        match decision {
            // Entry consumes the whole bank; the cost table says Free
            // because the drain is not a price check.
            Decision::Cast { ability, .. } if *ability == abilities::VOID_ERUPTION.id => {
                self.ranged.core.resource.drain_secondary();
            }
            // Void Bolt rolls both DoTs forward a few seconds.
            Decision::Cast { ability, target } if *ability == abilities::VOID_BOLT.id => {
                self.ranged
                    .core
                    .effects
                    .extend(*target, abilities::SHADOW_WORD_PAIN.id, 3_000, now_ms);
                self.ranged
                    .core
                    .effects
                    .extend(*target, abilities::VAMPIRIC_TOUCH.id, 3_000, now_ms);
            }
            _ => {}
        }
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
            let wants = [
                (
                    &abilities::SHADOWFORM,
                    !pctx.self_buff_active(abilities::SHADOWFORM.id),
                ),
                (
                    &abilities::POWER_WORD_FORTITUDE,
                    !pctx.self_buff_active(abilities::POWER_WORD_FORTITUDE.id),
                ),
            ];
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
