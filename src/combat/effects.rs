//! Status Effect Tracking
//!
//! Tracks the DoTs, HoTs, and buffs a bot has applied, keyed by
//! `(target guid, effect id)`. The book is what rotations consult for
//! refresh decisions; the host stays authoritative for what is really on a
//! unit, so stored expiries are hints that get reconciled against the host's
//! aura observations every tick.
//!
//! Refreshing follows the pandemic rule: the new duration is
//! `min(base + remaining, 1.3 * base)`, so clipping early never wastes more
//! than 30% of a base duration.

use std::collections::HashMap;

use crate::host::{Guid, SpellId, TickContext};

/// Ignore host/internal expiry drift below this threshold.
const RECONCILE_SLACK_MS: u64 = 750;

/// How long a fresh application is trusted before a missing host aura counts
/// as evidence the cast was refused.
const APPLY_GRACE_MS: u64 = 1500;

/// Periodic component of a tracked effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Periodic {
    pub amount: f32,
    pub every_ms: u64,
    pub healing: bool,
}

/// One tracked effect instance.
#[derive(Debug, Clone)]
pub struct Effect {
    pub applied_at: u64,
    pub expires_at: u64,
    /// Base duration of a fresh application; pandemic math works from this.
    pub base_ms: u64,
    pub stacks: u32,
    pub per_tick: Option<Periodic>,
}

impl Effect {
    fn remaining(&self, now_ms: u64) -> u64 {
        self.expires_at.saturating_sub(now_ms)
    }
}

/// Status-effect book for one bot.
#[derive(Debug, Clone, Default)]
pub struct EffectBook {
    entries: HashMap<(Guid, SpellId), Effect>,
}

impl EffectBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an application or refresh. Refreshes use the pandemic rule.
    pub fn apply(&mut self, target: Guid, effect: SpellId, base_ms: u64, stacks: u32, now_ms: u64) {
        self.apply_with(target, effect, base_ms, stacks, None, now_ms);
    }

    /// Record a periodic effect (DoT or HoT).
    pub fn apply_periodic(
        &mut self,
        target: Guid,
        effect: SpellId,
        base_ms: u64,
        per_tick: Periodic,
        now_ms: u64,
    ) {
        self.apply_with(target, effect, base_ms, 1, Some(per_tick), now_ms);
    }

    fn apply_with(
        &mut self,
        target: Guid,
        effect: SpellId,
        base_ms: u64,
        stacks: u32,
        per_tick: Option<Periodic>,
        now_ms: u64,
    ) {
        let remaining = self
            .entries
            .get(&(target, effect))
            .map(|e| e.remaining(now_ms))
            .unwrap_or(0);
        let cap = (base_ms as f64 * 1.3) as u64;
        let duration = (base_ms + remaining).min(cap);
        self.entries.insert(
            (target, effect),
            Effect {
                applied_at: now_ms,
                expires_at: now_ms + duration,
                base_ms,
                stacks,
                per_tick,
            },
        );
    }

    pub fn is_active(&self, target: Guid, effect: SpellId, now_ms: u64) -> bool {
        self.remaining(target, effect, now_ms) > 0
    }

    pub fn remaining(&self, target: Guid, effect: SpellId, now_ms: u64) -> u64 {
        self.entries
            .get(&(target, effect))
            .map(|e| e.remaining(now_ms))
            .unwrap_or(0)
    }

    pub fn stacks(&self, target: Guid, effect: SpellId, now_ms: u64) -> u32 {
        self.entries
            .get(&(target, effect))
            .filter(|e| e.remaining(now_ms) > 0)
            .map(|e| e.stacks)
            .unwrap_or(0)
    }

    /// True when the effect is missing or inside the refresh window.
    /// Remaining exactly at the window does not need a refresh yet.
    pub fn needs_refresh(
        &self,
        target: Guid,
        effect: SpellId,
        window_ms: u64,
        now_ms: u64,
    ) -> bool {
        self.remaining(target, effect, now_ms) < window_ms
    }

    /// Push an active effect's expiry out (Void Bolt style extensions).
    pub fn extend(&mut self, target: Guid, effect: SpellId, add_ms: u64, now_ms: u64) {
        if let Some(entry) = self.entries.get_mut(&(target, effect)) {
            if entry.remaining(now_ms) > 0 {
                entry.expires_at += add_ms;
            }
        }
    }

    pub fn remove(&mut self, target: Guid, effect: SpellId) {
        self.entries.remove(&(target, effect));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop expired entries and entries whose target left the snapshot.
    pub fn sweep(&mut self, now_ms: u64, ctx: &TickContext) {
        self.entries.retain(|(target, _), effect| {
            if effect.remaining(now_ms) == 0 {
                return false;
            }
            ctx.unit(*target).map(|u| u.alive).unwrap_or(false)
        });
    }

    /// Pull the book toward what the host reports.
    ///
    /// Durations here are hints: hosts disagree with embedded base durations
    /// (and with each other), so when the host shows the same aura with a
    /// meaningfully different remaining time we adopt its clock. An entry
    /// the host no longer shows is dropped once its application grace has
    /// passed; inside the grace the cast may simply not have landed yet.
    pub fn reconcile(&mut self, ctx: &TickContext, me: Guid, now_ms: u64) {
        self.entries.retain(|(target, effect), entry| {
            let seen = ctx
                .auras_on(*target)
                .iter()
                .find(|a| a.effect == *effect && a.caster.map(|c| c == me).unwrap_or(true));
            match seen {
                Some(seen) => {
                    let internal = entry.remaining(now_ms);
                    let drift = internal.abs_diff(seen.remaining_ms);
                    if drift > RECONCILE_SLACK_MS {
                        entry.expires_at = now_ms + seen.remaining_ms;
                    }
                    if seen.stacks > 0 {
                        entry.stacks = seen.stacks;
                    }
                    true
                }
                None => now_ms < entry.applied_at + APPLY_GRACE_MS,
            }
        });
    }

    /// Expected periodic healing on a target within the next window.
    pub fn periodic_healing_within(&self, target: Guid, window_ms: u64, now_ms: u64) -> f32 {
        self.entries
            .iter()
            .filter(|((t, _), _)| *t == target)
            .filter_map(|(_, e)| {
                let tick = e.per_tick.filter(|p| p.healing && p.every_ms > 0)?;
                let span = e.remaining(now_ms).min(window_ms);
                Some(tick.amount * (span / tick.every_ms) as f32)
            })
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{AuraSeen, ControlEffect, GroupRole, PowerKind, UnitView, WeaponProfile};
    use glam::Vec3;
    use std::collections::{HashMap, HashSet};

    const TARGET: Guid = Guid(7);
    const ME: Guid = Guid(1);
    const DOT: SpellId = SpellId(589);

    fn ctx_with<'a>(
        units: &'a HashMap<Guid, UnitView>,
        auras: &'a HashMap<Guid, Vec<AuraSeen>>,
        now_ms: u64,
    ) -> TickContext<'a> {
        TickContext {
            now_ms,
            units,
            auras,
        }
    }

    fn alive_unit(guid: Guid) -> UnitView {
        UnitView {
            guid,
            name: "dummy".to_string(),
            team: 2,
            role: GroupRole::Damage,
            level: 80,
            health: 100.0,
            max_health: 100.0,
            power: 0.0,
            max_power: 0.0,
            power_kind: PowerKind::Mana,
            position: Vec3::ZERO,
            facing: 0.0,
            alive: true,
            in_combat: true,
            target: None,
            casting: None,
            attackers: Vec::new(),
            threat: Vec::new(),
            known_spells: HashSet::new(),
            weapons: WeaponProfile::default(),
            owner: None,
            recent_damage_per_sec: 0.0,
        }
    }

    #[test]
    fn test_apply_then_remaining_round_trips() {
        let mut book = EffectBook::new();
        book.apply(TARGET, DOT, 16_000, 1, 1000);
        assert_eq!(book.remaining(TARGET, DOT, 1000), 16_000);
        assert!(book.is_active(TARGET, DOT, 16_999));
        assert!(!book.is_active(TARGET, DOT, 17_000));
    }

    #[test]
    fn test_pandemic_refresh_banks_the_remainder() {
        let mut book = EffectBook::new();
        book.apply(TARGET, DOT, 16_000, 1, 0);
        // Refresh with 4000 left: inside 30% of base, so the remainder banks.
        book.apply(TARGET, DOT, 16_000, 1, 12_000);
        assert_eq!(book.remaining(TARGET, DOT, 12_000), 20_000);
    }

    #[test]
    fn test_pandemic_refresh_caps_at_130_percent() {
        let mut book = EffectBook::new();
        book.apply(TARGET, DOT, 16_000, 1, 0);
        // Refresh with 8000 left: base + remainder would be 24000, cap wins.
        book.apply(TARGET, DOT, 16_000, 1, 8_000);
        assert_eq!(book.remaining(TARGET, DOT, 8_000), 20_800);
    }

    #[test]
    fn test_needs_refresh_window_boundary() {
        let mut book = EffectBook::new();
        book.apply(TARGET, DOT, 16_000, 1, 0);
        let window = 4800;
        // Remaining exactly at the window: hold.
        assert!(!book.needs_refresh(TARGET, DOT, window, 16_000 - window));
        // One ms later: refresh.
        assert!(book.needs_refresh(TARGET, DOT, window, 16_000 - window + 1));
    }

    #[test]
    fn test_needs_refresh_true_when_missing() {
        let book = EffectBook::new();
        assert!(book.needs_refresh(TARGET, DOT, 4800, 0));
    }

    #[test]
    fn test_sweep_drops_expired_and_vanished_targets() {
        let mut book = EffectBook::new();
        let gone = Guid(99);
        book.apply(TARGET, DOT, 10_000, 1, 0);
        book.apply(gone, DOT, 10_000, 1, 0);

        let mut units = HashMap::new();
        units.insert(TARGET, alive_unit(TARGET));
        let auras = HashMap::new();
        let ctx = ctx_with(&units, &auras, 5000);

        book.sweep(5000, &ctx);
        assert!(book.is_active(TARGET, DOT, 5000));
        assert!(!book.is_active(gone, DOT, 5000), "vanished target dropped");

        book.sweep(10_000, &ctx);
        assert!(book.is_empty(), "expired entry dropped");
    }

    #[test]
    fn test_reconcile_adopts_host_clock() {
        let mut book = EffectBook::new();
        book.apply(TARGET, DOT, 16_000, 1, 0);

        let mut units = HashMap::new();
        units.insert(TARGET, alive_unit(TARGET));
        let mut auras = HashMap::new();
        auras.insert(
            TARGET,
            vec![AuraSeen {
                effect: DOT,
                remaining_ms: 21_000,
                stacks: 1,
                caster: Some(ME),
                control: ControlEffect::None,
                dispellable: None,
            }],
        );
        let ctx = ctx_with(&units, &auras, 1000);

        book.reconcile(&ctx, ME, 1000);
        assert_eq!(
            book.remaining(TARGET, DOT, 1000),
            21_000,
            "host duration wins when drift exceeds the slack"
        );
    }

    #[test]
    fn test_reconcile_drops_refused_casts_after_grace() {
        let mut book = EffectBook::new();
        book.apply(TARGET, DOT, 16_000, 1, 0);

        let mut units = HashMap::new();
        units.insert(TARGET, alive_unit(TARGET));
        let auras = HashMap::new();

        let ctx = ctx_with(&units, &auras, 500);
        book.reconcile(&ctx, ME, 500);
        assert!(
            book.is_active(TARGET, DOT, 500),
            "inside grace the entry is trusted"
        );

        let ctx = ctx_with(&units, &auras, APPLY_GRACE_MS + 1);
        book.reconcile(&ctx, ME, APPLY_GRACE_MS + 1);
        assert!(
            !book.is_active(TARGET, DOT, APPLY_GRACE_MS + 1),
            "host never showed the aura, entry dropped"
        );
    }

    #[test]
    fn test_periodic_healing_projection() {
        let mut book = EffectBook::new();
        book.apply_periodic(
            TARGET,
            SpellId(61295),
            15_000,
            Periodic {
                amount: 200.0,
                every_ms: 3000,
                healing: true,
            },
            0,
        );
        // Three seconds of a 3 s tick: one tick lands.
        assert_eq!(book.periodic_healing_within(TARGET, 3000, 0), 200.0);
        assert_eq!(book.periodic_healing_within(TARGET, 9000, 0), 600.0);
    }

    #[test]
    fn test_extend_pushes_expiry() {
        let mut book = EffectBook::new();
        book.apply(TARGET, DOT, 16_000, 1, 0);
        book.extend(TARGET, DOT, 3000, 1000);
        assert_eq!(book.remaining(TARGET, DOT, 1000), 18_000);
        // Extending an expired effect does nothing.
        book.extend(TARGET, DOT, 3000, 60_000);
        assert_eq!(book.remaining(TARGET, DOT, 60_000), 0);
    }
}
