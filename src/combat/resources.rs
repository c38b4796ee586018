//! Resource Tracking
//!
//! Per-spec resource state: a simple regenerating pool, a dual
//! builder/spender pair, or the death knight rune set. The trackers are
//! authoritative for rotation decisions; the primary pool is reconciled from
//! the host snapshot at the start of every tick, so optimistic spends drift
//! at most one tick from the host's accounting.

use crate::host::PowerKind;

/// Per-slot rune recharge time.
pub const RUNE_RECHARGE_MS: u64 = 10_000;

/// Drain rate for volatile pools (rage, runic power) out of combat.
pub const VOLATILE_DECAY_PER_SEC: f32 = 10.0;

/// What an ability costs when committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cost {
    Free,
    /// Primary pool amount (mana, rage, energy, focus, runic power).
    Power(f32),
    /// Secondary units (chi, holy power, soul shards, insanity).
    Secondary(u8),
    PowerAndSecondary { power: f32, secondary: u8 },
    /// Death knight rune cost by kind.
    Runes { blood: u8, frost: u8, unholy: u8 },
}

/// What an ability grants when committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gain {
    None,
    Power(f32),
    Secondary(u8),
}

/// Common interface over the three resource shapes.
///
/// `now_ms` flows through every call because rune availability is a function
/// of absolute time, not of accumulated deltas.
pub trait ResourceState {
    /// Advance regeneration; volatile pools decay out of combat.
    fn regenerate(&mut self, now_ms: u64, dt_ms: u64, in_combat: bool);
    /// Adopt the host-reported primary pool value.
    fn reconcile(&mut self, host_power: f32);
    /// Primary pool fill fraction in [0, 1].
    fn fraction(&self) -> f32;
    /// Secondary units currently banked (0 for simple pools).
    fn secondary(&self) -> u8;
    fn can_pay(&self, cost: &Cost, now_ms: u64) -> bool;
    /// Pay a cost in full. Returns false (and changes nothing) when short.
    fn pay(&mut self, cost: &Cost, now_ms: u64) -> bool;
    fn apply_gain(&mut self, gain: &Gain);
    /// Combat-end housekeeping. Banked builder units do not persist between
    /// fights; volatile pools just decay on their own.
    fn on_combat_end(&mut self) {}
}

// ============================================================================
// Simple pool
// ============================================================================

/// One regenerating pool with clamped bounds.
#[derive(Debug, Clone)]
pub struct PowerPool {
    pub kind: PowerKind,
    pub current: f32,
    pub max: f32,
    pub regen_per_sec: f32,
}

impl PowerPool {
    pub fn new(kind: PowerKind, max: f32, regen_per_sec: f32) -> Self {
        let current = if kind.is_volatile() { 0.0 } else { max };
        Self {
            kind,
            current,
            max,
            regen_per_sec,
        }
    }

    pub fn has_enough(&self, amount: f32) -> bool {
        self.current >= amount
    }

    /// Spend `amount` in full; never partial.
    pub fn consume(&mut self, amount: f32) -> bool {
        if !self.has_enough(amount) {
            return false;
        }
        self.current -= amount;
        true
    }

    pub fn generate(&mut self, amount: f32) {
        self.current = (self.current + amount).clamp(0.0, self.max);
    }

    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    fn tick(&mut self, dt_ms: u64, in_combat: bool) {
        let dt = dt_ms as f32 / 1000.0;
        if !in_combat && self.kind.is_volatile() {
            self.current = (self.current - VOLATILE_DECAY_PER_SEC * dt).max(0.0);
        } else {
            self.generate(self.regen_per_sec * dt);
        }
    }

    fn adopt(&mut self, host_power: f32) {
        self.current = host_power.clamp(0.0, self.max);
    }
}

impl ResourceState for PowerPool {
    fn regenerate(&mut self, _now_ms: u64, dt_ms: u64, in_combat: bool) {
        self.tick(dt_ms, in_combat);
    }

    fn reconcile(&mut self, host_power: f32) {
        self.adopt(host_power);
    }

    fn fraction(&self) -> f32 {
        PowerPool::fraction(self)
    }

    fn secondary(&self) -> u8 {
        0
    }

    fn can_pay(&self, cost: &Cost, _now_ms: u64) -> bool {
        match cost {
            Cost::Free => true,
            Cost::Power(amount) => self.has_enough(*amount),
            _ => false,
        }
    }

    fn pay(&mut self, cost: &Cost, _now_ms: u64) -> bool {
        match cost {
            Cost::Free => true,
            Cost::Power(amount) => self.consume(*amount),
            _ => false,
        }
    }

    fn apply_gain(&mut self, gain: &Gain) {
        if let Gain::Power(amount) = gain {
            self.generate(*amount);
        }
    }
}

// ============================================================================
// Dual pool
// ============================================================================

/// A primary pool plus a discrete builder/spender bank (chi, holy power,
/// soul shards, insanity). The bank never regenerates on its own; builders
/// grant units through [`Gain::Secondary`].
#[derive(Debug, Clone)]
pub struct DualPool {
    pub primary: PowerPool,
    secondary: u8,
    pub secondary_cap: u8,
}

impl DualPool {
    pub fn new(primary: PowerPool, secondary_cap: u8) -> Self {
        Self {
            primary,
            secondary: 0,
            secondary_cap,
        }
    }

    pub fn has_secondary(&self, units: u8) -> bool {
        self.secondary >= units
    }

    pub fn consume_secondary(&mut self, units: u8) -> bool {
        if !self.has_secondary(units) {
            return false;
        }
        self.secondary -= units;
        true
    }

    pub fn generate_secondary(&mut self, units: u8) {
        self.secondary = (self.secondary + units).min(self.secondary_cap);
    }

    pub fn secondary_at_cap(&self) -> bool {
        self.secondary >= self.secondary_cap
    }

    /// Drop the entire bank (voidform entry consumes all insanity).
    pub fn drain_secondary(&mut self) -> u8 {
        std::mem::take(&mut self.secondary)
    }

    #[cfg(test)]
    pub fn set_secondary(&mut self, units: u8) {
        self.secondary = units.min(self.secondary_cap);
    }
}

impl ResourceState for DualPool {
    fn regenerate(&mut self, _now_ms: u64, dt_ms: u64, in_combat: bool) {
        self.primary.tick(dt_ms, in_combat);
    }

    fn reconcile(&mut self, host_power: f32) {
        self.primary.adopt(host_power);
    }

    fn fraction(&self) -> f32 {
        self.primary.fraction()
    }

    fn secondary(&self) -> u8 {
        self.secondary
    }

    fn can_pay(&self, cost: &Cost, _now_ms: u64) -> bool {
        match cost {
            Cost::Free => true,
            Cost::Power(amount) => self.primary.has_enough(*amount),
            Cost::Secondary(units) => self.has_secondary(*units),
            Cost::PowerAndSecondary { power, secondary } => {
                self.primary.has_enough(*power) && self.has_secondary(*secondary)
            }
            Cost::Runes { .. } => false,
        }
    }

    fn pay(&mut self, cost: &Cost, now_ms: u64) -> bool {
        if !self.can_pay(cost, now_ms) {
            return false;
        }
        match cost {
            Cost::Free => {}
            Cost::Power(amount) => {
                self.primary.current -= amount;
            }
            Cost::Secondary(units) => {
                self.secondary -= units;
            }
            Cost::PowerAndSecondary { power, secondary } => {
                self.primary.current -= power;
                self.secondary -= secondary;
            }
            Cost::Runes { .. } => return false,
        }
        true
    }

    fn apply_gain(&mut self, gain: &Gain) {
        match gain {
            Gain::None => {}
            Gain::Power(amount) => self.primary.generate(*amount),
            Gain::Secondary(units) => self.generate_secondary(*units),
        }
    }

    fn on_combat_end(&mut self) {
        self.secondary = 0;
    }
}

// ============================================================================
// Rune set
// ============================================================================

/// Base rune kinds; Death is the wildcard a slot converts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuneKind {
    Blood,
    Frost,
    Unholy,
    Death,
}

#[derive(Debug, Clone, Copy)]
struct RuneSlot {
    base: RuneKind,
    ready_at: u64,
    is_death: bool,
    /// Set when Death Rune Mastery should flip the slot on recharge.
    convert_pending: bool,
}

impl RuneSlot {
    fn ready(&self, now_ms: u64) -> bool {
        now_ms >= self.ready_at
    }
}

/// The death knight resource: six typed rune slots with individual 10 s
/// recharges, paired with a runic power pool fed by rune spenders.
///
/// Consume order per requested kind is Death runes first, then runes of the
/// requested kind. With the Death Rune Mastery talent, a consumed non-death
/// rune returns as a Death rune.
#[derive(Debug, Clone)]
pub struct RuneSet {
    slots: [RuneSlot; 6],
    pub runic_power: PowerPool,
    pub rune_mastery: bool,
}

impl RuneSet {
    pub fn new(max_runic_power: f32, rune_mastery: bool) -> Self {
        let slot = |base| RuneSlot {
            base,
            ready_at: 0,
            is_death: false,
            convert_pending: false,
        };
        Self {
            slots: [
                slot(RuneKind::Blood),
                slot(RuneKind::Blood),
                slot(RuneKind::Frost),
                slot(RuneKind::Frost),
                slot(RuneKind::Unholy),
                slot(RuneKind::Unholy),
            ],
            runic_power: PowerPool::new(PowerKind::RunicPower, max_runic_power, 0.0),
            rune_mastery,
        }
    }

    /// Count ready runes of a kind. Death runes count only under `Death`.
    pub fn available_of(&self, kind: RuneKind, now_ms: u64) -> usize {
        self.slots
            .iter()
            .filter(|s| {
                s.ready(now_ms)
                    && if kind == RuneKind::Death {
                        s.is_death
                    } else {
                        !s.is_death && s.base == kind
                    }
            })
            .count()
    }

    pub fn total_ready(&self, now_ms: u64) -> usize {
        self.slots.iter().filter(|s| s.ready(now_ms)).count()
    }

    /// All slots ready immediately (Empower Rune Weapon).
    pub fn refresh_all(&mut self, now_ms: u64) {
        for slot in &mut self.slots {
            if slot.convert_pending {
                slot.is_death = true;
                slot.convert_pending = false;
            }
            slot.ready_at = now_ms;
        }
    }

    fn requirement(cost: &Cost) -> Option<[(RuneKind, u8); 3]> {
        match cost {
            Cost::Runes {
                blood,
                frost,
                unholy,
            } => Some([
                (RuneKind::Blood, *blood),
                (RuneKind::Frost, *frost),
                (RuneKind::Unholy, *unholy),
            ]),
            _ => None,
        }
    }

    fn can_cover(&self, requirement: &[(RuneKind, u8); 3], now_ms: u64) -> bool {
        let mut death = self.available_of(RuneKind::Death, now_ms);
        for (kind, need) in requirement {
            let mut need = *need as usize;
            let from_death = need.min(death);
            death -= from_death;
            need -= from_death;
            if need > self.available_of(*kind, now_ms) {
                return false;
            }
        }
        true
    }

    fn spend_runes(&mut self, requirement: &[(RuneKind, u8); 3], now_ms: u64) {
        for (kind, need) in requirement {
            let mut need = *need;
            // Death runes first, then the requested kind, in slot order.
            for pass_death in [true, false] {
                for slot in &mut self.slots {
                    if need == 0 {
                        break;
                    }
                    if !slot.ready(now_ms) {
                        continue;
                    }
                    let usable = if pass_death {
                        slot.is_death
                    } else {
                        !slot.is_death && slot.base == *kind
                    };
                    if usable {
                        slot.ready_at = now_ms + RUNE_RECHARGE_MS;
                        if self.rune_mastery && !slot.is_death {
                            slot.convert_pending = true;
                        }
                        need -= 1;
                    }
                }
            }
        }
    }
}

impl ResourceState for RuneSet {
    fn regenerate(&mut self, now_ms: u64, dt_ms: u64, in_combat: bool) {
        for slot in &mut self.slots {
            if slot.convert_pending && slot.ready(now_ms) {
                slot.is_death = true;
                slot.convert_pending = false;
            }
        }
        self.runic_power.tick(dt_ms, in_combat);
    }

    fn reconcile(&mut self, host_power: f32) {
        self.runic_power.adopt(host_power);
    }

    fn fraction(&self) -> f32 {
        self.runic_power.fraction()
    }

    fn secondary(&self) -> u8 {
        0
    }

    fn can_pay(&self, cost: &Cost, now_ms: u64) -> bool {
        match cost {
            Cost::Free => true,
            Cost::Power(amount) => self.runic_power.has_enough(*amount),
            Cost::Runes { .. } => {
                let requirement = Self::requirement(cost).unwrap_or([
                    (RuneKind::Blood, 0),
                    (RuneKind::Frost, 0),
                    (RuneKind::Unholy, 0),
                ]);
                self.can_cover(&requirement, now_ms)
            }
            _ => false,
        }
    }

    fn pay(&mut self, cost: &Cost, now_ms: u64) -> bool {
        if !self.can_pay(cost, now_ms) {
            return false;
        }
        match cost {
            Cost::Free => {}
            Cost::Power(amount) => {
                self.runic_power.current -= amount;
            }
            Cost::Runes { .. } => {
                if let Some(requirement) = Self::requirement(cost) {
                    self.spend_runes(&requirement, now_ms);
                }
            }
            _ => return false,
        }
        true
    }

    fn apply_gain(&mut self, gain: &Gain) {
        if let Gain::Power(amount) = gain {
            self.runic_power.generate(*amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Simple pool
    // ========================================================================

    #[test]
    fn test_consume_at_exact_cost_leaves_zero() {
        let mut pool = PowerPool::new(PowerKind::Mana, 100.0, 0.0);
        pool.current = 30.0;
        assert!(pool.has_enough(30.0), "exact cost must be affordable");
        assert!(pool.consume(30.0));
        assert_eq!(pool.current, 0.0);
    }

    #[test]
    fn test_consume_never_partial() {
        let mut pool = PowerPool::new(PowerKind::Mana, 100.0, 0.0);
        pool.current = 20.0;
        assert!(!pool.consume(25.0), "insufficient consume must fail");
        assert_eq!(pool.current, 20.0, "failed consume must not touch the pool");
    }

    #[test]
    fn test_regen_clamps_to_max() {
        let mut pool = PowerPool::new(PowerKind::Energy, 100.0, 10.0);
        pool.current = 95.0;
        pool.regenerate(0, 2000, true);
        assert_eq!(pool.current, 100.0);
    }

    #[test]
    fn test_volatile_pool_decays_out_of_combat() {
        let mut pool = PowerPool::new(PowerKind::Rage, 100.0, 0.0);
        pool.current = 50.0;
        pool.regenerate(0, 1000, false);
        assert_eq!(pool.current, 50.0 - VOLATILE_DECAY_PER_SEC);
        pool.regenerate(0, 60_000, false);
        assert_eq!(pool.current, 0.0, "decay must stop at zero");
    }

    #[test]
    fn test_mana_does_not_decay_out_of_combat() {
        let mut pool = PowerPool::new(PowerKind::Mana, 100.0, 5.0);
        pool.current = 50.0;
        pool.regenerate(0, 1000, false);
        assert_eq!(pool.current, 55.0);
    }

    // ========================================================================
    // Dual pool
    // ========================================================================

    fn chi_pool() -> DualPool {
        DualPool::new(PowerPool::new(PowerKind::Energy, 100.0, 10.0), 5)
    }

    #[test]
    fn test_secondary_caps_at_limit() {
        let mut pool = chi_pool();
        pool.generate_secondary(3);
        pool.generate_secondary(4);
        assert_eq!(pool.secondary(), 5);
        assert!(pool.secondary_at_cap());
    }

    #[test]
    fn test_combined_cost_is_all_or_nothing() {
        let mut pool = chi_pool();
        pool.generate_secondary(1);
        let cost = Cost::PowerAndSecondary {
            power: 40.0,
            secondary: 2,
        };
        assert!(!pool.pay(&cost, 0), "missing chi must fail the whole cost");
        assert_eq!(pool.primary.current, 100.0, "energy must be untouched");
    }

    #[test]
    fn test_drain_secondary_empties_bank() {
        let mut pool = DualPool::new(PowerPool::new(PowerKind::Mana, 100.0, 1.0), 100);
        pool.generate_secondary(70);
        assert_eq!(pool.drain_secondary(), 70);
        assert_eq!(pool.secondary(), 0);
    }

    // ========================================================================
    // Rune set
    // ========================================================================

    #[test]
    fn test_fresh_rune_set_has_all_runes() {
        let runes = RuneSet::new(100.0, false);
        assert_eq!(runes.available_of(RuneKind::Blood, 0), 2);
        assert_eq!(runes.available_of(RuneKind::Frost, 0), 2);
        assert_eq!(runes.available_of(RuneKind::Unholy, 0), 2);
        assert_eq!(runes.available_of(RuneKind::Death, 0), 0);
        assert_eq!(runes.total_ready(0), 6);
    }

    #[test]
    fn test_rune_spend_starts_individual_recharge() {
        let mut runes = RuneSet::new(100.0, false);
        let cost = Cost::Runes {
            blood: 0,
            frost: 1,
            unholy: 1,
        };
        assert!(runes.pay(&cost, 1000));
        assert_eq!(runes.available_of(RuneKind::Frost, 1000), 1);
        assert_eq!(runes.available_of(RuneKind::Unholy, 1000), 1);

        // Just before the recharge boundary nothing comes back.
        assert_eq!(runes.total_ready(1000 + RUNE_RECHARGE_MS - 1), 4);
        assert_eq!(runes.total_ready(1000 + RUNE_RECHARGE_MS), 6);
    }

    #[test]
    fn test_insufficient_runes_fail_without_spending() {
        let mut runes = RuneSet::new(100.0, false);
        let both_blood = Cost::Runes {
            blood: 2,
            frost: 0,
            unholy: 0,
        };
        assert!(runes.pay(&both_blood, 0));
        assert!(
            !runes.pay(&Cost::Runes { blood: 1, frost: 0, unholy: 0 }, 1),
            "no blood runes left"
        );
        assert_eq!(
            runes.available_of(RuneKind::Frost, 1),
            2,
            "failed pay must not consume other kinds"
        );
    }

    #[test]
    fn test_death_runes_are_consumed_first() {
        let mut runes = RuneSet::new(100.0, true);
        // Spend one blood rune with mastery on; it returns as a death rune.
        assert!(runes.pay(&Cost::Runes { blood: 1, frost: 0, unholy: 0 }, 0));
        let later = RUNE_RECHARGE_MS + 1;
        runes.regenerate(later, 0, true);
        assert_eq!(runes.available_of(RuneKind::Death, later), 1);
        assert_eq!(runes.available_of(RuneKind::Blood, later), 1);

        // A blood cost should now prefer the death rune.
        assert!(runes.pay(&Cost::Runes { blood: 1, frost: 0, unholy: 0 }, later));
        assert_eq!(
            runes.available_of(RuneKind::Death, later),
            0,
            "death rune spent first"
        );
        assert_eq!(
            runes.available_of(RuneKind::Blood, later),
            1,
            "typed rune held back while a death rune was up"
        );
    }

    #[test]
    fn test_mastery_conversion_only_after_recharge() {
        let mut runes = RuneSet::new(100.0, true);
        assert!(runes.pay(&Cost::Runes { blood: 0, frost: 1, unholy: 0 }, 0));
        runes.regenerate(5000, 0, true);
        assert_eq!(
            runes.available_of(RuneKind::Death, 5000),
            0,
            "conversion happens on recharge, not on spend"
        );
        runes.regenerate(RUNE_RECHARGE_MS, 0, true);
        assert_eq!(runes.available_of(RuneKind::Death, RUNE_RECHARGE_MS), 1);
    }

    #[test]
    fn test_refresh_all_readies_every_slot() {
        let mut runes = RuneSet::new(100.0, false);
        assert!(runes.pay(
            &Cost::Runes {
                blood: 2,
                frost: 2,
                unholy: 2
            },
            0
        ));
        assert_eq!(runes.total_ready(1), 0);
        runes.refresh_all(1);
        assert_eq!(runes.total_ready(1), 6);
    }

    #[test]
    fn test_runic_power_gain_and_dump() {
        let mut runes = RuneSet::new(100.0, false);
        runes.apply_gain(&Gain::Power(40.0));
        assert!(runes.can_pay(&Cost::Power(40.0), 0));
        assert!(runes.pay(&Cost::Power(40.0), 0));
        assert_eq!(runes.runic_power.current, 0.0);
    }
}
