//! Cooldown Tracking
//!
//! Per-ability time-to-ready plus the shared global cooldown gate. Deadlines
//! are absolute milliseconds on the host's AI clock, so advancing a cooldown
//! is a matter of reading the clock rather than draining timers.

use std::collections::HashMap;

use crate::host::SpellId;

/// Base global cooldown. The host applies haste on the real cast; the core
/// plans around the unhasted floor.
pub const GCD_MS: u64 = 1500;

#[derive(Debug, Clone)]
struct CooldownEntry {
    cooldown_ms: u64,
    max_charges: u8,
    charges: u8,
    /// When the next charge returns; meaningful while charges < max.
    next_charge_at: u64,
}

impl CooldownEntry {
    fn charges_at(&self, now_ms: u64) -> u8 {
        if self.charges >= self.max_charges || self.cooldown_ms == 0 {
            return self.max_charges;
        }
        if now_ms < self.next_charge_at {
            return self.charges;
        }
        let refilled = 1 + (now_ms - self.next_charge_at) / self.cooldown_ms;
        let refilled = refilled.min(u64::from(self.max_charges - self.charges)) as u8;
        self.charges + refilled
    }
}

/// Cooldown state for one bot.
///
/// Abilities the book has never been told about are always ready; a bot only
/// pays attention to cooldowns it has started.
#[derive(Debug, Clone, Default)]
pub struct CooldownBook {
    entries: HashMap<SpellId, CooldownEntry>,
    gcd_ready_at: u64,
}

impl CooldownBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register an ability so charge counts are queryable before first use.
    pub fn register(&mut self, id: SpellId, cooldown_ms: u64, max_charges: u8) {
        self.entries.entry(id).or_insert(CooldownEntry {
            cooldown_ms,
            max_charges: max_charges.max(1),
            charges: max_charges.max(1),
            next_charge_at: 0,
        });
    }

    /// Refill charges that have finished recharging. Run once per tick before
    /// readiness queries.
    pub fn advance(&mut self, now_ms: u64) {
        for entry in self.entries.values_mut() {
            while entry.charges < entry.max_charges
                && entry.cooldown_ms > 0
                && now_ms >= entry.next_charge_at
            {
                entry.charges += 1;
                entry.next_charge_at += entry.cooldown_ms;
            }
        }
    }

    /// True when at least one charge is available at `now_ms`.
    pub fn is_ready(&self, id: SpellId, now_ms: u64) -> bool {
        match self.entries.get(&id) {
            Some(entry) => entry.charges_at(now_ms) > 0,
            None => true,
        }
    }

    /// Milliseconds until the next charge; 0 when ready.
    pub fn time_remaining(&self, id: SpellId, now_ms: u64) -> u64 {
        match self.entries.get(&id) {
            Some(entry) if entry.charges_at(now_ms) == 0 => {
                entry.next_charge_at.saturating_sub(now_ms)
            }
            _ => 0,
        }
    }

    /// Spend a charge. Registers the ability on first use.
    pub fn trigger(&mut self, id: SpellId, cooldown_ms: u64, max_charges: u8, now_ms: u64) {
        if cooldown_ms == 0 {
            return;
        }
        let entry = self.entries.entry(id).or_insert(CooldownEntry {
            cooldown_ms,
            max_charges: max_charges.max(1),
            charges: max_charges.max(1),
            next_charge_at: 0,
        });
        entry.charges = entry.charges_at(now_ms);
        if entry.charges == 0 {
            return;
        }
        if entry.charges == entry.max_charges {
            // First charge spent from full starts the recharge clock.
            entry.next_charge_at = now_ms + entry.cooldown_ms;
        }
        entry.charges -= 1;
    }

    /// Wipe one cooldown back to full charges.
    pub fn reset(&mut self, id: SpellId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.charges = entry.max_charges;
        }
    }

    /// Wipe every cooldown (cooldown-reset abilities).
    pub fn reset_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.charges = entry.max_charges;
        }
    }

    pub fn gcd_ready(&self, now_ms: u64) -> bool {
        now_ms >= self.gcd_ready_at
    }

    pub fn gcd_remaining(&self, now_ms: u64) -> u64 {
        self.gcd_ready_at.saturating_sub(now_ms)
    }

    /// Start the shared global cooldown after a non-exempt cast.
    pub fn arm_gcd(&mut self, now_ms: u64) {
        self.gcd_ready_at = now_ms + GCD_MS;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AB: SpellId = SpellId(1001);

    #[test]
    fn test_unknown_ability_is_ready() {
        let book = CooldownBook::new();
        assert!(book.is_ready(AB, 0));
        assert_eq!(book.time_remaining(AB, 0), 0);
    }

    #[test]
    fn test_trigger_blocks_for_full_cooldown() {
        let mut book = CooldownBook::new();
        book.trigger(AB, 8000, 1, 1000);
        assert!(!book.is_ready(AB, 1000));
        assert!(!book.is_ready(AB, 8999));
        assert!(book.is_ready(AB, 9000), "ready exactly at the deadline");
        assert_eq!(book.time_remaining(AB, 5000), 4000);
    }

    #[test]
    fn test_zero_cooldown_never_blocks() {
        let mut book = CooldownBook::new();
        book.trigger(AB, 0, 1, 0);
        assert!(book.is_ready(AB, 0));
    }

    #[test]
    fn test_charges_spend_and_refill_one_at_a_time() {
        let mut book = CooldownBook::new();
        book.register(AB, 6000, 2);
        book.trigger(AB, 6000, 2, 0);
        assert!(book.is_ready(AB, 0), "second charge still banked");
        book.trigger(AB, 6000, 2, 1000);
        assert!(!book.is_ready(AB, 1000));

        // First charge comes back at 6000 (recharge started at first spend).
        book.advance(6000);
        assert!(book.is_ready(AB, 6000));
        book.trigger(AB, 6000, 2, 6000);
        assert!(!book.is_ready(AB, 6000));
        assert!(book.is_ready(AB, 12_000));
    }

    #[test]
    fn test_reset_and_reset_all_restore_charges() {
        let mut book = CooldownBook::new();
        book.trigger(AB, 120_000, 1, 0);
        let other = SpellId(1002);
        book.trigger(other, 60_000, 1, 0);
        assert!(!book.is_ready(AB, 1));

        book.reset(AB);
        assert!(book.is_ready(AB, 1));
        assert!(!book.is_ready(other, 1));

        book.reset_all();
        assert!(book.is_ready(other, 1));
    }

    #[test]
    fn test_gcd_gate() {
        let mut book = CooldownBook::new();
        assert!(book.gcd_ready(0));
        book.arm_gcd(1000);
        assert!(!book.gcd_ready(1000 + GCD_MS - 1));
        assert!(book.gcd_ready(1000 + GCD_MS));
        assert_eq!(book.gcd_remaining(1500), 1000);
    }
}
