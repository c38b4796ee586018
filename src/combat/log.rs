//! Decision logging
//!
//! Records what each bot decided and what came of it, for post-run analysis
//! and for the driver's exported reports.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::host::{Guid, SpellId};

/// A single entry in the decision log
#[derive(Debug, Clone, Serialize)]
pub struct DecisionEntry {
    /// Timestamp in run time (milliseconds since run start)
    pub timestamp_ms: u64,
    /// The type of event
    pub kind: DecisionKind,
    /// Unit the entry is about, when there is one
    pub source: Option<Guid>,
    /// Ability involved, when there is one
    pub ability: Option<SpellId>,
    /// Damage or healing amount, when there is one
    pub amount: Option<f32>,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of decision log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecisionKind {
    /// Specialization detected for a bot
    SpecDetected,
    /// Rotation phase changed
    PhaseChange,
    /// Cast requested from the host
    CastRequest,
    /// Positional move requested
    MoveRequest,
    /// Pet command issued
    PetCommand,
    /// Buff/debuff applied
    AuraApplied,
    /// Buff/debuff removed
    AuraRemoved,
    /// Damage dealt
    Damage,
    /// Healing done
    Healing,
    /// Unit died
    Death,
    /// Encounter event (start, end, scripted spawns)
    Encounter,
}

/// The decision log storing all events in chronological order
#[derive(Debug, Default, Serialize)]
pub struct DecisionLog {
    pub entries: Vec<DecisionEntry>,
    /// Current run time, stamped onto new entries
    pub run_time_ms: u64,
}

impl DecisionLog {
    /// Clear the log for a new run
    pub fn clear(&mut self) {
        self.entries.clear();
        self.run_time_ms = 0;
    }

    /// Add an entry with no unit attached
    pub fn log(&mut self, kind: DecisionKind, message: impl Into<String>) {
        self.push(kind, None, None, None, message.into());
    }

    /// Add an entry about a specific unit
    pub fn log_unit(&mut self, source: Guid, kind: DecisionKind, message: impl Into<String>) {
        self.push(kind, Some(source), None, None, message.into());
    }

    /// Add a damage entry with its ability and amount
    pub fn log_damage(
        &mut self,
        source: Guid,
        ability: SpellId,
        amount: f32,
        message: impl Into<String>,
    ) {
        self.push(
            DecisionKind::Damage,
            Some(source),
            Some(ability),
            Some(amount),
            message.into(),
        );
    }

    /// Add a cast request with its ability
    pub fn log_cast(&mut self, source: Guid, ability: SpellId, message: impl Into<String>) {
        self.push(
            DecisionKind::CastRequest,
            Some(source),
            Some(ability),
            None,
            message.into(),
        );
    }

    /// Add a healing entry with its ability and amount
    pub fn log_heal(
        &mut self,
        source: Guid,
        ability: SpellId,
        amount: f32,
        message: impl Into<String>,
    ) {
        self.push(
            DecisionKind::Healing,
            Some(source),
            Some(ability),
            Some(amount),
            message.into(),
        );
    }

    fn push(
        &mut self,
        kind: DecisionKind,
        source: Option<Guid>,
        ability: Option<SpellId>,
        amount: Option<f32>,
        message: String,
    ) {
        self.entries.push(DecisionEntry {
            timestamp_ms: self.run_time_ms,
            kind,
            source,
            ability,
            amount,
            message,
        });
    }

    /// Get entries filtered by event type
    pub fn filter_by_kind(&self, kind: DecisionKind) -> Vec<&DecisionEntry> {
        self.entries.iter().filter(|e| e.kind == kind).collect()
    }

    /// Get only HP-changing events (damage and healing)
    pub fn hp_changes_only(&self) -> Vec<&DecisionEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.kind, DecisionKind::Damage | DecisionKind::Healing))
            .collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&DecisionEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Total damage per ability across the whole run
    pub fn damage_by_ability(&self) -> HashMap<SpellId, f32> {
        let mut totals = HashMap::new();
        for entry in &self.entries {
            if entry.kind != DecisionKind::Damage {
                continue;
            }
            if let (Some(ability), Some(amount)) = (entry.ability, entry.amount) {
                *totals.entry(ability).or_insert(0.0) += amount;
            }
        }
        totals
    }

    /// Write the full log as pretty JSON
    pub fn save_to_file(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_stamped_with_run_time() {
        let mut log = DecisionLog::default();
        log.run_time_ms = 1500;
        log.log(DecisionKind::Encounter, "combat start");
        log.run_time_ms = 1700;
        log.log_unit(Guid(1), DecisionKind::CastRequest, "Mind Blast -> enemy");

        assert_eq!(log.entries[0].timestamp_ms, 1500);
        assert_eq!(log.entries[1].timestamp_ms, 1700);
        assert_eq!(log.entries[1].source, Some(Guid(1)));
    }

    #[test]
    fn test_filter_by_kind() {
        let mut log = DecisionLog::default();
        log.log(DecisionKind::Encounter, "start");
        log.log_damage(Guid(1), SpellId(8092), 120.0, "Mind Blast hits");
        log.log(DecisionKind::Encounter, "end");

        assert_eq!(log.filter_by_kind(DecisionKind::Encounter).len(), 2);
        assert_eq!(log.filter_by_kind(DecisionKind::Damage).len(), 1);
        assert_eq!(log.hp_changes_only().len(), 1);
    }

    #[test]
    fn test_recent_preserves_order() {
        let mut log = DecisionLog::default();
        for i in 0..5 {
            log.log(DecisionKind::PhaseChange, format!("phase {}", i));
        }
        let recent = log.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "phase 3");
        assert_eq!(recent[1].message, "phase 4");
    }

    #[test]
    fn test_damage_by_ability_accumulates() {
        let mut log = DecisionLog::default();
        let blast = SpellId(8092);
        let pain = SpellId(589);
        log.log_damage(Guid(1), blast, 100.0, "hit");
        log.log_damage(Guid(1), blast, 150.0, "hit");
        log.log_damage(Guid(1), pain, 40.0, "tick");
        log.log_heal(Guid(2), SpellId(61295), 300.0, "hot tick");

        let totals = log.damage_by_ability();
        assert_eq!(totals.get(&blast), Some(&250.0));
        assert_eq!(totals.get(&pain), Some(&40.0));
        assert_eq!(totals.len(), 2, "healing entries do not count as damage");
    }

    #[test]
    fn test_save_to_file_writes_json() {
        let mut log = DecisionLog::default();
        log.log(DecisionKind::Encounter, "start");
        let path = std::env::temp_dir().join("classai_decision_log_test.json");
        log.save_to_file(&path).expect("save should succeed");
        let contents = std::fs::read_to_string(&path).expect("file should exist");
        assert!(contents.contains("\"Encounter\""));
        let _ = std::fs::remove_file(&path);
    }
}
