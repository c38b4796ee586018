//! Host Boundary Types
//!
//! The AI core is a library embedded into a game host. Once per AI tick the
//! host assembles a read-only [`TickContext`] snapshot of the world, hands it
//! to a bot's `ClassAi`, and receives back at most one [`Decision`].
//!
//! ## Architecture
//!
//! The decision flow works in two phases:
//! 1. **Context building**: the host collects unit views and aura observations
//!    into a `TickContext` keyed by [`Guid`].
//! 2. **Decision making**: the core reads the snapshot, never the live world,
//!    and returns a `Decision` the host is free to apply or refuse.
//!
//! No handle in the snapshot outlives the tick. The core keeps its own
//! trackers between ticks but re-resolves every unit by guid each call.

pub mod sim;

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Stable unit identifier assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Guid(pub u64);

/// Ability identifier from the host's spell database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpellId(pub u32);

/// Primary power kind a unit runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerKind {
    Mana,
    Rage,
    Energy,
    Focus,
    RunicPower,
}

impl PowerKind {
    /// Volatile pools drain back to zero outside of combat.
    pub fn is_volatile(&self) -> bool {
        matches!(self, PowerKind::Rage | PowerKind::RunicPower)
    }
}

/// Group role assigned by the host's group manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GroupRole {
    MainTank,
    Tank,
    Healer,
    #[default]
    Damage,
}

impl GroupRole {
    pub fn is_tank(&self) -> bool {
        matches!(self, GroupRole::MainTank | GroupRole::Tank)
    }

    /// Healing-priority weight: tanks 2.0, healers 1.5, damage 1.0.
    pub fn heal_weight(&self) -> f32 {
        match self {
            GroupRole::MainTank | GroupRole::Tank => 2.0,
            GroupRole::Healer => 1.5,
            GroupRole::Damage => 1.0,
        }
    }
}

/// Weapon loadout summary, derived by the host from equipped items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeaponProfile {
    #[default]
    TwoHander,
    DualWield,
    WeaponAndShield,
    Caster,
}

/// Loss-of-control category carried on an observed aura.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlEffect {
    #[default]
    None,
    Stun,
    Fear,
    Incapacitate,
    Silence,
    Root,
}

/// Dispel school of a removable debuff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispelSchool {
    Magic,
    Curse,
    Disease,
    Poison,
}

/// One aura as the host reports it on a unit this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuraSeen {
    pub effect: SpellId,
    pub remaining_ms: u64,
    pub stacks: u32,
    /// Unit that applied the aura, when the host knows it.
    pub caster: Option<Guid>,
    pub control: ControlEffect,
    pub dispellable: Option<DispelSchool>,
}

/// An in-flight cast the host reports on a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastSeen {
    pub spell: SpellId,
    pub target: Option<Guid>,
    pub remaining_ms: u64,
    pub interruptible: bool,
    pub is_heal: bool,
}

/// Per-tick snapshot of a single unit, built by the host.
#[derive(Debug, Clone)]
pub struct UnitView {
    pub guid: Guid,
    pub name: String,
    pub team: u8,
    pub role: GroupRole,
    pub level: u32,
    pub health: f32,
    pub max_health: f32,
    pub power: f32,
    pub max_power: f32,
    pub power_kind: PowerKind,
    /// Per-tick snapshot of the unit's world position.
    pub position: Vec3,
    /// Facing in radians around the vertical axis.
    pub facing: f32,
    pub alive: bool,
    pub in_combat: bool,
    pub target: Option<Guid>,
    pub casting: Option<CastSeen>,
    /// Hostile units currently attacking this unit.
    pub attackers: Vec<Guid>,
    /// Threat table for hostile units: (group member, threat). Empty otherwise.
    pub threat: Vec<(Guid, f32)>,
    /// Spellbook; the host fills this for the bot's own view.
    pub known_spells: HashSet<SpellId>,
    pub weapons: WeaponProfile,
    /// Owning unit for pets and guardians.
    pub owner: Option<Guid>,
    /// Host-estimated damage intake over the recent window, per second.
    pub recent_damage_per_sec: f32,
}

impl UnitView {
    /// Health as a percentage (0.0 to 100.0).
    pub fn health_pct(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health * 100.0
        } else {
            0.0
        }
    }

    /// Health as a fraction (0.0 to 1.0).
    pub fn health_frac(&self) -> f32 {
        self.health_pct() / 100.0
    }

    /// Missing health as a percentage (0.0 to 100.0).
    pub fn health_deficit(&self) -> f32 {
        100.0 - self.health_pct()
    }

    /// Distance to another position.
    pub fn distance_to(&self, other_pos: Vec3) -> f32 {
        self.position.distance(other_pos)
    }

    pub fn knows(&self, spell: SpellId) -> bool {
        self.known_spells.contains(&spell)
    }

    /// True when the unit is mid-cast on the given spell.
    pub fn is_casting(&self, spell: SpellId) -> bool {
        self.casting.map(|c| c.spell == spell).unwrap_or(false)
    }
}

/// Read-only world snapshot for one AI tick.
///
/// The host builds this once per tick and shares it across every bot update
/// in that tick. All lookups go through guids; the core never stores the
/// references it obtains here.
pub struct TickContext<'a> {
    /// Milliseconds since the host started its AI clock.
    pub now_ms: u64,
    /// Map of guid to unit view (per-tick snapshot).
    pub units: &'a HashMap<Guid, UnitView>,
    /// Map of guid to the auras observed on that unit.
    pub auras: &'a HashMap<Guid, Vec<AuraSeen>>,
}

impl<'a> TickContext<'a> {
    pub fn unit(&self, guid: Guid) -> Option<&UnitView> {
        self.units.get(&guid)
    }

    /// Auras on a unit, empty when the host reported none.
    pub fn auras_on(&self, guid: Guid) -> &[AuraSeen] {
        self.auras.get(&guid).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn aura(&self, guid: Guid, effect: SpellId) -> Option<&AuraSeen> {
        self.auras_on(guid).iter().find(|a| a.effect == effect)
    }

    pub fn has_aura(&self, guid: Guid, effect: SpellId) -> bool {
        self.aura(guid, effect).is_some()
    }

    pub fn aura_remaining(&self, guid: Guid, effect: SpellId) -> Option<u64> {
        self.aura(guid, effect).map(|a| a.remaining_ms)
    }

    pub fn aura_stacks(&self, guid: Guid, effect: SpellId) -> u32 {
        self.aura(guid, effect).map(|a| a.stacks).unwrap_or(0)
    }

    /// Check if a unit is under a given loss-of-control effect.
    pub fn controlled_by(&self, guid: Guid, control: ControlEffect) -> bool {
        self.auras_on(guid).iter().any(|a| a.control == control)
    }

    /// Stunned, feared, or incapacitated: the unit can take no action at all.
    pub fn is_incapacitated(&self, guid: Guid) -> bool {
        self.auras_on(guid).iter().any(|a| {
            matches!(
                a.control,
                ControlEffect::Stun | ControlEffect::Fear | ControlEffect::Incapacitate
            )
        })
    }

    /// All living units hostile to `me`.
    pub fn enemies_of(&self, me: &UnitView) -> impl Iterator<Item = &UnitView> {
        let team = me.team;
        self.units
            .values()
            .filter(move |u| u.team != team && u.alive)
    }

    /// All living units on `me`'s team, including `me` and pets.
    pub fn allies_of(&self, me: &UnitView) -> impl Iterator<Item = &UnitView> {
        let team = me.team;
        self.units
            .values()
            .filter(move |u| u.team == team && u.alive)
    }

    /// Living group members of `me`'s team, excluding pets.
    pub fn group_of(&self, me: &UnitView) -> impl Iterator<Item = &UnitView> {
        self.allies_of(me).filter(|u| u.owner.is_none())
    }

    /// Count living enemies within `range` of a position.
    pub fn enemies_within(&self, me: &UnitView, origin: Vec3, range: f32) -> usize {
        self.enemies_of(me)
            .filter(|u| u.distance_to(origin) <= range)
            .count()
    }

    /// The living ally with the lowest health fraction.
    pub fn lowest_ally(&self, me: &UnitView) -> Option<&UnitView> {
        self.group_of(me).min_by(|a, b| {
            a.health_frac()
                .partial_cmp(&b.health_frac())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.guid.cmp(&b.guid))
        })
    }

    /// The designated main tank of `me`'s group, falling back to any tank.
    pub fn main_tank(&self, me: &UnitView) -> Option<&UnitView> {
        self.group_of(me)
            .find(|u| u.role == GroupRole::MainTank)
            .or_else(|| self.group_of(me).find(|u| u.role.is_tank()))
    }

    /// The bot's living pet, if one is out.
    pub fn pet_of(&self, owner: Guid) -> Option<&UnitView> {
        self.units
            .values()
            .find(|u| u.owner == Some(owner) && u.alive)
    }
}

/// A pet command the core asks the host to relay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PetOrder {
    Attack(Guid),
    Follow,
    Stay,
}

/// The single action a bot requests for this tick.
///
/// Requests are fire-and-forget: the host may refuse (silenced, out of
/// range, dead target) and the core simply re-selects next tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// Cast an ability on a unit.
    Cast { ability: SpellId, target: Guid },
    /// Cast a ground-targeted ability at a position.
    CastAt { ability: SpellId, position: Vec3 },
    /// Move to a position.
    Move { to: Vec3 },
    /// Relay an order to the bot's pet.
    Pet(PetOrder),
}

impl Decision {
    /// The ability this decision casts, if it is a cast.
    pub fn ability(&self) -> Option<SpellId> {
        match self {
            Decision::Cast { ability, .. } | Decision::CastAt { ability, .. } => Some(*ability),
            _ => None,
        }
    }
}
