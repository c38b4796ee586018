//! Class dispatch
//!
//! The per-bot entry point. A [`ClassAi`] owns exactly one [`Specialization`]
//! at a time, detected from the bot's spellbook on the first tick and
//! rebuilt when the host reports a talent change. Every tick it resolves the
//! bot and its target from the snapshot, summarizes loss-of-control, and
//! hands the tick to the active spec.

pub mod death_knight;
pub mod monk;
pub mod paladin;
pub mod priest;
pub mod shaman;
pub mod spec_core;
pub mod warlock;
pub mod warrior;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::abilities;
use crate::combat::RotationPhase;
use crate::config::CoreConfig;
use crate::host::{ControlEffect, Decision, Guid, SpellId, TickContext, UnitView};
use crate::talents::{HeroTalentDetector, HeroTree};

pub use spec_core::SpecMetrics;

/// Playable classes the core ships rotation policies for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Class {
    DeathKnight,
    Priest,
    Paladin,
    Warrior,
    Warlock,
    Monk,
    Shaman,
}

impl Class {
    pub fn name(&self) -> &'static str {
        match self {
            Class::DeathKnight => "death knight",
            Class::Priest => "priest",
            Class::Paladin => "paladin",
            Class::Warrior => "warrior",
            Class::Warlock => "warlock",
            Class::Monk => "monk",
            Class::Shaman => "shaman",
        }
    }

    /// Implemented specs in class order; the first is the detection fallback.
    pub fn specs(&self) -> &'static [SpecId] {
        match self {
            Class::DeathKnight => &[
                SpecId::BloodDeathKnight,
                SpecId::FrostDeathKnight,
                SpecId::UnholyDeathKnight,
            ],
            Class::Priest => &[SpecId::ShadowPriest],
            Class::Paladin => &[SpecId::HolyPaladin],
            Class::Warrior => &[SpecId::ArmsWarrior],
            Class::Warlock => &[SpecId::DestructionWarlock],
            Class::Monk => &[SpecId::WindwalkerMonk],
            Class::Shaman => &[SpecId::RestorationShaman],
        }
    }

    pub fn first_spec(&self) -> SpecId {
        self.specs()[0]
    }
}

/// Implemented specializations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecId {
    BloodDeathKnight,
    FrostDeathKnight,
    UnholyDeathKnight,
    ShadowPriest,
    HolyPaladin,
    ArmsWarrior,
    DestructionWarlock,
    WindwalkerMonk,
    RestorationShaman,
}

impl SpecId {
    pub fn name(&self) -> &'static str {
        match self {
            SpecId::BloodDeathKnight => "blood",
            SpecId::FrostDeathKnight => "frost",
            SpecId::UnholyDeathKnight => "unholy",
            SpecId::ShadowPriest => "shadow",
            SpecId::HolyPaladin => "holy",
            SpecId::ArmsWarrior => "arms",
            SpecId::DestructionWarlock => "destruction",
            SpecId::WindwalkerMonk => "windwalker",
            SpecId::RestorationShaman => "restoration",
        }
    }

    pub fn class(&self) -> Class {
        match self {
            SpecId::BloodDeathKnight | SpecId::FrostDeathKnight | SpecId::UnholyDeathKnight => {
                Class::DeathKnight
            }
            SpecId::ShadowPriest => Class::Priest,
            SpecId::HolyPaladin => Class::Paladin,
            SpecId::ArmsWarrior => Class::Warrior,
            SpecId::DestructionWarlock => Class::Warlock,
            SpecId::WindwalkerMonk => Class::Monk,
            SpecId::RestorationShaman => Class::Shaman,
        }
    }

    /// The spell whose presence in the spellbook marks this spec.
    fn signature_spell(&self) -> SpellId {
        match self {
            SpecId::BloodDeathKnight => abilities::HEART_STRIKE.id,
            SpecId::FrostDeathKnight => abilities::HOWLING_BLAST.id,
            SpecId::UnholyDeathKnight => abilities::SCOURGE_STRIKE.id,
            SpecId::ShadowPriest => abilities::SHADOWFORM.id,
            SpecId::HolyPaladin => abilities::HOLY_SHOCK.id,
            SpecId::ArmsWarrior => abilities::MORTAL_STRIKE.id,
            SpecId::DestructionWarlock => abilities::CHAOS_BOLT.id,
            SpecId::WindwalkerMonk => abilities::RISING_SUN_KICK.id,
            SpecId::RestorationShaman => abilities::RIPTIDE.id,
        }
    }

    /// Presence aura that disambiguates when the spellbook is inconclusive.
    fn presence_aura(&self) -> Option<SpellId> {
        match self {
            SpecId::BloodDeathKnight => Some(abilities::BLOOD_PRESENCE_AURA),
            SpecId::FrostDeathKnight => Some(abilities::FROST_PRESENCE_AURA),
            SpecId::UnholyDeathKnight => Some(abilities::UNHOLY_PRESENCE_AURA),
            _ => None,
        }
    }
}

/// Detect a bot's spec from the snapshot: signature spells first, then the
/// presence aura, then the class's first spec with a warning.
pub fn detect_spec(class: Class, me: &UnitView, ctx: &TickContext) -> SpecId {
    for spec in class.specs() {
        if me.knows(spec.signature_spell()) {
            return *spec;
        }
    }
    for spec in class.specs() {
        if let Some(aura) = spec.presence_aura() {
            if ctx.has_aura(me.guid, aura) {
                return *spec;
            }
        }
    }
    let fallback = class.first_spec();
    warn!(
        bot = me.guid.0,
        class = class.name(),
        spec = fallback.name(),
        "spec detection inconclusive, falling back to first spec"
    );
    fallback
}

/// Loss-of-control summary for one bot this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    /// Stunned, feared, or incapacitated: no action at all.
    pub incapacitated: bool,
    /// Casts are off the table; movement is still allowed.
    pub silenced: bool,
    /// Movement is off the table; casts are still allowed.
    pub rooted: bool,
}

impl Controls {
    pub fn observe(ctx: &TickContext, guid: Guid) -> Self {
        Self {
            incapacitated: ctx.is_incapacitated(guid),
            silenced: ctx.controlled_by(guid, ControlEffect::Silence),
            rooted: ctx.controlled_by(guid, ControlEffect::Root),
        }
    }
}

/// Closed sum of the shipped specializations. One variant per spec keeps the
/// hot dispatch a plain match.
pub enum Specialization {
    Blood(death_knight::Blood),
    Frost(death_knight::Frost),
    Unholy(death_knight::Unholy),
    Shadow(priest::Shadow),
    Holy(paladin::Holy),
    Arms(warrior::Arms),
    Destruction(warlock::Destruction),
    Windwalker(monk::Windwalker),
    Restoration(shaman::Restoration),
}

macro_rules! each_spec {
    ($self:expr, $spec:ident => $body:expr) => {
        match $self {
            Specialization::Blood($spec) => $body,
            Specialization::Frost($spec) => $body,
            Specialization::Unholy($spec) => $body,
            Specialization::Shadow($spec) => $body,
            Specialization::Holy($spec) => $body,
            Specialization::Arms($spec) => $body,
            Specialization::Destruction($spec) => $body,
            Specialization::Windwalker($spec) => $body,
            Specialization::Restoration($spec) => $body,
        }
    };
}

impl Specialization {
    pub fn new(spec: SpecId, config: &CoreConfig) -> Self {
        match spec {
            SpecId::BloodDeathKnight => Specialization::Blood(death_knight::Blood::new(config)),
            SpecId::FrostDeathKnight => Specialization::Frost(death_knight::Frost::new(config)),
            SpecId::UnholyDeathKnight => Specialization::Unholy(death_knight::Unholy::new(config)),
            SpecId::ShadowPriest => Specialization::Shadow(priest::Shadow::new(config)),
            SpecId::HolyPaladin => Specialization::Holy(paladin::Holy::new(config)),
            SpecId::ArmsWarrior => Specialization::Arms(warrior::Arms::new(config)),
            SpecId::DestructionWarlock => {
                Specialization::Destruction(warlock::Destruction::new(config))
            }
            SpecId::WindwalkerMonk => Specialization::Windwalker(monk::Windwalker::new(config)),
            SpecId::RestorationShaman => {
                Specialization::Restoration(shaman::Restoration::new(config))
            }
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
        each_spec!(self, spec => spec.update(ctx, me, target, dt_ms, config, controls))
    }

    pub fn enter_combat(&mut self, now_ms: u64) {
        each_spec!(self, spec => spec.enter_combat(now_ms))
    }

    pub fn leave_combat(&mut self) {
        each_spec!(self, spec => spec.leave_combat())
    }

    pub fn in_combat(&self) -> bool {
        each_spec!(self, spec => spec.in_combat())
    }

    pub fn phase(&self) -> RotationPhase {
        each_spec!(self, spec => spec.phase())
    }

    pub fn metrics(&self) -> &SpecMetrics {
        each_spec!(self, spec => spec.metrics())
    }
}

/// Per-bot AI entry point.
///
/// Owns the active specialization, the hero-talent cache, and the per-tick
/// idempotence guard. The host calls [`ClassAi::update`] once per tick and
/// the combat/talent event hooks as they happen.
pub struct ClassAi {
    guid: Guid,
    class: Class,
    config: CoreConfig,
    spec_id: Option<SpecId>,
    spec: Option<Specialization>,
    talents: HeroTalentDetector,
    hero_tree: HeroTree,
    last_tick_ms: Option<u64>,
}

impl ClassAi {
    pub fn new(guid: Guid, class: Class, config: CoreConfig) -> Self {
        Self {
            guid,
            class,
            config,
            spec_id: None,
            spec: None,
            talents: HeroTalentDetector::new(),
            hero_tree: HeroTree::None,
            last_tick_ms: None,
        }
    }

    pub fn guid(&self) -> Guid {
        self.guid
    }

    pub fn class(&self) -> Class {
        self.class
    }

    /// The detected spec; `None` before the first tick.
    pub fn spec_id(&self) -> Option<SpecId> {
        self.spec_id
    }

    pub fn hero_tree(&self) -> HeroTree {
        self.hero_tree
    }

    pub fn phase(&self) -> Option<RotationPhase> {
        self.spec.as_ref().map(|s| s.phase())
    }

    pub fn metrics(&self) -> Option<&SpecMetrics> {
        self.spec.as_ref().map(|s| s.metrics())
    }

    /// One AI tick. Returns at most one decision; a repeated call with the
    /// same `now_ms` returns `None` so the host may re-enter safely.
    pub fn update(&mut self, ctx: &TickContext, dt_ms: u64) -> Option<Decision> {
        if self.last_tick_ms == Some(ctx.now_ms) {
            return None;
        }
        self.last_tick_ms = Some(ctx.now_ms);

        // Bot missing from the snapshot: abort the tick without acting.
        let me = ctx.unit(self.guid)?;
        if !me.alive {
            return None;
        }

        self.ensure_spec(ctx, me);
        let spec = self.spec.as_mut()?;

        // Reconcile combat state with the host before the spec acts.
        if me.in_combat && !spec.in_combat() {
            spec.enter_combat(ctx.now_ms);
        } else if !me.in_combat && spec.in_combat() {
            spec.leave_combat();
        }

        let target = me
            .target
            .and_then(|guid| ctx.unit(guid))
            .filter(|t| t.alive && t.team != me.team);
        let controls = Controls::observe(ctx, me.guid);

        let decision = spec.update(ctx, me, target, dt_ms, &self.config, controls);
        if self.config.trace_decisions {
            debug!(
                bot = me.guid.0,
                phase = spec.phase().name(),
                decision = ?decision,
                "tick"
            );
        }
        decision
    }

    /// Host event: the bot entered combat against `target`.
    pub fn on_combat_start(&mut self, now_ms: u64) {
        if let Some(spec) = self.spec.as_mut() {
            spec.enter_combat(now_ms);
        }
    }

    /// Host event: combat ended.
    pub fn on_combat_end(&mut self) {
        if let Some(spec) = self.spec.as_mut() {
            spec.leave_combat();
        }
    }

    /// Host event: talents changed. Drops the active spec and caches; the
    /// next tick re-detects and rebuilds.
    pub fn on_talents_changed(&mut self) {
        self.spec = None;
        self.spec_id = None;
        self.talents.invalidate();
        self.hero_tree = HeroTree::None;
    }

    fn ensure_spec(&mut self, ctx: &TickContext, me: &UnitView) {
        if self.spec.is_some() {
            return;
        }
        let spec_id = detect_spec(self.class, me, ctx);
        debug!(
            bot = me.guid.0,
            class = self.class.name(),
            spec = spec_id.name(),
            "specialization detected"
        );
        self.hero_tree = self.talents.detect(me, spec_id);
        if self.hero_tree != HeroTree::None {
            debug!(
                bot = me.guid.0,
                tree = self.hero_tree.name(),
                "hero talent tree detected"
            );
        }
        self.spec_id = Some(spec_id);
        self.spec = Some(Specialization::new(spec_id, &self.config));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use glam::Vec3;

    use super::*;
    use crate::decision::testbed;
    use crate::host::AuraSeen;

    const ME: Guid = Guid(1);
    const ENEMY: Guid = Guid(100);

    fn world(me_spells: &[SpellId]) -> (HashMap<Guid, UnitView>, HashMap<Guid, Vec<AuraSeen>>) {
        let mut units = HashMap::new();
        let mut me = testbed::unit(ME, 1, Vec3::ZERO);
        me.in_combat = true;
        me.target = Some(ENEMY);
        for id in me_spells {
            me.known_spells.insert(*id);
        }
        units.insert(ME, me);
        let mut enemy = testbed::unit(ENEMY, 2, Vec3::new(3.0, 0.0, 0.0));
        enemy.in_combat = true;
        units.insert(ENEMY, enemy);
        (units, HashMap::new())
    }

    #[test]
    fn test_signature_spell_decides_the_spec() {
        let (units, auras) = world(&[abilities::SCOURGE_STRIKE.id]);
        let ctx = TickContext {
            now_ms: 0,
            units: &units,
            auras: &auras,
        };
        let spec = detect_spec(Class::DeathKnight, &units[&ME], &ctx);
        assert_eq!(spec, SpecId::UnholyDeathKnight);
    }

    #[test]
    fn test_presence_aura_breaks_spellbook_ties() {
        let (units, mut auras) = world(&[]);
        auras.insert(
            ME,
            vec![AuraSeen {
                effect: abilities::FROST_PRESENCE_AURA,
                remaining_ms: u64::MAX,
                stacks: 1,
                caster: Some(ME),
                control: crate::host::ControlEffect::None,
                dispellable: None,
            }],
        );
        let ctx = TickContext {
            now_ms: 0,
            units: &units,
            auras: &auras,
        };
        let spec = detect_spec(Class::DeathKnight, &units[&ME], &ctx);
        assert_eq!(spec, SpecId::FrostDeathKnight);
    }

    #[test]
    fn test_unknown_spec_falls_back_to_first_in_class_order() {
        let (units, auras) = world(&[]);
        let ctx = TickContext {
            now_ms: 0,
            units: &units,
            auras: &auras,
        };
        let spec = detect_spec(Class::DeathKnight, &units[&ME], &ctx);
        assert_eq!(spec, SpecId::BloodDeathKnight);
    }

    #[test]
    fn test_update_is_idempotent_within_a_tick() {
        let mut ai = ClassAi::new(ME, Class::Warrior, CoreConfig::default());
        let (units, auras) = world(&[abilities::MORTAL_STRIKE.id]);
        let ctx = TickContext {
            now_ms: 1_000,
            units: &units,
            auras: &auras,
        };

        let first = ai.update(&ctx, 100);
        assert!(first.is_some(), "an arms warrior in melee should act");
        assert_eq!(ai.update(&ctx, 0), None, "same now_ms must not act twice");

        // Past the global cooldown the next tick acts again.
        let ctx = TickContext {
            now_ms: 3_000,
            units: &units,
            auras: &auras,
        };
        assert!(ai.update(&ctx, 2_000).is_some(), "the next tick acts again");
    }

    #[test]
    fn test_missing_bot_aborts_the_tick() {
        let mut ai = ClassAi::new(Guid(999), Class::Priest, CoreConfig::default());
        let (units, auras) = world(&[]);
        let ctx = TickContext {
            now_ms: 1_000,
            units: &units,
            auras: &auras,
        };
        assert_eq!(ai.update(&ctx, 100), None);
    }

    #[test]
    fn test_talent_change_rebuilds_the_spec() {
        let mut ai = ClassAi::new(ME, Class::DeathKnight, CoreConfig::default());
        let (units, auras) = world(&[abilities::HEART_STRIKE.id]);
        let ctx = TickContext {
            now_ms: 1_000,
            units: &units,
            auras: &auras,
        };
        ai.update(&ctx, 100);
        assert_eq!(ai.spec_id(), Some(SpecId::BloodDeathKnight));

        ai.on_talents_changed();
        assert_eq!(ai.spec_id(), None);

        // Respecced to unholy: the new spellbook decides.
        let (units, auras) = world(&[abilities::SCOURGE_STRIKE.id]);
        let ctx = TickContext {
            now_ms: 2_000,
            units: &units,
            auras: &auras,
        };
        ai.update(&ctx, 100);
        assert_eq!(ai.spec_id(), Some(SpecId::UnholyDeathKnight));
    }

    #[test]
    fn test_combat_transitions_follow_the_snapshot() {
        let mut ai = ClassAi::new(ME, Class::Warrior, CoreConfig::default());
        let (mut units, auras) = world(&[abilities::MORTAL_STRIKE.id]);

        let ctx = TickContext {
            now_ms: 1_000,
            units: &units,
            auras: &auras,
        };
        ai.update(&ctx, 100);
        assert_eq!(ai.phase(), Some(RotationPhase::Opening));

        units.get_mut(&ME).unwrap().in_combat = false;
        let ctx = TickContext {
            now_ms: 2_000,
            units: &units,
            auras: &auras,
        };
        ai.update(&ctx, 1_000);
        assert_eq!(ai.phase(), Some(RotationPhase::Steady));
    }
}
