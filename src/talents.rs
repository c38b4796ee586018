//! Hero talent detection
//!
//! Bots cannot be asked which meta-talent tree they picked; the host only
//! exposes the spellbook. Each tree has a keystone ability, so probing
//! known-spell membership against a static table recovers the choice. The
//! result is cached per bot and dropped when the host reports a talent swap.

use crate::classes::SpecId;
use crate::host::{SpellId, UnitView};

/// Hero talents unlock at this level; below it detection reports `None`.
pub const HERO_TALENT_MIN_LEVEL: u32 = 71;

/// Meta-talent trees reachable from the supported specializations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeroTree {
    #[default]
    None,
    Deathbringer,
    RiderOfTheApocalypse,
    SanLayn,
    Voidweaver,
    Archon,
    HeraldOfTheSun,
    Lightsmith,
    Colossus,
    Slayer,
    Diabolist,
    Hellcaller,
    ShadoPan,
    ConduitOfTheCelestials,
    Totemic,
    Farseer,
}

impl HeroTree {
    pub fn name(&self) -> &'static str {
        match self {
            HeroTree::None => "none",
            HeroTree::Deathbringer => "deathbringer",
            HeroTree::RiderOfTheApocalypse => "rider_of_the_apocalypse",
            HeroTree::SanLayn => "sanlayn",
            HeroTree::Voidweaver => "voidweaver",
            HeroTree::Archon => "archon",
            HeroTree::HeraldOfTheSun => "herald_of_the_sun",
            HeroTree::Lightsmith => "lightsmith",
            HeroTree::Colossus => "colossus",
            HeroTree::Slayer => "slayer",
            HeroTree::Diabolist => "diabolist",
            HeroTree::Hellcaller => "hellcaller",
            HeroTree::ShadoPan => "shado_pan",
            HeroTree::ConduitOfTheCelestials => "conduit_of_the_celestials",
            HeroTree::Totemic => "totemic",
            HeroTree::Farseer => "farseer",
        }
    }
}

/// Keystone spell ids per spec, probed in order; first match wins.
fn keystones(spec: SpecId) -> &'static [(SpellId, HeroTree)] {
    match spec {
        SpecId::BloodDeathKnight => &[
            (SpellId(439843), HeroTree::Deathbringer),
            (SpellId(433901), HeroTree::SanLayn),
        ],
        SpecId::FrostDeathKnight => &[
            (SpellId(439843), HeroTree::Deathbringer),
            (SpellId(444005), HeroTree::RiderOfTheApocalypse),
        ],
        SpecId::UnholyDeathKnight => &[
            (SpellId(433901), HeroTree::SanLayn),
            (SpellId(444005), HeroTree::RiderOfTheApocalypse),
        ],
        SpecId::ShadowPriest => &[
            (SpellId(447444), HeroTree::Voidweaver),
            (SpellId(453109), HeroTree::Archon),
        ],
        SpecId::HolyPaladin => &[
            (SpellId(431377), HeroTree::HeraldOfTheSun),
            (SpellId(432459), HeroTree::Lightsmith),
        ],
        SpecId::ArmsWarrior => &[
            (SpellId(436358), HeroTree::Colossus),
            (SpellId(444767), HeroTree::Slayer),
        ],
        SpecId::DestructionWarlock => &[
            (SpellId(428514), HeroTree::Diabolist),
            (SpellId(445468), HeroTree::Hellcaller),
        ],
        SpecId::WindwalkerMonk => &[
            (SpellId(450615), HeroTree::ShadoPan),
            (SpellId(443028), HeroTree::ConduitOfTheCelestials),
        ],
        SpecId::RestorationShaman => &[
            (SpellId(444995), HeroTree::Totemic),
            (SpellId(443450), HeroTree::Farseer),
        ],
    }
}

/// Per-bot detector with a one-slot cache.
#[derive(Debug, Default)]
pub struct HeroTalentDetector {
    cached: Option<HeroTree>,
}

impl HeroTalentDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detect the active tree, probing at most once between invalidations.
    pub fn detect(&mut self, me: &UnitView, spec: SpecId) -> HeroTree {
        if let Some(tree) = self.cached {
            return tree;
        }
        let tree = probe(me, spec);
        self.cached = Some(tree);
        tree
    }

    /// Drop the cache; the next detect re-probes the spellbook.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

fn probe(me: &UnitView, spec: SpecId) -> HeroTree {
    if me.level < HERO_TALENT_MIN_LEVEL {
        return HeroTree::None;
    }
    keystones(spec)
        .iter()
        .find(|(keystone, _)| me.knows(*keystone))
        .map(|(_, tree)| *tree)
        .unwrap_or(HeroTree::None)
}
