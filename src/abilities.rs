//! Ability catalog
//!
//! Static definitions for every ability the bots know how to use: costs,
//! gains, cooldowns, ranges, targeting rules, and the auras an ability
//! applies on a successful cast. Specs reference these statics directly;
//! the driver uses the same data to resolve what a requested cast does.
//!
//! Numbers are tuned for the embedded simulation, not scraped from any
//! particular game build.

use crate::combat::{Cost, Gain, Periodic};
use crate::host::SpellId;

/// Melee reach in yards. Movement logic closes to just inside this.
pub const MELEE_RANGE: f32 = 5.0;

/// How an ability picks its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Current hostile target
    Hostile,
    /// Always the caster
    SelfOnly,
    /// Friendly unit chosen by the healing selector
    Ally,
    /// The group's main tank
    MainTank,
    /// Ally at the densest cluster of injured allies
    ClusterAlly,
    /// Ground position at the densest cluster of injured allies
    GroundAlly,
    /// Ground position at the current hostile target
    GroundHostile,
}

/// Broad intent of an ability. Informational only; tiers decide priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    Offensive,
    Defensive,
    Utility,
    DamageSingle,
    DamageAoe,
}

/// Who an applied aura lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyTo {
    Target,
    Caster,
}

/// Aura applied when a cast succeeds.
#[derive(Debug, Clone, Copy)]
pub struct AppliedEffect {
    pub effect: SpellId,
    pub on: ApplyTo,
    pub base_ms: u64,
    pub stacks: u32,
    pub periodic: Option<Periodic>,
}

/// Everything the decision layer needs to know about one ability.
#[derive(Debug, Clone, Copy)]
pub struct AbilityInfo {
    pub id: SpellId,
    pub name: &'static str,
    pub cost: Cost,
    pub gain: Gain,
    pub cooldown_ms: u64,
    pub charges: u8,
    /// Whether the cast triggers the shared global cooldown
    pub gcd: bool,
    pub range: f32,
    pub target: TargetKind,
    pub category: ActionCategory,
    /// Cast time; zero means instant
    pub cast_ms: u64,
    pub applies: Option<AppliedEffect>,
}

const fn instant(
    id: u32,
    name: &'static str,
    cost: Cost,
    gain: Gain,
    cooldown_ms: u64,
    range: f32,
    target: TargetKind,
    category: ActionCategory,
) -> AbilityInfo {
    AbilityInfo {
        id: SpellId(id),
        name,
        cost,
        gain,
        cooldown_ms,
        charges: 1,
        gcd: true,
        range,
        target,
        category,
        cast_ms: 0,
        applies: None,
    }
}

// ============================================================================
// Aura-only spell ids (procs and debuffs the host applies)
// ============================================================================

pub const BLOOD_PLAGUE_AURA: SpellId = SpellId(55078);
pub const FROST_FEVER_AURA: SpellId = SpellId(55095);
pub const KILLING_MACHINE_AURA: SpellId = SpellId(51124);
pub const RIME_AURA: SpellId = SpellId(59052);
pub const SUDDEN_DOOM_AURA: SpellId = SpellId(81340);
pub const VOIDFORM_AURA: SpellId = SpellId(194249);
pub const TASTE_FOR_BLOOD_AURA: SpellId = SpellId(60503);

// Stance auras, read only by spec detection.
pub const BLOOD_PRESENCE_AURA: SpellId = SpellId(48263);
pub const FROST_PRESENCE_AURA: SpellId = SpellId(48266);
pub const UNHOLY_PRESENCE_AURA: SpellId = SpellId(48265);

// ============================================================================
// Death Knight
// ============================================================================

pub const DEATH_GRIP: AbilityInfo = instant(
    49576,
    "Death Grip",
    Cost::Free,
    Gain::None,
    25_000,
    30.0,
    TargetKind::Hostile,
    ActionCategory::Utility,
);

pub const DARK_COMMAND: AbilityInfo = AbilityInfo {
    gcd: false,
    cooldown_ms: 8_000,
    ..instant(
        56222,
        "Dark Command",
        Cost::Free,
        Gain::None,
        8_000,
        30.0,
        TargetKind::Hostile,
        ActionCategory::Utility,
    )
};

pub const ICY_TOUCH: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: FROST_FEVER_AURA,
        on: ApplyTo::Target,
        base_ms: 21_000,
        stacks: 1,
        periodic: Some(Periodic {
            amount: 55.0,
            every_ms: 3_000,
            healing: false,
        }),
    }),
    ..instant(
        45477,
        "Icy Touch",
        Cost::Runes {
            blood: 0,
            frost: 1,
            unholy: 0,
        },
        Gain::Power(10.0),
        0,
        20.0,
        TargetKind::Hostile,
        ActionCategory::DamageSingle,
    )
};

pub const PLAGUE_STRIKE: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: BLOOD_PLAGUE_AURA,
        on: ApplyTo::Target,
        base_ms: 21_000,
        stacks: 1,
        periodic: Some(Periodic {
            amount: 60.0,
            every_ms: 3_000,
            healing: false,
        }),
    }),
    ..instant(
        45462,
        "Plague Strike",
        Cost::Runes {
            blood: 0,
            frost: 0,
            unholy: 1,
        },
        Gain::Power(10.0),
        0,
        MELEE_RANGE,
        TargetKind::Hostile,
        ActionCategory::DamageSingle,
    )
};

pub const PESTILENCE: AbilityInfo = instant(
    50842,
    "Pestilence",
    Cost::Runes {
        blood: 1,
        frost: 0,
        unholy: 0,
    },
    Gain::Power(10.0),
    0,
    MELEE_RANGE,
    TargetKind::Hostile,
    ActionCategory::DamageAoe,
);

pub const BLOOD_BOIL: AbilityInfo = instant(
    48721,
    "Blood Boil",
    Cost::Runes {
        blood: 1,
        frost: 0,
        unholy: 0,
    },
    Gain::Power(10.0),
    0,
    10.0,
    TargetKind::Hostile,
    ActionCategory::DamageAoe,
);

pub const HEART_STRIKE: AbilityInfo = instant(
    55050,
    "Heart Strike",
    Cost::Runes {
        blood: 1,
        frost: 0,
        unholy: 0,
    },
    Gain::Power(10.0),
    0,
    MELEE_RANGE,
    TargetKind::Hostile,
    ActionCategory::DamageSingle,
);

pub const DEATH_STRIKE: AbilityInfo = instant(
    49998,
    "Death Strike",
    Cost::Runes {
        blood: 0,
        frost: 1,
        unholy: 1,
    },
    Gain::Power(15.0),
    0,
    MELEE_RANGE,
    TargetKind::Hostile,
    ActionCategory::Defensive,
);

pub const DEATH_COIL: AbilityInfo = instant(
    47541,
    "Death Coil",
    Cost::Power(40.0),
    Gain::None,
    0,
    30.0,
    TargetKind::Hostile,
    ActionCategory::DamageSingle,
);

pub const BONE_SHIELD: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: SpellId(49222),
        on: ApplyTo::Caster,
        base_ms: 300_000,
        stacks: 3,
        periodic: None,
    }),
    ..instant(
        49222,
        "Bone Shield",
        Cost::Runes {
            blood: 0,
            frost: 0,
            unholy: 1,
        },
        Gain::None,
        60_000,
        0.0,
        TargetKind::SelfOnly,
        ActionCategory::Defensive,
    )
};

pub const ICEBOUND_FORTITUDE: AbilityInfo = AbilityInfo {
    gcd: false,
    applies: Some(AppliedEffect {
        effect: SpellId(48792),
        on: ApplyTo::Caster,
        base_ms: 12_000,
        stacks: 1,
        periodic: None,
    }),
    ..instant(
        48792,
        "Icebound Fortitude",
        Cost::Free,
        Gain::None,
        120_000,
        0.0,
        TargetKind::SelfOnly,
        ActionCategory::Defensive,
    )
};

pub const VAMPIRIC_BLOOD: AbilityInfo = AbilityInfo {
    gcd: false,
    applies: Some(AppliedEffect {
        effect: SpellId(55233),
        on: ApplyTo::Caster,
        base_ms: 10_000,
        stacks: 1,
        periodic: None,
    }),
    ..instant(
        55233,
        "Vampiric Blood",
        Cost::Free,
        Gain::None,
        60_000,
        0.0,
        TargetKind::SelfOnly,
        ActionCategory::Defensive,
    )
};

pub const DEATH_PACT: AbilityInfo = instant(
    48743,
    "Death Pact",
    Cost::Power(40.0),
    Gain::None,
    120_000,
    0.0,
    TargetKind::SelfOnly,
    ActionCategory::Defensive,
);

pub const DANCING_RUNE_WEAPON: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: SpellId(49028),
        on: ApplyTo::Caster,
        base_ms: 12_000,
        stacks: 1,
        periodic: None,
    }),
    ..instant(
        49028,
        "Dancing Rune Weapon",
        Cost::Power(60.0),
        Gain::None,
        90_000,
        0.0,
        TargetKind::SelfOnly,
        ActionCategory::Offensive,
    )
};

pub const HORN_OF_WINTER: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: SpellId(57330),
        on: ApplyTo::Caster,
        base_ms: 120_000,
        stacks: 1,
        periodic: None,
    }),
    ..instant(
        57330,
        "Horn of Winter",
        Cost::Free,
        Gain::Power(10.0),
        20_000,
        0.0,
        TargetKind::SelfOnly,
        ActionCategory::Utility,
    )
};

pub const OBLITERATE: AbilityInfo = instant(
    49020,
    "Obliterate",
    Cost::Runes {
        blood: 0,
        frost: 1,
        unholy: 1,
    },
    Gain::Power(15.0),
    0,
    MELEE_RANGE,
    TargetKind::Hostile,
    ActionCategory::DamageSingle,
);

pub const FROST_STRIKE: AbilityInfo = instant(
    49143,
    "Frost Strike",
    Cost::Power(40.0),
    Gain::None,
    0,
    MELEE_RANGE,
    TargetKind::Hostile,
    ActionCategory::DamageSingle,
);

pub const HOWLING_BLAST: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: FROST_FEVER_AURA,
        on: ApplyTo::Target,
        base_ms: 21_000,
        stacks: 1,
        periodic: Some(Periodic {
            amount: 55.0,
            every_ms: 3_000,
            healing: false,
        }),
    }),
    ..instant(
        49184,
        "Howling Blast",
        Cost::Runes {
            blood: 0,
            frost: 1,
            unholy: 0,
        },
        Gain::Power(10.0),
        0,
        20.0,
        TargetKind::Hostile,
        ActionCategory::DamageAoe,
    )
};

pub const MIND_FREEZE: AbilityInfo = AbilityInfo {
    gcd: false,
    ..instant(
        47528,
        "Mind Freeze",
        Cost::Free,
        Gain::None,
        10_000,
        MELEE_RANGE,
        TargetKind::Hostile,
        ActionCategory::Utility,
    )
};

pub const EMPOWER_RUNE_WEAPON: AbilityInfo = AbilityInfo {
    gcd: false,
    ..instant(
        47568,
        "Empower Rune Weapon",
        Cost::Free,
        Gain::Power(25.0),
        300_000,
        0.0,
        TargetKind::SelfOnly,
        ActionCategory::Utility,
    )
};

pub const SCOURGE_STRIKE: AbilityInfo = instant(
    55090,
    "Scourge Strike",
    Cost::Runes {
        blood: 0,
        frost: 0,
        unholy: 1,
    },
    Gain::Power(15.0),
    0,
    MELEE_RANGE,
    TargetKind::Hostile,
    ActionCategory::DamageSingle,
);

pub const DEATH_AND_DECAY: AbilityInfo = instant(
    43265,
    "Death and Decay",
    Cost::Runes {
        blood: 0,
        frost: 0,
        unholy: 1,
    },
    Gain::Power(15.0),
    30_000,
    30.0,
    TargetKind::GroundHostile,
    ActionCategory::DamageAoe,
);

pub const RAISE_DEAD: AbilityInfo = instant(
    46584,
    "Raise Dead",
    Cost::Free,
    Gain::None,
    180_000,
    0.0,
    TargetKind::SelfOnly,
    ActionCategory::Utility,
);

pub const SUMMON_GARGOYLE: AbilityInfo = instant(
    49206,
    "Summon Gargoyle",
    Cost::Power(60.0),
    Gain::None,
    180_000,
    30.0,
    TargetKind::Hostile,
    ActionCategory::Offensive,
);

// ============================================================================
// Priest (Shadow)
// ============================================================================

pub const MIND_BLAST: AbilityInfo = AbilityInfo {
    cast_ms: 1_500,
    ..instant(
        8092,
        "Mind Blast",
        Cost::Power(500.0),
        Gain::Secondary(12),
        7_500,
        30.0,
        TargetKind::Hostile,
        ActionCategory::DamageSingle,
    )
};

pub const SHADOW_WORD_PAIN: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: SpellId(589),
        on: ApplyTo::Target,
        base_ms: 16_000,
        stacks: 1,
        periodic: Some(Periodic {
            amount: 50.0,
            every_ms: 2_000,
            healing: false,
        }),
    }),
    ..instant(
        589,
        "Shadow Word: Pain",
        Cost::Power(300.0),
        Gain::Secondary(4),
        0,
        30.0,
        TargetKind::Hostile,
        ActionCategory::DamageSingle,
    )
};

pub const VAMPIRIC_TOUCH: AbilityInfo = AbilityInfo {
    cast_ms: 1_500,
    applies: Some(AppliedEffect {
        effect: SpellId(34914),
        on: ApplyTo::Target,
        base_ms: 21_000,
        stacks: 1,
        periodic: Some(Periodic {
            amount: 65.0,
            every_ms: 3_000,
            healing: false,
        }),
    }),
    ..instant(
        34914,
        "Vampiric Touch",
        Cost::Power(400.0),
        Gain::Secondary(5),
        0,
        30.0,
        TargetKind::Hostile,
        ActionCategory::DamageSingle,
    )
};

pub const DEVOURING_PLAGUE: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: SpellId(2944),
        on: ApplyTo::Target,
        base_ms: 6_000,
        stacks: 1,
        periodic: Some(Periodic {
            amount: 120.0,
            every_ms: 2_000,
            healing: false,
        }),
    }),
    ..instant(
        2944,
        "Devouring Plague",
        Cost::Secondary(50),
        Gain::None,
        0,
        30.0,
        TargetKind::Hostile,
        ActionCategory::DamageSingle,
    )
};

pub const VOID_ERUPTION: AbilityInfo = AbilityInfo {
    cast_ms: 2_000,
    applies: Some(AppliedEffect {
        effect: VOIDFORM_AURA,
        on: ApplyTo::Caster,
        base_ms: 20_000,
        stacks: 1,
        periodic: None,
    }),
    ..instant(
        228260,
        "Void Eruption",
        Cost::Free,
        Gain::None,
        90_000,
        30.0,
        TargetKind::Hostile,
        ActionCategory::DamageAoe,
    )
};

pub const VOID_BOLT: AbilityInfo = instant(
    228266,
    "Void Bolt",
    Cost::Free,
    Gain::Secondary(8),
    4_500,
    40.0,
    TargetKind::Hostile,
    ActionCategory::DamageSingle,
);

pub const MIND_FLAY: AbilityInfo = AbilityInfo {
    cast_ms: 3_000,
    ..instant(
        15407,
        "Mind Flay",
        Cost::Power(100.0),
        Gain::Secondary(6),
        0,
        30.0,
        TargetKind::Hostile,
        ActionCategory::DamageSingle,
    )
};

pub const SHADOW_WORD_DEATH: AbilityInfo = instant(
    32379,
    "Shadow Word: Death",
    Cost::Power(300.0),
    Gain::Secondary(10),
    10_000,
    30.0,
    TargetKind::Hostile,
    ActionCategory::DamageSingle,
);

pub const SHADOWFORM: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: SpellId(15473),
        on: ApplyTo::Caster,
        base_ms: 3_600_000,
        stacks: 1,
        periodic: None,
    }),
    ..instant(
        15473,
        "Shadowform",
        Cost::Free,
        Gain::None,
        0,
        0.0,
        TargetKind::SelfOnly,
        ActionCategory::Utility,
    )
};

pub const POWER_WORD_FORTITUDE: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: SpellId(21562),
        on: ApplyTo::Caster,
        base_ms: 3_600_000,
        stacks: 1,
        periodic: None,
    }),
    ..instant(
        21562,
        "Power Word: Fortitude",
        Cost::Power(400.0),
        Gain::None,
        0,
        0.0,
        TargetKind::SelfOnly,
        ActionCategory::Utility,
    )
};

pub const DISPERSION: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: SpellId(47585),
        on: ApplyTo::Caster,
        base_ms: 6_000,
        stacks: 1,
        periodic: None,
    }),
    ..instant(
        47585,
        "Dispersion",
        Cost::Free,
        Gain::None,
        120_000,
        0.0,
        TargetKind::SelfOnly,
        ActionCategory::Defensive,
    )
};

pub const SILENCE: AbilityInfo = AbilityInfo {
    gcd: false,
    ..instant(
        15487,
        "Silence",
        Cost::Free,
        Gain::None,
        45_000,
        30.0,
        TargetKind::Hostile,
        ActionCategory::Utility,
    )
};

// ============================================================================
// Paladin (Holy)
// ============================================================================

pub const HOLY_SHOCK: AbilityInfo = instant(
    20473,
    "Holy Shock",
    Cost::Power(600.0),
    Gain::Secondary(1),
    7_500,
    40.0,
    TargetKind::Ally,
    ActionCategory::Defensive,
);

pub const WORD_OF_GLORY: AbilityInfo = instant(
    85673,
    "Word of Glory",
    Cost::Secondary(3),
    Gain::None,
    0,
    40.0,
    TargetKind::Ally,
    ActionCategory::Defensive,
);

pub const LIGHT_OF_DAWN: AbilityInfo = instant(
    85222,
    "Light of Dawn",
    Cost::Secondary(3),
    Gain::None,
    0,
    0.0,
    TargetKind::SelfOnly,
    ActionCategory::Defensive,
);

pub const FLASH_OF_LIGHT: AbilityInfo = AbilityInfo {
    cast_ms: 1_500,
    ..instant(
        19750,
        "Flash of Light",
        Cost::Power(900.0),
        Gain::None,
        0,
        40.0,
        TargetKind::Ally,
        ActionCategory::Defensive,
    )
};

pub const HOLY_LIGHT: AbilityInfo = AbilityInfo {
    cast_ms: 2_500,
    ..instant(
        82326,
        "Holy Light",
        Cost::Power(700.0),
        Gain::None,
        0,
        40.0,
        TargetKind::Ally,
        ActionCategory::Defensive,
    )
};

pub const BEACON_OF_LIGHT: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: SpellId(53563),
        on: ApplyTo::Target,
        base_ms: 300_000,
        stacks: 1,
        periodic: None,
    }),
    ..instant(
        53563,
        "Beacon of Light",
        Cost::Power(500.0),
        Gain::None,
        0,
        40.0,
        TargetKind::MainTank,
        ActionCategory::Utility,
    )
};

pub const LAY_ON_HANDS: AbilityInfo = AbilityInfo {
    gcd: false,
    ..instant(
        633,
        "Lay on Hands",
        Cost::Free,
        Gain::None,
        600_000,
        40.0,
        TargetKind::Ally,
        ActionCategory::Defensive,
    )
};

pub const CLEANSE: AbilityInfo = instant(
    4987,
    "Cleanse",
    Cost::Power(400.0),
    Gain::None,
    0,
    40.0,
    TargetKind::Ally,
    ActionCategory::Utility,
);

pub const JUDGMENT: AbilityInfo = instant(
    20271,
    "Judgment",
    Cost::Power(300.0),
    Gain::None,
    8_000,
    30.0,
    TargetKind::Hostile,
    ActionCategory::DamageSingle,
);

// ============================================================================
// Warrior (Arms)
// ============================================================================

pub const MORTAL_STRIKE: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: SpellId(12294),
        on: ApplyTo::Target,
        base_ms: 10_000,
        stacks: 1,
        periodic: None,
    }),
    ..instant(
        12294,
        "Mortal Strike",
        Cost::Power(30.0),
        Gain::None,
        6_000,
        MELEE_RANGE,
        TargetKind::Hostile,
        ActionCategory::DamageSingle,
    )
};

pub const OVERPOWER: AbilityInfo = instant(
    7384,
    "Overpower",
    Cost::Power(5.0),
    Gain::None,
    5_000,
    MELEE_RANGE,
    TargetKind::Hostile,
    ActionCategory::DamageSingle,
);

pub const EXECUTE: AbilityInfo = instant(
    5308,
    "Execute",
    Cost::Power(20.0),
    Gain::None,
    0,
    MELEE_RANGE,
    TargetKind::Hostile,
    ActionCategory::DamageSingle,
);

pub const SLAM: AbilityInfo = AbilityInfo {
    cast_ms: 1_500,
    ..instant(
        1464,
        "Slam",
        Cost::Power(15.0),
        Gain::None,
        0,
        MELEE_RANGE,
        TargetKind::Hostile,
        ActionCategory::DamageSingle,
    )
};

pub const REND: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: SpellId(772),
        on: ApplyTo::Target,
        base_ms: 15_000,
        stacks: 1,
        periodic: Some(Periodic {
            amount: 45.0,
            every_ms: 3_000,
            healing: false,
        }),
    }),
    ..instant(
        772,
        "Rend",
        Cost::Power(10.0),
        Gain::None,
        0,
        MELEE_RANGE,
        TargetKind::Hostile,
        ActionCategory::DamageSingle,
    )
};

pub const CHARGE: AbilityInfo = instant(
    100,
    "Charge",
    Cost::Free,
    Gain::Power(20.0),
    15_000,
    25.0,
    TargetKind::Hostile,
    ActionCategory::Utility,
);

pub const PUMMEL: AbilityInfo = AbilityInfo {
    gcd: false,
    ..instant(
        6552,
        "Pummel",
        Cost::Free,
        Gain::None,
        10_000,
        MELEE_RANGE,
        TargetKind::Hostile,
        ActionCategory::Utility,
    )
};

pub const BLADESTORM: AbilityInfo = instant(
    46924,
    "Bladestorm",
    Cost::Power(25.0),
    Gain::None,
    90_000,
    0.0,
    TargetKind::SelfOnly,
    ActionCategory::DamageAoe,
);

pub const SWEEPING_STRIKES: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: SpellId(12328),
        on: ApplyTo::Caster,
        base_ms: 10_000,
        stacks: 1,
        periodic: None,
    }),
    ..instant(
        12328,
        "Sweeping Strikes",
        Cost::Power(30.0),
        Gain::None,
        30_000,
        0.0,
        TargetKind::SelfOnly,
        ActionCategory::Utility,
    )
};

pub const BATTLE_SHOUT: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: SpellId(47436),
        on: ApplyTo::Caster,
        base_ms: 120_000,
        stacks: 1,
        periodic: None,
    }),
    ..instant(
        47436,
        "Battle Shout",
        Cost::Free,
        Gain::None,
        0,
        0.0,
        TargetKind::SelfOnly,
        ActionCategory::Utility,
    )
};

pub const ENRAGED_REGENERATION: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: SpellId(55694),
        on: ApplyTo::Caster,
        base_ms: 10_000,
        stacks: 1,
        periodic: Some(Periodic {
            amount: 150.0,
            every_ms: 1_000,
            healing: true,
        }),
    }),
    ..instant(
        55694,
        "Enraged Regeneration",
        Cost::Power(15.0),
        Gain::None,
        180_000,
        0.0,
        TargetKind::SelfOnly,
        ActionCategory::Defensive,
    )
};

// ============================================================================
// Warlock (Destruction)
// ============================================================================

pub const IMMOLATE: AbilityInfo = AbilityInfo {
    cast_ms: 1_500,
    applies: Some(AppliedEffect {
        effect: SpellId(348),
        on: ApplyTo::Target,
        base_ms: 15_000,
        stacks: 1,
        periodic: Some(Periodic {
            amount: 70.0,
            every_ms: 3_000,
            healing: false,
        }),
    }),
    ..instant(
        348,
        "Immolate",
        Cost::Power(500.0),
        Gain::None,
        0,
        40.0,
        TargetKind::Hostile,
        ActionCategory::DamageSingle,
    )
};

pub const INCINERATE: AbilityInfo = AbilityInfo {
    cast_ms: 2_000,
    ..instant(
        29722,
        "Incinerate",
        Cost::Power(400.0),
        Gain::Secondary(1),
        0,
        40.0,
        TargetKind::Hostile,
        ActionCategory::DamageSingle,
    )
};

pub const CONFLAGRATE: AbilityInfo = AbilityInfo {
    charges: 2,
    ..instant(
        17962,
        "Conflagrate",
        Cost::Power(300.0),
        Gain::Secondary(1),
        12_000,
        40.0,
        TargetKind::Hostile,
        ActionCategory::DamageSingle,
    )
};

pub const CHAOS_BOLT: AbilityInfo = AbilityInfo {
    cast_ms: 2_500,
    ..instant(
        116858,
        "Chaos Bolt",
        Cost::Secondary(2),
        Gain::None,
        0,
        40.0,
        TargetKind::Hostile,
        ActionCategory::DamageSingle,
    )
};

pub const RAIN_OF_FIRE: AbilityInfo = instant(
    5740,
    "Rain of Fire",
    Cost::Secondary(3),
    Gain::None,
    0,
    35.0,
    TargetKind::GroundHostile,
    ActionCategory::DamageAoe,
);

pub const SHADOWBURN: AbilityInfo = instant(
    17877,
    "Shadowburn",
    Cost::Secondary(1),
    Gain::None,
    12_000,
    40.0,
    TargetKind::Hostile,
    ActionCategory::DamageSingle,
);

pub const UNENDING_RESOLVE: AbilityInfo = AbilityInfo {
    gcd: false,
    applies: Some(AppliedEffect {
        effect: SpellId(104773),
        on: ApplyTo::Caster,
        base_ms: 8_000,
        stacks: 1,
        periodic: None,
    }),
    ..instant(
        104773,
        "Unending Resolve",
        Cost::Free,
        Gain::None,
        180_000,
        0.0,
        TargetKind::SelfOnly,
        ActionCategory::Defensive,
    )
};

pub const SUMMON_IMP: AbilityInfo = AbilityInfo {
    cast_ms: 2_500,
    ..instant(
        688,
        "Summon Imp",
        Cost::Power(1_000.0),
        Gain::None,
        0,
        0.0,
        TargetKind::SelfOnly,
        ActionCategory::Utility,
    )
};

// ============================================================================
// Monk (Windwalker)
// ============================================================================

pub const TIGER_PALM: AbilityInfo = instant(
    100780,
    "Tiger Palm",
    Cost::Power(50.0),
    Gain::Secondary(2),
    0,
    MELEE_RANGE,
    TargetKind::Hostile,
    ActionCategory::DamageSingle,
);

pub const RISING_SUN_KICK: AbilityInfo = instant(
    107428,
    "Rising Sun Kick",
    Cost::Secondary(2),
    Gain::None,
    10_000,
    MELEE_RANGE,
    TargetKind::Hostile,
    ActionCategory::DamageSingle,
);

pub const BLACKOUT_KICK: AbilityInfo = instant(
    100784,
    "Blackout Kick",
    Cost::Secondary(1),
    Gain::None,
    0,
    MELEE_RANGE,
    TargetKind::Hostile,
    ActionCategory::DamageSingle,
);

pub const FISTS_OF_FURY: AbilityInfo = AbilityInfo {
    cast_ms: 4_000,
    ..instant(
        113656,
        "Fists of Fury",
        Cost::Secondary(3),
        Gain::None,
        24_000,
        MELEE_RANGE,
        TargetKind::Hostile,
        ActionCategory::DamageAoe,
    )
};

pub const SPINNING_CRANE_KICK: AbilityInfo = instant(
    101546,
    "Spinning Crane Kick",
    Cost::Secondary(2),
    Gain::None,
    0,
    0.0,
    TargetKind::SelfOnly,
    ActionCategory::DamageAoe,
);

pub const TOUCH_OF_DEATH: AbilityInfo = instant(
    115080,
    "Touch of Death",
    Cost::Free,
    Gain::None,
    180_000,
    MELEE_RANGE,
    TargetKind::Hostile,
    ActionCategory::DamageSingle,
);

pub const SPEAR_HAND_STRIKE: AbilityInfo = AbilityInfo {
    gcd: false,
    ..instant(
        116705,
        "Spear Hand Strike",
        Cost::Free,
        Gain::None,
        15_000,
        MELEE_RANGE,
        TargetKind::Hostile,
        ActionCategory::Utility,
    )
};

pub const FORTIFYING_BREW: AbilityInfo = AbilityInfo {
    gcd: false,
    applies: Some(AppliedEffect {
        effect: SpellId(115203),
        on: ApplyTo::Caster,
        base_ms: 15_000,
        stacks: 1,
        periodic: None,
    }),
    ..instant(
        115203,
        "Fortifying Brew",
        Cost::Free,
        Gain::None,
        180_000,
        0.0,
        TargetKind::SelfOnly,
        ActionCategory::Defensive,
    )
};

// ============================================================================
// Shaman (Restoration)
// ============================================================================

pub const RIPTIDE: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: SpellId(61295),
        on: ApplyTo::Target,
        base_ms: 15_000,
        stacks: 1,
        periodic: Some(Periodic {
            amount: 200.0,
            every_ms: 3_000,
            healing: true,
        }),
    }),
    ..instant(
        61295,
        "Riptide",
        Cost::Power(600.0),
        Gain::None,
        6_000,
        40.0,
        TargetKind::Ally,
        ActionCategory::Defensive,
    )
};

pub const HEALING_WAVE: AbilityInfo = AbilityInfo {
    cast_ms: 2_500,
    ..instant(
        77472,
        "Healing Wave",
        Cost::Power(800.0),
        Gain::None,
        0,
        40.0,
        TargetKind::Ally,
        ActionCategory::Defensive,
    )
};

pub const HEALING_SURGE: AbilityInfo = AbilityInfo {
    cast_ms: 1_500,
    ..instant(
        8004,
        "Healing Surge",
        Cost::Power(1_100.0),
        Gain::None,
        0,
        40.0,
        TargetKind::Ally,
        ActionCategory::Defensive,
    )
};

pub const CHAIN_HEAL: AbilityInfo = AbilityInfo {
    cast_ms: 2_500,
    ..instant(
        1064,
        "Chain Heal",
        Cost::Power(1_000.0),
        Gain::None,
        0,
        40.0,
        TargetKind::ClusterAlly,
        ActionCategory::Defensive,
    )
};

pub const HEALING_RAIN: AbilityInfo = AbilityInfo {
    cast_ms: 2_000,
    ..instant(
        73920,
        "Healing Rain",
        Cost::Power(1_200.0),
        Gain::None,
        10_000,
        35.0,
        TargetKind::GroundAlly,
        ActionCategory::Defensive,
    )
};

pub const HEALING_TIDE_TOTEM: AbilityInfo = instant(
    108280,
    "Healing Tide Totem",
    Cost::Free,
    Gain::None,
    180_000,
    0.0,
    TargetKind::SelfOnly,
    ActionCategory::Defensive,
);

pub const SPIRIT_LINK_TOTEM: AbilityInfo = instant(
    98008,
    "Spirit Link Totem",
    Cost::Free,
    Gain::None,
    180_000,
    0.0,
    TargetKind::SelfOnly,
    ActionCategory::Defensive,
);

pub const EARTH_SHIELD: AbilityInfo = AbilityInfo {
    applies: Some(AppliedEffect {
        effect: SpellId(974),
        on: ApplyTo::Target,
        base_ms: 600_000,
        stacks: 9,
        periodic: None,
    }),
    ..instant(
        974,
        "Earth Shield",
        Cost::Power(600.0),
        Gain::None,
        0,
        40.0,
        TargetKind::MainTank,
        ActionCategory::Utility,
    )
};

pub const WIND_SHEAR: AbilityInfo = AbilityInfo {
    gcd: false,
    ..instant(
        57994,
        "Wind Shear",
        Cost::Free,
        Gain::None,
        12_000,
        30.0,
        TargetKind::Hostile,
        ActionCategory::Utility,
    )
};

pub const PURIFY_SPIRIT: AbilityInfo = instant(
    77130,
    "Purify Spirit",
    Cost::Power(400.0),
    Gain::None,
    8_000,
    40.0,
    TargetKind::Ally,
    ActionCategory::Utility,
);

pub const LIGHTNING_BOLT: AbilityInfo = AbilityInfo {
    cast_ms: 2_000,
    ..instant(
        403,
        "Lightning Bolt",
        Cost::Power(100.0),
        Gain::None,
        0,
        30.0,
        TargetKind::Hostile,
        ActionCategory::DamageSingle,
    )
};

// ============================================================================
// Registry
// ============================================================================

/// Every ability the crate knows about, for lookup and validation.
pub static ALL_ABILITIES: &[&AbilityInfo] = &[
    // Death Knight
    &DEATH_GRIP,
    &DARK_COMMAND,
    &ICY_TOUCH,
    &PLAGUE_STRIKE,
    &PESTILENCE,
    &BLOOD_BOIL,
    &HEART_STRIKE,
    &DEATH_STRIKE,
    &DEATH_COIL,
    &BONE_SHIELD,
    &ICEBOUND_FORTITUDE,
    &VAMPIRIC_BLOOD,
    &DEATH_PACT,
    &DANCING_RUNE_WEAPON,
    &HORN_OF_WINTER,
    &OBLITERATE,
    &FROST_STRIKE,
    &HOWLING_BLAST,
    &MIND_FREEZE,
    &EMPOWER_RUNE_WEAPON,
    &SCOURGE_STRIKE,
    &DEATH_AND_DECAY,
    &RAISE_DEAD,
    &SUMMON_GARGOYLE,
    // Priest
    &MIND_BLAST,
    &SHADOW_WORD_PAIN,
    &VAMPIRIC_TOUCH,
    &DEVOURING_PLAGUE,
    &VOID_ERUPTION,
    &VOID_BOLT,
    &MIND_FLAY,
    &SHADOW_WORD_DEATH,
    &SHADOWFORM,
    &POWER_WORD_FORTITUDE,
    &DISPERSION,
    &SILENCE,
    // Paladin
    &HOLY_SHOCK,
    &WORD_OF_GLORY,
    &LIGHT_OF_DAWN,
    &FLASH_OF_LIGHT,
    &HOLY_LIGHT,
    &BEACON_OF_LIGHT,
    &LAY_ON_HANDS,
    &CLEANSE,
    &JUDGMENT,
    // Warrior
    &MORTAL_STRIKE,
    &OVERPOWER,
    &EXECUTE,
    &SLAM,
    &REND,
    &CHARGE,
    &PUMMEL,
    &BLADESTORM,
    &SWEEPING_STRIKES,
    &BATTLE_SHOUT,
    &ENRAGED_REGENERATION,
    // Warlock
    &IMMOLATE,
    &INCINERATE,
    &CONFLAGRATE,
    &CHAOS_BOLT,
    &RAIN_OF_FIRE,
    &SHADOWBURN,
    &UNENDING_RESOLVE,
    &SUMMON_IMP,
    // Monk
    &TIGER_PALM,
    &RISING_SUN_KICK,
    &BLACKOUT_KICK,
    &FISTS_OF_FURY,
    &SPINNING_CRANE_KICK,
    &TOUCH_OF_DEATH,
    &SPEAR_HAND_STRIKE,
    &FORTIFYING_BREW,
    // Shaman
    &RIPTIDE,
    &HEALING_WAVE,
    &HEALING_SURGE,
    &CHAIN_HEAL,
    &HEALING_RAIN,
    &HEALING_TIDE_TOTEM,
    &SPIRIT_LINK_TOTEM,
    &EARTH_SHIELD,
    &WIND_SHEAR,
    &PURIFY_SPIRIT,
    &LIGHTNING_BOLT,
];

/// Look an ability up by id.
pub fn find(id: SpellId) -> Option<&'static AbilityInfo> {
    ALL_ABILITIES.iter().copied().find(|a| a.id == id)
}

/// Ability name for logging, falling back to the raw id.
pub fn name_of(id: SpellId) -> String {
    match find(id) {
        Some(info) => info.name.to_string(),
        None => format!("spell #{}", id.0),
    }
}

/// Sanity-check the catalog. Returns the ids that fail.
pub fn validate_catalog() -> Result<(), Vec<SpellId>> {
    let mut bad = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for info in ALL_ABILITIES {
        if !seen.insert(info.id) {
            bad.push(info.id);
            continue;
        }
        if info.charges == 0 || info.range < 0.0 {
            bad.push(info.id);
            continue;
        }
        if info.charges > 1 && info.cooldown_ms == 0 {
            bad.push(info.id);
        }
    }
    if bad.is_empty() {
        Ok(())
    } else {
        Err(bad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_valid() {
        assert_eq!(validate_catalog(), Ok(()), "catalog has bad entries");
    }

    #[test]
    fn test_find_round_trips_every_entry() {
        for info in ALL_ABILITIES {
            let found = find(info.id).expect("registered ability must be findable");
            assert_eq!(found.name, info.name);
        }
    }

    #[test]
    fn test_name_of_falls_back_to_id() {
        assert_eq!(name_of(MORTAL_STRIKE.id), "Mortal Strike");
        assert_eq!(name_of(SpellId(999_999)), "spell #999999");
    }

    #[test]
    fn test_interrupts_bypass_the_gcd() {
        for interrupt in [&MIND_FREEZE, &PUMMEL, &SILENCE, &WIND_SHEAR, &SPEAR_HAND_STRIKE] {
            assert!(!interrupt.gcd, "{} must be off the gcd", interrupt.name);
        }
    }

    #[test]
    fn test_dot_appliers_carry_their_aura() {
        let applied = SHADOW_WORD_PAIN.applies.expect("SW:P applies its dot");
        assert_eq!(applied.effect, SHADOW_WORD_PAIN.id);
        assert!(applied.periodic.is_some());
        let ff = ICY_TOUCH.applies.expect("Icy Touch applies Frost Fever");
        assert_eq!(ff.effect, FROST_FEVER_AURA);
    }
}
