//! Scenario execution
//!
//! Builds a [`SimWorld`] from a scenario, steps every bot through it for
//! the configured number of ticks, and reports the outcome. Suitable for
//! automated testing and batch comparison of rotation changes.

use std::collections::HashSet;
use std::path::Path;

use glam::Vec3;
use serde::Serialize;
use tracing::info;

use crate::abilities;
use crate::classes::{Class, ClassAi, SpecId};
use crate::combat::DecisionKind;
use crate::host::sim::{ScriptedDamage, SimWorld, UnitSeed};
use crate::host::{Guid, PowerKind, TickContext, WeaponProfile};

use super::config::{BotSpec, Scenario, ScenarioError};

/// Outcome of one scenario run, serialized as the driver's JSON report.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub scenario: String,
    pub seed: u64,
    pub ticks_run: u64,
    pub elapsed_ms: u64,
    pub bots_alive: usize,
    pub enemies_alive: usize,
    pub bots: Vec<BotReport>,
}

/// Per-bot outcome and activity counters.
#[derive(Debug, Serialize)]
pub struct BotReport {
    pub name: String,
    pub class: &'static str,
    pub spec: Option<&'static str>,
    pub final_phase: Option<&'static str>,
    pub survived: bool,
    pub final_health: f32,
    pub casts: u64,
    pub moves: u64,
    pub pet_orders: u64,
}

/// Run a validated scenario to completion or tick exhaustion. When
/// `log_path` is set, the full decision log is saved there as JSON.
pub fn run_scenario(
    scenario: &Scenario,
    log_path: Option<&Path>,
) -> Result<RunReport, ScenarioError> {
    let seed = scenario.seed.unwrap_or_else(rand::random);
    info!(
        scenario = scenario.name.as_str(),
        seed,
        ticks = scenario.ticks,
        tick_ms = scenario.tick_ms,
        "starting scenario"
    );

    let mut world = SimWorld::new(seed);
    let mut ais: Vec<ClassAi> = Vec::new();
    let mut bot_names: Vec<String> = Vec::new();

    for bot in &scenario.bots {
        let guid = spawn_bot(&mut world, bot);
        ais.push(ClassAi::new(guid, bot.class, scenario.core.clone()));
        bot_names.push(bot.name.clone());
    }

    for enemy in &scenario.enemies {
        world.spawn(UnitSeed {
            name: enemy.name.clone(),
            team: 2,
            max_health: enemy.health,
            max_power: 0.0,
            position: Vec3::from(enemy.position),
            swing_damage: enemy.swing_damage,
            ..UnitSeed::default()
        });
    }

    for event in &scenario.events {
        // Names were validated against the roster at load time.
        if let Some(target) = world.guid_of(&event.target) {
            world.schedule(ScriptedDamage {
                at_ms: event.at_ms,
                target,
                amount: event.amount,
            });
        }
    }

    world.log.log(
        DecisionKind::Encounter,
        format!("scenario '{}' begins", scenario.name),
    );

    let mut ticks_run = 0;
    for _ in 0..scenario.ticks {
        world.advance(scenario.tick_ms);
        ticks_run += 1;
        if !world.combat_active() {
            world
                .log
                .log(DecisionKind::Encounter, "one side eliminated");
            break;
        }

        // The host keeps each bot pointed at a living enemy.
        for ai in &ais {
            let guid = ai.guid();
            let stale = world
                .target_of(guid)
                .map(|t| !world.is_alive(t))
                .unwrap_or(true);
            if stale {
                let next = world.nearest_hostile(guid);
                world.set_target(guid, next);
            }
        }

        let (units, auras) = world.snapshot();
        let ctx = TickContext {
            now_ms: world.now_ms,
            units: &units,
            auras: &auras,
        };
        let mut decisions = Vec::new();
        for ai in &mut ais {
            if let Some(decision) = ai.update(&ctx, scenario.tick_ms) {
                decisions.push((ai.guid(), decision));
            }
        }
        drop(ctx);
        for (guid, decision) in decisions {
            world.apply(guid, decision);
        }
    }

    let report = build_report(scenario, seed, ticks_run, &world, &ais, &bot_names);
    info!(
        scenario = scenario.name.as_str(),
        ticks_run,
        bots_alive = report.bots_alive,
        enemies_alive = report.enemies_alive,
        "scenario finished"
    );

    if let Some(path) = log_path {
        world.log.save_to_file(path)?;
        info!(path = %path.display(), "decision log saved");
    }
    Ok(report)
}

fn spawn_bot(world: &mut SimWorld, bot: &BotSpec) -> Guid {
    let spec = bot.spec.unwrap_or_else(|| bot.class.first_spec());
    let (power_kind, max_power) = primary_pool(spec);
    let guid = world.spawn(UnitSeed {
        name: bot.name.clone(),
        team: 1,
        role: bot.role,
        max_health: if bot.role.is_tank() { 16_000.0 } else { 10_000.0 },
        max_power,
        power_kind,
        position: Vec3::from(bot.position),
        weapons: weapons_for(spec),
        known_spells: HashSet::new(),
        swing_damage: 0.0,
        ..UnitSeed::default()
    });
    // Death knight specs share a spellbook shape; the stance aura is what
    // tells them apart when no spellbook is reported.
    let presence = match spec {
        SpecId::BloodDeathKnight => Some(abilities::BLOOD_PRESENCE_AURA),
        SpecId::FrostDeathKnight => Some(abilities::FROST_PRESENCE_AURA),
        SpecId::UnholyDeathKnight => Some(abilities::UNHOLY_PRESENCE_AURA),
        _ => None,
    };
    if let Some(aura) = presence {
        world.grant_aura(guid, aura, u64::MAX / 2);
    }
    guid
}

fn primary_pool(spec: SpecId) -> (PowerKind, f32) {
    match spec {
        SpecId::BloodDeathKnight | SpecId::FrostDeathKnight | SpecId::UnholyDeathKnight => {
            (PowerKind::RunicPower, 100.0)
        }
        SpecId::ArmsWarrior => (PowerKind::Rage, 100.0),
        SpecId::WindwalkerMonk => (PowerKind::Energy, 100.0),
        SpecId::ShadowPriest
        | SpecId::HolyPaladin
        | SpecId::DestructionWarlock
        | SpecId::RestorationShaman => (PowerKind::Mana, 10_000.0),
    }
}

fn weapons_for(spec: SpecId) -> WeaponProfile {
    match spec {
        SpecId::WindwalkerMonk => WeaponProfile::DualWield,
        SpecId::ShadowPriest
        | SpecId::HolyPaladin
        | SpecId::DestructionWarlock
        | SpecId::RestorationShaman => WeaponProfile::Caster,
        _ => WeaponProfile::TwoHander,
    }
}

fn build_report(
    scenario: &Scenario,
    seed: u64,
    ticks_run: u64,
    world: &SimWorld,
    ais: &[ClassAi],
    bot_names: &[String],
) -> RunReport {
    let bots = ais
        .iter()
        .zip(bot_names)
        .map(|(ai, name)| BotReport {
            name: name.clone(),
            class: ai.class().name(),
            spec: ai.spec_id().map(|s| s.name()),
            final_phase: ai.phase().map(|p| p.name()),
            survived: world.is_alive(ai.guid()),
            final_health: world.health_of(ai.guid()).unwrap_or(0.0),
            casts: ai.metrics().map(|m| m.casts).unwrap_or(0),
            moves: ai.metrics().map(|m| m.moves).unwrap_or(0),
            pet_orders: ai.metrics().map(|m| m.pet_orders).unwrap_or(0),
        })
        .collect();
    RunReport {
        scenario: scenario.name.clone(),
        seed,
        ticks_run,
        elapsed_ms: world.now_ms,
        bots_alive: world.living_on_team(1),
        enemies_alive: world.living_on_team(2),
        bots,
    }
}
