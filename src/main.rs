//! Elementum - Elemental tower-defense combat simulation
//!
//! Runs a scenario headless on a fixed timestep and prints a JSON report.
//!
//! Usage: `elementum [settings.toml]` or `elementum --init` to write the
//! default settings to the config directory.

mod scenario;
mod settings;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use elementum_combat::projectile::PoolOccupancy;
use elementum_combat::{log_matchup_table, Battlefield, CombatEvent, ProjectileStats};
use elementum_core::GameTime;

use scenario::WaveSpawner;
use settings::SimSettings;

/// Outcome of one run, printed as JSON
#[derive(Debug, Serialize)]
struct SimulationReport {
    simulated_seconds: f64,
    frames: u64,
    enemies_spawned: u32,
    enemies_killed: u32,
    enemies_leaked: u32,
    gold_earned: u64,
    base_damage_taken: i64,
    damage_by_element: BTreeMap<String, i64>,
    statuses_applied: BTreeMap<String, u32>,
    zones_spawned: u32,
    stats: ProjectileStats,
    pools: Vec<PoolOccupancy>,
}

/// Tallies drained battlefield events
#[derive(Debug, Default)]
struct EventTally {
    damage_by_element: BTreeMap<String, i64>,
    statuses_applied: BTreeMap<String, u32>,
    zones_spawned: u32,
}

impl EventTally {
    fn record(&mut self, event: &CombatEvent) {
        match event {
            CombatEvent::Damage {
                enemy,
                amount,
                element,
                source,
            } => {
                debug!("{:?} took {} {} damage ({:?})", enemy, amount, element.name(), source);
                *self
                    .damage_by_element
                    .entry(element.name().to_string())
                    .or_default() += i64::from(*amount);
            }
            CombatEvent::StatusApplied { enemy, kind } => {
                debug!("{:?} afflicted with {}", enemy, kind.name());
                *self.statuses_applied.entry(kind.name().to_string()).or_default() += 1;
            }
            CombatEvent::ZoneSpawned { .. } => self.zones_spawned += 1,
            CombatEvent::Killed { .. }
            | CombatEvent::Leaked { .. }
            | CombatEvent::ProjectileExpired { .. }
            | CombatEvent::ZoneExpired { .. } => {}
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging; the JSON report owns stdout
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("--init") {
        let path = SimSettings::default().save()?;
        println!("{}", path.display());
        return Ok(());
    }

    let settings = SimSettings::load(arg.map(PathBuf::from).as_deref())?;
    settings.time.validate().context("Invalid time configuration")?;
    settings.run.validate(&settings.time)?;

    info!("Starting Elementum simulation...");
    log_matchup_table();

    let report = run(&settings)?;
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{json}");
    Ok(())
}

fn run(settings: &SimSettings) -> Result<SimulationReport> {
    let mut battlefield =
        Battlefield::new(settings.combat.clone()).context("Invalid combat configuration")?;
    for placement in &settings.scenario.turrets {
        battlefield.add_turret(placement.build());
    }

    let scenario = &settings.scenario;
    let mut spawner = WaveSpawner::new(scenario);
    let mut time = GameTime::new(settings.time.clone());
    let step = time.config.fixed_timestep;
    let mut tally = EventTally::default();
    let mut enemies_spawned = 0;

    while time.total_time < f64::from(settings.run.max_duration) {
        time.update(settings.run.frame_delta);

        for _ in 0..time.fixed_steps() {
            for enemy in spawner.tick(step, scenario) {
                battlefield.spawn_enemy(enemy);
                enemies_spawned += 1;
            }
            battlefield.tick(step);
            for event in battlefield.drain_events() {
                tally.record(&event);
            }
        }

        if spawner.is_done(scenario) && battlefield.is_quiet() {
            info!("All waves resolved after {:.1}s", battlefield.elapsed());
            break;
        }
    }

    if settings.run.log_report {
        info!("Projectile stats:\n{}", battlefield.stats().report());
    }
    info!(
        "Killed {} / leaked {} of {} enemies, {} gold earned",
        battlefield.enemies_killed(),
        battlefield.enemies_leaked(),
        enemies_spawned,
        battlefield.gold_earned()
    );

    Ok(SimulationReport {
        simulated_seconds: battlefield.elapsed(),
        frames: time.frame_count,
        enemies_spawned,
        enemies_killed: battlefield.enemies_killed(),
        enemies_leaked: battlefield.enemies_leaked(),
        gold_earned: battlefield.gold_earned(),
        base_damage_taken: battlefield.base_damage_taken(),
        damage_by_element: tally.damage_by_element,
        statuses_applied: tally.statuses_applied,
        zones_spawned: tally.zones_spawned,
        stats: battlefield.stats().clone(),
        pools: battlefield.pool_occupancy(),
    })
}
