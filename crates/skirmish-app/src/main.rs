//! Headless battle runner.
//!
//! Sets up a scripted skirmish, drives the engine at the fixed tick rate,
//! and reports the outcome. Useful for balance runs and benchmarks;
//! rendering and input live in separate frontends.

mod game_loop;

use clap::Parser;

use skirmish_core::constants::TICK_RATE;
use skirmish_core::enums::{Faction, WeaponKind};
use skirmish_core::state::WorldSnapshot;
use skirmish_sim::engine::{SimConfig, SimulationEngine};
use skirmish_sim::{weapons, world_setup};

#[derive(Parser, Debug)]
#[command(name = "skirmish", about = "Headless tactical combat simulation runner")]
struct Args {
    /// RNG seed; equal seeds replay the same battle.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 3000)]
    ticks: u64,

    /// Simulation speed multiplier when pacing in real time.
    #[arg(long, default_value_t = 1.0)]
    time_scale: f64,

    /// Pace ticks against the wall clock instead of running flat out.
    #[arg(long)]
    realtime: bool,

    /// Print the final snapshot as JSON.
    #[arg(long)]
    json: bool,

    /// Map edge the monster pack spawns from (left/right/top/bottom).
    #[arg(long, default_value = "bottom")]
    monster_edge: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let monster_edge = match world_setup::parse_region(&args.monster_edge) {
        Ok(region) => region,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let mut engine = SimulationEngine::new(SimConfig {
        seed: args.seed,
        ..Default::default()
    });
    setup_battle(&mut engine, monster_edge);

    let config = game_loop::LoopConfig {
        time_scale: args.time_scale,
        max_ticks: args.ticks,
        realtime: args.realtime,
    };

    let mut last: Option<WorldSnapshot> = None;
    game_loop::run(&mut engine, &config, |snapshot| {
        if snapshot.time.tick % (TICK_RATE as u64 * 5) == 0 {
            log::info!(
                "tick {} | units {} | projectiles {} | money {:.0}",
                snapshot.time.tick,
                snapshot.units.len(),
                snapshot.projectiles.len(),
                snapshot.score.money,
            );
        }
        last = Some(snapshot.clone());
    });

    let Some(snapshot) = last else {
        return;
    };

    if args.json {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{json}"),
            Err(err) => log::error!("failed to serialize snapshot: {err}"),
        }
        return;
    }

    println!(
        "after {} ticks: {} units alive, {} kills, {} losses, {:.0}$",
        snapshot.time.tick,
        snapshot.units.len(),
        snapshot.score.enemies_killed,
        snapshot.score.units_lost,
        snapshot.score.money,
    );
    for stat in &snapshot.weapon_stats {
        println!(
            "{:<16} fired {:>5} hit {:>5} acc {:>5.2} eff {:>5.2} dmg {:>8.0}",
            stat.name, stat.shots_fired, stat.shots_hit, stat.accuracy, stat.efficiency, stat.damage_hit,
        );
    }
}

/// Script a three-sided battle: a player force with a base and turret
/// against an enemy battalion, with a monster pack closing in.
fn setup_battle(engine: &mut SimulationEngine, monster_edge: skirmish_core::enums::SpawnRegion) {
    let spawn = |engine: &mut SimulationEngine, bp| {
        if let Err(err) = engine.insert_unit(bp) {
            log::error!("spawn rejected: {err}");
        }
    };

    let bp = {
        let rng = engine.rng();
        world_setup::base(rng, 700.0, 1000.0, Faction::Black)
    };
    spawn(engine, bp);

    let bp = {
        let rng = engine.rng();
        world_setup::turret(rng, 900.0, 1200.0, Faction::Black)
    };
    spawn(engine, bp);

    spawn(
        engine,
        world_setup::fighter(800.0, 900.0, weapons::build(WeaponKind::AssaultRifle)),
    );
    spawn(
        engine,
        world_setup::fighter(820.0, 1100.0, weapons::build(WeaponKind::Shotgun)),
    );

    for i in 0..6 {
        let bp = {
            let rng = engine.rng();
            world_setup::infantry(rng, 1000.0, 700.0 + i as f64 * 120.0, Faction::Black)
        };
        spawn(engine, bp);
    }

    for i in 0..5 {
        let bp = {
            let rng = engine.rng();
            world_setup::veteran(rng, 3800.0, 800.0 + i as f64 * 150.0, Faction::Blue)
        };
        spawn(engine, bp);
    }
    for i in 0..4 {
        let bp = {
            let rng = engine.rng();
            world_setup::militia(rng, 4100.0, 900.0 + i as f64 * 140.0, Faction::Blue)
        };
        spawn(engine, bp);
    }

    let big_at = {
        let rng = engine.rng();
        world_setup::random_point(rng, monster_edge, true)
    };
    spawn(engine, world_setup::monster_big(big_at.x, big_at.y, 1.2));
    for _ in 0..4 {
        let at = {
            let rng = engine.rng();
            world_setup::random_point(rng, monster_edge, true)
        };
        spawn(engine, world_setup::monster_fast(at.x, at.y, 1.0));
    }
}
