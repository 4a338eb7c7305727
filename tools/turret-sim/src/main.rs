//! turret-sim: headless runner for SENTINEL turret scenarios.
//!
//! Usage:
//!   turret-sim run --scenario scenarios/courtyard.json --ticks 600
//!   turret-sim random --seed 42 --targets 8 --obstacles 4 --ticks 600

use std::path::PathBuf;
use std::process;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sentinel_core::constants::DT;
use sentinel_core::events::TurretEvent;
use sentinel_core::state::Snapshot;
use sentinel_sim::{Scenario, SimConfig};

const DEFAULT_TICKS: u64 = 600;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "random" => cmd_random(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(message) = result {
        error!("{message}");
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!(
        "turret-sim: SENTINEL turret scenario runner\n\
         \n\
         Commands:\n\
         \n\
         run       Load a scenario JSON file and simulate it\n\
         \n\
           --scenario <path>  Scenario file\n\
           --ticks <N>        Ticks to simulate (default: 600)\n\
           --dt <secs>        Seconds per tick (default: 1/60)\n\
         \n\
         random    Generate a seeded scenario and simulate it\n\
         \n\
           --seed <N>         RNG seed (default: 42)\n\
           --targets <N>      Number of targets (default: 8)\n\
           --obstacles <N>    Number of obstacles (default: 4)\n\
           --ticks <N>        Ticks to simulate (default: 600)\n\
           --dump <path>      Also write the generated scenario JSON\n\
         \n\
         The final snapshot is printed to stdout as JSON. Set RUST_LOG to\n\
         control log output (default: info).\n"
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> Result<T, String> {
    match flag_value(args, flag) {
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("Invalid value for {flag}: {raw}")),
        None => Ok(default),
    }
}

fn cmd_run(args: &[String]) -> Result<(), String> {
    let path = flag_value(args, "--scenario")
        .map(PathBuf::from)
        .ok_or("Missing --scenario <path>")?;
    let ticks = parse_flag(args, "--ticks", DEFAULT_TICKS)?;
    let dt = parse_flag(args, "--dt", DT)?;
    if !(dt.is_finite() && dt > 0.0) {
        return Err(format!("--dt must be positive, got {dt}"));
    }

    let json = std::fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let scenario = Scenario::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))?;

    simulate(&scenario, SimConfig { dt, ..Default::default() }, ticks)
}

fn cmd_random(args: &[String]) -> Result<(), String> {
    let seed = parse_flag(args, "--seed", 42u64)?;
    let targets = parse_flag(args, "--targets", 8usize)?;
    let obstacles = parse_flag(args, "--obstacles", 4usize)?;
    let ticks = parse_flag(args, "--ticks", DEFAULT_TICKS)?;

    let scenario = Scenario::random(seed, targets, obstacles);

    if let Some(dump) = flag_value(args, "--dump") {
        let json = scenario.to_json().map_err(|e| e.to_string())?;
        std::fs::write(dump, json).map_err(|e| format!("Failed to write {dump}: {e}"))?;
        info!(path = dump, "scenario written");
    }

    simulate(&scenario, SimConfig::default(), ticks)
}

fn simulate(scenario: &Scenario, config: SimConfig, ticks: u64) -> Result<(), String> {
    let mut engine = scenario.build_engine(config).map_err(|e| e.to_string())?;

    let mut last = Snapshot::default();
    let mut fired = 0usize;
    let mut held = 0usize;
    for _ in 0..ticks {
        last = engine.tick().map_err(|e| format!("Scene fault at tick {}: {e}", engine.time().tick))?;
        for event in &last.events {
            match event {
                TurretEvent::ShotFired { .. } => fired += 1,
                TurretEvent::ShotHeld { .. } => held += 1,
                _ => {}
            }
        }
    }

    info!(
        ticks,
        elapsed_secs = last.time.elapsed_secs,
        shots_fired = fired,
        shots_held = held,
        projectiles = last.projectiles.len(),
        "simulation finished"
    );

    let json = serde_json::to_string_pretty(&last).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}
