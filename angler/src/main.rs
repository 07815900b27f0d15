//! Autonomous fishing-session runner.
//!
//! The library owns the control loop; this binary is a thin operator layer:
//! validate a session config, inspect the built-in catalog, or drive a full
//! demo session against the in-memory simulator at the reference 2 Hz
//! cadence.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use angler::core::catalog::{BankLocation, FishingLocation};
use angler::core::config::{SessionConfig, load_config};
use angler::core::geometry::WorldPoint;
use angler::core::transitions::State;
use angler::exit_codes;
use angler::logging;
use angler::machine::FishingMachine;
use angler::metrics::MetricsService;
use angler::navigation::Mover;
use angler::sim::{SimMover, SimWorld, StaticPrices};
use angler::world::{SkillSnapshot, WorldSnapshot};

#[derive(Parser)]
#[command(name = "angler", version, about = "Autonomous fishing-session runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that a session config resolves against the catalog.
    Validate {
        /// Path to the session TOML.
        #[arg(short, long, default_value = "session.toml")]
        config: PathBuf,
    },
    /// List known fishing locations and banks.
    Catalog,
    /// Drive a scripted session end to end and print the metrics snapshot.
    Demo {
        /// Path to the session TOML; defaults are used when missing.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Stop after this many completed trips.
        #[arg(long, default_value_t = 1)]
        trips: u32,
        /// Hard tick budget for the whole session.
        #[arg(long, default_value_t = 2000)]
        max_ticks: u32,
        /// Tick interval in milliseconds (reference cadence is 500).
        #[arg(long, default_value_t = 500)]
        tick_millis: u64,
    },
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Validate { config } => cmd_validate(&config),
        Command::Catalog => cmd_catalog(),
        Command::Demo {
            config,
            trips,
            max_ticks,
            tick_millis,
        } => cmd_demo(config.as_deref(), trips, max_ticks, tick_millis),
    }
}

fn cmd_validate(path: &std::path::Path) -> Result<i32> {
    let cfg = load_config(path)?;
    let resolved = cfg.resolve().context("resolve session config")?;
    println!(
        "ok: {} ({}) for {}, full-storage policy {:?}",
        resolved.fishing.name, resolved.method.name, resolved.target.name, resolved.storage_full_policy
    );
    if let Some(bank) = resolved.bank {
        println!("bank: {}", bank.name);
    }
    Ok(exit_codes::OK)
}

fn cmd_catalog() -> Result<i32> {
    println!("Fishing locations:");
    for location in FishingLocation::all() {
        let requirements = location.requirements.unwrap_or("none");
        println!(
            "  {} - {} (requirements: {})",
            location.name, location.method.name, requirements
        );
    }
    println!("Banks:");
    for bank in BankLocation::all() {
        let anchor = bank.anchor.map_or("none", |a| a.name());
        println!("  {} (anchor: {})", bank.name, anchor);
    }
    Ok(exit_codes::OK)
}

fn cmd_demo(
    config_path: Option<&std::path::Path>,
    trips: u32,
    max_ticks: u32,
    tick_millis: u64,
) -> Result<i32> {
    let cfg = match config_path {
        Some(path) => load_config(path)?,
        None => SessionConfig::default(),
    };
    let resolved = cfg.resolve().context("resolve session config")?;

    // Scripted environment: player at the spot, one fishing spot nearby, a
    // bank booth at the bank if one is configured.
    let center = resolved.fishing.area.center();
    let world = SimWorld::new(center);
    world.add_entity(
        resolved.method.spot_name,
        WorldPoint::new(center.x + 2, center.y + 1, center.plane),
    );
    if let Some(bank) = resolved.bank {
        world.add_entity("Bank booth", bank.area.center());
    }
    world.update(|state| {
        state.animation_active = true;
        state.skill = SkillSnapshot {
            level: resolved.target.level,
            xp: 0,
            xp_to_next_level: 1_000,
        };
    });

    let mut mover = SimMover::new(world.clone());
    mover.teleport_landing = Some(WorldPoint::new(center.x + 30, center.y, center.plane));
    let prices = StaticPrices::new(
        resolved
            .method
            .fish
            .iter()
            .map(|fish| (fish.item_id, i64::from(fish.level) * 10)),
    );
    let metrics = Arc::new(MetricsService::new(Arc::new(prices)));
    let mut machine = FishingMachine::new(
        resolved,
        world.clone(),
        Arc::new(mover) as Arc<dyn Mover>,
        Arc::clone(&metrics),
    );

    machine.start();
    for _ in 0..max_ticks {
        machine.tick();
        // The simulated spot yields one catch per tick while gathering.
        let gathering = matches!(machine.state(), State::Fishing | State::WaitingForFish);
        if gathering && !world.storage_full() {
            world.add_item(resolved.target.item_id);
        }
        if metrics.completed_trips() >= trips || machine.state() == State::Error {
            break;
        }
        thread::sleep(Duration::from_millis(tick_millis));
    }
    let errored = machine.state() == State::Error;
    machine.stop();

    println!(
        "{}",
        serde_json::to_string_pretty(&metrics.snapshot()).context("serialize metrics")?
    );
    Ok(if errored {
        exit_codes::ERRORED
    } else {
        exit_codes::OK
    })
}
