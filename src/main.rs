//! Salient - Entry Point
//!
//! Headless simulation runner: loads a scenario, wires the offline route
//! and terrain collaborators onto a tokio runtime, and advances the world
//! tick by tick, optionally streaming visualization frames as JSON lines.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::runtime::Runtime;

use salient::core::error::Result;
use salient::routing::{GreatCircleRouter, NavigationService, RollingTerrain};
use salient::scenario::{build_world, Scenario};
use salient::viz::{JsonlSink, NullSink, VisualizationSink};

#[derive(Parser, Debug)]
#[command(name = "salient")]
#[command(about = "Battalion-scale engagement simulator")]
struct Args {
    /// Scenario file (TOML)
    scenario: PathBuf,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 720)]
    ticks: u64,

    /// Simulated seconds per tick (overrides the scenario)
    #[arg(long)]
    tick_secs: Option<f64>,

    /// Random seed for deterministic runs (overrides the scenario)
    #[arg(long)]
    seed: Option<u64>,

    /// Write visualization frames as JSON lines to this file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Stop early once at most one side has live collections
    #[arg(long)]
    until_decided: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "salient=info".into()),
        )
        .init();

    let args = Args::parse();
    let scenario = Scenario::load(&args.scenario)?;
    let mut world = build_world(&scenario);
    if let Some(tick_secs) = args.tick_secs {
        world.config.tick_seconds = tick_secs;
    }
    if let Some(seed) = args.seed {
        world.config.seed = seed;
        world.rng = rand::SeedableRng::seed_from_u64(seed);
    }

    let rt = Runtime::new()?;
    let mut nav = NavigationService::new(
        GreatCircleRouter::default(),
        RollingTerrain::default(),
        rt.handle().clone(),
        Duration::from_secs_f64(world.config.router_retry_delay_secs),
    );

    let mut sink: Box<dyn VisualizationSink> = match &args.output {
        Some(path) => Box::new(JsonlSink::new(BufWriter::new(File::create(path)?))),
        None => Box::new(NullSink),
    };

    tracing::info!(
        collections = world.collections.len(),
        ticks = args.ticks,
        "simulation starting"
    );

    for _ in 0..args.ticks {
        world.tick(&mut nav, sink.as_mut())?;
        if world.clock.tick % 100 == 0 {
            tracing::info!(
                tick = world.clock.tick,
                elapsed_secs = world.clock.elapsed_secs,
                live = world.live_count(),
                "progress"
            );
        }
        if args.until_decided && decided(&world) {
            tracing::info!(tick = world.clock.tick, "engagement decided");
            break;
        }
    }

    println!(
        "simulated {} ticks ({:.0} s); {} of {} collections remain",
        world.clock.tick,
        world.clock.elapsed_secs,
        world.live_count(),
        world.collections.len()
    );
    for collection in &world.collections {
        let state = if collection.eliminated {
            "eliminated".to_string()
        } else {
            format!("health {:.1}", collection.health())
        };
        println!(
            "  [team {}] {} - {}",
            collection.team.0, collection.name, state
        );
    }
    Ok(())
}

/// At most one team still fields a live collection.
fn decided(world: &salient::world::SimulationWorld) -> bool {
    let mut teams: Vec<u8> = world
        .collections
        .iter()
        .filter(|c| !c.eliminated)
        .map(|c| c.team.0)
        .collect();
    teams.sort_unstable();
    teams.dedup();
    teams.len() <= 1
}
