use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use station_sim::scenario::Scenario;
use station_sim::simulation::{CatchmentFlag, SimWorld, StationId};

#[derive(Parser)]
#[command(name = "station_sim")]
#[command(about = "Headless station cargo acceptance and rating simulation")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "1000")]
    ticks: u32,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// JSON scenario to load instead of the built-in test world
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Highlight this station's catchment on the printed map
    #[arg(long)]
    show_catchment: Option<usize>,

    /// Print a summary every this many ticks (0 = only at the start and end)
    #[arg(long, default_value = "0")]
    summary_every: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,station_sim=info"),
    )
    .init();

    let cli = Cli::parse();

    let mut world = match &cli.scenario {
        Some(path) => Scenario::load(path)?
            .build_world(cli.seed)
            .context("Failed to build scenario world")?,
        None => match cli.seed {
            Some(seed) => SimWorld::create_test_world_with_seed(seed),
            None => SimWorld::create_test_world(),
        },
    };

    run_headless(&mut world, &cli);
    Ok(())
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(world: &mut SimWorld, cli: &Cli) {
    println!("Running station simulation in headless mode...");
    println!("Ticks: {}", cli.ticks);
    println!();

    if let Some(index) = cli.show_catchment {
        world.set_catchment_display(StationId::from_index(index), CatchmentFlag::DISPLAY);
    }

    println!("Initial state:");
    world.print_summary();
    world.draw_map();

    let mut well_served_ticks = 0u64;
    for tick in 1..=cli.ticks {
        let well_served = world.tick();
        well_served_ticks += well_served.len() as u64;

        if cli.summary_every > 0 && tick % cli.summary_every == 0 && tick < cli.ticks {
            println!("--- After tick {} ---", tick);
            world.print_summary();
        }
    }

    let messages = world.messages.drain();
    for message in &messages {
        info!(
            "Message {:?}: company {} station {} cargo {}",
            message.kind,
            message.company.0,
            message.station.0,
            message.cargo.index()
        );
    }

    println!("=== Final State ===");
    world.print_summary();
    world.draw_map();

    info!("=== SIMULATION COMPLETE ===");
    info!("Ticks run: {}", world.ticks);
    info!("Stations: {}", world.stations().count());
    info!("Messages posted: {}", messages.len());
    info!("Redraw requests: {}", world.windows.drain().len());
    info!("Well-served station ticks: {}", well_served_ticks);
}
