//! # Poison Demo
//!
//! Runs the Health/Poison scenario and reports each tick through `tracing`.
//!
//! ```text
//! RUST_LOG=info poison_demo --ticks 5 --regen 1
//! ```

use std::path::PathBuf;

use clap::Parser;
use tessel::{run, Scenario};
use tessel_core::{Manager, ManagerConfig};
use tracing_subscriber::EnvFilter;

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Arguments {
    #[arg(
        short = 'c',
        long = "config",
        env = "TESSEL_CONFIG",
        help = "Path to a manager configuration file (TOML)"
    )]
    config_file: Option<PathBuf>,

    #[arg(short = 't', long = "ticks", default_value_t = 5, help = "Number of ticks to run")]
    ticks: u32,

    #[arg(long = "health", default_value_t = 15, help = "Starting player health")]
    health: i32,

    #[arg(
        long = "regen",
        default_value_t = 1,
        help = "Health restored after each tick, 0 to disable"
    )]
    regen: i32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let arguments = Arguments::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_level(true)
        .init();

    let config = match &arguments.config_file {
        Some(path) => ManagerConfig::from_toml_file(path)?,
        None => ManagerConfig::default(),
    };
    tracing::debug!(?config, "configuration loaded");

    let mut manager = Manager::with_config(config);
    let scenario = Scenario {
        health: arguments.health,
        ticks: arguments.ticks,
        regen: arguments.regen,
    };

    let observed = run(&mut manager, scenario)?;
    let survived = observed.last().copied().flatten().is_some();
    tracing::info!(ticks = manager.tick_count(), survived, "scenario finished");
    Ok(())
}
