//! # engine_app
//!
//! Headless runner for the engine. Builds the demo scene, then drives it
//! with a fixed-rate `update → draw → refresh` loop until the tick limit is
//! reached or something clears the world's run flag (the quit key, or a
//! component whose required dependency was missing).
//!
//! Drawing goes to an in-memory frame buffer; only draw-call counts are
//! logged.

mod config;
mod scene;
mod tick;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use tick::TickLoop;

#[derive(Debug, Parser)]
#[command(name = "engine_app", about = "Run the engine's demo scene headless")]
struct Args {
    /// JSON config file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Stop after this many ticks (0 = until quit).
    #[arg(long)]
    ticks: Option<u64>,
    /// Target ticks per second.
    #[arg(long)]
    tick_rate: Option<f64>,
}

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?.with_overrides(args.ticks, args.tick_rate);
    config.validate()?;

    info!(
        tick_rate = config.tick_rate,
        max_ticks = config.max_ticks,
        layers = config.layers.len(),
        "engine starting"
    );

    let scene = scene::build(&config)?;
    let mut tick_loop = TickLoop::from_scene(
        scene,
        config.tick_config(),
        config.layers.clone(),
        config.inputs.clone(),
    );
    let ticks = tick_loop.run()?;

    info!(
        ticks,
        tick_id = tick_loop.tick_id(),
        paused = tick_loop.is_paused(),
        last_frame = tick_loop.frame().len(),
        draw_calls = tick_loop.draw_calls(),
        entities = tick_loop.world().entity_count(),
        "engine stopped"
    );
    Ok(())
}
