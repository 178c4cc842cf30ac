#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the aim trainer.

mod config;
mod simulation;

use std::path::PathBuf;

use aim_trainer_core::{FIELD_HEIGHT, FIELD_WIDTH, WELCOME_BANNER};
use aim_trainer_rendering::{Color, FieldPresentation, Presentation, RenderingBackend, Scene};
use aim_trainer_rendering_macroquad::MacroquadBackend;
use aim_trainer_system_spawning as spawning;
use anyhow::{Context, Result};
use clap::Parser;

use crate::{config::GameConfig, simulation::Simulation};

/// Aim trainer: click randomly spawned targets before the clock runs out.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML file with session tuning and initial slider positions.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seed for wave generation; drawn from the OS when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Render as fast as possible instead of waiting for the display refresh.
    #[arg(long)]
    no_vsync: bool,

    /// Print frame timing once per second.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the aim trainer command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let game_config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => GameConfig::default(),
    };
    let session_config = game_config
        .session_config()
        .context("invalid configuration")?;

    let seed = args.seed.or(game_config.seed).unwrap_or_else(rand::random);
    log::info!("wave seed {seed}");

    let mut simulation = Simulation::new(session_config, spawning::Config::new(seed));
    let mut scene = Scene::new(WELCOME_BANNER);
    simulation.populate_scene(&mut scene);

    let field = FieldPresentation::new(FIELD_WIDTH, FIELD_HEIGHT)?;
    let presentation = Presentation::new("Aim Trainer", Color::BLACK, field, scene);

    MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps)
        .run(presentation, move |now, input, scene| {
            let flow = simulation.advance(now, input);
            simulation.populate_scene(scene);
            flow
        })
        .context("rendering backend failed")
}
