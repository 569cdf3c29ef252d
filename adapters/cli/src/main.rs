#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Maze Escape session headlessly.

mod script;
mod text;

use std::{
    fs,
    ops::ControlFlow,
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use maze_escape_core::{Motion, Outcome};
use maze_escape_rendering::{Color, Hud, Presentation, RenderingBackend, Scene};
use maze_escape_system_session::{SessionSnapshot, Simulation};
use maze_escape_world::SimulationConfig;

use crate::text::TextBackend;

/// Roll a ball out of a maze while enemies patrol and give chase.
#[derive(Parser, Debug)]
#[command(name = "maze-escape")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input keys, one per tick: w/s roll, a/d turn, '.' waits
    #[arg(short, long, default_value = "")]
    script: String,

    /// Read the input script from a file instead
    #[arg(long, conflicts_with = "script")]
    script_file: Option<PathBuf>,

    /// Maximum number of ticks to simulate
    #[arg(short, long, default_value = "600")]
    ticks: u64,

    /// Simulated milliseconds per tick
    #[arg(long, default_value = "16")]
    tick_ms: u64,

    /// Log an ASCII frame every N ticks (0 logs only the last frame)
    #[arg(long, default_value = "60")]
    frame_every: u64,
}

/// Entry point for the Maze Escape command-line interface.
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<Option<Outcome>> {
    let config = load_config(args.config.as_deref())?;
    let source = match &args.script_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read input script {}", path.display()))?,
        None => args.script.clone(),
    };
    let script: Vec<Option<Motion>> = script::parse(&source).context("invalid input script")?;

    let mut simulation = Simulation::new(&config).context("invalid simulation configuration")?;
    let exit = simulation.session().exit;
    let scene = Scene::capture(simulation.world(), exit, hud(&simulation.session()));
    let presentation = Presentation::new("Maze Escape", Color::from_rgb_u8(0, 0, 0), scene);
    let backend = TextBackend::new(Duration::from_millis(args.tick_ms), args.frame_every);

    let mut inputs = script.into_iter();
    let mut tick: u64 = 0;
    backend.run(presentation, |dt, scene| {
        if let Some(Some(motion)) = inputs.next() {
            simulation.queue_motion(motion);
        }
        let report = simulation.advance(dt);
        tick += 1;
        if let Some(lives) = report.life_lost {
            info!("tick {tick}: caught, {lives} lives left");
        }

        let session = simulation.session();
        *scene = Scene::capture(simulation.world(), exit, hud(&session));
        if session.game_over || tick >= args.ticks {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;

    let session = simulation.session();
    match session.outcome {
        Some(Outcome::Escaped) => info!("escaped in {:.2}s", session.elapsed.as_secs_f32()),
        Some(Outcome::Captured) => info!("captured after {:.2}s", session.elapsed.as_secs_f32()),
        None => info!(
            "stopped after {tick} ticks with {} lives left",
            session.lives
        ),
    }
    Ok(session.outcome)
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    SimulationConfig::from_toml_str(&contents)
        .with_context(|| format!("failed to parse configuration {}", path.display()))
}

fn hud(session: &SessionSnapshot) -> Hud {
    Hud {
        elapsed: session.elapsed,
        lives: session.lives,
        chased: session.any_chasing,
        outcome: session.outcome,
    }
}
