//! Surfline - headless surf run
//!
//! Loads a movement config, builds the demo course and drives the simulation
//! from a scripted input stream, logging telemetry as it goes.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use surfline_game::{InputState, Map, MovementInput, PlayerInput, Simulation, StepOutcome};
use surfline_physics::SurfConfig;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Surf,
    Bhop,
}

#[derive(Parser, Debug)]
#[command(name = "surfline")]
#[command(about = "Run the surf movement simulation headless on the demo course")]
struct Args {
    /// TOML movement config; overrides --preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in tuning preset
    #[arg(short, long, value_enum, default_value = "surf")]
    preset: Preset,

    /// Simulated seconds to run
    #[arg(short, long, default_value = "20")]
    seconds: f32,

    /// Frames per second
    #[arg(short, long, default_value = "60")]
    fps: u32,

    /// Log telemetry every N frames
    #[arg(long, default_value = "30")]
    report_every: u64,
}

/// Scripted player: run forward, hold jump, and sweep the mouse so the air
/// strafes alternate sides.
fn scripted_input(frame: u64) -> PlayerInput {
    let phase = (frame / 45) % 2 == 0;
    PlayerInput {
        movement: MovementInput {
            forward: frame < 120,
            backward: false,
            left: frame >= 120 && !phase,
            right: frame >= 120 && phase,
        },
        mouse_delta: if frame < 120 {
            (0.0, 0.0)
        } else if phase {
            (6.0, 0.0)
        } else {
            (-6.0, 0.0)
        },
        jump: frame % 2 == 0,
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match SurfConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => match args.preset {
            Preset::Surf => SurfConfig::default(),
            Preset::Bhop => SurfConfig::bhop(),
        },
    };

    let mut simulation = match Simulation::new(config) {
        Ok(simulation) => simulation.with_map(Map::surf_course()),
        Err(e) => {
            log::error!("invalid config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let fps = args.fps.max(1);
    let frame_delta = 1.0 / fps as f32;
    let frames = (args.seconds.max(0.0) * fps as f32) as u64;
    let report_every = args.report_every.max(1);
    let mut input_state = InputState::default();
    let mut top_speed = 0.0_f32;

    log::info!("running {} frames at {} fps", frames, fps);

    for frame in 0..frames {
        let snapshot = input_state.snapshot(&scripted_input(frame));

        match simulation.step(&snapshot, frame_delta) {
            Ok(StepOutcome::Advanced(telemetry)) => {
                top_speed = top_speed.max(telemetry.speed);
                if frame % report_every == 0 {
                    log::info!("{}", telemetry);
                }
            }
            Ok(StepOutcome::Paused) => break,
            Err(e) => {
                log::error!("simulation stopped: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    let telemetry = simulation.telemetry();
    let transform = simulation.transform();
    println!(
        "{} frames, {:.1}s simulated, top speed {:.2} m/s, {} respawns, final position {:?}",
        telemetry.frame,
        telemetry.clock_ms / 1000.0,
        top_speed,
        telemetry.respawns,
        transform.position
    );

    ExitCode::SUCCESS
}
