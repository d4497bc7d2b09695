use std::path::PathBuf;

use clap::{Parser, Subcommand};
use glam::Vec2;
use terrascene_common::SceneConfig;
use terrascene_input::{PointerEvent, PointerTracker};
use terrascene_kernel::Scene;
use terrascene_noise::PermutationTable;
use terrascene_render::{DebugTextRenderer, Projection, Renderer};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "terrascene-cli", about = "Headless tool for terrascene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Sample the noise function at a point
    Sample {
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        x: f64,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        y: f64,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        z: f64,
    },
    /// Run the frame loop headless and print the final scene
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "120")]
        frames: u64,
        /// Seconds per frame
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f64,
        /// Per-frame pointer drag "DX,DY" in pixels, applied from frame 0
        #[arg(long, value_parser = parse_vec2, allow_hyphen_values = true)]
        drag: Option<Vec2>,
        /// Frame at which the drag is released (default: half way)
        #[arg(long)]
        release_at: Option<u64>,
        /// Number of particle positions to print
        #[arg(long, default_value = "5")]
        show: usize,
    },
}

fn parse_vec2(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"DX,DY\", got {s:?}"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad DX {x:?}: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad DY {y:?}: {e}"))?;
    Ok(Vec2::new(x, y))
}

/// Drive `scene` for `frames` frames, dragging by `drag` per frame until
/// `release_at`.
fn simulate(scene: &mut Scene, frames: u64, dt: f64, drag: Option<Vec2>, release_at: u64) {
    let mut pointer = PointerTracker::new();
    let mut cursor = Vec2::ZERO;

    if drag.is_some() {
        scene.apply(pointer.handle(PointerEvent::Down(cursor)));
    }

    for frame in 0..frames {
        if let Some(delta) = drag {
            if frame == release_at {
                scene.apply(pointer.handle(PointerEvent::Up));
            } else if pointer.is_dragging() {
                cursor += delta;
                scene.apply(pointer.handle(PointerEvent::Move(cursor)));
            }
        }
        scene.step(dt);
        tracing::trace!(frame, time = scene.time(), "frame");
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("terrascene-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("noise: {}", terrascene_noise::crate_info());
            println!("input: {}", terrascene_input::crate_info());
            println!("render: {}", terrascene_render::crate_info());
            println!(
                "scene: particles={} terrain={}x{} seed={}",
                config.particle_count,
                config.terrain_segments,
                config.terrain_segments,
                config.seed
            );
        }
        Commands::Sample { x, y, z } => {
            let table = PermutationTable::new();
            let n = table.noise3(x, y, z);
            println!("noise({x}, {y}, {z}) = {n:.17} (bits {:#018x})", n.to_bits());
        }
        Commands::Simulate {
            frames,
            dt,
            drag,
            release_at,
            show,
        } => {
            let mut scene = Scene::new(&config);
            simulate(&mut scene, frames, dt, drag, release_at.unwrap_or(frames / 2));
            tracing::info!("{}", scene.summary());

            let renderer = DebugTextRenderer::with_max_particles(show);
            print!("{}", renderer.render(&scene, &Projection::default()));
        }
    }

    Ok(())
}
