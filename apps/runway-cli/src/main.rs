use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use runway_common::GeometryHandle;
use runway_kernel::Scene;
use runway_stream::{
    DecorationConfig, DecorationSpawnerKind, LevelConfig, LevelGenerator, ObstacleConfig,
    ObstacleSpawnerKind, Runner, Subject, TileRecord,
};
use runway_tools::{LevelInspector, LevelSummary};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "runway-cli", about = "CLI tool for the endless runway generator")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, crate info and the default level config
    Info,
    /// Generate a level and print its map
    Generate {
        /// Rows to generate after the initial level
        #[arg(short, long, default_value = "20")]
        rows: u32,
        /// RNG seed for deterministic generation
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// YAML level config; built-in demo config if omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Dump the window as JSON instead of the ASCII map
        #[arg(long)]
        json: bool,
    },
    /// Drive a runner through fixed steps
    Run {
        /// Number of fixed steps to simulate
        #[arg(long, default_value = "3600")]
        steps: u32,
        /// Runner speed in world units per second
        #[arg(long, default_value = "12.0")]
        speed: f32,
        /// RNG seed for deterministic generation
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Change lane every N steps
        #[arg(long)]
        lane_every: Option<u32>,
        /// YAML level config; built-in demo config if omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Fixed step length, 60 Hz.
const STEP: f32 = 1.0 / 60.0;

#[derive(Serialize)]
struct WindowDump<'a> {
    summary: LevelSummary,
    tiles: Vec<&'a TileRecord>,
}

fn demo_config() -> LevelConfig {
    LevelConfig {
        obstacles: vec![ObstacleConfig {
            name: "barrier".into(),
            geometry: Some(GeometryHandle(10)),
            spawner: ObstacleSpawnerKind::Center,
        }],
        decorations: vec![
            DecorationConfig {
                name: "door".into(),
                geometry: Some(GeometryHandle(20)),
                spawner: DecorationSpawnerKind::Door,
                spawn_chance: 1.0,
            },
            DecorationConfig {
                name: "curb".into(),
                geometry: Some(GeometryHandle(21)),
                spawner: DecorationSpawnerKind::Curb,
                spawn_chance: 1.0,
            },
        ],
        ..LevelConfig::default()
    }
}

fn load_config(path: Option<PathBuf>, seed: u64) -> anyhow::Result<LevelConfig> {
    let mut config = match path {
        Some(path) => LevelConfig::load(&path)
            .with_context(|| format!("loading level config {}", path.display()))?,
        None => demo_config(),
    };
    config.seed = Some(seed);
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("runway-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("stream: {}", runway_stream::crate_info());
            println!("tools: {}", runway_tools::crate_info());
            let config = LevelConfig::default();
            println!(
                "default level: lanes={} layers={} tile_length={} loop_distance={}",
                config.lane_count(),
                config.layer_count(),
                config.tile_length,
                config.loop_distance()
            );
        }
        Commands::Generate {
            rows,
            seed,
            config,
            json,
        } => {
            let config = load_config(config, seed)?;
            let mut level = LevelGenerator::new(config, Scene::new())?;
            level.create_level();
            level.extend(rows);

            let summary = LevelInspector::summary(level.window(), level.scene());
            if json {
                let dump = WindowDump {
                    summary,
                    tiles: level.window().iter().collect(),
                };
                println!("{}", serde_json::to_string_pretty(&dump)?);
            } else {
                print!("{}", LevelInspector::ascii_map(level.window()));
                println!("{summary}");
            }
        }
        Commands::Run {
            steps,
            speed,
            seed,
            lane_every,
            config,
        } => {
            let config = load_config(config, seed)?;
            let lanes = config.lane_count();
            let lane_width = config.lane_width;
            let mut level = LevelGenerator::new(config, Scene::new())?;
            level.create_level();
            let mut runner = Runner::new(lanes, lane_width, speed);

            println!("Run: seed={seed}, steps={steps}, speed={speed}");
            let mut events = 0;
            let mut direction = 1;
            for step in 1..=steps {
                if let Some(every) = lane_every.filter(|&n| n > 0) {
                    if step % every == 0 {
                        // Bounce between the outer lanes.
                        let lane = runner.lane();
                        if (direction > 0 && lane + 1 >= lanes) || (direction < 0 && lane == 0) {
                            direction = -direction;
                        }
                        runner.change_lane(direction);
                    }
                }
                runner.advance(STEP);
                let report = level.fixed_step(&mut runner);
                if report.rebased {
                    tracing::info!(step, z = runner.position().z, "origin rebased");
                }
                events += level.scene_mut().drain_events().len();
            }

            let stats = level.stats();
            println!("{}", LevelInspector::summary(level.window(), level.scene()));
            println!(
                "Stream: generated={} deleted={} rebases={} lane_changes={} last_step={:?}",
                stats.rows_generated,
                stats.rows_deleted,
                stats.rebases,
                stats.visibility_refreshes,
                stats.last_step
            );
            println!(
                "Placed: obstacles={} decorations={} ramps={} (+{} optional) doors={}",
                stats.obstacles,
                stats.decorations,
                stats.required_ramps,
                stats.optional_ramps,
                stats.doors
            );
            println!(
                "Runner: lane={} z={:.2} scene_events={events} hash={:#x}",
                runner.lane(),
                runner.position().z,
                level.scene().state_hash()
            );
        }
    }

    Ok(())
}
