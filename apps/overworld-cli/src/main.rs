mod demo;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand};
use overworld_common::{Position, RingDefinition};
use overworld_stream::{ConcentricRings, StreamingConfig, StreamingManager};
use overworld_tools::StreamingInspector;
use tracing_subscriber::EnvFilter;

use demo::{DemoGenerator, DemoRemover, DemoWorld};

#[derive(Parser)]
#[command(name = "overworld-cli", about = "CLI tool for overworld streaming")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the default streaming config, or validate a config file
    Config {
        /// YAML file to load and validate
        #[arg(long)]
        validate: Option<PathBuf>,
        /// Print as JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
    /// Walk a synthetic player through a ring world and report streaming state
    Simulate {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "600")]
        ticks: u64,
        /// Player speed in world units per tick
        #[arg(long, default_value = "2.5")]
        speed: f32,
        /// Heading change per tick, in degrees
        #[arg(long, default_value = "0.2")]
        turn: f32,
        /// Simulated milliseconds per tick
        #[arg(long, default_value = "16")]
        tick_ms: u64,
        /// Seed for generated content
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Per-stage generation failure rate in [0, 1]
        #[arg(long, default_value = "0.0")]
        fail_rate: f64,
        /// Fog visibility range override
        #[arg(long)]
        fog: Option<f32>,
        /// Width of each ring in world units
        #[arg(long, default_value = "100.0")]
        ring_width: f32,
        /// Streaming config YAML file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print a tick line every N ticks (0 disables)
        #[arg(long, default_value = "60")]
        report_every: u64,
        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<StreamingConfig> {
    match path {
        Some(path) => {
            let config = StreamingConfig::load(path)
                .with_context(|| format!("loading streaming config from {}", path.display()))?;
            tracing::info!(path = %path.display(), "loaded streaming config");
            Ok(config)
        }
        None => Ok(StreamingConfig::default()),
    }
}

fn ring_definitions() -> Vec<RingDefinition> {
    let kinds: [&[&str]; 4] = [
        &["village"],
        &["farm", "windmill"],
        &["tower", "ruin", "camp"],
        &["ruin", "cave", "shrine", "fort"],
    ];
    kinds
        .iter()
        .enumerate()
        .map(|(ring, types)| RingDefinition {
            ring: ring as u32,
            structure_types: types.iter().map(|s| s.to_string()).collect(),
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("overworld-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("stream: {}", overworld_stream::crate_info());
            println!("tools: {}", overworld_tools::crate_info());
        }
        Commands::Config { validate, json } => {
            let config = load_config(validate.as_ref())?;
            if let Some(path) = &validate {
                println!("{}: valid", path.display());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", config.to_yaml_string()?);
            }
        }
        Commands::Simulate {
            ticks,
            speed,
            turn,
            tick_ms,
            seed,
            fail_rate,
            fog,
            ring_width,
            config,
            report_every,
            json,
        } => {
            let config = load_config(config.as_ref())?;
            let locator =
                ConcentricRings::new(ring_width).with_ring_definitions(ring_definitions());
            let mut manager = StreamingManager::new(
                config,
                locator,
                DemoWorld::new(ring_width, 2),
                DemoGenerator::new(seed, fail_rate),
                DemoRemover::default(),
            )?;
            if let Some(fog) = fog {
                manager.set_fog_visibility_range(fog);
            }

            tracing::info!(
                ticks,
                speed,
                turn,
                seed,
                fail_rate,
                streaming_radius = manager.streaming_radius(),
                unload_radius = manager.unload_radius(),
                "starting simulation"
            );

            let t0 = Instant::now();
            let mut position = Position::ZERO;
            let mut heading = 0.0f32;
            for tick in 0..ticks {
                let now = t0 + Duration::from_millis(tick * tick_ms);
                let report = manager.update(position, now);
                if report_every > 0 && tick % report_every == 0 {
                    if let Some(line) = StreamingInspector::describe_tick(&report) {
                        println!("tick {tick:>6} @ ({:.0}, {:.0}): {line}", position.x, position.z);
                    }
                }
                heading += turn.to_radians();
                position += Position::new(heading.cos(), 0.0, heading.sin()) * speed;
            }

            let snapshot = manager.snapshot();
            tracing::info!(
                loaded = snapshot.loaded_regions,
                failures = snapshot.stats.generation_failures,
                evicted = snapshot.stats.regions_evicted,
                "simulation finished"
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                return Ok(());
            }

            println!();
            println!("{}", StreamingInspector::summary(&snapshot));
            for row in StreamingInspector::ring_rows(&snapshot, 40) {
                println!("  {row}");
            }
            let timer = manager.frame_timer();
            println!(
                "Ticks: total={} gated={} avg={:.2?} max={:.2?}",
                snapshot.stats.ticks,
                snapshot.stats.gated_ticks,
                timer.average(),
                timer.max()
            );
            let generator = manager.generator();
            println!(
                "Content: stage_runs={} rocks_placed={} structures_placed={} releases={}",
                generator.stage_runs,
                generator.rock_count(),
                generator.structures.len(),
                manager.remover().released
            );
        }
    }

    Ok(())
}
