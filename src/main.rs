//! Headless planet LOD driver.
//!
//! Builds a planet from a TOML config, flies a camera from orbit toward the
//! top face and logs how the quadtrees and the render intake react.

mod config;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{debug, info, warn};

use planet_geom::DVec3;
use planet_runtime::{DEFAULT_WORKER_NAME, MeshQueue};
use planet_surface::{DrainStats, Planet, SplitTask};

use config::{PlanetConfig, load_config_from_path};

const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "planet-lod")]
#[command(author, version, about = "Adaptive cube-sphere terrain flythrough", long_about = None)]
struct Cli {
    /// Planet config (TOML). Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `flight.frames`.
    #[arg(short, long)]
    frames: Option<u32>,

    /// Complete every split on the main thread instead of the mesh worker.
    #[arg(long)]
    force: bool,

    /// Log filter, same syntax as RUST_LOG (e.g. `debug`, `planet_surface=debug`).
    #[arg(long)]
    log_level: Option<String>,

    /// Log per-layer stats every N frames.
    #[arg(long, default_value = "30")]
    report_every: u32,
}

fn init_logging(level: Option<&str>) {
    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(filters) = level {
        builder.parse_filters(filters);
    }
    builder.format_timestamp_millis().init();
}

fn report(frame: u32, planet: &Planet) {
    for (i, layer) in planet.layers().iter().enumerate() {
        let s = layer.mesh().stats();
        let registry = layer.integrator().registry();
        info!(
            "frame {} layer {}: nodes={} leaves={} pending={} max_level={} created={} active={}",
            frame,
            i,
            s.nodes,
            s.leaves,
            s.pending_splits,
            s.max_level,
            registry.global().len(),
            registry.active().len()
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let mut cfg = match &cli.config {
        Some(path) => {
            let cfg = load_config_from_path(path)?;
            info!("loaded planet config from {}", path.display());
            cfg
        }
        None => {
            info!("no --config given, using built-in defaults");
            PlanetConfig::default()
        }
    };
    if let Some(frames) = cli.frames {
        cfg.flight.frames = frames;
    }
    if cfg.layers.is_empty() {
        return Err("planet config has no [[layers]]".into());
    }

    let queue: MeshQueue<SplitTask> = MeshQueue::start_named(DEFAULT_WORKER_NAME)?;
    let position = cfg.planet.position();
    let mut planet = Planet::new(position, queue.clone());
    for (i, layer) in cfg.layers.iter().enumerate() {
        let built = planet.add_layer(layer.surface(&cfg.lod), layer.displacement()?)?;
        info!(
            "layer {}: radius={} skirt_depth={} max_displacement={} roots={}",
            i,
            layer.radius,
            layer.skirt_depth,
            layer.max_displacement,
            built.mesh().roots().len()
        );
    }

    let surface_radius = cfg.layers.iter().map(|l| l.radius).fold(0.0_f64, f64::max);
    let started = Instant::now();
    let mut total = DrainStats::default();
    for frame in 0..cfg.flight.frames {
        let altitude = cfg.flight.altitude(frame);
        let camera = position + DVec3::Y * (surface_radius + altitude);
        let stats = if cli.force {
            planet.force_update(camera)?
        } else {
            planet.update(camera)?
        };
        if !stats.is_empty() {
            debug!("frame {} altitude {:.1}: {:?}", frame, altitude, stats);
        }
        total.accumulate(stats);
        if cli.report_every > 0 && frame % cli.report_every == 0 {
            report(frame, &planet);
        }
    }

    if !queue.wait_idle(IDLE_TIMEOUT) {
        warn!("mesh worker still busy after {:?} ({} pending)", IDLE_TIMEOUT, queue.pending());
    }
    total.accumulate(planet.drain());
    report(cfg.flight.frames, &planet);
    info!(
        "flythrough done in {:.2?}: {} frames, {} mesh tasks, {:?}",
        started.elapsed(),
        cfg.flight.frames,
        queue.executed(),
        total
    );

    drop(planet);
    queue.release();
    Ok(())
}
