//! Headless driver: loads a config, drops the particles onto a ground quad
//! and runs a fixed number of frames.
//!
//! Usage: bvh-particles [config.toml] [frames]

use std::time::Instant;

use anyhow::{Context, Result};

use bvh_particles::constants::defaults;
use bvh_particles::{BvhAsset, BvhProvider, ParticleSimulation, SimulationConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimulationConfig::load(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => {
            log::info!("[Driver] No config given, using defaults");
            SimulationConfig::default()
        }
    };
    let frames = match args.next() {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("frame count must be a non-negative integer, got {}", raw))?,
        None => defaults::DRIVER_FRAMES,
    };

    let bounds = config.spawn_bounds.aabb();
    let ground = BvhAsset::ground_quad(&bounds, bounds.min.y);
    let gizmo = config.gizmo;
    log::info!(
        "[Driver] Ground at y={:.2}, {} gizmo boxes at depth {}",
        bounds.min.y,
        ground.gizmo_boxes(gizmo.depth, gizmo.leaf_only).len(),
        gizmo.depth
    );

    let mut simulation = ParticleSimulation::new(config)?;
    simulation.initialize(&ground)?;

    let started = Instant::now();
    let mut collisions = 0u64;
    let mut respawns = 0u64;
    for _ in 0..frames {
        let report = simulation.advance(defaults::FIXED_DELTA_TIME)?;
        collisions += report.collisions as u64;
        respawns += report.respawns as u64;
    }
    let elapsed = started.elapsed();

    let particles = simulation.particles()?;
    let mean_height = particles.iter().map(|p| p.position[1]).sum::<f32>() / particles.len() as f32;

    log::info!(
        "[Driver] {} frames of {} particles in {:.2?} ({:.3} ms/frame)",
        frames,
        simulation.particle_count(),
        elapsed,
        elapsed.as_secs_f64() * 1000.0 / frames.max(1) as f64
    );
    log::info!(
        "[Driver] {} collisions, {} respawns, mean height {:.3}",
        collisions,
        respawns,
        mean_height
    );

    simulation.shutdown();
    Ok(())
}
