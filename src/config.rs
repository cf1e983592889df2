//! Simulation configuration
//!
//! Loaded from TOML or built in code. Validation and clamping happen once,
//! here, so per-frame parameter construction never has to re-check.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::defaults;
use crate::error::{invalid_config, SimulationError, SimulationResult};
use crate::mesh::Aabb;

/// Which kernel implementation runs the dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// rayon workgroups on the host
    #[default]
    Cpu,
    /// wgpu compute pipeline
    Gpu,
}

/// Spawn volume, expressed as centre and full size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnBounds {
    pub center: Vec3,
    pub size: Vec3,
}

impl Default for SpawnBounds {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            size: Vec3::splat(defaults::SPAWN_SIZE),
        }
    }
}

impl SpawnBounds {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_size(self.center, self.size)
    }
}

/// Debug overlay options, forwarded to the BVH provider
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GizmoConfig {
    pub depth: u32,
    pub leaf_only: bool,
}

/// Main simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub particle_count: u32,
    pub bounce_rate: f32,
    pub spawn_bounds: SpawnBounds,
    pub gravity: f32,
    pub damping: f32,
    /// Seed for initial positions and colours; entropy when unset
    pub seed: Option<u64>,
    pub backend: BackendKind,
    /// CPU backend threads (0 = one per core)
    pub worker_threads: usize,
    /// Recycle particles that leave the spawn volume
    pub respawn_out_of_bounds: bool,
    pub gizmo: GizmoConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: defaults::PARTICLE_COUNT,
            bounce_rate: defaults::BOUNCE_RATE,
            spawn_bounds: SpawnBounds::default(),
            gravity: defaults::GRAVITY,
            damping: defaults::DAMPING,
            seed: None,
            backend: BackendKind::default(),
            worker_threads: num_cpus::get(),
            respawn_out_of_bounds: true,
            gizmo: GizmoConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> SimulationResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SimulationError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("[Config] Loaded {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> SimulationResult<Self> {
        let config: SimulationConfig = toml::from_str(text)?;
        config.validate()
    }

    /// Reject unusable values and clamp the bounce rate into [0, 1]
    pub fn validate(mut self) -> SimulationResult<Self> {
        if self.particle_count == 0 {
            return Err(invalid_config("particle_count", "must be positive"));
        }

        let bounds = self.spawn_bounds.aabb();
        if !bounds.is_valid() {
            return Err(invalid_config(
                "spawn_bounds",
                format!(
                    "size must be finite and non-negative, got {:?}",
                    self.spawn_bounds.size
                ),
            ));
        }

        for (field, value) in [
            ("bounce_rate", self.bounce_rate),
            ("gravity", self.gravity),
            ("damping", self.damping),
        ] {
            if !value.is_finite() {
                return Err(invalid_config(field, format!("must be finite, got {}", value)));
            }
        }

        if !(0.0..=1.0).contains(&self.bounce_rate) {
            let clamped = self.bounce_rate.clamp(0.0, 1.0);
            log::warn!(
                "[Config] bounce_rate {} outside [0, 1], clamped to {}",
                self.bounce_rate,
                clamped
            );
            self.bounce_rate = clamped;
        }

        if self.worker_threads == 0 {
            self.worker_threads = num_cpus::get();
        }

        Ok(self)
    }
}
