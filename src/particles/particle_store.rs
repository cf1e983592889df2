use glam::Vec3;
use rand::Rng;

use crate::constants::colors;
use crate::error::{invalid_config, SimulationResult};
use crate::gpu::buffer_layouts::ParticleData;
use crate::mesh::Aabb;
use crate::particles::random::seed_for_index;

/// Particle State Store
///
/// Allocated once with a fixed particle count. After initialization only the
/// update kernel writes to the slots; the host reads them back for rendering.
#[derive(Debug, Default)]
pub struct ParticleStore {
    particles: Option<Vec<ParticleData>>,
}

impl ParticleStore {
    /// Allocate `count` particles spread uniformly over `spawn_bounds`
    pub fn initialize<R: Rng + ?Sized>(
        count: u32,
        spawn_bounds: &Aabb,
        rng: &mut R,
    ) -> SimulationResult<Self> {
        if count == 0 {
            return Err(invalid_config("particle_count", "must be positive"));
        }
        if !spawn_bounds.is_valid() {
            return Err(invalid_config(
                "spawn_bounds",
                format!("min {:?} exceeds max {:?}", spawn_bounds.min, spawn_bounds.max),
            ));
        }

        let particles = (0..count)
            .map(|index| spawn_particle(index, spawn_bounds, rng))
            .collect();

        log::info!("[ParticleStore] Initialized {} particles", count);
        Ok(Self {
            particles: Some(particles),
        })
    }

    /// Adopt an explicit particle array, e.g. a hand-placed scene
    pub fn from_particles(particles: Vec<ParticleData>) -> SimulationResult<Self> {
        if particles.is_empty() {
            return Err(invalid_config("particle_count", "must be positive"));
        }
        if let Some(index) = particles.iter().position(|p| p.random_state == 0) {
            return Err(invalid_config(
                "random_state",
                format!("particle {} has the reserved zero state", index),
            ));
        }
        Ok(Self {
            particles: Some(particles),
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.particles.as_ref().map_or(0, Vec::len)
    }

    pub fn is_released(&self) -> bool {
        self.particles.is_none()
    }

    pub fn as_slice(&self) -> &[ParticleData] {
        self.particles.as_deref().unwrap_or(&[])
    }

    /// Mutable slots, handed to the update kernel only
    pub(crate) fn as_mut_slice(&mut self) -> &mut [ParticleData] {
        self.particles.as_deref_mut().unwrap_or(&mut [])
    }

    /// Free the particle array. Safe to call repeatedly.
    pub fn release(&mut self) {
        if let Some(particles) = self.particles.take() {
            log::info!("[ParticleStore] Released {} particles", particles.len());
        }
    }
}

/// Initial state for the particle at `index`
pub fn spawn_particle<R: Rng + ?Sized>(index: u32, spawn_bounds: &Aabb, rng: &mut R) -> ParticleData {
    let random_vector = Vec3::new(rng.gen(), rng.gen(), rng.gen());
    let position = spawn_bounds.min + random_vector * spawn_bounds.size();
    let color = lerp_color(colors::GRAY, colors::WHITE, rng.gen());

    ParticleData::new(position, color, seed_for_index(index))
}

fn lerp_color(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
}
