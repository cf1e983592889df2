//! Particle state and per-frame parameter layouts

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::constants::flags;

/// One particle slot, owned by exactly one kernel lane
/// Total size: 48 bytes (aligned)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleData {
    /// World position
    pub position: [f32; 3],

    /// xorshift state, never zero
    pub random_state: u32,

    /// World velocity
    pub velocity: [f32; 3],

    /// Padding
    pub _padding: f32,

    /// Render colour (RGBA), no simulation effect
    pub color: [f32; 4],
}

impl ParticleData {
    pub fn new(position: Vec3, color: [f32; 4], random_state: u32) -> Self {
        Self {
            position: position.into(),
            random_state,
            velocity: [0.0; 3],
            _padding: 0.0,
            color,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity.into();
        self
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        Vec3::from(self.velocity)
    }
}

/// Simulation parameters uploaded once per frame
/// Total size: 64 bytes (uniform aligned)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SimParams {
    /// Spawn volume minimum corner
    pub spawn_bounds_min: [f32; 3],

    /// Fraction of normal velocity kept after a bounce (0-1)
    pub bounce_rate: f32,

    /// Spawn volume maximum corner
    pub spawn_bounds_max: [f32; 3],

    /// Signed acceleration along the gravity axis
    pub gravity: f32,

    /// Per-frame velocity attenuation (1 = none, 0 = full stop)
    pub damping: f32,

    /// Absolute simulation time in seconds
    pub time: f32,

    /// Frame delta time in seconds
    pub delta_time: f32,

    /// Number of live lanes; lanes at or above this index exit immediately
    pub particle_count: u32,

    /// Number of nodes in the BVH buffer (0 disables collision)
    pub node_count: u32,

    /// See `constants::flags`
    pub flags: u32,

    /// Padding
    pub _padding: [u32; 2],
}

impl SimParams {
    #[inline]
    pub fn spawn_min(&self) -> Vec3 {
        Vec3::from(self.spawn_bounds_min)
    }

    #[inline]
    pub fn spawn_max(&self) -> Vec3 {
        Vec3::from(self.spawn_bounds_max)
    }

    #[inline]
    pub fn respawn_out_of_bounds(&self) -> bool {
        self.flags & flags::RESPAWN_OUT_OF_BOUNDS != 0
    }
}
