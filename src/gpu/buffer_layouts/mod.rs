//! Centralized GPU buffer layout definitions
//!
//! Single source of truth for every record shared between the host, the CPU
//! kernel and the WGSL kernel. All records are `#[repr(C)]` + `Pod` and follow
//! WGSL storage/uniform alignment (vec3 fields padded to 16 bytes).

pub mod bvh;
pub mod particle;

#[cfg(test)]
mod tests;

pub use bvh::{BvhNode, TriangleData};
pub use particle::{ParticleData, SimParams};

/// Byte sizes of the shared records
pub const PARTICLE_DATA_SIZE: usize = 48;
pub const BVH_NODE_SIZE: usize = 32;
pub const TRIANGLE_DATA_SIZE: usize = 64;
pub const SIM_PARAMS_SIZE: usize = 64;

/// Buffer binding indices for the particle update kernel
pub mod bindings {
    pub const PARTICLE_BUFFER: u32 = 0;
    pub const BVH_BUFFER: u32 = 1;
    pub const TRIANGLE_BUFFER: u32 = 2;
    pub const PARAMS_BUFFER: u32 = 3;
}
