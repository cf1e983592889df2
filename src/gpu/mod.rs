//! GPU side of the particle kernel
//!
//! `buffer_layouts` is always built because the CPU kernel works on the same
//! `#[repr(C)]` records. Device, shader and pipeline code need the `gpu`
//! feature.

pub mod buffer_layouts;

#[cfg(feature = "gpu")]
pub mod context;
#[cfg(feature = "gpu")]
pub mod particle_pipeline;
#[cfg(feature = "gpu")]
pub mod shader;

#[cfg(feature = "gpu")]
pub use context::GpuContext;
#[cfg(feature = "gpu")]
pub use particle_pipeline::GpuParticleBackend;
#[cfg(feature = "gpu")]
pub use shader::{particle_update_source, validate_wgsl, wgsl_constants};
