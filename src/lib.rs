//! Parallel particle simulation with BVH triangle collision
//!
//! Every frame each particle is integrated under gravity, its motion segment
//! is tested against a triangle mesh through a flat BVH, and colliding
//! particles bounce off the closest surface. The same kernel runs on a rayon
//! pool or as a wgpu compute shader.

pub mod config;
pub mod constants;
pub mod error;
pub mod gpu;
pub mod kernel;
pub mod mesh;
pub mod particles;
pub mod simulation;
pub mod time;

pub use config::{BackendKind, GizmoConfig, SimulationConfig, SpawnBounds};
pub use error::{SimulationError, SimulationResult};
pub use gpu::buffer_layouts::{BvhNode, ParticleData, SimParams, TriangleData};
pub use kernel::DispatchReport;
pub use mesh::{Aabb, BvhAsset, BvhBuffers, BvhProvider};
pub use simulation::{ParticleBackend, ParticleSimulation, SimulationParameters};
