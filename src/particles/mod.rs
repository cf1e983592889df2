pub mod particle_store;
pub mod random;

pub use particle_store::{spawn_particle, ParticleStore};
