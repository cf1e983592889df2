use crate::error::{SimulationError, SimulationResult};
use crate::gpu::buffer_layouts::{ParticleData, SimParams};
use crate::kernel::{dispatch_update, BvhView, DispatchReport};
use crate::mesh::BvhBuffers;
use crate::particles::ParticleStore;

/// A place the update kernel can run.
///
/// Backends own the particle slots and the collision buffers for the lifetime
/// of the simulation. Dispatches are issued strictly one after another.
pub trait ParticleBackend: Send {
    fn name(&self) -> &'static str;

    /// Run one frame over every lane
    fn dispatch(&mut self, params: &SimParams) -> SimulationResult<DispatchReport>;

    /// Snapshot of the particle slots after the last completed dispatch
    fn read_particles(&mut self) -> SimulationResult<Vec<ParticleData>>;

    /// Free every buffer. Safe to call more than once.
    fn release(&mut self);
}

/// Kernel on a dedicated rayon pool
pub struct CpuBackend {
    pool: rayon::ThreadPool,
    store: ParticleStore,
    bvh: Option<BvhBuffers>,
}

impl CpuBackend {
    pub fn new(store: ParticleStore, bvh: BvhBuffers, worker_threads: usize) -> SimulationResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_threads)
            .thread_name(|i| format!("particle-kernel-{}", i))
            .build()
            .map_err(|e| SimulationError::DeviceUnavailable {
                message: format!("worker pool: {}", e),
            })?;

        log::info!(
            "[CpuBackend] {} particles on {} worker threads",
            store.len(),
            pool.current_num_threads()
        );

        Ok(Self {
            pool,
            store,
            bvh: Some(bvh),
        })
    }

    /// Borrow the slots without copying
    pub fn particles(&self) -> &[ParticleData] {
        self.store.as_slice()
    }
}

impl ParticleBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn dispatch(&mut self, params: &SimParams) -> SimulationResult<DispatchReport> {
        let Some(bvh) = self.bvh.as_ref() else {
            return Err(SimulationError::ShutDown);
        };
        if self.store.is_released() {
            return Err(SimulationError::ShutDown);
        }

        let view = BvhView::new(&bvh.nodes, &bvh.triangles);
        let particles = self.store.as_mut_slice();
        Ok(self
            .pool
            .install(|| dispatch_update(particles, params, &view)))
    }

    fn read_particles(&mut self) -> SimulationResult<Vec<ParticleData>> {
        if self.store.is_released() {
            return Err(SimulationError::ShutDown);
        }
        Ok(self.store.as_slice().to_vec())
    }

    fn release(&mut self) {
        self.store.release();
        if self.bvh.take().is_some() {
            log::info!("[CpuBackend] Released BVH buffers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::colors;
    use glam::Vec3;

    fn backend() -> CpuBackend {
        let particles = vec![ParticleData::new(Vec3::ZERO, colors::WHITE, 1).with_velocity(Vec3::Y)];
        let store = ParticleStore::from_particles(particles).unwrap();
        CpuBackend::new(store, BvhBuffers::empty(), 2).unwrap()
    }

    fn params() -> SimParams {
        SimParams {
            spawn_bounds_min: [-1.0; 3],
            bounce_rate: 0.5,
            spawn_bounds_max: [1.0; 3],
            gravity: 0.0,
            damping: 1.0,
            time: 0.1,
            delta_time: 0.1,
            particle_count: 1,
            node_count: 0,
            flags: 0,
            _padding: [0; 2],
        }
    }

    #[test]
    fn test_dispatch_moves_particles() {
        let mut backend = backend();
        let report = backend.dispatch(&params()).unwrap();
        assert_eq!(report.groups, 1);

        let particles = backend.read_particles().unwrap();
        assert!((particles[0].position[1] - 0.1).abs() < 1e-6);
        assert_eq!(backend.particles(), particles.as_slice());
    }

    #[test]
    fn test_released_backend_refuses_work() {
        let mut backend = backend();
        backend.release();
        backend.release();
        assert!(matches!(backend.dispatch(&params()), Err(SimulationError::ShutDown)));
        assert!(matches!(backend.read_particles(), Err(SimulationError::ShutDown)));
    }
}
