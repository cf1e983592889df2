//! Simulation lifecycle
//!
//! `ParticleSimulation` is an explicit state machine driven by an external
//! frame loop: `initialize` once, `step` once per frame, `shutdown` once.

pub mod backend;
pub mod params;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{BackendKind, SimulationConfig};
use crate::error::{SimulationError, SimulationResult};
use crate::gpu::buffer_layouts::ParticleData;
use crate::kernel::DispatchReport;
use crate::mesh::{BvhBuffers, BvhProvider};
use crate::particles::ParticleStore;
use crate::time::FrameClock;

pub use backend::{CpuBackend, ParticleBackend};
pub use params::SimulationParameters;

enum Lifecycle {
    Uninitialized,
    Running(Box<dyn ParticleBackend>),
    ShutDown,
}

/// Running state carried alongside the backend
struct Geometry {
    particle_count: u32,
    node_count: u32,
}

pub struct ParticleSimulation {
    config: SimulationConfig,
    lifecycle: Lifecycle,
    geometry: Geometry,
    clock: FrameClock,
}

impl ParticleSimulation {
    /// Validate the configuration. Nothing is allocated yet.
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        Ok(Self {
            config: config.validate()?,
            lifecycle: Lifecycle::Uninitialized,
            geometry: Geometry {
                particle_count: 0,
                node_count: 0,
            },
            clock: FrameClock::new(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Running(_))
    }

    pub fn particle_count(&self) -> u32 {
        self.geometry.particle_count
    }

    pub fn frame_count(&self) -> u64 {
        self.clock.frame_count()
    }

    pub fn backend_name(&self) -> Option<&'static str> {
        match &self.lifecycle {
            Lifecycle::Running(backend) => Some(backend.name()),
            _ => None,
        }
    }

    /// Allocate particles from the configured spawn volume and take the
    /// provider's collision buffers
    pub fn initialize(&mut self, provider: &dyn BvhProvider) -> SimulationResult<()> {
        self.ensure_uninitialized()?;

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let store = ParticleStore::initialize(
            self.config.particle_count,
            &self.config.spawn_bounds.aabb(),
            &mut rng,
        )?;

        self.start(store, provider)
    }

    /// Like `initialize`, with caller-placed particles instead of random spawns
    pub fn initialize_with_particles(
        &mut self,
        provider: &dyn BvhProvider,
        particles: Vec<ParticleData>,
    ) -> SimulationResult<()> {
        self.ensure_uninitialized()?;
        let store = ParticleStore::from_particles(particles)?;
        self.start(store, provider)
    }

    fn ensure_uninitialized(&self) -> SimulationResult<()> {
        match self.lifecycle {
            Lifecycle::Uninitialized => Ok(()),
            Lifecycle::Running(_) => Err(SimulationError::AlreadyInitialized),
            Lifecycle::ShutDown => Err(SimulationError::ShutDown),
        }
    }

    fn start(&mut self, store: ParticleStore, provider: &dyn BvhProvider) -> SimulationResult<()> {
        let bvh = provider.create_buffers()?;
        let height = bvh.validate()?;
        log::info!(
            "[Simulation] BVH with {} nodes, {} triangles, height {}",
            bvh.nodes.len(),
            bvh.triangles.len(),
            height
        );

        let particle_count = store.len() as u32;
        let node_count = bvh.nodes.len() as u32;
        let backend = create_backend(&self.config, store, bvh)?;
        log::info!(
            "[Simulation] Running {} particles on the {} backend",
            particle_count,
            backend.name()
        );

        self.geometry = Geometry {
            particle_count,
            node_count,
        };
        self.lifecycle = Lifecycle::Running(backend);
        Ok(())
    }

    /// Parameters for the next frame from the configuration and the clock.
    /// The clock only moves once the frame is dispatched by `step`.
    pub fn frame_parameters(&self, delta_time: f32) -> SimulationParameters {
        let frame = self.clock.peek_secs(delta_time);
        SimulationParameters::from_config(&self.config, frame)
    }

    /// Dispatch one frame and count it
    pub fn step(&mut self, params: &SimulationParameters) -> SimulationResult<DispatchReport> {
        let backend = match &mut self.lifecycle {
            Lifecycle::Running(backend) => backend,
            Lifecycle::Uninitialized => return Err(SimulationError::NotInitialized),
            Lifecycle::ShutDown => return Err(SimulationError::ShutDown),
        };

        let packed = params.to_gpu(self.geometry.particle_count, self.geometry.node_count);
        let report = backend.dispatch(&packed)?;
        self.clock.tick_secs(params.delta_time);
        log::debug!(
            "[Simulation] t={:.3} dt={:.4}: {} groups, {} collisions, {} respawns",
            params.time,
            params.delta_time,
            report.groups,
            report.collisions,
            report.respawns
        );
        Ok(report)
    }

    /// Build this frame's parameters and dispatch
    pub fn advance(&mut self, delta_time: f32) -> SimulationResult<DispatchReport> {
        let params = self.frame_parameters(delta_time);
        self.step(&params)
    }

    /// Current particle slots
    pub fn particles(&mut self) -> SimulationResult<Vec<ParticleData>> {
        match &mut self.lifecycle {
            Lifecycle::Running(backend) => backend.read_particles(),
            Lifecycle::Uninitialized => Err(SimulationError::NotInitialized),
            Lifecycle::ShutDown => Err(SimulationError::ShutDown),
        }
    }

    /// Release every buffer. Later calls are no-ops.
    pub fn shutdown(&mut self) {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::ShutDown) {
            Lifecycle::Running(mut backend) => {
                backend.release();
                log::info!(
                    "[Simulation] Shut down after {} frames",
                    self.clock.frame_count()
                );
            }
            Lifecycle::Uninitialized | Lifecycle::ShutDown => {}
        }
    }
}

impl Drop for ParticleSimulation {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn create_backend(
    config: &SimulationConfig,
    store: ParticleStore,
    bvh: BvhBuffers,
) -> SimulationResult<Box<dyn ParticleBackend>> {
    match config.backend {
        BackendKind::Cpu => Ok(Box::new(CpuBackend::new(
            store,
            bvh,
            config.worker_threads,
        )?)),
        #[cfg(feature = "gpu")]
        BackendKind::Gpu => {
            let context = crate::gpu::GpuContext::request()?;
            let backend = crate::gpu::GpuParticleBackend::new(&context, store.as_slice(), &bvh)?;
            Ok(Box::new(backend))
        }
        #[cfg(not(feature = "gpu"))]
        BackendKind::Gpu => Err(SimulationError::DeviceUnavailable {
            message: "built without the `gpu` feature".to_string(),
        }),
    }
}
