use std::sync::Arc;

use crate::error::{SimulationError, SimulationResult};

/// Headless device and queue for compute work
#[derive(Clone)]
pub struct GpuContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub adapter_name: String,
}

impl GpuContext {
    /// Blocking version of `request_async`
    pub fn request() -> SimulationResult<Self> {
        pollster::block_on(Self::request_async())
    }

    pub async fn request_async() -> SimulationResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| SimulationError::DeviceUnavailable {
                message: "no compatible adapter found".to_string(),
            })?;

        let info = adapter.get_info();
        log::info!(
            "[GpuContext] Using adapter {} ({:?})",
            info.name,
            info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Particle Compute Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                },
                None,
            )
            .await
            .map_err(|e| SimulationError::DeviceUnavailable {
                message: e.to_string(),
            })?;

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter_name: info.name,
        })
    }
}
