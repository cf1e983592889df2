//! Compute pipeline running the update kernel on a wgpu device

use std::borrow::Cow;
use std::sync::Arc;

use bytemuck::Zeroable;
use wgpu::util::DeviceExt;

use crate::error::{SimulationError, SimulationErrorContext, SimulationResult};
use crate::gpu::buffer_layouts::{bindings, BvhNode, ParticleData, SimParams, TriangleData};
use crate::gpu::context::GpuContext;
use crate::gpu::shader::{particle_update_source, validate_wgsl, PARTICLE_UPDATE_SHADER};
use crate::kernel::{DispatchReport, DispatchSize};
use crate::mesh::BvhBuffers;
use crate::simulation::ParticleBackend;

/// Device buffers owned by the backend until `release`
struct KernelBuffers {
    particles: wgpu::Buffer,
    nodes: wgpu::Buffer,
    triangles: wgpu::Buffer,
    params: wgpu::Buffer,
    staging: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl KernelBuffers {
    fn destroy(self) {
        self.particles.destroy();
        self.nodes.destroy();
        self.triangles.destroy();
        self.params.destroy();
        self.staging.destroy();
    }
}

/// Update kernel on the GPU
///
/// Particle slots stay resident on the device between frames and are only
/// copied back when read. Collision and respawn counts are not gathered on
/// this backend, so reports carry zero for both.
pub struct GpuParticleBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pipeline: wgpu::ComputePipeline,
    buffers: Option<KernelBuffers>,
    particle_count: u32,
}

impl GpuParticleBackend {
    pub fn new(
        context: &GpuContext,
        particles: &[ParticleData],
        bvh: &BvhBuffers,
    ) -> SimulationResult<Self> {
        let device = context.device.clone();
        let queue = context.queue.clone();

        if particles.is_empty() {
            return Err(SimulationError::InvalidConfig {
                field: "particle_count",
                reason: "no particles to upload".to_string(),
            });
        }

        // Catch the problem before the device does, with a readable message
        let source = particle_update_source();
        validate_wgsl(PARTICLE_UPDATE_SHADER, &source)?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Update Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(source)),
        });

        let particle_bytes = std::mem::size_of_val(particles) as u64;
        let particle_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Buffer"),
            contents: bytemuck::cast_slice(particles),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
        });

        // Zero-sized storage bindings are not allowed; node_count = 0 keeps
        // the placeholder from ever being traversed
        let placeholder_node = [BvhNode::zeroed()];
        let nodes: &[BvhNode] = if bvh.nodes.is_empty() {
            &placeholder_node
        } else {
            &bvh.nodes[..]
        };
        let node_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("BVH Node Buffer"),
            contents: bytemuck::cast_slice(nodes),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let placeholder_triangle = [TriangleData::zeroed()];
        let triangles: &[TriangleData] = if bvh.triangles.is_empty() {
            &placeholder_triangle
        } else {
            &bvh.triangles[..]
        };
        let triangle_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Triangle Buffer"),
            contents: bytemuck::cast_slice(triangles),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sim Params Buffer"),
            size: std::mem::size_of::<SimParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Staging Buffer"),
            size: particle_bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let storage_entry = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Update Bind Group Layout"),
            entries: &[
                storage_entry(bindings::PARTICLE_BUFFER, false),
                storage_entry(bindings::BVH_BUFFER, true),
                storage_entry(bindings::TRIANGLE_BUFFER, true),
                wgpu::BindGroupLayoutEntry {
                    binding: bindings::PARAMS_BUFFER,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Update Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Particle Update Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "update_particles",
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Update Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: bindings::PARTICLE_BUFFER,
                    resource: particle_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: bindings::BVH_BUFFER,
                    resource: node_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: bindings::TRIANGLE_BUFFER,
                    resource: triangle_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: bindings::PARAMS_BUFFER,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(SimulationError::ShaderCompilationFailed {
                shader: PARTICLE_UPDATE_SHADER.to_string(),
                error: error.to_string(),
            });
        }

        log::info!(
            "[GpuParticleBackend] Uploaded {} particles ({} bytes), {} nodes, {} triangles on {}",
            particles.len(),
            particle_bytes,
            bvh.nodes.len(),
            bvh.triangles.len(),
            context.adapter_name
        );

        Ok(Self {
            device,
            queue,
            pipeline,
            buffers: Some(KernelBuffers {
                particles: particle_buffer,
                nodes: node_buffer,
                triangles: triangle_buffer,
                params: params_buffer,
                staging: staging_buffer,
                bind_group,
            }),
            particle_count: particles.len() as u32,
        })
    }

    async fn read_back(&self, buffers: &KernelBuffers) -> SimulationResult<Vec<ParticleData>> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Particle Readback Encoder"),
            });
        encoder.copy_buffer_to_buffer(
            &buffers.particles,
            0,
            &buffers.staging,
            0,
            buffers.staging.size(),
        );
        self.queue.submit(Some(encoder.finish()));

        let buffer_slice = buffers.staging.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            // Receiver only goes away if the caller stopped waiting
            let _ = tx.send(result);
        });

        let _ = self.device.poll(wgpu::Maintain::Wait);

        rx.await
            .map_err(|_| SimulationError::BufferMapFailed {
                message: "mapping callback dropped".to_string(),
            })?
            .map_err(|e| SimulationError::BufferMapFailed {
                message: e.to_string(),
            })?;

        let particles = {
            let data = buffer_slice.get_mapped_range();
            bytemuck::cast_slice::<u8, ParticleData>(&data).to_vec()
        };
        buffers.staging.unmap();

        Ok(particles)
    }
}

impl ParticleBackend for GpuParticleBackend {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn dispatch(&mut self, params: &SimParams) -> SimulationResult<DispatchReport> {
        let Some(buffers) = self.buffers.as_ref() else {
            return Err(SimulationError::ShutDown);
        };

        let size = DispatchSize::for_particles(params.particle_count.min(self.particle_count));
        if size.groups == 0 {
            return Ok(DispatchReport::default());
        }

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        self.queue
            .write_buffer(&buffers.params, 0, bytemuck::bytes_of(params));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Particle Update Encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Particle Update Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &buffers.bind_group, &[]);
            pass.dispatch_workgroups(size.groups, 1, 1);
        }
        self.queue.submit(Some(encoder.finish()));

        match pollster::block_on(self.device.pop_error_scope()) {
            Some(error) => Err(error).dispatch_context("particle update"),
            None => Ok(DispatchReport {
                groups: size.groups,
                lanes: size.lanes,
                collisions: 0,
                respawns: 0,
            }),
        }
    }

    fn read_particles(&mut self) -> SimulationResult<Vec<ParticleData>> {
        let Some(buffers) = self.buffers.as_ref() else {
            return Err(SimulationError::ShutDown);
        };
        pollster::block_on(self.read_back(buffers))
    }

    fn release(&mut self) {
        if let Some(buffers) = self.buffers.take() {
            buffers.destroy();
            log::info!(
                "[GpuParticleBackend] Released buffers for {} particles",
                self.particle_count
            );
        }
    }
}

impl Drop for GpuParticleBackend {
    fn drop(&mut self) {
        self.release();
    }
}
