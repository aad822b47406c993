//! GPU plumbing: device acquisition, program compilation, buffers, binding
//! sets, the compute and render stages, and frame capture.

mod bindings;
mod buffers;
mod capture;
mod compute;
mod render;

pub use bindings::{check_binding_sizes, compute_bind_group_layout, BindingPair, BufferBindingSet};
pub use buffers::{
    check_particle_capacity, create_params_buffer, create_vertex_shape_buffer,
    particle_buffer_limit, ParticleStore, PARTICLE_BUFFER_USAGES,
};
pub use capture::{check_target_size, OffscreenTarget};
pub use compute::{dispatch_size, workgroup_size_limit, FlockingKernel};
pub use render::{Rasterizer, TARGET_FORMAT};

use std::sync::mpsc;

use crate::error::GpuError;
use crate::shaders;

/// Device and queue the pipeline runs on.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Acquire a headless device with compute support.
    ///
    /// Fails with [`GpuError::NoAdapter`] or [`GpuError::DeviceCreation`]
    /// before any simulation state exists.
    pub async fn new() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using GPU: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Boids Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        device.on_uncaptured_error(Box::new(|error| {
            log::error!("GPU uncaptured error: {}", error);
        }));

        Ok(Self { device, queue })
    }

    /// Blocking variant of [`GpuContext::new`].
    pub fn new_blocking() -> Result<Self, GpuError> {
        pollster::block_on(Self::new())
    }

    /// Largest workgroup the compute program may declare on this device.
    pub fn max_workgroup_size(&self) -> u32 {
        workgroup_size_limit(&self.device.limits())
    }

    /// Run `f` inside validation and out-of-memory error scopes.
    ///
    /// Anything the device rejects while `f` runs comes back as
    /// [`GpuError::Submission`] instead of reaching the uncaptured handler.
    pub fn scoped<T>(&self, f: impl FnOnce() -> T) -> Result<T, GpuError> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f();
        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());
        match validation.or(out_of_memory) {
            Some(error) => Err(GpuError::Submission(error.to_string())),
            None => Ok(value),
        }
    }

    /// Map a `MAP_READ` buffer and copy its contents out.
    pub(crate) fn read_buffer(&self, buffer: &wgpu::Buffer) -> Result<Vec<u8>, GpuError> {
        let slice = buffer.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                log::error!("Buffer map failed: {:?}", e);
                return Err(GpuError::BufferMapping(e.to_string()));
            }
            Err(_) => {
                log::error!("Buffer map channel disconnected - possible device lost");
                return Err(GpuError::BufferMapping("map callback dropped".into()));
            }
        }

        let bytes = slice.get_mapped_range().to_vec();
        buffer.unmap();
        Ok(bytes)
    }
}

/// Compiled compute and draw programs.
///
/// The compute program bakes in its workgroup size, so the size travels
/// with the module.
pub struct Programs {
    pub compute: wgpu::ShaderModule,
    pub draw: wgpu::ShaderModule,
    workgroup_size: u32,
}

impl Programs {
    /// Compile the generated WGSL for `workgroup_size`.
    pub fn compile(ctx: &GpuContext, workgroup_size: u32) -> Result<Self, GpuError> {
        let compute_src = shaders::compute_shader(workgroup_size);
        let draw_src = shaders::draw_shader();

        ctx.scoped(|| {
            let compute = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Compute Shader"),
                source: wgpu::ShaderSource::Wgsl(compute_src.into()),
            });
            let draw = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Draw Shader"),
                source: wgpu::ShaderSource::Wgsl(draw_src.into()),
            });
            Self {
                compute,
                draw,
                workgroup_size,
            }
        })
    }

    pub fn workgroup_size(&self) -> u32 {
        self.workgroup_size
    }
}
