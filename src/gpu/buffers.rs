use wgpu::util::DeviceExt;

use super::GpuContext;
use crate::error::{ConfigError, GpuError};
use crate::generation::{Slot, SLOT_COUNT};
use crate::params::SimParams;
use crate::particle::{Particle, VERTEX_SHAPE};

/// Particle buffers are a compute source, a compute destination and an
/// instance vertex source. `COPY_SRC` allows host readback.
pub const PARTICLE_BUFFER_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::VERTEX
    .union(wgpu::BufferUsages::STORAGE)
    .union(wgpu::BufferUsages::COPY_DST)
    .union(wgpu::BufferUsages::COPY_SRC);

/// Largest particle buffer the device can bind as storage.
pub fn particle_buffer_limit(limits: &wgpu::Limits) -> u64 {
    (limits.max_storage_buffer_binding_size as u64).min(limits.max_buffer_size)
}

/// Reject a population whose buffers the device could not bind.
pub fn check_particle_capacity(
    particle_count: u32,
    limits: &wgpu::Limits,
) -> Result<(), ConfigError> {
    let requested = Particle::buffer_size(particle_count);
    let limit = particle_buffer_limit(limits);
    if requested > limit {
        return Err(ConfigError::ParticleBufferTooLarge { requested, limit });
    }
    Ok(())
}

/// The two ping-pong particle buffers.
///
/// Allocated once with the initial population in both slots and only ever
/// overwritten in place by the compute stage afterwards.
pub struct ParticleStore {
    buffers: [wgpu::Buffer; SLOT_COUNT],
    count: u32,
}

impl ParticleStore {
    pub fn new(device: &wgpu::Device, initial: &[Particle]) -> Self {
        let contents: &[u8] = bytemuck::cast_slice(initial);
        let buffers = Slot::ALL.map(|slot| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Particle Buffer {:?}", slot)),
                contents,
                usage: PARTICLE_BUFFER_USAGES,
            })
        });

        Self {
            buffers,
            count: initial.len() as u32,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn buffer(&self, slot: Slot) -> &wgpu::Buffer {
        &self.buffers[slot.index()]
    }

    /// Both buffers in slot order, for building the binding sets.
    pub fn buffers(&self) -> [&wgpu::Buffer; SLOT_COUNT] {
        Slot::ALL.map(|slot| self.buffer(slot))
    }

    /// Copy the particles in `slot` back to the host.
    pub fn read(&self, ctx: &GpuContext, slot: Slot) -> Result<Vec<Particle>, GpuError> {
        if self.count == 0 {
            return Ok(Vec::new());
        }

        let size = Particle::buffer_size(self.count);
        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Readback Buffer"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        ctx.scoped(|| {
            let mut encoder = ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Particle Readback Encoder"),
                });
            encoder.copy_buffer_to_buffer(self.buffer(slot), 0, &staging, 0, size);
            ctx.queue.submit(std::iter::once(encoder.finish()));
        })?;

        let bytes = ctx.read_buffer(&staging)?;
        Ok(bytemuck::pod_collect_to_vec(&bytes))
    }
}

/// Uniform buffer holding the seven rule constants.
pub fn create_params_buffer(device: &wgpu::Device, params: &SimParams) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Simulation Parameter Buffer"),
        contents: params.as_bytes(),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

/// Vertex buffer holding the constant triangle.
pub fn create_vertex_shape_buffer(device: &wgpu::Device) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Vertex Buffer"),
        contents: bytemuck::cast_slice(&VERTEX_SHAPE),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}
