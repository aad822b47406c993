use crate::error::ConfigError;
use crate::generation::{Generation, Slot, SLOT_COUNT};
use crate::params::SimParams;
use crate::particle::Particle;

/// Layout of the compute bind group: parameters, source, destination.
pub fn compute_bind_group_layout(device: &wgpu::Device, particle_count: u32) -> wgpu::BindGroupLayout {
    let particles_size = wgpu::BufferSize::new(Particle::buffer_size(particle_count));

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Compute Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(SimParams::SIZE),
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: particles_size,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: false },
                    has_dynamic_offset: false,
                    min_binding_size: particles_size,
                },
                count: None,
            },
        ],
    })
}

/// Check buffer sizes against `particle_count` and the parameter layout.
pub fn check_binding_sizes(
    params_size: u64,
    buffer_sizes: [u64; SLOT_COUNT],
    particle_count: u32,
) -> Result<(), ConfigError> {
    if params_size != SimParams::SIZE {
        return Err(ConfigError::ParamsBufferSize {
            expected: SimParams::SIZE,
            actual: params_size,
        });
    }

    let expected = Particle::buffer_size(particle_count);
    match buffer_sizes.into_iter().find(|&size| size != expected) {
        Some(actual) => Err(ConfigError::ParticleBufferSize { expected, actual }),
        None => Ok(()),
    }
}

/// One precomputed compute binding: parameters, `source`, `destination`.
pub struct BufferBindingSet {
    bind_group: wgpu::BindGroup,
    source_slot: Slot,
    destination_slot: Slot,
}

impl BufferBindingSet {
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn source_slot(&self) -> Slot {
        self.source_slot
    }

    pub fn destination_slot(&self) -> Slot {
        self.destination_slot
    }
}

/// Both binding sets of the ping-pong pair, built once up front.
///
/// Set 0 reads buffer A and writes buffer B, set 1 the reverse.
pub struct BindingPair {
    sets: [BufferBindingSet; SLOT_COUNT],
}

impl BindingPair {
    pub fn build(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        params: &wgpu::Buffer,
        buffers: [&wgpu::Buffer; SLOT_COUNT],
        particle_count: u32,
    ) -> Result<Self, ConfigError> {
        check_binding_sizes(params.size(), buffers.map(|b| b.size()), particle_count)?;

        let sets = Slot::ALL.map(|source_slot| {
            let destination_slot = source_slot.other();
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("Compute Bind Group {:?}", source_slot)),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: params.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: buffers[source_slot.index()].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffers[destination_slot.index()].as_entire_binding(),
                    },
                ],
            });
            BufferBindingSet {
                bind_group,
                source_slot,
                destination_slot,
            }
        });

        Ok(Self { sets })
    }

    /// The binding set whose source is the current slot of `generation`.
    pub fn for_generation(&self, generation: Generation) -> &BufferBindingSet {
        &self.sets[generation.source_slot().index()]
    }
}
