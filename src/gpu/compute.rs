use super::bindings::{compute_bind_group_layout, BufferBindingSet};
use super::{GpuContext, Programs};
use crate::error::{ConfigError, SimulationError};
use crate::flocking::workgroup_count;
use crate::shaders::COMPUTE_ENTRY;

/// Largest workgroup a compute program may declare under `limits`.
pub fn workgroup_size_limit(limits: &wgpu::Limits) -> u32 {
    limits
        .max_compute_workgroup_size_x
        .min(limits.max_compute_invocations_per_workgroup)
}

/// `ceil(N / workgroup_size)`, rejected if the device cannot run it.
pub fn dispatch_size(
    particle_count: u32,
    workgroup_size: u32,
    limits: &wgpu::Limits,
) -> Result<u32, ConfigError> {
    let limit = workgroup_size_limit(limits);
    if workgroup_size > limit {
        return Err(ConfigError::WorkgroupTooLarge {
            requested: workgroup_size,
            limit,
        });
    }

    let workgroups = workgroup_count(particle_count, workgroup_size)?;
    if workgroups > limits.max_compute_workgroups_per_dimension {
        return Err(ConfigError::TooManyWorkgroups {
            requested: workgroups,
            limit: limits.max_compute_workgroups_per_dimension,
        });
    }
    Ok(workgroups)
}

/// Compute stage: one invocation per particle, reading the source buffer of
/// a binding set and writing its destination buffer.
pub struct FlockingKernel {
    pipeline: wgpu::ComputePipeline,
    layout: wgpu::BindGroupLayout,
    particle_count: u32,
    workgroups: u32,
}

impl FlockingKernel {
    pub fn new(
        ctx: &GpuContext,
        programs: &Programs,
        particle_count: u32,
    ) -> Result<Self, SimulationError> {
        let workgroup_size = programs.workgroup_size();
        let workgroups = dispatch_size(particle_count, workgroup_size, &ctx.device.limits())?;

        let (pipeline, layout) = ctx.scoped(|| {
            let layout = compute_bind_group_layout(&ctx.device, particle_count);
            let pipeline_layout = ctx
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("Compute Pipeline Layout"),
                    bind_group_layouts: &[&layout],
                    push_constant_ranges: &[],
                });

            let pipeline = ctx
                .device
                .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                    label: Some("Compute Pipeline"),
                    layout: Some(&pipeline_layout),
                    module: &programs.compute,
                    entry_point: Some(COMPUTE_ENTRY),
                    compilation_options: Default::default(),
                    cache: None,
                });
            (pipeline, layout)
        })?;

        log::info!(
            "Compute pipeline ready: {} particles, {} workgroups of {}",
            particle_count,
            workgroups,
            workgroup_size
        );

        Ok(Self {
            pipeline,
            layout,
            particle_count,
            workgroups,
        })
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    /// `ceil(N / workgroup_size)`.
    pub fn workgroups(&self) -> u32 {
        self.workgroups
    }

    /// Record one simulation step into `encoder`.
    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder, bindings: &BufferBindingSet) {
        if self.particle_count == 0 {
            return;
        }

        encoder.push_debug_group("compute boid movement");
        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Compute Pass"),
                timestamp_writes: None,
            });

            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, bindings.bind_group(), &[]);
            compute_pass.dispatch_workgroups(self.workgroups, 1, 1);
        }
        encoder.pop_debug_group();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_size_within_limits() {
        let limits = wgpu::Limits::default();
        assert_eq!(dispatch_size(1500, 64, &limits).unwrap(), 24);
        assert_eq!(dispatch_size(0, 64, &limits).unwrap(), 0);
        // 65535 groups of one is the largest single-dimension dispatch.
        assert_eq!(dispatch_size(65_535, 1, &limits).unwrap(), 65_535);
    }

    #[test]
    fn test_dispatch_size_rejects_too_many_groups() {
        let limits = wgpu::Limits::default();
        assert!(matches!(
            dispatch_size(70_000, 1, &limits),
            Err(ConfigError::TooManyWorkgroups {
                requested: 70_000,
                limit: 65_535
            })
        ));
    }

    #[test]
    fn test_dispatch_size_rejects_oversized_group() {
        let limits = wgpu::Limits::default();
        let limit = workgroup_size_limit(&limits);
        assert!(matches!(
            dispatch_size(100, limit + 1, &limits),
            Err(ConfigError::WorkgroupTooLarge { requested, .. }) if requested == limit + 1
        ));
        assert!(matches!(
            dispatch_size(100, 0, &limits),
            Err(ConfigError::ZeroWorkgroupSize)
        ));
    }

    #[test]
    fn test_workgroup_size_limit_takes_smaller_bound() {
        let limits = wgpu::Limits {
            max_compute_workgroup_size_x: 1024,
            max_compute_invocations_per_workgroup: 256,
            ..wgpu::Limits::default()
        };
        assert_eq!(workgroup_size_limit(&limits), 256);
    }
}
