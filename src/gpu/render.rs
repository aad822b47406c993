use super::buffers::create_vertex_shape_buffer;
use super::{GpuContext, Programs};
use crate::error::GpuError;
use crate::particle::{vertex_shape_layout, Particle, VERTEX_SHAPE};
use crate::shaders::{FRAGMENT_ENTRY, VERTEX_ENTRY};

/// Colour format of the offscreen target.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Render stage: one oriented triangle instance per particle.
pub struct Rasterizer {
    pipeline: wgpu::RenderPipeline,
    vertex_shape: wgpu::Buffer,
    particle_count: u32,
}

impl Rasterizer {
    pub fn new(ctx: &GpuContext, programs: &Programs, particle_count: u32) -> Result<Self, GpuError> {
        let (pipeline, vertex_shape) = ctx.scoped(|| {
            let vertex_shape = create_vertex_shape_buffer(&ctx.device);
            let layout = ctx
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("Render Pipeline Layout"),
                    bind_group_layouts: &[],
                    push_constant_ranges: &[],
                });

            let pipeline = ctx
                .device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("Render Pipeline"),
                    layout: Some(&layout),
                    vertex: wgpu::VertexState {
                        module: &programs.draw,
                        entry_point: Some(VERTEX_ENTRY),
                        buffers: &[Particle::instance_layout(), vertex_shape_layout()],
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &programs.draw,
                        entry_point: Some(FRAGMENT_ENTRY),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: TARGET_FORMAT,
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: None,
                        polygon_mode: wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                    cache: None,
                });
            (pipeline, vertex_shape)
        })?;

        Ok(Self {
            pipeline,
            vertex_shape,
            particle_count,
        })
    }

    /// Record the render pass drawing `instances` into `target`.
    ///
    /// `instances` must be the buffer the preceding compute step wrote.
    pub fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        instances: &wgpu::Buffer,
        clear_color: wgpu::Color,
    ) {
        encoder.push_debug_group("render boids");
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // Empty buffers cannot be bound; the pass still clears.
            if self.particle_count > 0 {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_vertex_buffer(0, instances.slice(..));
                render_pass.set_vertex_buffer(1, self.vertex_shape.slice(..));
                render_pass.draw(0..VERTEX_SHAPE.len() as u32, 0..self.particle_count);
            }
        }
        encoder.pop_debug_group();
    }
}
