//! Particle memory layout shared by the host, the compute program and the
//! vertex stage.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// One boid: position and velocity, 16 bytes, no padding.
///
/// The same bytes are bound as a storage array in the compute program and
/// as a per-instance vertex buffer in the draw program.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
}

const _: () = assert!(std::mem::size_of::<Particle>() == 16);
const _: () = assert!(std::mem::offset_of!(Particle, position) == 0);
const _: () = assert!(std::mem::offset_of!(Particle, velocity) == 8);

impl Particle {
    /// Size of one particle in bytes.
    pub const SIZE: u64 = std::mem::size_of::<Particle>() as u64;

    /// Instance attributes: location 0 is position, location 1 is velocity.
    pub const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: std::mem::offset_of!(Particle, position) as wgpu::BufferAddress,
            shader_location: 0,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: std::mem::offset_of!(Particle, velocity) as wgpu::BufferAddress,
            shader_location: 1,
        },
    ];

    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    /// Per-instance vertex buffer layout for the draw program.
    pub const fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::INSTANCE_ATTRIBUTES,
        }
    }

    /// Bytes needed to store `count` particles.
    pub fn buffer_size(count: u32) -> u64 {
        count as u64 * Self::SIZE
    }
}

/// The constant triangle drawn for every particle, in local space.
///
/// Points along +y so the vertex stage can rotate it onto the heading.
pub const VERTEX_SHAPE: [Vec2; 3] = [
    Vec2::new(-0.01, -0.02),
    Vec2::new(0.01, -0.02),
    Vec2::new(0.00, 0.02),
];

/// Per-vertex attribute at location 2.
pub const VERTEX_SHAPE_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x2,
    offset: 0,
    shader_location: 2,
}];

/// Per-vertex buffer layout for [`VERTEX_SHAPE`].
pub const fn vertex_shape_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vec2>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_SHAPE_ATTRIBUTES,
    }
}
