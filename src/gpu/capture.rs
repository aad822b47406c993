use super::render::TARGET_FORMAT;
use super::GpuContext;
use crate::error::{ConfigError, GpuError};
use crate::output::PixelBuffer;

/// Reject an image the device cannot allocate as a 2D texture.
pub fn check_target_size(width: u32, height: u32, limits: &wgpu::Limits) -> Result<(), ConfigError> {
    let limit = limits.max_texture_dimension_2d;
    if width > limit || height > limit {
        return Err(ConfigError::TextureTooLarge {
            width,
            height,
            limit,
        });
    }
    Ok(())
}

/// Offscreen colour target plus the host-readable buffer it is copied into.
pub struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    readback: wgpu::Buffer,
    width: u32,
    height: u32,
    padded_bytes_per_row: u32,
}

impl OffscreenTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Capture Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let padded_bytes_per_row = PixelBuffer::padded_bytes_per_row_for(width);
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Buffer"),
            size: padded_bytes_per_row as u64 * height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            texture,
            view,
            readback,
            width,
            height,
            padded_bytes_per_row,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Record the texture-to-buffer copy.
    pub fn copy_to_readback(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padded_bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Map the readback buffer (call after submit).
    pub fn read(&self, ctx: &GpuContext) -> Result<PixelBuffer, GpuError> {
        let data = ctx.read_buffer(&self.readback)?;
        Ok(PixelBuffer {
            width: self.width,
            height: self.height,
            padded_bytes_per_row: self.padded_bytes_per_row,
            data,
        })
    }
}
