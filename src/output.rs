//! Captured frames and PNG encoding.
//!
//! The GPU copies the offscreen target row by row into a buffer whose row
//! stride is padded to the copy alignment. [`PixelBuffer`] keeps that layout
//! untouched; cropping to `width` happens only here, on the way to an image.

use std::path::Path;

use image::RgbaImage;

use crate::error::CaptureError;

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: u32 = 4;

/// Host copy of the offscreen target in its padded row layout.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// Row stride in bytes, at least `width * 4`.
    pub padded_bytes_per_row: u32,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Row stride for a copy of `width` pixels, rounded up to the GPU copy
    /// alignment.
    pub fn padded_bytes_per_row_for(width: u32) -> u32 {
        let unpadded = width * BYTES_PER_PIXEL;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        unpadded.div_ceil(align) * align
    }

    pub fn unpadded_bytes_per_row(&self) -> u32 {
        self.width * BYTES_PER_PIXEL
    }

    fn check_size(&self) -> Result<(), CaptureError> {
        let expected = self.padded_bytes_per_row as usize * self.height as usize;
        if self.data.len() < expected || self.padded_bytes_per_row < self.unpadded_bytes_per_row() {
            return Err(CaptureError::BufferSize {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// RGBA bytes of row `y`, without padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = (y * self.padded_bytes_per_row) as usize;
        &self.data[start..start + self.unpadded_bytes_per_row() as usize]
    }

    /// Crop padding and build an image.
    pub fn to_rgba_image(&self) -> Result<RgbaImage, CaptureError> {
        self.check_size()?;
        let mut cropped = Vec::with_capacity((self.unpadded_bytes_per_row() * self.height) as usize);
        for y in 0..self.height {
            cropped.extend_from_slice(self.row(y));
        }
        let actual = cropped.len();
        RgbaImage::from_raw(self.width, self.height, cropped).ok_or(CaptureError::BufferSize {
            expected: (self.unpadded_bytes_per_row() * self.height) as usize,
            actual,
        })
    }
}

/// Encode `pixels` as a PNG file at `path`.
pub fn save_png(pixels: &PixelBuffer, path: impl AsRef<Path>) -> Result<(), CaptureError> {
    let image = pixels.to_rgba_image()?;
    image.save_with_format(path.as_ref(), image::ImageFormat::Png)?;
    log::info!(
        "Wrote {}x{} frame to {}",
        pixels.width,
        pixels.height,
        path.as_ref().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(width: u32, height: u32) -> PixelBuffer {
        let stride = PixelBuffer::padded_bytes_per_row_for(width);
        let mut data = vec![0xAA; (stride * height) as usize];
        for y in 0..height {
            for x in 0..width {
                let i = (y * stride + x * 4) as usize;
                data[i..i + 4].copy_from_slice(&[x as u8, y as u8, 7, 255]);
            }
        }
        PixelBuffer {
            width,
            height,
            padded_bytes_per_row: stride,
            data,
        }
    }

    #[test]
    fn test_padded_stride() {
        assert_eq!(PixelBuffer::padded_bytes_per_row_for(1600), 6400);
        assert_eq!(PixelBuffer::padded_bytes_per_row_for(3), 256);
        assert_eq!(PixelBuffer::padded_bytes_per_row_for(65), 512);
    }

    #[test]
    fn test_crop_drops_padding() {
        let pixels = padded(3, 2);
        let image = pixels.to_rgba_image().unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [2, 1, 7, 255]);
        assert!(image.as_raw().iter().all(|&b| b != 0xAA));
    }

    #[test]
    fn test_short_buffer_rejected() {
        let mut pixels = padded(3, 2);
        pixels.data.truncate(300);
        assert!(matches!(
            pixels.to_rgba_image(),
            Err(CaptureError::BufferSize { expected: 512, actual: 300 })
        ));
    }

    #[test]
    fn test_save_png() {
        let path = std::env::temp_dir().join("gpu_boids_output_test.png");
        save_png(&padded(5, 4), &path).unwrap();
        let decoded = image::open(&path).unwrap().to_rgba8();
        let _ = std::fs::remove_file(&path);
        assert_eq!(decoded.get_pixel(4, 3).0, [4, 3, 7, 255]);
    }
}
