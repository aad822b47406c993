//! # gpu_boids
//!
//! A flock of boids simulated on the GPU and rendered to an offscreen image.
//!
//! Each invocation runs one compute step over all particles, then draws one
//! oriented triangle per particle from the buffer that step just wrote, then
//! copies the frame back to the host.
//!
//! ## Quick Start
//!
//! ```ignore
//! use gpu_boids::prelude::*;
//!
//! fn main() -> Result<(), SimulationError> {
//!     let ctx = GpuContext::new_blocking()?;
//!     let config = RunConfig::new().with_particle_count(1500).with_seed(7);
//!     let mut frames = FrameOrchestrator::from_config(&ctx, &config)?;
//!     while let Some(capture) = frames.run_frame()? {
//!         save_png(&capture.pixels, "boids.png")?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Double buffering
//!
//! Two particle buffers swap roles every step. The compute program reads
//! one and writes the other, so no invocation ever reads a value written in
//! the same step. Both compute binding sets are built once; a
//! [`Generation`] selects which one runs and which buffer the render pass
//! reads.
//!
//! ## Host reference
//!
//! [`flocking`] implements the same rules on the CPU with `rayon`. It is
//! what the tests check the properties against, and what the GPU output is
//! compared to.

pub mod config;
pub mod error;
pub mod flocking;
mod frame;
pub mod generation;
pub mod gpu;
pub mod output;
mod params;
mod particle;
pub mod shaders;
pub mod spawn;

pub use config::RunConfig;
pub use error::{CaptureError, ConfigError, GpuError, SimulationError};
pub use frame::{FrameCapture, FrameCursor, FrameOrchestrator, FramePlan, FrameState};
pub use generation::{Generation, Slot};
pub use glam::Vec2;
pub use gpu::{GpuContext, Programs};
pub use output::{save_png, PixelBuffer};
pub use params::SimParams;
pub use particle::{Particle, VERTEX_SHAPE};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use gpu_boids::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::RunConfig;
    pub use crate::error::SimulationError;
    pub use crate::flocking::HostFlock;
    pub use crate::frame::{FrameCapture, FrameOrchestrator, FrameState};
    pub use crate::generation::{Generation, Slot};
    pub use crate::gpu::{GpuContext, Programs};
    pub use crate::output::{save_png, PixelBuffer};
    pub use crate::params::SimParams;
    pub use crate::particle::Particle;
    pub use crate::Vec2;
}
