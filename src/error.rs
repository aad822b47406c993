//! Error types for the boids pipeline.
//!
//! Failures fall into three groups: bad configuration (caught before any
//! device work is submitted), an unavailable or rejecting GPU, and failures
//! while handing the captured frame to the encoder.

use std::fmt;

/// Errors caused by an inconsistent run configuration or buffer layout.
#[derive(Debug)]
pub enum ConfigError {
    /// A particle buffer does not hold exactly `N` particles.
    ParticleBufferSize { expected: u64, actual: u64 },
    /// The parameter buffer does not match the seven-float layout.
    ParamsBufferSize { expected: u64, actual: u64 },
    /// Workgroup size of zero would dispatch zero groups.
    ZeroWorkgroupSize,
    /// Workgroup size exceeds what the device can run in one group.
    WorkgroupTooLarge { requested: u32, limit: u32 },
    /// Compiled programs were built for a different workgroup size.
    WorkgroupSizeMismatch { configured: u32, compiled: u32 },
    /// `ceil(N / workgroup_size)` exceeds the device's per-dimension limit.
    TooManyWorkgroups { requested: u32, limit: u32 },
    /// A particle buffer would exceed the largest storage binding.
    ParticleBufferTooLarge { requested: u64, limit: u64 },
    /// Image width or height is zero.
    ZeroDimensions { width: u32, height: u32 },
    /// Image is larger than the device's 2D texture limit.
    TextureTooLarge { width: u32, height: u32, limit: u32 },
    /// A run with no invocations would never produce a frame.
    ZeroFrames,
    /// A simulation parameter is NaN or infinite.
    NonFiniteParam(&'static str),
    /// `deltaT` lets a particle cross the domain more than once per step.
    StepTooLarge { delta_t: f32, limit: f32 },
    /// Host-side source and destination slices differ in length.
    LengthMismatch { source: usize, destination: usize },
    /// Failed to read or write a configuration file.
    Io(std::io::Error),
    /// Configuration file is not valid JSON for [`RunConfig`](crate::RunConfig).
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParticleBufferSize { expected, actual } => write!(
                f,
                "Particle buffer is {} bytes, expected {} bytes",
                actual, expected
            ),
            ConfigError::ParamsBufferSize { expected, actual } => write!(
                f,
                "Simulation parameter buffer is {} bytes, expected {} bytes",
                actual, expected
            ),
            ConfigError::ZeroWorkgroupSize => write!(f, "Workgroup size must be at least 1"),
            ConfigError::WorkgroupTooLarge { requested, limit } => write!(
                f,
                "Workgroup size {} exceeds the device limit of {}",
                requested, limit
            ),
            ConfigError::WorkgroupSizeMismatch {
                configured,
                compiled,
            } => write!(
                f,
                "Programs were compiled for workgroup size {} but the configuration asks for {}",
                compiled, configured
            ),
            ConfigError::TooManyWorkgroups { requested, limit } => write!(
                f,
                "Dispatch of {} workgroups exceeds the device limit of {}",
                requested, limit
            ),
            ConfigError::ParticleBufferTooLarge { requested, limit } => write!(
                f,
                "Particle buffer of {} bytes exceeds the device binding limit of {} bytes",
                requested, limit
            ),
            ConfigError::ZeroDimensions { width, height } => {
                write!(f, "Image dimensions must be non-zero, got {}x{}", width, height)
            }
            ConfigError::TextureTooLarge {
                width,
                height,
                limit,
            } => write!(
                f,
                "Image of {}x{} exceeds the device texture limit of {}",
                width, height, limit
            ),
            ConfigError::ZeroFrames => write!(f, "Frame count must be at least 1"),
            ConfigError::NonFiniteParam(name) => {
                write!(f, "Simulation parameter `{}` must be finite", name)
            }
            ConfigError::StepTooLarge { delta_t, limit } => write!(
                f,
                "deltaT of {} moves a particle further than the domain width; at most {} is allowed",
                delta_t, limit
            ),
            ConfigError::LengthMismatch { source, destination } => write!(
                f,
                "Source holds {} particles but destination holds {}",
                source, destination
            ),
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Json(e) => write!(f, "Invalid config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Errors raised by the GPU device.
#[derive(Debug)]
pub enum GpuError {
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The device rejected a command sequence.
    Submission(String),
    /// Failed to map buffer for reading.
    BufferMapping(String),
}

impl GpuError {
    /// True when the error means no usable device exists.
    pub fn is_device_unavailable(&self) -> bool {
        matches!(self, GpuError::NoAdapter | GpuError::DeviceCreation(_))
    }
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::Submission(msg) => write!(f, "GPU rejected submitted commands: {}", msg),
            GpuError::BufferMapping(msg) => write!(f, "Failed to map GPU buffer: {}", msg),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur while handing a captured frame to the encoder.
#[derive(Debug)]
pub enum CaptureError {
    /// Pixel data does not cover `padded_bytes_per_row * height` bytes.
    BufferSize { expected: usize, actual: usize },
    /// Failed to encode or write the image.
    Encode(image::ImageError),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::BufferSize { expected, actual } => write!(
                f,
                "Captured pixel buffer is {} bytes, expected {} bytes",
                actual, expected
            ),
            CaptureError::Encode(e) => write!(f, "Failed to encode image: {}", e),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Encode(e) => Some(e),
            CaptureError::BufferSize { .. } => None,
        }
    }
}

impl From<image::ImageError> for CaptureError {
    fn from(e: image::ImageError) -> Self {
        CaptureError::Encode(e)
    }
}

/// Errors that can occur when running a simulation.
#[derive(Debug)]
pub enum SimulationError {
    /// Run configuration rejected before any device work.
    Config(ConfigError),
    /// GPU unavailable or rejected the work.
    Gpu(GpuError),
    /// Captured frame could not be encoded.
    Capture(CaptureError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Config(e) => write!(f, "Configuration error: {}", e),
            SimulationError::Gpu(e) => write!(f, "GPU error: {}", e),
            SimulationError::Capture(e) => write!(f, "Capture error: {}", e),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(e) => Some(e),
            SimulationError::Gpu(e) => Some(e),
            SimulationError::Capture(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        SimulationError::Config(e)
    }
}

impl From<GpuError> for SimulationError {
    fn from(e: GpuError) -> Self {
        SimulationError::Gpu(e)
    }
}

impl From<CaptureError> for SimulationError {
    fn from(e: CaptureError) -> Self {
        SimulationError::Capture(e)
    }
}
