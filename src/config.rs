//! Run configuration.
//!
//! A [`RunConfig`] can be built in code with the `with_*` methods or loaded
//! from a JSON file. Fields missing from the file keep their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::gpu::{check_particle_capacity, check_target_size, dispatch_size};
use crate::params::SimParams;

/// Everything one run needs besides the device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of boids `N`.
    pub particle_count: u32,
    /// Offscreen image width in pixels.
    pub width: u32,
    /// Offscreen image height in pixels.
    pub height: u32,
    /// Particles per compute workgroup.
    pub workgroup_size: u32,
    /// Flocking rule constants.
    pub params: SimParams,
    /// Seed for the initial population. `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Number of simulate-then-render invocations.
    pub frames: u32,
    /// Background colour of the offscreen target (linear RGBA).
    pub clear_color: [f64; 4],
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            particle_count: 1500,
            width: 1600,
            height: 1200,
            workgroup_size: 64,
            params: SimParams::default(),
            seed: None,
            frames: 1,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: u32) -> Self {
        self.particle_count = count;
        self
    }

    /// Set the offscreen image size.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_workgroup_size(mut self, size: u32) -> Self {
        self.workgroup_size = size;
        self
    }

    pub fn with_params(mut self, params: SimParams) -> Self {
        self.params = params;
        self
    }

    /// Fix the seed of the initial population.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_frames(mut self, frames: u32) -> Self {
        self.frames = frames;
        self
    }

    /// Reject configurations that would abort on the device anyway.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.workgroup_size == 0 {
            return Err(ConfigError::ZeroWorkgroupSize);
        }
        if self.frames == 0 {
            return Err(ConfigError::ZeroFrames);
        }
        self.params.validate()
    }

    /// [`validate`](Self::validate), then check the run fits within
    /// `limits`: workgroup size and count, particle buffer size, and image
    /// size.
    pub fn validate_for_device(&self, limits: &wgpu::Limits) -> Result<(), ConfigError> {
        self.validate()?;
        dispatch_size(self.particle_count, self.workgroup_size, limits)?;
        check_particle_capacity(self.particle_count, limits)?;
        check_target_size(self.width, self.height, limits)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }
}
