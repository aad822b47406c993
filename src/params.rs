//! Flocking rule constants uploaded once per run.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::flocking::{DOMAIN_EXTENT, MAX_SPEED};

/// Tunable constants for the three steering rules.
///
/// Rule 1 is cohesion, rule 2 separation, rule 3 alignment. The GPU sees
/// this as a uniform of seven consecutive `f32`s in declaration order.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimParams {
    pub delta_t: f32,
    pub rule1_distance: f32,
    pub rule2_distance: f32,
    pub rule3_distance: f32,
    pub rule1_scale: f32,
    pub rule2_scale: f32,
    pub rule3_scale: f32,
}

const _: () = assert!(std::mem::size_of::<SimParams>() == 28);

impl Default for SimParams {
    fn default() -> Self {
        Self {
            delta_t: 0.04,
            rule1_distance: 0.1,
            rule2_distance: 0.025,
            rule3_distance: 0.025,
            rule1_scale: 0.02,
            rule2_scale: 0.05,
            rule3_scale: 0.005,
        }
    }
}

impl SimParams {
    /// Byte size of the uniform block.
    pub const SIZE: u64 = std::mem::size_of::<SimParams>() as u64;

    /// WGSL declaration matching this layout.
    pub const WGSL_STRUCT: &'static str = r#"struct SimParams {
    deltaT: f32,
    rule1Distance: f32,
    rule2Distance: f32,
    rule3Distance: f32,
    rule1Scale: f32,
    rule2Scale: f32,
    rule3Scale: f32,
};"#;

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    fn named(&self) -> [(&'static str, f32); 7] {
        [
            ("deltaT", self.delta_t),
            ("rule1Distance", self.rule1_distance),
            ("rule2Distance", self.rule2_distance),
            ("rule3Distance", self.rule3_distance),
            ("rule1Scale", self.rule1_scale),
            ("rule2Scale", self.rule2_scale),
            ("rule3Scale", self.rule3_scale),
        ]
    }

    /// Largest `|deltaT|` for which a particle at [`MAX_SPEED`] moves at
    /// most one domain width per step, so a single wrap lands it back
    /// inside `[-1, 1]`.
    pub const MAX_DELTA_T: f32 = 2.0 * DOMAIN_EXTENT / MAX_SPEED;

    /// Reject NaN and infinite values, and steps too long to wrap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((name, _)) = self.named().iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NonFiniteParam(name));
        }
        if self.delta_t.abs() > Self::MAX_DELTA_T {
            return Err(ConfigError::StepTooLarge {
                delta_t: self.delta_t,
                limit: Self::MAX_DELTA_T,
            });
        }
        Ok(())
    }
}
