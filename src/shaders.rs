//! WGSL sources for the compute and draw programs.

use crate::flocking::{DOMAIN_EXTENT, MAX_SPEED};
use crate::params::SimParams;

/// Entry point of the compute program.
pub const COMPUTE_ENTRY: &str = "main";
/// Entry point of the vertex stage.
pub const VERTEX_ENTRY: &str = "vs_main";
/// Entry point of the fragment stage.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Generate the flocking compute program for the given workgroup size.
///
/// Binding 0 is the parameter uniform, binding 1 the source particles
/// (read-only), binding 2 the destination particles.
pub fn compute_shader(workgroup_size: u32) -> String {
    let params_struct = SimParams::WGSL_STRUCT;
    let max_speed = wgsl_float(MAX_SPEED);
    let extent = wgsl_float(DOMAIN_EXTENT);

    format!(
        r#"struct Particle {{
    pos: vec2<f32>,
    vel: vec2<f32>,
}};

{params_struct}

@group(0) @binding(0) var<uniform> params: SimParams;
@group(0) @binding(1) var<storage, read> particlesSrc: array<Particle>;
@group(0) @binding(2) var<storage, read_write> particlesDst: array<Particle>;

const MAX_SPEED: f32 = {max_speed};
const EXTENT: f32 = {extent};

fn wrap(x: f32) -> f32 {{
    if (x > EXTENT) {{
        return x - 2.0 * EXTENT;
    }}
    if (x < -EXTENT) {{
        return x + 2.0 * EXTENT;
    }}
    return x;
}}

@compute @workgroup_size({workgroup_size})
fn {COMPUTE_ENTRY}(@builtin(global_invocation_id) global_id: vec3<u32>) {{
    let index = global_id.x;
    let total = arrayLength(&particlesSrc);
    if (index >= total) {{
        return;
    }}

    let vPos = particlesSrc[index].pos;
    var vVel = particlesSrc[index].vel;

    var cMass = vec2<f32>(0.0, 0.0);
    var colVel = vec2<f32>(0.0, 0.0);
    var cVel = vec2<f32>(0.0, 0.0);
    var cMassCount = 0u;
    var cVelCount = 0u;

    for (var i = 0u; i < total; i++) {{
        if (i == index) {{
            continue;
        }}

        let pos = particlesSrc[i].pos;
        let vel = particlesSrc[i].vel;
        let d = distance(pos, vPos);

        if (d < params.rule1Distance) {{
            cMass += pos;
            cMassCount++;
        }}
        if (d < params.rule2Distance) {{
            colVel += vPos - pos;
        }}
        if (d < params.rule3Distance) {{
            cVel += vel;
            cVelCount++;
        }}
    }}

    if (cMassCount > 0u) {{
        cMass = cMass / f32(cMassCount) - vPos;
    }}
    if (cVelCount > 0u) {{
        cVel = cVel / f32(cVelCount);
    }}

    vVel = vVel + cMass * params.rule1Scale + colVel * params.rule2Scale + cVel * params.rule3Scale;

    let speed = length(vVel);
    if (speed > MAX_SPEED) {{
        vVel = vVel * (MAX_SPEED / speed);
    }}

    var newPos = vPos + vVel * params.deltaT;
    newPos = vec2<f32>(wrap(newPos.x), wrap(newPos.y));

    particlesDst[index] = Particle(newPos, vVel);
}}
"#
    )
}

/// Generate the draw program.
///
/// Instance attributes are the particle position (location 0) and velocity
/// (location 1); the per-vertex attribute is the local triangle (location 2).
pub fn draw_shader() -> String {
    format!(
        r#"struct VertexOutput {{
    @builtin(position) clip_position: vec4<f32>,
}};

@vertex
fn {VERTEX_ENTRY}(
    @location(0) particle_pos: vec2<f32>,
    @location(1) particle_vel: vec2<f32>,
    @location(2) local_pos: vec2<f32>,
) -> VertexOutput {{
    let angle = -atan2(particle_vel.x, particle_vel.y);
    let rotated = vec2<f32>(
        local_pos.x * cos(angle) - local_pos.y * sin(angle),
        local_pos.x * sin(angle) + local_pos.y * cos(angle),
    );

    var out: VertexOutput;
    out.clip_position = vec4<f32>(rotated + particle_pos, 0.0, 1.0);
    return out;
}}

@fragment
fn {FRAGMENT_ENTRY}() -> @location(0) vec4<f32> {{
    return vec4<f32>(1.0, 1.0, 1.0, 1.0);
}}
"#
    )
}

/// Format a float so WGSL always parses it as `f32`.
fn wgsl_float(value: f32) -> String {
    let s = format!("{:?}", value);
    if s.contains('.') || s.contains('e') {
        s
    } else {
        format!("{}.0", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workgroup_size_interpolated() {
        let src = compute_shader(128);
        assert!(src.contains("@workgroup_size(128)"));
        assert!(src.contains("fn main("));
    }

    #[test]
    fn test_compute_bounds_check() {
        assert!(compute_shader(64).contains("if (index >= total)"));
    }

    #[test]
    fn test_wgsl_float() {
        assert_eq!(wgsl_float(0.1), "0.1");
        assert_eq!(wgsl_float(1.0), "1.0");
    }

    #[test]
    fn test_draw_entry_points() {
        let src = draw_shader();
        assert!(src.contains("fn vs_main("));
        assert!(src.contains("fn fs_main("));
    }
}
