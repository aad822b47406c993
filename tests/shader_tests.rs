//! Generated WGSL must parse and validate before it ever reaches a device.

use gpu_boids::shaders::{compute_shader, draw_shader, COMPUTE_ENTRY, FRAGMENT_ENTRY, VERTEX_ENTRY};
use gpu_boids::{Vec2, VERTEX_SHAPE};

fn validate_wgsl(code: &str) -> Result<naga::Module, String> {
    let module = naga::front::wgsl::parse_str(code)
        .map_err(|e| format!("WGSL parse error: {}", e.emit_to_string(code)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("WGSL validation error: {:?}", e))?;

    Ok(module)
}

fn entry_point<'m>(module: &'m naga::Module, name: &str) -> Option<&'m naga::EntryPoint> {
    module.entry_points.iter().find(|ep| ep.name == name)
}

#[test]
fn test_compute_shader_validates() {
    for size in [1, 64, 256] {
        let src = compute_shader(size);
        let module = validate_wgsl(&src).unwrap_or_else(|e| panic!("{}\n{}", e, src));
        let ep = entry_point(&module, COMPUTE_ENTRY).expect("compute entry point");
        assert_eq!(ep.stage, naga::ShaderStage::Compute);
        assert_eq!(ep.workgroup_size, [size, 1, 1]);
    }
}

#[test]
fn test_draw_shader_validates() {
    let src = draw_shader();
    let module = validate_wgsl(&src).unwrap_or_else(|e| panic!("{}\n{}", e, src));
    assert_eq!(
        entry_point(&module, VERTEX_ENTRY).map(|ep| ep.stage),
        Some(naga::ShaderStage::Vertex)
    );
    assert_eq!(
        entry_point(&module, FRAGMENT_ENTRY).map(|ep| ep.stage),
        Some(naga::ShaderStage::Fragment)
    );
}

#[test]
fn test_compute_bindings_match_layout() {
    let module = validate_wgsl(&compute_shader(64)).unwrap();
    let mut bindings: Vec<(u32, naga::AddressSpace)> = module
        .global_variables
        .iter()
        .filter_map(|(_, var)| var.binding.as_ref().map(|b| (b.binding, var.space)))
        .collect();
    bindings.sort_by_key(|(binding, _)| *binding);

    assert_eq!(bindings.len(), 3);
    assert_eq!(bindings[0], (0, naga::AddressSpace::Uniform));
    assert_eq!(
        bindings[1],
        (1, naga::AddressSpace::Storage { access: naga::StorageAccess::LOAD })
    );
    assert_eq!(
        bindings[2],
        (
            2,
            naga::AddressSpace::Storage {
                access: naga::StorageAccess::LOAD | naga::StorageAccess::STORE
            }
        )
    );
}

#[test]
fn test_bounds_check_precedes_particle_access() {
    let src = compute_shader(64);
    let guard = src.find("if (index >= total)").expect("bounds check");
    let first_read = src.find("particlesSrc[index]").expect("source read");
    let first_write = src.find("particlesDst[index]").expect("destination write");
    assert!(guard < first_read);
    assert!(guard < first_write);
}

/// Host evaluation of the vertex stage's heading rotation.
fn rotate_to_heading(local: Vec2, velocity: Vec2) -> Vec2 {
    let angle = -velocity.x.atan2(velocity.y);
    Vec2::new(
        local.x * angle.cos() - local.y * angle.sin(),
        local.x * angle.sin() + local.y * angle.cos(),
    )
}

#[test]
fn test_draw_shader_rotation_formula() {
    let src = draw_shader();
    assert!(src.contains("let angle = -atan2(particle_vel.x, particle_vel.y);"));
    assert!(src.contains("local_pos.x * cos(angle) - local_pos.y * sin(angle),"));
    assert!(src.contains("local_pos.x * sin(angle) + local_pos.y * cos(angle),"));
    assert!(src.contains("rotated + particle_pos"));
}

#[test]
fn test_triangle_tip_points_along_velocity() {
    let tip = VERTEX_SHAPE[2];

    let right = rotate_to_heading(tip, Vec2::new(1.0, 0.0));
    assert!((right - Vec2::new(0.02, 0.0)).length() < 1e-6, "{:?}", right);

    let down = rotate_to_heading(tip, Vec2::new(0.0, -0.3));
    assert!((down - Vec2::new(0.0, -0.02)).length() < 1e-6, "{:?}", down);

    for velocity in [Vec2::new(0.03, 0.04), Vec2::new(-0.07, 0.01), Vec2::new(-0.02, -0.09)] {
        let rotated = rotate_to_heading(tip, velocity);
        assert!((rotated.length() - tip.length()).abs() < 1e-6);
        assert!((rotated.normalize() - velocity.normalize()).length() < 1e-5);
    }
}
