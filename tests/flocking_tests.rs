//! Behavioural tests for the host flocking kernel.
//!
//! These pin down the rule arithmetic the compute program mirrors: the
//! speed cap, toroidal wrap, neighbor averaging, and ping-pong buffering.

use gpu_boids::flocking::{self, BruteForce, HostFlock, NeighborQuery, MAX_SPEED};
use gpu_boids::gpu::dispatch_size;
use gpu_boids::spawn::initialize_seeded;
use gpu_boids::{Particle, SimParams, Slot, Vec2};

const EPS: f32 = 1e-6;

fn boid(px: f32, py: f32, vx: f32, vy: f32) -> Particle {
    Particle::new(Vec2::new(px, py), Vec2::new(vx, vy))
}

fn step_once(source: &[Particle], params: &SimParams) -> Vec<Particle> {
    let mut destination = vec![Particle::default(); source.len()];
    flocking::step(source, &mut destination, params).unwrap();
    destination
}

fn assert_close(actual: Vec2, expected: Vec2) {
    assert!(
        (actual - expected).length() < EPS,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

// ============================================================================
// Determinism and counts
// ============================================================================

#[test]
fn test_same_seed_same_step() {
    let params = SimParams::default();
    let first = step_once(&initialize_seeded(500, 1234), &params);
    let second = step_once(&initialize_seeded(500, 1234), &params);
    assert_eq!(first, second);
}

#[test]
fn test_particle_count_preserved() {
    for n in [0u32, 1, 7, 300] {
        let mut flock = HostFlock::new(initialize_seeded(n, 99), SimParams::default());
        for _ in 0..3 {
            flock.step().unwrap();
            assert_eq!(flock.current().len(), n as usize);
        }
    }
}

#[test]
fn test_empty_step_is_noop() {
    let mut destination: Vec<Particle> = Vec::new();
    flocking::step(&[], &mut destination, &SimParams::default()).unwrap();
    assert!(destination.is_empty());
}

// ============================================================================
// Boundary and speed policy
// ============================================================================

#[test]
fn test_toroidal_wrap_past_right_edge() {
    let params = SimParams::default();
    let out = step_once(&[boid(1.0 + 1e-3, 0.3, 0.05, 0.0)], &params);
    let x = out[0].position.x;
    assert!((-1.0..=1.0).contains(&x), "x = {}", x);
    assert!(x < 0.0, "expected wrap to the left edge, got {}", x);
    assert!((x - (1.0 + 1e-3 + 0.05 * params.delta_t - 2.0)).abs() < EPS);
}

#[test]
fn test_toroidal_wrap_past_bottom_edge() {
    let params = SimParams::default();
    let out = step_once(&[boid(0.0, -1.0 - 1e-3, 0.0, -0.05)], &params);
    let y = out[0].position.y;
    assert!((-1.0..=1.0).contains(&y));
    assert!(y > 0.0);
}

#[test]
fn test_longest_allowed_step_wraps_back_inside() {
    let params = SimParams {
        delta_t: SimParams::MAX_DELTA_T,
        ..SimParams::default()
    };
    assert!(params.validate().is_ok());
    // Full speed from the right edge travels one domain width.
    let out = step_once(&[boid(1.0, -1.0, 0.5, -0.5)], &params);
    let p = out[0].position;
    assert!((-1.0..=1.0).contains(&p.x), "x = {}", p.x);
    assert!((-1.0..=1.0).contains(&p.y), "y = {}", p.y);
}

#[test]
fn test_speed_capped_direction_kept() {
    let params = SimParams::default();
    let out = step_once(&[boid(0.0, 0.0, 0.3, 0.4)], &params);
    let v = out[0].velocity;
    assert!((v.length() - MAX_SPEED).abs() < EPS);
    assert_close(v.normalize(), Vec2::new(0.6, 0.8));
}

#[test]
fn test_slow_particle_not_capped() {
    let out = step_once(&[boid(0.0, 0.0, 0.02, -0.01)], &SimParams::default());
    assert_close(out[0].velocity, Vec2::new(0.02, -0.01));
}

// ============================================================================
// Rules
// ============================================================================

#[test]
fn test_isolated_particle_only_advances() {
    let params = SimParams::default();
    let me = boid(0.0, 0.0, 0.03, 0.04);
    let far = [boid(0.9, 0.9, -0.05, 0.0), boid(-0.9, 0.5, 0.0, 0.05)];
    let out = flocking::steer(&me, far.iter(), &params);
    assert_close(out.velocity, me.velocity);
    assert_close(out.position, me.position + me.velocity * params.delta_t);
}

#[test]
fn test_cohesion_only_scenario() {
    // Only A and B are within rule1 distance of each other; rule2 and rule3
    // never fire because their distances are zero.
    let params = SimParams {
        rule1_distance: 0.1,
        rule2_distance: 0.0,
        rule3_distance: 0.0,
        ..SimParams::default()
    };
    let a = boid(0.0, 0.0, 0.01, 0.0);
    let b = boid(0.05, 0.0, 0.0, 0.01);
    let c = boid(0.8, 0.8, 0.0, -0.02);
    let d = boid(-0.8, -0.8, 0.02, 0.0);

    let out = step_once(&[a, b, c, d], &params);

    // center = avg(neighbors) - pos, scaled by rule1Scale
    let a_vel = a.velocity + (b.position - a.position) * params.rule1_scale;
    let b_vel = b.velocity + (a.position - b.position) * params.rule1_scale;
    assert_close(out[0].velocity, a_vel);
    assert_close(out[1].velocity, b_vel);
    assert_close(out[0].position, a.position + a_vel * params.delta_t);
    assert_close(out[1].position, b.position + b_vel * params.delta_t);

    assert_close(out[2].velocity, c.velocity);
    assert_close(out[3].velocity, d.velocity);
    assert_close(out[2].position, c.position + c.velocity * params.delta_t);
}

#[test]
fn test_cohesion_averages_neighbors() {
    let params = SimParams {
        rule2_distance: 0.0,
        rule3_distance: 0.0,
        ..SimParams::default()
    };
    let me = boid(0.0, 0.0, 0.0, 0.0);
    let n1 = boid(0.06, 0.0, 0.0, 0.0);
    let n2 = boid(0.0, 0.03, 0.0, 0.0);
    let out = flocking::steer(&me, [&n1, &n2], &params);
    let expected = Vec2::new(0.03, 0.015) * params.rule1_scale;
    assert_close(out.velocity, expected);
}

#[test]
fn test_separation_sums_without_averaging() {
    let params = SimParams {
        rule1_distance: 0.0,
        rule3_distance: 0.0,
        ..SimParams::default()
    };
    let me = boid(0.0, 0.0, 0.0, 0.0);
    let n1 = boid(0.01, 0.0, 0.0, 0.0);
    let n2 = boid(0.02, 0.0, 0.0, 0.0);
    let out = flocking::steer(&me, [&n1, &n2], &params);
    assert_close(out.velocity, Vec2::new(-0.03, 0.0) * params.rule2_scale);
}

#[test]
fn test_alignment_averages_velocity() {
    let params = SimParams {
        rule1_distance: 0.0,
        rule2_distance: 0.0,
        ..SimParams::default()
    };
    let me = boid(0.0, 0.0, 0.0, 0.0);
    let n1 = boid(0.01, 0.0, 0.04, 0.0);
    let n2 = boid(0.0, 0.01, 0.0, 0.02);
    let out = flocking::steer(&me, [&n1, &n2], &params);
    assert_close(out.velocity, Vec2::new(0.02, 0.01) * params.rule3_scale);
}

// ============================================================================
// Ping-pong and neighbor queries
// ============================================================================

#[test]
fn test_each_step_reads_previous_destination() {
    let params = SimParams::default();
    let mut flock = HostFlock::new(initialize_seeded(200, 8), params);

    let written = flock.step().unwrap();
    assert_eq!(written, Slot::B);
    let after_first = flock.slot(written).to_vec();

    let written_again = flock.step().unwrap();
    assert_eq!(written_again, Slot::A);
    assert_eq!(flock.slot(written_again), step_once(&after_first, &params).as_slice());
}

#[test]
fn test_source_untouched_by_step() {
    let source = initialize_seeded(64, 21);
    let snapshot = source.clone();
    let _ = step_once(&source, &SimParams::default());
    assert_eq!(source, snapshot);
}

struct NoNeighbors;

impl NeighborQuery for NoNeighbors {
    fn neighbors(&self, _index: usize) -> impl Iterator<Item = &Particle> + '_ {
        std::iter::empty()
    }
}

#[test]
fn test_custom_neighbor_query() {
    let params = SimParams::default();
    let source = vec![boid(0.0, 0.0, 0.01, 0.0), boid(0.001, 0.0, -0.01, 0.0)];
    let mut destination = vec![Particle::default(); 2];
    flocking::step_with(&NoNeighbors, &source, &mut destination, &params).unwrap();
    for (before, after) in source.iter().zip(&destination) {
        assert_close(after.velocity, before.velocity);
    }
}

// ============================================================================
// Dispatch grid
// ============================================================================

#[test]
fn test_dispatch_grid_covers_each_particle_once() {
    let limits = wgpu::Limits::default();
    let params = SimParams::default();

    for (n, size) in [(70u32, 64u32), (64, 64), (1, 64), (1500, 64), (1000, 256)] {
        let groups = dispatch_size(n, size, &limits).unwrap();
        let invocations = groups * size;
        assert!(invocations >= n);
        assert!(invocations - n < size, "{} groups of {} for {} particles", groups, size, n);

        let source = initialize_seeded(n, 4);
        let expected = step_once(&source, &params);
        let query = BruteForce::new(&source);

        // Invocations past the last particle return before touching memory.
        let mut written: Vec<Option<Particle>> = vec![None; n as usize];
        for id in 0..invocations {
            if id >= n {
                continue;
            }
            let i = id as usize;
            assert!(written[i].is_none(), "particle {} written twice", i);
            written[i] = Some(flocking::steer(&source[i], query.neighbors(i), &params));
        }

        let written: Vec<Particle> = written.into_iter().map(|p| p.unwrap()).collect();
        assert_eq!(written, expected);
    }
}
