//! Host-side flocking kernel.
//!
//! [`steer`] is the per-particle rule logic shared in meaning with the
//! compute program: cohesion toward the neighbors' center of mass,
//! separation away from close neighbors, alignment with neighbor velocity,
//! then a speed cap and toroidal wrap. It only sees an iterator of
//! neighbors, so any [`NeighborQuery`] can feed it. [`BruteForce`] is the
//! O(N²) query that matches the GPU program.

use glam::Vec2;
use rayon::prelude::*;

use crate::error::ConfigError;
use crate::generation::{Generation, Slot, SLOT_COUNT};
use crate::params::SimParams;
use crate::particle::Particle;

/// Largest speed a boid may reach after steering.
pub const MAX_SPEED: f32 = 0.1;

/// Half-width of the square simulation domain.
pub const DOMAIN_EXTENT: f32 = 1.0;

/// Produces candidate neighbors for the particle at `index`.
///
/// Implementations may return a superset of the true neighbors; the rule
/// distances are applied inside [`steer`]. The particle itself must not be
/// yielded.
pub trait NeighborQuery: Sync {
    fn neighbors(&self, index: usize) -> impl Iterator<Item = &Particle> + '_;
}

/// Every other particle is a candidate.
#[derive(Clone, Copy, Debug)]
pub struct BruteForce<'a> {
    particles: &'a [Particle],
}

impl<'a> BruteForce<'a> {
    pub fn new(particles: &'a [Particle]) -> Self {
        Self { particles }
    }
}

impl NeighborQuery for BruteForce<'_> {
    fn neighbors(&self, index: usize) -> impl Iterator<Item = &Particle> + '_ {
        self.particles
            .iter()
            .enumerate()
            .filter(move |(j, _)| *j != index)
            .map(|(_, p)| p)
    }
}

/// Scale `velocity` down to [`MAX_SPEED`] if it is faster, keeping direction.
#[inline]
pub fn clamp_speed(velocity: Vec2) -> Vec2 {
    let speed = velocity.length();
    if speed > MAX_SPEED {
        velocity * (MAX_SPEED / speed)
    } else {
        velocity
    }
}

/// Wrap a coordinate that left `[-1, 1]` in to the opposite edge.
#[inline]
fn wrap_coord(x: f32) -> f32 {
    if x > DOMAIN_EXTENT {
        x - 2.0 * DOMAIN_EXTENT
    } else if x < -DOMAIN_EXTENT {
        x + 2.0 * DOMAIN_EXTENT
    } else {
        x
    }
}

/// Toroidal wrap of both coordinates.
#[inline]
pub fn wrap_position(position: Vec2) -> Vec2 {
    Vec2::new(wrap_coord(position.x), wrap_coord(position.y))
}

/// Apply the three steering rules to `me` and integrate one step.
pub fn steer<'a, I>(me: &Particle, neighbors: I, params: &SimParams) -> Particle
where
    I: IntoIterator<Item = &'a Particle>,
{
    let mut center = Vec2::ZERO;
    let mut center_count = 0u32;
    let mut separation = Vec2::ZERO;
    let mut vel_match = Vec2::ZERO;
    let mut vel_count = 0u32;

    for other in neighbors {
        let distance = me.position.distance(other.position);
        if distance < params.rule1_distance {
            center += other.position;
            center_count += 1;
        }
        if distance < params.rule2_distance {
            separation += me.position - other.position;
        }
        if distance < params.rule3_distance {
            vel_match += other.velocity;
            vel_count += 1;
        }
    }

    let cohesion = if center_count > 0 {
        center / center_count as f32 - me.position
    } else {
        Vec2::ZERO
    };
    let alignment = if vel_count > 0 {
        vel_match / vel_count as f32
    } else {
        Vec2::ZERO
    };

    let velocity = clamp_speed(
        me.velocity
            + cohesion * params.rule1_scale
            + separation * params.rule2_scale
            + alignment * params.rule3_scale,
    );
    let position = wrap_position(me.position + velocity * params.delta_t);

    Particle { position, velocity }
}

/// One step over all particles using `query` for neighbor candidates.
///
/// Each index writes only `destination[i]` and reads only `source`, so the
/// indices run in parallel with no ordering between them.
pub fn step_with<Q: NeighborQuery>(
    query: &Q,
    source: &[Particle],
    destination: &mut [Particle],
    params: &SimParams,
) -> Result<(), ConfigError> {
    if source.len() != destination.len() {
        return Err(ConfigError::LengthMismatch {
            source: source.len(),
            destination: destination.len(),
        });
    }

    destination
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, out)| *out = steer(&source[i], query.neighbors(i), params));

    Ok(())
}

/// One brute-force step from `source` into `destination`.
pub fn step(
    source: &[Particle],
    destination: &mut [Particle],
    params: &SimParams,
) -> Result<(), ConfigError> {
    step_with(&BruteForce::new(source), source, destination, params)
}

/// Number of workgroups needed to cover `n` particles.
pub fn workgroup_count(n: u32, workgroup_size: u32) -> Result<u32, ConfigError> {
    if workgroup_size == 0 {
        return Err(ConfigError::ZeroWorkgroupSize);
    }
    Ok(n.div_ceil(workgroup_size))
}

/// Double-buffered flock simulated on the host.
///
/// Mirrors the GPU ping-pong scheme: two equally sized buffers and a
/// [`Generation`] picking which one is current.
#[derive(Clone, Debug)]
pub struct HostFlock {
    buffers: [Vec<Particle>; SLOT_COUNT],
    generation: Generation,
    params: SimParams,
}

impl HostFlock {
    pub fn new(initial: Vec<Particle>, params: SimParams) -> Self {
        let other = initial.clone();
        Self {
            buffers: [initial, other],
            generation: Generation::INITIAL,
            params,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Particles of the latest generation.
    pub fn current(&self) -> &[Particle] {
        self.slot(self.generation.source_slot())
    }

    pub fn slot(&self, slot: Slot) -> &[Particle] {
        &self.buffers[slot.index()]
    }

    /// Advance one step; returns the slot that was written.
    pub fn step(&mut self) -> Result<Slot, ConfigError> {
        let dst = self.generation.destination_slot();
        let [a, b] = &mut self.buffers;
        let (source, destination) = match dst {
            Slot::B => (&*a, b),
            Slot::A => (&*b, a),
        };
        step(source, destination, &self.params)?;
        self.generation = self.generation.next();
        Ok(dst)
    }
}
