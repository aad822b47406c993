//! Initial particle population.
//!
//! Every particle draws four independent uniform values: position x, position
//! y, velocity x, velocity y. Positions land in `[-1, 1]`, velocities in
//! `[-0.1, 0.1]`. Randomness always comes from a caller-supplied source so a
//! fixed seed reproduces the same population.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::particle::Particle;

/// Half-extent of the initial velocity range.
pub const INITIAL_SPEED_RANGE: f32 = 0.1;

/// Build the RNG for a run. `None` seeds from OS entropy.
pub fn rng_from_seed(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

/// Map a uniform sample in `[0, 1)` onto `[-1, 1)`.
#[inline]
fn signed_unit<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    2.0 * (rng.gen::<f32>() - 0.5)
}

/// Generate `n` particles with randomized position and velocity.
pub fn initialize<R: Rng + ?Sized>(n: u32, rng: &mut R) -> Vec<Particle> {
    (0..n)
        .map(|_| {
            let position = Vec2::new(signed_unit(rng), signed_unit(rng));
            let velocity = Vec2::new(signed_unit(rng), signed_unit(rng)) * INITIAL_SPEED_RANGE;
            Particle { position, velocity }
        })
        .collect()
}

/// Shorthand for [`initialize`] with a fixed seed.
pub fn initialize_seeded(n: u32, seed: u64) -> Vec<Particle> {
    initialize(n, &mut SmallRng::seed_from_u64(seed))
}
