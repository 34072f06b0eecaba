//! Deterministic seeding for resampling and simulation
//!
//! Every bootstrap resample and every power trial owns its generator, seeded
//! from `(seed, index)`. Results therefore do not depend on how rayon splits
//! the work or on the number of worker threads.

use fxhash::FxHasher64;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::hash::{Hash, Hasher};

/// Generator used throughout the engine
pub type EngineRng = Xoshiro256PlusPlus;

/// Derive a well-mixed seed for work item `counter` of a stream seeded by `seed`
///
/// SplitMix64 finalizer over `seed ^ golden-ratio * (counter + 1)`.
#[inline]
pub fn counter_rng_seed(seed: u64, counter: u64) -> u64 {
    let mut z = seed ^ counter.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Generator for work item `counter` of the stream seeded by `seed`
#[inline]
pub fn rng_for(seed: u64, counter: u64) -> EngineRng {
    Xoshiro256PlusPlus::seed_from_u64(counter_rng_seed(seed, counter))
}

/// Seed for a named group, e.g. one (model, tier) cell
pub fn seed_for_key(global_seed: u64, key: &str) -> u64 {
    let mut hasher = FxHasher64::default();
    key.hash(&mut hasher);
    counter_rng_seed(global_seed, hasher.finish())
}
