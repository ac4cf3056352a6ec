//! Seeded random helpers shared by the generator phases.
//!
//! All randomness of a run flows from a single `ChaCha8Rng`, so a seed fully
//! determines the output.

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub type GeneratorRng = ChaCha8Rng;

/// Largest seed picked when the caller asks for a random one.
pub const MAX_RANDOM_SEED: u32 = 999_999;

pub fn seeded(seed: u32) -> GeneratorRng {
    ChaCha8Rng::seed_from_u64(u64::from(seed))
}

/// A seed of 0 means "pick one".
pub fn resolve_seed(seed: u32) -> u32 {
    if seed == 0 {
        rand::thread_rng().gen_range(1..=MAX_RANDOM_SEED)
    } else {
        seed
    }
}

/// Inclusive integer range.
pub fn range(rng: &mut GeneratorRng, min: i32, max: i32) -> i32 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}

pub fn coin_flip(rng: &mut GeneratorRng) -> bool {
    rng.gen_bool(0.5)
}

/// Percent-chance roll.
pub fn chance(rng: &mut GeneratorRng, percent: u32) -> bool {
    percent > 0 && rng.gen_range(0..100) < percent
}

pub fn pick<'a, T>(rng: &mut GeneratorRng, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}

pub fn shuffle<T>(rng: &mut GeneratorRng, items: &mut [T]) {
    items.shuffle(rng);
}

/// Pick by integer weights. Returns `None` when every weight is zero or the list is empty.
pub fn weighted_pick<'a, T>(rng: &mut GeneratorRng, items: &'a [(T, u32)]) -> Option<&'a T> {
    let dist = WeightedIndex::new(items.iter().map(|(_, w)| *w)).ok()?;
    Some(&items[dist.sample(rng)].0)
}
