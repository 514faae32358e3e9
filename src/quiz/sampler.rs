use rand::seq::SliceRandom;
use rand::Rng;

/// Smallest pool a four-option multiple-choice quiz can be built from.
pub const MULTIPLE_CHOICE_FLOOR: usize = 4;
/// Smallest exercise set offered by the negation drill.
pub const NEGATION_FLOOR: usize = 3;

/// Fisher-Yates over a copy of `items`; the input is left untouched.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

/// Draws `count` distinct elements of `pool` in random order.
pub fn sample<T: Clone, R: Rng + ?Sized>(pool: &[T], count: usize, rng: &mut R) -> Vec<T> {
    let mut picked = shuffle(pool, rng);
    picked.truncate(count);
    picked
}

/// Clamps a requested count into `[min(floor, pool_len), pool_len]`.
pub fn clamp_count(requested: usize, floor: usize, pool_len: usize) -> usize {
    requested.clamp(floor.min(pool_len), pool_len)
}
