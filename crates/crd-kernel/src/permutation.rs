//! Seeded, unbiased permutation.
//!
//! The seed-to-permutation mapping is fixed: a ChaCha8 stream seeded with
//! `seed_from_u64`, consumed by a descending Fisher-Yates pass. The same seed
//! and input therefore give the same output on every platform for a given
//! version of `rand`/`rand_chacha`.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Generator used for one randomization. Each call gets its own stream.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// In-place Fisher-Yates shuffle.
///
/// For `i` from `n - 1` down to `1`, swaps element `i` with a uniformly
/// chosen element in `0..=i`. Every ordering is equally likely and the pass
/// always terminates.
pub fn shuffle<T, R>(items: &mut [T], rng: &mut R)
where
    R: Rng + ?Sized,
{
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Shuffle `items` with a fresh generator seeded from `seed`.
pub fn permute<T>(mut items: Vec<T>, seed: u64) -> Vec<T> {
    let mut rng = seeded_rng(seed);
    shuffle(&mut items, &mut rng);
    items
}
