//! Selection primitives shared by the three population variants. Each
//! variant pairs elitism with one of these draws: the disc packer uses the
//! fitness-weighted roulette, the vector and neuro populations use the
//! tournament.

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

/// Fitness-proportionate sampling with replacement. Weights are expected to
/// be non-negative; if the weight set is degenerate (zero total, or any
/// negative entry) the draw degrades to uniform sampling over the pool.
pub fn roulette<T: Clone, R: Rng>(pool: &[T], weights: &[f64], draws: usize, rng: &mut R) -> Vec<T> {
    if draws == 0 || pool.is_empty() {
        return Vec::new();
    }
    match WeightedIndex::new(weights) {
        Ok(dist) => (0..draws).map(|_| pool[dist.sample(rng)].clone()).collect(),
        Err(_) => (0..draws)
            .map(|_| pool[rng.gen_range(0..pool.len())].clone())
            .collect(),
    }
}

/// One tournament round over a pool sorted best-first: sample
/// `tournament_size` indices with replacement, the smallest index (the
/// fittest contestant) wins and is removed from the pool.
///
/// Callers must validate `1 <= tournament_size` and a non-empty pool.
pub fn tournament<T, R: Rng>(pool: &mut Vec<T>, tournament_size: usize, rng: &mut R) -> T {
    let winner = (0..tournament_size)
        .map(|_| rng.gen_range(0..pool.len()))
        .min()
        .unwrap_or(0);
    pool.remove(winner)
}
