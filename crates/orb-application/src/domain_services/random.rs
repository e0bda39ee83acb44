//! Random Source
//!
//! The weighted selection draw is the only non-deterministic step in
//! provider selection. It reads from this seam so tests can seed it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Source of uniform random integers
pub trait RandomSource: Send + Sync {
    /// Uniform integer in `[low, high]` (inclusive)
    fn next_in_range(&self, low: u64, high: u64) -> u64;
}

/// Reproducible source backed by a seeded [`StdRng`]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Create a source from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_in_range(&self, low: u64, high: u64) -> u64 {
        if low >= high {
            return low;
        }
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.random_range(low..=high)
    }
}

/// Non-reproducible source backed by the thread-local generator
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_in_range(&self, low: u64, high: u64) -> u64 {
        if low >= high {
            return low;
        }
        rand::rng().random_range(low..=high)
    }
}
