//! Pluggable randomness for routing and port selection.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource: Send + Sync {
    /// Uniform draw in `[0, 1)`.
    fn unit(&self) -> f64;

    /// Uniform index in `[0, upper)`. `upper` must be non-zero.
    fn below(&self, upper: usize) -> usize;

    /// Uniform port in `[min, max)`.
    fn port(&self, min: u16, max: u16) -> u16 {
        let span = usize::from(max.saturating_sub(min)).max(1);
        min + self.below(span) as u16
    }
}

/// Thread-local RNG, the default.
#[derive(Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn unit(&self) -> f64 {
        rand::thread_rng().r#gen::<f64>()
    }

    fn below(&self, upper: usize) -> usize {
        rand::thread_rng().gen_range(0..upper)
    }
}

/// Deterministic source for reproducible runs.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn unit(&self) -> f64 {
        self.rng.lock().r#gen::<f64>()
    }

    fn below(&self, upper: usize) -> usize {
        self.rng.lock().gen_range(0..upper)
    }
}
