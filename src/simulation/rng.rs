//! Random numbers for the simulation

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

/// Uniform integers in an inclusive range
pub trait RandomSource {
    /// Random value in `low..=high`
    fn rand_next(&mut self, low: i32, high: i32) -> i32;
}

/// Shared simulation generator; seeded runs are reproducible
#[derive(Debug, Clone)]
pub struct SimRng {
    rng: StdRng,
}

impl SimRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl RandomSource for SimRng {
    fn rand_next(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..=high)
    }
}
