//! Pseudo-random number generation, wrapping the `rand` crate (spec §6).
//!
//! Each [`Prng`] owns its own generator state — there is no implicit
//! process-wide seed to keep thread-safety arguments simple (unlike the
//! event queue, nothing here is meant to be shared across threads).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct Prng {
    rng: StdRng,
}

impl Prng {
    /// Seed from OS entropy.
    pub fn new() -> Self {
        Prng {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seed deterministically — for reproducible tests/simulations.
    pub fn from_seed(seed: u64) -> Self {
        Prng {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.rng.gen()
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.gen()
    }

    /// A value in `[0.0, 1.0)`.
    pub fn next_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// A value in `[low, high)`. Panics if `low >= high`.
    pub fn range_i32(&mut self, low: i32, high: i32) -> i32 {
        self.rng.gen_range(low..high)
    }
}

impl Default for Prng {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_reproduces_the_same_sequence() {
        let mut a = Prng::from_seed(42);
        let mut b = Prng::from_seed(42);
        for _ in 0..8 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn range_stays_within_bounds() {
        let mut p = Prng::from_seed(7);
        for _ in 0..100 {
            let v = p.range_i32(10, 20);
            assert!((10..20).contains(&v));
        }
    }
}
