//! # Deterministic Randomness
//!
//! Each collection owns one ChaCha8 stream seeded from its settings, so a
//! restarted or fast-forwarded effect draws exactly the same numbers as the
//! first run.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Per-collection random stream.
#[derive(Clone, Debug)]
pub struct ParticleRng {
    seed: u64,
    rng: ChaCha8Rng,
}

impl ParticleRng {
    /// Creates a stream from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The seed this stream started from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Rewinds to the start of the stream.
    pub fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }

    /// Uniform float in `[lo, hi]`. Empty or inverted ranges return `lo`.
    pub fn float(&mut self, lo: f32, hi: f32) -> f32 {
        if !lo.is_finite() || !hi.is_finite() || hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform integer in `[lo, hi]`. Inverted ranges return `lo`.
    pub fn int(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }
}
