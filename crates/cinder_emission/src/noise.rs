//! # Simplex Noise
//!
//! Deterministic 2D simplex noise, sampled along a line to drive
//! noise-based emission rates.
//!
//! ## Determinism Guarantee
//!
//! Given the same `NoiseSeed`, this produces **exactly** the same values on
//! any platform, any time. Replays and skip-to-time depend on this.

use serde::{Deserialize, Serialize};

/// Seed for a noise field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoiseSeed(u64);

impl NoiseSeed {
    /// Creates a seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Raw value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl Default for NoiseSeed {
    fn default() -> Self {
        Self(0xC1DE_55EE_D0FF_1CE5)
    }
}

/// Pre-computed permutation table, built once from the seed.
#[derive(Clone, Debug)]
struct PermutationTable {
    /// 256 entries, doubled so lookups never wrap.
    perm: [u8; 512],
}

/// 12 gradients for 2D simplex.
const GRADIENTS: [[i8; 2]; 12] = [
    [1, 0], [1, 1], [0, 1], [-1, 1],
    [-1, 0], [-1, -1], [0, -1], [1, -1],
    [1, 0], [0, 1], [-1, 0], [0, -1],
];

impl PermutationTable {
    fn new(seed: NoiseSeed) -> Self {
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates with xorshift64. A zero state would never move, so
        // the seed is mixed first.
        let mut state = seed.value() ^ 0x9E37_79B9_7F4A_7C15;
        for i in (1..256).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            perm.swap(i, j);
        }

        let (low, high) = perm.split_at_mut(256);
        high.copy_from_slice(low);

        Self { perm }
    }

    #[inline]
    fn get(&self, index: usize) -> u8 {
        self.perm[index & 511]
    }

    #[inline]
    fn gradient(hash: u8) -> [i8; 2] {
        GRADIENTS[(hash % 12) as usize]
    }
}

/// 2D simplex noise generator.
///
/// Produces smooth, continuous values in `[-1, 1]`. O(1) per sample, no
/// allocation.
#[derive(Clone, Debug)]
pub struct SimplexNoise {
    perm_table: PermutationTable,
}

impl SimplexNoise {
    /// Skew factor, (sqrt(3) - 1) / 2.
    const F2: f64 = 0.366_025_403_784_439;
    /// Unskew factor, (3 - sqrt(3)) / 6.
    const G2: f64 = 0.211_324_865_405_187;

    /// Creates a generator from a seed.
    #[must_use]
    pub fn new(seed: NoiseSeed) -> Self {
        Self {
            perm_table: PermutationTable::new(seed),
        }
    }

    /// Samples the field at `(x, y)`. Result is clamped to `[-1, 1]`.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let skew = (x + y) * Self::F2;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);

        let unskew = f64::from(i.wrapping_add(j)) * Self::G2;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);

        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - f64::from(i1) + Self::G2;
        let y1 = y0 - f64::from(j1) + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let i1 = i1 as usize;
        let j1 = j1 as usize;

        let gi0 = self.perm_table.get(ii + self.perm_table.get(jj) as usize);
        let gi1 = self
            .perm_table
            .get(ii + i1 + self.perm_table.get(jj + j1) as usize);
        let gi2 = self
            .perm_table
            .get(ii + 1 + self.perm_table.get(jj + 1) as usize);

        let n = contribution(x0, y0, gi0) + contribution(x1, y1, gi1) + contribution(x2, y2, gi2);

        // 70 normalizes the corner sum to roughly [-1, 1].
        (70.0 * n).clamp(-1.0, 1.0)
    }

    /// Samples along the line `y = 0`. Used for time-driven noise.
    #[inline]
    #[must_use]
    pub fn sample_line(&self, t: f64) -> f64 {
        self.sample(t, 0.0)
    }
}

#[inline]
fn contribution(x: f64, y: f64, hash: u8) -> f64 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        0.0
    } else {
        let grad = PermutationTable::gradient(hash);
        let t2 = t * t;
        t2 * t2 * (x * f64::from(grad[0]) + y * f64::from(grad[1]))
    }
}

/// Floor for the simplex lattice. Saturates far outside the i32 range.
#[inline]
fn fast_floor(x: f64) -> i32 {
    let xi = x as i32;
    if x < f64::from(xi) {
        xi - 1
    } else {
        xi
    }
}
