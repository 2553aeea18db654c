//! # Simplex Noise
//!
//! Seeded 2D simplex noise, the primitive every height sample is built from.
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed`, the permutation table is identical and every
//! sample is computed with plain `f64` arithmetic in a fixed order, so the
//! same coordinate always yields the same bits.

use serde::{Deserialize, Serialize};

/// World seed for deterministic generation.
///
/// All terrain derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives an independent sub-seed for a named purpose.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        let mut hash = self.0 ^ purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0x5EED_0FA3_21E0_0001)
    }
}

/// Gradient directions for 2D simplex corners.
const GRADIENTS: [[i8; 2]; 12] = [
    [1, 0], [1, 1], [0, 1], [-1, 1],
    [-1, 0], [-1, -1], [0, -1], [1, -1],
    [1, 0], [0, 1], [-1, 0], [0, -1],
];

/// Seed-shuffled permutation, doubled so lookups never wrap mid-hash.
#[derive(Clone)]
struct PermutationTable {
    perm: [u8; 512],
}

impl PermutationTable {
    fn new(seed: WorldSeed) -> Self {
        let mut base = [0u8; 256];
        for (slot, value) in base.iter_mut().zip(0u8..=255) {
            *slot = value;
        }

        // Fisher-Yates driven by xorshift64. A zero state would never advance.
        let mut state = seed.value() | 1;
        for i in (1..256usize).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let j = (state % (i as u64 + 1)) as usize;
            base.swap(i, j);
        }

        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(&base);
        perm[256..].copy_from_slice(&base);
        Self { perm }
    }

    #[inline]
    fn get(&self, index: usize) -> usize {
        usize::from(self.perm[index & 511])
    }
}

/// 2D simplex noise generator.
///
/// Produces smooth, continuous values roughly in `[-1, 1]`. Holds only the
/// immutable permutation table, so a shared reference can be sampled from
/// any number of builders at once.
#[derive(Clone)]
pub struct SimplexNoise {
    table: PermutationTable,
}

impl std::fmt::Debug for SimplexNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplexNoise").finish_non_exhaustive()
    }
}

impl SimplexNoise {
    /// Skewing factor: (sqrt(3) - 1) / 2
    const F2: f64 = 0.366_025_403_784_438_6;
    /// Unskewing factor: (3 - sqrt(3)) / 6
    const G2: f64 = 0.211_324_865_405_187_1;

    /// Creates a new simplex noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            table: PermutationTable::new(seed),
        }
    }

    /// Samples 2D simplex noise at the given coordinates.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let skew = (x + y) * Self::F2;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);

        let unskew = (i as f64 + j as f64) * Self::G2;
        let x0 = x - (i as f64 - unskew);
        let y0 = y - (j as f64 - unskew);

        // Lower or upper triangle of the skewed cell
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + Self::G2;
        let y1 = y0 - j1 as f64 + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let t = &self.table;

        let g0 = t.get(ii + t.get(jj));
        let g1 = t.get(ii + i1 + t.get(jj + j1));
        let g2 = t.get(ii + 1 + t.get(jj + 1));

        70.0 * (corner(x0, y0, g0) + corner(x1, y1, g1) + corner(x2, y2, g2))
    }

    /// Sums `octaves` layers of noise starting at `frequency` / `amplitude`,
    /// doubling frequency and halving amplitude on every layer.
    ///
    /// Unlike a normalized fractal sum the result keeps its world units: with
    /// amplitude `a` the output lies roughly in `[-2a, 2a]`.
    #[must_use]
    pub fn fractal(&self, x: f64, z: f64, octaves: u32, frequency: f64, amplitude: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = frequency;
        let mut amplitude = amplitude;

        for _ in 0..octaves {
            total += self.sample(x * frequency, z * frequency) * amplitude;
            frequency *= 2.0;
            amplitude *= 0.5;
        }

        total
    }
}

#[inline]
fn corner(x: f64, y: f64, hash: usize) -> f64 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        return 0.0;
    }
    let grad = GRADIENTS[hash % 12];
    let t2 = t * t;
    t2 * t2 * (x * f64::from(grad[0]) + y * f64::from(grad[1]))
}

#[inline]
fn fast_floor(x: f64) -> i64 {
    let xi = x as i64;
    if x < xi as f64 { xi.saturating_sub(1) } else { xi }
}
