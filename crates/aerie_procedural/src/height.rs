//! # Height Field
//!
//! Maps a world `(x, z)` to an elevation and a shading class.
//!
//! The field is a pure function of the coordinate, the seed and the
//! [`NoiseProfile`]: nothing advances between calls, so re-sampling a point
//! after its chunk was evicted and rebuilt yields the same bits.

use serde::{Deserialize, Serialize};

use crate::noise::{SimplexNoise, WorldSeed};

/// Octave parameters for the fractal height sum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseProfile {
    /// Frequency of the first octave (cycles per world unit).
    pub frequency: f64,
    /// Amplitude of the first octave (world units).
    pub amplitude: f64,
    /// Number of octaves; each doubles frequency and halves amplitude.
    pub octaves: u32,
}

impl NoiseProfile {
    /// Broad rolling terrain used by the streaming landscape.
    pub const BROAD: Self = Self {
        frequency: 0.02,
        amplitude: 15.0,
        octaves: 4,
    };

    /// Finer, lower relief.
    pub const DETAIL: Self = Self {
        frequency: 0.05,
        amplitude: 6.0,
        octaves: 4,
    };
}

impl Default for NoiseProfile {
    fn default() -> Self {
        Self::BROAD
    }
}

/// Categorical elevation bucket used for vertex shading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ShadeClass {
    /// Deep valleys, `t < 0.2`.
    Lowland = 0,
    /// Lower ground, `0.2 <= t < 0.4`.
    Ground = 1,
    /// Hills, `0.4 <= t < 0.7`.
    Hill = 2,
    /// Rock and peaks, `t >= 0.7`.
    Peak = 3,
}

impl ShadeClass {
    /// Buckets a normalized elevation.
    #[must_use]
    pub fn from_normalized(t: f64) -> Self {
        if t < 0.2 {
            Self::Lowland
        } else if t < 0.4 {
            Self::Ground
        } else if t < 0.7 {
            Self::Hill
        } else {
            Self::Peak
        }
    }
}

/// One evaluation of the height field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightSample {
    /// Elevation in world units.
    pub elevation: f64,
    /// Elevation normalized against the first octave amplitude, in `[0, 1]`.
    pub normalized: f64,
    /// Shading bucket derived from `normalized`.
    pub shade: ShadeClass,
}

impl HeightSample {
    /// Builds a sample, deriving the normalized height and shade class.
    ///
    /// `t = (elevation + amplitude) / (2 * amplitude)`, clamped to `[0, 1]`.
    #[must_use]
    pub fn new(elevation: f64, amplitude: f64) -> Self {
        let normalized = ((elevation + amplitude) / (2.0 * amplitude)).clamp(0.0, 1.0);
        Self {
            elevation,
            normalized,
            shade: ShadeClass::from_normalized(normalized),
        }
    }

    /// RGB vertex color for this sample.
    ///
    /// Green bands for the three low buckets, grey scaled by height on peaks.
    #[must_use]
    pub fn color(&self) -> [f32; 3] {
        match self.shade {
            ShadeClass::Lowland => hsl_to_rgb(0.35, 0.9, 0.2),
            ShadeClass::Ground => hsl_to_rgb(0.35, 0.9, 0.3),
            ShadeClass::Hill => hsl_to_rgb(0.35, 0.9, 0.4),
            ShadeClass::Peak => hsl_to_rgb(0.0, 0.0, self.normalized),
        }
    }
}

/// Anything the chunk builder can read elevations from.
///
/// Implementations must be pure: the same `(x, z)` always returns the same
/// sample.
pub trait HeightSource {
    /// Samples the field at a world coordinate.
    fn sample(&self, x: f64, z: f64) -> HeightSample;
}

/// Seeded fractal simplex height field.
#[derive(Clone, Debug)]
pub struct HeightField {
    noise: SimplexNoise,
    profile: NoiseProfile,
    seed: WorldSeed,
}

impl HeightField {
    /// Creates a height field for a seed and octave profile.
    #[must_use]
    pub fn new(seed: WorldSeed, profile: NoiseProfile) -> Self {
        Self {
            noise: SimplexNoise::new(seed),
            profile,
            seed,
        }
    }

    /// Returns the octave profile.
    #[must_use]
    pub const fn profile(&self) -> NoiseProfile {
        self.profile
    }

    /// Returns the seed the field was built from.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Raw elevation without the shading derivation.
    #[inline]
    #[must_use]
    pub fn elevation(&self, x: f64, z: f64) -> f64 {
        let NoiseProfile {
            frequency,
            amplitude,
            octaves,
        } = self.profile;
        self.noise.fractal(x, z, octaves, frequency, amplitude)
    }
}

impl HeightSource for HeightField {
    fn sample(&self, x: f64, z: f64) -> HeightSample {
        HeightSample::new(self.elevation(x, z), self.profile.amplitude)
    }
}

impl<T: HeightSource + ?Sized> HeightSource for &T {
    fn sample(&self, x: f64, z: f64) -> HeightSample {
        (**self).sample(x, z)
    }
}

/// HSL (all components in `[0, 1]`) to RGB.
#[must_use]
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [f32; 3] {
    if s <= 0.0 {
        let v = l as f32;
        return [v, v, v];
    }
    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        hue_channel(p, q, h + 1.0 / 3.0) as f32,
        hue_channel(p, q, h) as f32,
        hue_channel(p, q, h - 1.0 / 3.0) as f32,
    ]
}

fn hue_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_pure() {
        let field = HeightField::new(WorldSeed::new(9), NoiseProfile::BROAD);
        for i in 0..100 {
            let x = f64::from(i) * 13.7 - 600.0;
            let z = f64::from(i) * -5.3 + 40.0;
            let a = field.sample(x, z);
            let b = field.sample(x, z);
            assert_eq!(a.elevation.to_bits(), b.elevation.to_bits());
            assert_eq!(a.shade, b.shade);
        }
    }

    #[test]
    fn test_two_fields_with_same_seed_agree() {
        let a = HeightField::new(WorldSeed::new(77), NoiseProfile::DETAIL);
        let b = HeightField::new(WorldSeed::new(77), NoiseProfile::DETAIL);
        assert_eq!(a.elevation(123.4, -56.7), b.elevation(123.4, -56.7));
    }

    #[test]
    fn test_shade_buckets() {
        assert_eq!(ShadeClass::from_normalized(0.0), ShadeClass::Lowland);
        assert_eq!(ShadeClass::from_normalized(0.199), ShadeClass::Lowland);
        assert_eq!(ShadeClass::from_normalized(0.2), ShadeClass::Ground);
        assert_eq!(ShadeClass::from_normalized(0.4), ShadeClass::Hill);
        assert_eq!(ShadeClass::from_normalized(0.699), ShadeClass::Hill);
        assert_eq!(ShadeClass::from_normalized(0.7), ShadeClass::Peak);
        assert_eq!(ShadeClass::from_normalized(1.0), ShadeClass::Peak);
    }

    #[test]
    fn test_normalization_clamps() {
        assert_eq!(HeightSample::new(-100.0, 15.0).normalized, 0.0);
        assert_eq!(HeightSample::new(100.0, 15.0).normalized, 1.0);
        assert_eq!(HeightSample::new(0.0, 15.0).normalized, 0.5);
        assert_eq!(HeightSample::new(0.0, 15.0).shade, ShadeClass::Hill);
    }

    #[test]
    fn test_peak_color_is_grey_lightness() {
        let sample = HeightSample::new(15.0, 15.0);
        assert_eq!(sample.color(), [1.0, 1.0, 1.0]);

        let sample = HeightSample::new(9.0, 15.0);
        let [r, g, b] = sample.color();
        assert!((r - 0.8).abs() < 1e-6 && r == g && g == b);
    }

    #[test]
    fn test_lowland_color_is_dark_green() {
        let [r, g, b] = HeightSample::new(-15.0, 15.0).color();
        assert!(g > r && g > b, "expected green, got {r} {g} {b}");
        assert!(g < 0.5);
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]);
        let [r, g, b] = hsl_to_rgb(1.0 / 3.0, 1.0, 0.5);
        assert!(r.abs() < 1e-6 && (g - 1.0).abs() < 1e-6 && b.abs() < 1e-6);
    }
}
