//! # Streaming Configuration
//!
//! Fixed at construction. Changing any value means building a new streamer
//! (or calling [`crate::TerrainStreamer::reset`]) so the resident set is
//! derived from scratch.
//!
//! ## File Format
//!
//! ```toml
//! chunk_size = 100.0
//! segments = 50
//! load_distance = 300.0
//! seed = 42
//! attributes = "vertex_color"
//! max_builds_per_tick = 8
//!
//! [noise]
//! frequency = 0.02
//! amplitude = 15.0
//! octaves = 4
//! ```
//!
//! Every key is optional; missing keys take the defaults below.

use serde::{Deserialize, Serialize};

use crate::builder::{AttributeMode, MAX_SEGMENTS};
use crate::error::{TerrainError, TerrainResult};
use crate::height::NoiseProfile;
use crate::noise::WorldSeed;

/// Largest accepted `ceil(load_distance / chunk_size)`.
pub const MAX_LOAD_RADIUS: i32 = 256;

/// Terrain streaming parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamingConfig {
    /// Side length of one chunk in world units.
    pub chunk_size: f64,
    /// Quads per chunk axis.
    pub segments: u32,
    /// Radius around the focus within which chunks must be resident.
    pub load_distance: f64,
    /// Noise seed.
    pub seed: WorldSeed,
    /// Per-vertex attribute stream.
    pub attributes: AttributeMode,
    /// Upper bound on chunk builds per `update`; `None` builds everything
    /// in one tick.
    pub max_builds_per_tick: Option<usize>,
    /// Octave parameters. Kept last: TOML tables follow plain keys.
    pub noise: NoiseProfile,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100.0,
            segments: 50,
            load_distance: 300.0,
            seed: WorldSeed::default(),
            attributes: AttributeMode::VertexColor,
            max_builds_per_tick: None,
            noise: NoiseProfile::BROAD,
        }
    }
}

impl StreamingConfig {
    /// Small, fast configuration for tests: 16-unit chunks, 4 segments,
    /// 48-unit load distance.
    #[must_use]
    pub fn test() -> Self {
        Self {
            chunk_size: 16.0,
            segments: 4,
            load_distance: 48.0,
            ..Self::default()
        }
    }

    /// Sets the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: WorldSeed) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the per-tick build budget.
    #[must_use]
    pub const fn with_build_budget(mut self, max_builds_per_tick: usize) -> Self {
        self.max_builds_per_tick = Some(max_builds_per_tick);
        self
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`TerrainError::ConfigParse`] for malformed TOML or unknown keys,
    /// [`TerrainError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> TerrainResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| TerrainError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// [`TerrainError::ConfigParse`] if a value has no TOML representation.
    pub fn to_toml_string(&self) -> TerrainResult<String> {
        toml::to_string(self).map_err(|e| TerrainError::ConfigParse(e.to_string()))
    }

    /// Checks every value.
    ///
    /// # Errors
    ///
    /// [`TerrainError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> TerrainResult<()> {
        let invalid = |msg: String| Err(TerrainError::InvalidConfig(msg));

        if !(self.chunk_size.is_finite() && self.chunk_size > 0.0) {
            return invalid(format!("chunk_size must be positive, got {}", self.chunk_size));
        }
        if self.segments == 0 || self.segments > MAX_SEGMENTS {
            return invalid(format!(
                "segments must be in 1..={MAX_SEGMENTS}, got {}",
                self.segments
            ));
        }
        if !(self.load_distance.is_finite() && self.load_distance >= 0.0) {
            return invalid(format!(
                "load_distance must be non-negative, got {}",
                self.load_distance
            ));
        }
        if (self.load_distance / self.chunk_size).ceil() > f64::from(MAX_LOAD_RADIUS) {
            return invalid(format!(
                "load_distance {} spans more than {MAX_LOAD_RADIUS} chunks",
                self.load_distance
            ));
        }
        if self.noise.octaves == 0 {
            return invalid("noise.octaves must be at least 1".to_owned());
        }
        if !(self.noise.frequency.is_finite() && self.noise.frequency > 0.0) {
            return invalid(format!(
                "noise.frequency must be positive, got {}",
                self.noise.frequency
            ));
        }
        if !(self.noise.amplitude.is_finite() && self.noise.amplitude > 0.0) {
            return invalid(format!(
                "noise.amplitude must be positive, got {}",
                self.noise.amplitude
            ));
        }
        if self.max_builds_per_tick == Some(0) {
            return invalid("max_builds_per_tick must be at least 1".to_owned());
        }
        Ok(())
    }

    /// `ceil(load_distance / chunk_size)`: half-width of the candidate window
    /// in chunks.
    #[must_use]
    pub fn load_radius(&self) -> i32 {
        (self.load_distance / self.chunk_size).ceil() as i32
    }
}
