//! # Terrain Streamer
//!
//! Keeps the chunks around a moving focus resident.
//!
//! ## Per-Tick Algorithm
//!
//! 1. `center = floor(focus / chunk_size)`
//! 2. `radius = ceil(load_distance / chunk_size)`
//! 3. Every offset in `[-radius, radius]²` whose length in chunks, times
//!    `chunk_size`, is `<= load_distance` is desired.
//! 4. Resident chunks outside the desired set are detached and released.
//! 5. Desired coordinates that are not resident are built and attached.
//!
//! With no build budget the resident set equals the desired set after every
//! [`TerrainStreamer::update`]. The desired set is recomputed from the focus
//! each tick; nothing accumulates.
//!
//! ## Example
//!
//! ```rust
//! use aerie_procedural::{ChunkCoord, NullSurface, StreamingConfig, TerrainStreamer};
//!
//! let mut streamer = TerrainStreamer::new(StreamingConfig::test(), NullSurface).unwrap();
//! let report = streamer.update(0.0, 0.0);
//!
//! assert!(report.is_converged());
//! assert!(streamer.is_resident(ChunkCoord::new(0, 0)));
//! ```

use std::collections::HashSet;

use crate::builder::ChunkBuilder;
use crate::cache::{ChunkCache, TickReport};
use crate::chunk::{Chunk, ChunkCoord, MaterialHandle};
use crate::config::StreamingConfig;
use crate::error::TerrainResult;
use crate::height::HeightField;
use crate::surface::RenderSurface;

/// Coordinates that should be resident, ordered nearest-first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DesiredSet {
    order: Vec<ChunkCoord>,
    members: HashSet<ChunkCoord>,
}

impl DesiredSet {
    /// Disc of chunks around `center`: offsets within `radius` in the square
    /// window whose scaled distance does not exceed `load_distance`.
    ///
    /// Offsets that would leave the `i32` coordinate range are skipped, so at
    /// the edge of the addressable grid the disc is cut off.
    #[must_use]
    pub fn around(center: ChunkCoord, radius: i32, chunk_size: f64, load_distance: f64) -> Self {
        let mut order = Vec::new();
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                let distance = f64::from(dx).hypot(f64::from(dz)) * chunk_size;
                if distance > load_distance {
                    continue;
                }
                if let Some(coord) = center.checked_offset(dx, dz) {
                    order.push(coord);
                }
            }
        }

        // Nearest first so a build budget fills in from the focus outward.
        order.sort_by_key(|c| {
            let dx = i64::from(c.cx) - i64::from(center.cx);
            let dz = i64::from(c.cz) - i64::from(center.cz);
            (dx * dx + dz * dz, c.cz, c.cx)
        });

        let members = order.iter().copied().collect();
        Self { order, members }
    }

    /// Set with an explicit build order.
    #[must_use]
    pub fn from_coords(coords: impl IntoIterator<Item = ChunkCoord>) -> Self {
        let mut set = Self::default();
        for coord in coords {
            if set.members.insert(coord) {
                set.order.push(coord);
            }
        }
        set
    }

    /// Returns true if `coord` is desired.
    #[must_use]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.members.contains(&coord)
    }

    /// Number of desired coordinates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if nothing is desired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Desired coordinates, nearest first.
    pub fn iter(&self) -> std::slice::Iter<'_, ChunkCoord> {
        self.order.iter()
    }

    /// Membership view.
    #[must_use]
    pub const fn as_set(&self) -> &HashSet<ChunkCoord> {
        &self.members
    }
}

/// How [`TerrainStreamer::height_query`] resolves an elevation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeightQuery {
    /// Nearest stored grid vertex of the resident chunk. `None` if the chunk
    /// is not resident.
    #[default]
    Snapped,
    /// Bilinear blend of the four vertices of the containing grid cell.
    /// `None` if the chunk is not resident.
    Interpolated,
    /// Height field evaluated directly. Always available.
    Exact,
}

/// Session counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Completed `update` calls.
    pub ticks: u64,
    /// Chunks built since construction.
    pub generated_this_session: u64,
    /// Chunks released since construction.
    pub unloaded_this_session: u64,
    /// Build attempts that failed.
    pub failed_builds: u64,
}

/// Streaming controller: owns the cache, the height field and the surface.
pub struct TerrainStreamer<S: RenderSurface> {
    config: StreamingConfig,
    field: HeightField,
    builder: ChunkBuilder,
    cache: ChunkCache,
    surface: S,
    stats: StreamStats,
    last_center: Option<ChunkCoord>,
}

impl<S: RenderSurface> TerrainStreamer<S> {
    /// Validates `config` and creates an empty streamer.
    ///
    /// # Errors
    ///
    /// [`crate::TerrainError::InvalidConfig`] if any value is out of range.
    pub fn new(config: StreamingConfig, surface: S) -> TerrainResult<Self> {
        config.validate()?;

        let field = HeightField::new(config.seed, config.noise);
        let builder = ChunkBuilder::new().with_attributes(config.attributes);

        tracing::info!(
            chunk_size = config.chunk_size,
            segments = config.segments,
            load_distance = config.load_distance,
            seed = config.seed.value(),
            "terrain streamer ready"
        );

        Ok(Self {
            config,
            field,
            builder,
            cache: ChunkCache::new(),
            surface,
            stats: StreamStats::default(),
            last_center: None,
        })
    }

    /// Attaches a shared material to every chunk built from now on.
    #[must_use]
    pub fn with_material(mut self, material: MaterialHandle) -> Self {
        self.builder = self.builder.with_material(material);
        self
    }

    /// Runs one reconciliation tick for a focus at world `(x, z)`.
    ///
    /// Chunk coordinates are `i32`, so the addressable landscape ends at
    /// `i32::MAX * chunk_size` world units per axis. A focus beyond that is
    /// treated as standing in the last chunk, and the part of the disc past
    /// the edge is never loaded.
    ///
    /// A non-finite focus is ignored: nothing is built or evicted and an
    /// empty report is returned.
    pub fn update(&mut self, focus_x: f64, focus_z: f64) -> TickReport {
        if !(focus_x.is_finite() && focus_z.is_finite()) {
            tracing::warn!(focus_x, focus_z, "non-finite focus, terrain tick skipped");
            return TickReport::default();
        }

        let center = self.center_of(focus_x, focus_z);
        let desired = self.desired_set(focus_x, focus_z);

        let Self {
            config,
            field,
            builder,
            cache,
            surface,
            ..
        } = self;
        let (chunk_size, segments) = (config.chunk_size, config.segments);

        let report = cache.ensure_resident(&desired, surface, config.max_builds_per_tick, |coord| {
            let (x, z) = coord.origin(chunk_size);
            builder.build(x, z, chunk_size, segments, &*field)
        });

        self.stats.ticks += 1;
        self.stats.generated_this_session += report.built.len() as u64;
        self.stats.unloaded_this_session += report.evicted.len() as u64;
        self.stats.failed_builds += report.failed.len() as u64;

        if !report.is_noop() || !report.is_converged() {
            tracing::debug!(
                %center,
                built = report.built.len(),
                evicted = report.evicted.len(),
                deferred = report.deferred.len(),
                failed = report.failed.len(),
                resident = self.cache.len(),
                "terrain tick"
            );
        }
        self.last_center = Some(center);

        report
    }

    /// Chunk containing world `(x, z)`.
    #[must_use]
    pub fn center_of(&self, x: f64, z: f64) -> ChunkCoord {
        ChunkCoord::from_world(x, z, self.config.chunk_size)
    }

    /// Coordinates that must be resident for a focus at `(x, z)`.
    #[must_use]
    pub fn desired_set(&self, x: f64, z: f64) -> DesiredSet {
        DesiredSet::around(
            self.center_of(x, z),
            self.config.load_radius(),
            self.config.chunk_size,
            self.config.load_distance,
        )
    }

    /// Detaches and releases every chunk. The next `update` rebuilds the
    /// resident set from scratch.
    pub fn reset(&mut self) -> Vec<ChunkCoord> {
        let evicted = self.cache.clear(&mut self.surface);
        self.stats.unloaded_this_session += evicted.len() as u64;
        self.last_center = None;
        tracing::info!(evicted = evicted.len(), "terrain streamer reset");
        evicted
    }

    /// Elevation at world `(x, z)` from the nearest stored vertex.
    ///
    /// Returns `0.0` when the owning chunk is not resident: a cheap degraded
    /// answer, not an error. Use [`TerrainStreamer::height_query`] to tell
    /// "unavailable" apart from sea level, or
    /// [`TerrainStreamer::exact_height_at`] for the true field value.
    #[must_use]
    pub fn height_at(&self, x: f64, z: f64) -> f64 {
        self.height_query(x, z, HeightQuery::Snapped).unwrap_or(0.0)
    }

    /// Elevation at world `(x, z)` resolved by `mode`.
    #[must_use]
    pub fn height_query(&self, x: f64, z: f64, mode: HeightQuery) -> Option<f64> {
        let lookup: fn(&Chunk, f64, f64) -> Option<f64> = match mode {
            HeightQuery::Exact => return Some(self.exact_height_at(x, z)),
            HeightQuery::Snapped => snapped,
            HeightQuery::Interpolated => interpolated,
        };

        let chunk_size = self.config.chunk_size;
        let coord = self.center_of(x, z);
        let chunk = self.cache.get(coord)?;

        let (ox, oz) = coord.origin(chunk_size);
        let segments = f64::from(self.config.segments);
        let gx = (x - ox) / chunk_size * segments;
        let gz = (z - oz) / chunk_size * segments;

        lookup(chunk, gx, gz)
    }

    /// Height field evaluated directly, independent of residency.
    #[must_use]
    pub fn exact_height_at(&self, x: f64, z: f64) -> f64 {
        self.field.elevation(x, z)
    }

    /// Returns true if `coord` is resident.
    #[must_use]
    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        self.cache.contains(coord)
    }

    /// Resident chunk at `coord`.
    #[must_use]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.cache.get(coord)
    }

    /// Resident coordinates in ascending order.
    #[must_use]
    pub fn resident_coords(&self) -> Vec<ChunkCoord> {
        self.cache.coords()
    }

    /// Number of resident chunks.
    #[must_use]
    pub fn resident_count(&self) -> usize {
        self.cache.len()
    }

    /// The chunk cache.
    #[must_use]
    pub const fn cache(&self) -> &ChunkCache {
        &self.cache
    }

    /// Center chunk of the last `update`.
    #[must_use]
    pub const fn last_center(&self) -> Option<ChunkCoord> {
        self.last_center
    }

    /// Session counters.
    #[must_use]
    pub const fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// The height field chunks are built from.
    #[must_use]
    pub const fn field(&self) -> &HeightField {
        &self.field
    }

    /// The render surface.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// The render surface, mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Consumes the streamer and returns the surface. Resident chunks are
    /// dropped without a detach; call [`TerrainStreamer::reset`] first if
    /// the surface tracks them.
    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }
}

impl<S: RenderSurface> std::fmt::Debug for TerrainStreamer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerrainStreamer")
            .field("config", &self.config)
            .field("resident", &self.cache.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Nearest-index lookup: `round(gx)`, `round(gz)`.
fn snapped(chunk: &Chunk, gx: f64, gz: f64) -> Option<f64> {
    let ix = gx.round().max(0.0) as usize;
    let iz = gz.round().max(0.0) as usize;
    chunk.elevation_at_vertex(ix, iz)
}

fn interpolated(chunk: &Chunk, gx: f64, gz: f64) -> Option<f64> {
    let last_cell = f64::from(chunk.segments() - 1);
    let x0 = gx.floor().clamp(0.0, last_cell);
    let z0 = gz.floor().clamp(0.0, last_cell);
    let tx = (gx - x0).clamp(0.0, 1.0);
    let tz = (gz - z0).clamp(0.0, 1.0);
    let (ix, iz) = (x0 as usize, z0 as usize);

    let h00 = chunk.elevation_at_vertex(ix, iz)?;
    let h10 = chunk.elevation_at_vertex(ix + 1, iz)?;
    let h01 = chunk.elevation_at_vertex(ix, iz + 1)?;
    let h11 = chunk.elevation_at_vertex(ix + 1, iz + 1)?;

    let near = h00 + (h10 - h00) * tx;
    let far = h01 + (h11 - h01) * tx;
    Some(near + (far - near) * tz)
}
