//! # Chunk Cache
//!
//! Owns every live [`Chunk`], keyed by [`ChunkCoord`].
//!
//! [`ChunkCache::ensure_resident`] is the single place residency changes:
//! given the desired set it evicts everything outside it, then builds what is
//! missing. Building is a caller-supplied closure, so the cache does not care
//! whether chunks come from a synchronous builder or somewhere else.

use std::collections::HashMap;

use crate::chunk::{Chunk, ChunkCoord};
use crate::error::{TerrainError, TerrainResult};
use crate::streaming::DesiredSet;
use crate::surface::RenderSurface;

/// What one reconciliation pass changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Coordinates built and attached this tick, nearest first.
    pub built: Vec<ChunkCoord>,
    /// Coordinates detached and released this tick.
    pub evicted: Vec<ChunkCoord>,
    /// Desired but not attempted because the build budget ran out.
    pub deferred: Vec<ChunkCoord>,
    /// Desired but the build failed; retried on a later tick.
    pub failed: Vec<(ChunkCoord, TerrainError)>,
}

impl TickReport {
    /// Returns true if nothing was built or evicted.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.built.is_empty() && self.evicted.is_empty()
    }

    /// Returns true if the resident set now equals the desired set.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.deferred.is_empty() && self.failed.is_empty()
    }
}

/// Coordinate-keyed chunk storage. At most one chunk per coordinate.
#[derive(Debug, Default)]
pub struct ChunkCache {
    chunks: HashMap<ChunkCoord, Chunk>,
}

impl ChunkCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resident chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if nothing is resident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Returns true if `coord` is resident.
    #[must_use]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Resident chunk at `coord`.
    #[must_use]
    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Resident coordinates in ascending `(cx, cz)` order.
    #[must_use]
    pub fn coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.chunks.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Iterates resident chunks in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkCoord, &Chunk)> {
        self.chunks.iter().map(|(&coord, chunk)| (coord, chunk))
    }

    /// Total geometry bytes held.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.chunks.values().map(Chunk::byte_size).sum()
    }

    /// Reconciles residency with `desired`.
    ///
    /// 1. Every resident coordinate outside `desired` is detached from
    ///    `surface`, dropped and removed, before anything is built.
    /// 2. Missing coordinates are built nearest-first through `build`,
    ///    inserted and attached. With `budget = Some(n)` at most `n` builds
    ///    are attempted; the remainder is reported as deferred.
    ///
    /// A failed build leaves its coordinate absent and is reported in
    /// [`TickReport::failed`].
    pub fn ensure_resident<S, F>(
        &mut self,
        desired: &DesiredSet,
        surface: &mut S,
        budget: Option<usize>,
        mut build: F,
    ) -> TickReport
    where
        S: RenderSurface + ?Sized,
        F: FnMut(ChunkCoord) -> TerrainResult<Chunk>,
    {
        let mut report = TickReport::default();

        let mut stale: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .copied()
            .filter(|coord| !desired.contains(*coord))
            .collect();
        stale.sort_unstable();

        for coord in stale {
            if let Some(chunk) = self.chunks.remove(&coord) {
                surface.detach(coord, &chunk);
                drop(chunk);
                tracing::trace!(%coord, "chunk evicted");
                report.evicted.push(coord);
            }
        }

        let mut attempts = 0usize;
        for &coord in desired.iter() {
            if self.chunks.contains_key(&coord) {
                continue;
            }
            if budget.is_some_and(|limit| attempts >= limit) {
                report.deferred.push(coord);
                continue;
            }
            attempts += 1;

            match build(coord) {
                Ok(chunk) => {
                    surface.attach(coord, &chunk);
                    self.chunks.insert(coord, chunk);
                    tracing::trace!(%coord, "chunk built");
                    report.built.push(coord);
                }
                Err(err) => {
                    tracing::warn!(%coord, error = %err, "chunk build failed, retrying next tick");
                    report.failed.push((coord, err));
                }
            }
        }

        report
    }

    /// Detaches and releases every chunk. Returns the evicted coordinates.
    pub fn clear<S>(&mut self, surface: &mut S) -> Vec<ChunkCoord>
    where
        S: RenderSurface + ?Sized,
    {
        let mut evicted = Vec::with_capacity(self.chunks.len());
        let mut drained: Vec<_> = self.chunks.drain().collect();
        drained.sort_unstable_by_key(|(coord, _)| *coord);
        for (coord, chunk) in drained {
            surface.detach(coord, &chunk);
            evicted.push(coord);
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ChunkBuilder;
    use crate::height::{HeightSample, HeightSource};

    struct Flat;

    impl HeightSource for Flat {
        fn sample(&self, _x: f64, _z: f64) -> HeightSample {
            HeightSample::new(0.0, 1.0)
        }
    }

    /// Records the order of surface calls.
    #[derive(Default)]
    struct Log(Vec<(&'static str, ChunkCoord)>);

    impl RenderSurface for Log {
        fn attach(&mut self, coord: ChunkCoord, _chunk: &Chunk) {
            self.0.push(("attach", coord));
        }

        fn detach(&mut self, coord: ChunkCoord, _chunk: &Chunk) {
            self.0.push(("detach", coord));
        }
    }

    fn flat_chunk(coord: ChunkCoord) -> TerrainResult<Chunk> {
        let (x, z) = coord.origin(10.0);
        ChunkBuilder::new().build(x, z, 10.0, 1, &Flat)
    }

    fn set(coords: &[(i32, i32)]) -> DesiredSet {
        DesiredSet::from_coords(coords.iter().map(|&(x, z)| ChunkCoord::new(x, z)))
    }

    #[test]
    fn test_evictions_precede_builds() {
        let mut cache = ChunkCache::new();
        let mut log = Log::default();

        cache.ensure_resident(&set(&[(0, 0), (1, 0)]), &mut log, None, flat_chunk);
        log.0.clear();

        let report = cache.ensure_resident(&set(&[(1, 0), (2, 0)]), &mut log, None, flat_chunk);

        assert_eq!(report.evicted, vec![ChunkCoord::new(0, 0)]);
        assert_eq!(report.built, vec![ChunkCoord::new(2, 0)]);
        assert_eq!(
            log.0,
            vec![("detach", ChunkCoord::new(0, 0)), ("attach", ChunkCoord::new(2, 0))]
        );
        assert_eq!(cache.coords(), vec![ChunkCoord::new(1, 0), ChunkCoord::new(2, 0)]);
    }

    #[test]
    fn test_failed_build_is_not_inserted_and_retries() {
        let mut cache = ChunkCache::new();
        let mut log = Log::default();
        let desired = set(&[(0, 0), (5, 5)]);
        let bad = ChunkCoord::new(5, 5);

        let report = cache.ensure_resident(&desired, &mut log, None, |coord| {
            if coord == bad {
                Err(TerrainError::Allocation { buffer: "position", bytes: 1 << 40 })
            } else {
                flat_chunk(coord)
            }
        });

        assert_eq!(report.built, vec![ChunkCoord::new(0, 0)]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, bad);
        assert!(!report.is_converged());
        assert!(!cache.contains(bad));
        assert!(!log.0.contains(&("attach", bad)));

        let retry = cache.ensure_resident(&desired, &mut log, None, flat_chunk);
        assert_eq!(retry.built, vec![bad]);
        assert!(retry.is_converged());
        assert!(cache.contains(bad));
    }

    #[test]
    fn test_budget_defers_remaining_builds() {
        let mut cache = ChunkCache::new();
        let desired = set(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);

        let first = cache.ensure_resident(&desired, &mut crate::NullSurface, Some(2), flat_chunk);
        assert_eq!(first.built.len(), 2);
        assert_eq!(first.deferred.len(), 3);
        assert_eq!(cache.len(), 2);

        let second = cache.ensure_resident(&desired, &mut crate::NullSurface, Some(2), flat_chunk);
        assert_eq!(second.built.len(), 2);
        let third = cache.ensure_resident(&desired, &mut crate::NullSurface, Some(2), flat_chunk);
        assert_eq!(third.built.len(), 1);
        assert!(third.is_converged());
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn test_clear_detaches_everything() {
        let mut cache = ChunkCache::new();
        let mut log = Log::default();
        cache.ensure_resident(&set(&[(0, 0), (0, 1)]), &mut log, None, flat_chunk);
        log.0.clear();

        let evicted = cache.clear(&mut log);
        assert_eq!(evicted, vec![ChunkCoord::new(0, 0), ChunkCoord::new(0, 1)]);
        assert_eq!(log.0.len(), 2);
        assert!(log.0.iter().all(|(op, _)| *op == "detach"));
        assert!(cache.is_empty());
    }
}
