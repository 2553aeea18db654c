//! # Headless Render Surface
//!
//! Accepts chunk meshes the way a GPU uploader would (interleaved vertex
//! bytes plus index bytes) and keeps only the bookkeeping.

use std::collections::HashMap;

use aerie_procedural::{Chunk, ChunkCoord, MaterialHandle, RenderSurface, TerrainVertex};

/// What the surface holds for one resident chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiveMesh {
    /// Vertices uploaded.
    pub vertices: usize,
    /// Triangles uploaded.
    pub triangles: usize,
    /// Vertex plus index bytes uploaded.
    pub bytes: usize,
    /// Material the mesh was drawn with.
    pub material: Option<MaterialHandle>,
}

/// GPU-free [`RenderSurface`].
///
/// Protocol violations (attaching a live coordinate, detaching an unknown
/// one) are counted, never panicked on, so a long run can report them.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    live: HashMap<ChunkCoord, LiveMesh>,
    attach_counts: HashMap<ChunkCoord, u32>,
    attaches: u64,
    detaches: u64,
    bytes_uploaded: u64,
    peak_live: usize,
    violations: u64,
}

impl HeadlessSurface {
    /// Creates an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Meshes currently held.
    #[must_use]
    pub fn live(&self) -> &HashMap<ChunkCoord, LiveMesh> {
        &self.live
    }

    /// Number of meshes currently held.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Largest number of meshes held at once.
    #[must_use]
    pub const fn peak_live(&self) -> usize {
        self.peak_live
    }

    /// How many times `coord` has been attached in total.
    #[must_use]
    pub fn attach_count(&self, coord: ChunkCoord) -> u32 {
        self.attach_counts.get(&coord).copied().unwrap_or(0)
    }

    /// Total attaches.
    #[must_use]
    pub const fn attaches(&self) -> u64 {
        self.attaches
    }

    /// Total detaches.
    #[must_use]
    pub const fn detaches(&self) -> u64 {
        self.detaches
    }

    /// Total bytes that would have been uploaded.
    #[must_use]
    pub const fn bytes_uploaded(&self) -> u64 {
        self.bytes_uploaded
    }

    /// Bytes of all live meshes.
    #[must_use]
    pub fn live_bytes(&self) -> usize {
        self.live.values().map(|m| m.bytes).sum()
    }

    /// Attach/detach protocol violations seen.
    #[must_use]
    pub const fn violations(&self) -> u64 {
        self.violations
    }
}

impl RenderSurface for HeadlessSurface {
    fn attach(&mut self, coord: ChunkCoord, chunk: &Chunk) {
        let vertices = chunk.interleaved();
        let vertex_bytes: &[u8] = bytemuck::cast_slice::<TerrainVertex, u8>(&vertices);
        let bytes = vertex_bytes.len() + chunk.index_bytes().len();

        let mesh = LiveMesh {
            vertices: vertices.len(),
            triangles: chunk.triangle_count(),
            bytes,
            material: chunk.material(),
        };

        if self.live.insert(coord, mesh).is_some() {
            tracing::error!(%coord, "mesh attached while already live");
            self.violations += 1;
        }
        *self.attach_counts.entry(coord).or_insert(0) += 1;
        self.attaches += 1;
        self.bytes_uploaded += bytes as u64;
        self.peak_live = self.peak_live.max(self.live.len());
    }

    fn detach(&mut self, coord: ChunkCoord, _chunk: &Chunk) {
        if self.live.remove(&coord).is_none() {
            tracing::error!(%coord, "detach for a mesh that is not live");
            self.violations += 1;
        }
        self.detaches += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerie_procedural::{ChunkBuilder, HeightField, NoiseProfile, WorldSeed};

    fn chunk() -> Chunk {
        let field = HeightField::new(WorldSeed::new(1), NoiseProfile::BROAD);
        ChunkBuilder::new().build(0.0, 0.0, 10.0, 2, &field).unwrap()
    }

    #[test]
    fn test_attach_detach_accounting() {
        let mut surface = HeadlessSurface::new();
        let c = chunk();
        let coord = ChunkCoord::new(0, 0);

        surface.attach(coord, &c);
        let mesh = surface.live()[&coord];
        assert_eq!(mesh.vertices, 9);
        assert_eq!(mesh.triangles, 8);
        assert_eq!(mesh.bytes, 9 * 36 + 24 * 4);
        assert_eq!(surface.live_bytes(), mesh.bytes);

        surface.detach(coord, &c);
        assert_eq!(surface.live_count(), 0);
        assert_eq!(surface.attach_count(coord), 1);
        assert_eq!(surface.peak_live(), 1);
        assert_eq!(surface.violations(), 0);
    }

    #[test]
    fn test_counts_protocol_violations() {
        let mut surface = HeadlessSurface::new();
        let c = chunk();
        let coord = ChunkCoord::new(2, 2);

        surface.detach(coord, &c);
        surface.attach(coord, &c);
        surface.attach(coord, &c);
        assert_eq!(surface.violations(), 2);
        assert_eq!(surface.live_count(), 1);
    }
}
