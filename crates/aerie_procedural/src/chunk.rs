//! # Chunk Geometry
//!
//! The landscape is tiled into square chunks addressed by [`ChunkCoord`].
//! A [`Chunk`] is the finished mesh for one tile: row-major vertex grid,
//! per-vertex attribute, triangle indices and smooth normals.
//!
//! Chunks are only ever produced whole by [`crate::ChunkBuilder`] and never
//! mutated afterwards.

use bytemuck::{Pod, Zeroable};

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not world units).
    pub cx: i32,
    /// Z coordinate (in chunks, not world units).
    pub cz: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Chunk owning a world position: `floor(pos / chunk_size)` per axis.
    #[inline]
    #[must_use]
    pub fn from_world(x: f64, z: f64, chunk_size: f64) -> Self {
        Self {
            cx: (x / chunk_size).floor() as i32,
            cz: (z / chunk_size).floor() as i32,
        }
    }

    /// World-space corner of this chunk.
    #[inline]
    #[must_use]
    pub fn origin(self, chunk_size: f64) -> (f64, f64) {
        (f64::from(self.cx) * chunk_size, f64::from(self.cz) * chunk_size)
    }

    /// Coordinate shifted by a grid offset, saturating at the `i32` range.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx.saturating_add(dx),
            cz: self.cz.saturating_add(dz),
        }
    }

    /// Coordinate shifted by a grid offset, or `None` if it leaves the
    /// `i32` range.
    #[inline]
    #[must_use]
    pub const fn checked_offset(self, dx: i32, dz: i32) -> Option<Self> {
        match (self.cx.checked_add(dx), self.cz.checked_add(dz)) {
            (Some(cx), Some(cz)) => Some(Self { cx, cz }),
            _ => None,
        }
    }

    /// Euclidean distance to `other`, in chunk units.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.cx) - f64::from(other.cx);
        let dz = f64::from(self.cz) - f64::from(other.cz);
        (dx * dx + dz * dz).sqrt()
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.cx, self.cz)
    }
}

/// Opaque reference to shared surface imagery supplied by the material
/// provider. Every chunk built with it carries the same handle; nothing is
/// owned per chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialHandle(u32);

impl MaterialHandle {
    /// Wraps a provider-assigned material id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Provider-assigned material id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// Per-vertex attribute stream.
#[derive(Clone, Debug, PartialEq)]
pub enum VertexAttributes {
    /// RGB color from the elevation shade class.
    Colors(Vec<[f32; 3]>),
    /// Grid texture coordinates in `[0, 1]`, for externally textured terrain.
    TexCoords(Vec<[f32; 2]>),
}

impl VertexAttributes {
    /// Number of attribute entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Colors(v) => v.len(),
            Self::TexCoords(v) => v.len(),
        }
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attribute of one vertex widened to three components (UVs get `0.0`).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<[f32; 3]> {
        match self {
            Self::Colors(v) => v.get(index).copied(),
            Self::TexCoords(v) => v.get(index).map(|&[u, w]| [u, w, 0.0]),
        }
    }

    fn byte_len(&self) -> usize {
        match self {
            Self::Colors(v) => std::mem::size_of_val(v.as_slice()),
            Self::TexCoords(v) => std::mem::size_of_val(v.as_slice()),
        }
    }
}

/// Interleaved vertex for GPU upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    /// Position in world space [x, y, z]
    pub position: [f32; 3],
    /// Smooth normal [nx, ny, nz]
    pub normal: [f32; 3],
    /// Color [r, g, b] or texture coordinate [u, v, 0]
    pub attribute: [f32; 3],
}

/// One finished terrain tile.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    origin: (f64, f64),
    size: (f64, f64),
    segments: u32,
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    attributes: VertexAttributes,
    indices: Vec<u32>,
    material: Option<MaterialHandle>,
}

impl Chunk {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        origin: (f64, f64),
        size: (f64, f64),
        segments: u32,
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        attributes: VertexAttributes,
        indices: Vec<u32>,
        material: Option<MaterialHandle>,
    ) -> Self {
        debug_assert_eq!(positions.len(), normals.len());
        debug_assert_eq!(positions.len(), attributes.len());
        debug_assert_eq!(indices.len() % 3, 0);
        Self {
            origin,
            size,
            segments,
            positions,
            normals,
            attributes,
            indices,
            material,
        }
    }

    /// World-space corner `(x, z)`.
    #[must_use]
    pub const fn origin(&self) -> (f64, f64) {
        self.origin
    }

    /// Side length along x.
    #[must_use]
    pub const fn size(&self) -> f64 {
        self.size.0
    }

    /// Side lengths `(x, z)`.
    #[must_use]
    pub const fn extent(&self) -> (f64, f64) {
        self.size
    }

    /// Quads per axis.
    #[must_use]
    pub const fn segments(&self) -> u32 {
        self.segments
    }

    /// Vertices per grid row (`segments + 1`).
    #[must_use]
    pub const fn row_len(&self) -> usize {
        self.segments as usize + 1
    }

    /// Vertex positions, row-major with x varying fastest.
    #[must_use]
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Unit vertex normals.
    #[must_use]
    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    /// Per-vertex attribute stream.
    #[must_use]
    pub const fn attributes(&self) -> &VertexAttributes {
        &self.attributes
    }

    /// Triangle list indices.
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Shared material, if one was supplied.
    #[must_use]
    pub const fn material(&self) -> Option<MaterialHandle> {
        self.material
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Position of grid vertex `(ix, iz)`.
    #[must_use]
    pub fn vertex(&self, ix: usize, iz: usize) -> Option<[f32; 3]> {
        let row = self.row_len();
        if ix >= row || iz >= row {
            return None;
        }
        self.positions.get(iz * row + ix).copied()
    }

    /// Stored elevation of grid vertex `(ix, iz)`.
    #[must_use]
    pub fn elevation_at_vertex(&self, ix: usize, iz: usize) -> Option<f64> {
        self.vertex(ix, iz).map(|p| f64::from(p[1]))
    }

    /// Total bytes held by the geometry buffers.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        std::mem::size_of_val(self.positions.as_slice())
            + std::mem::size_of_val(self.normals.as_slice())
            + std::mem::size_of_val(self.indices.as_slice())
            + self.attributes.byte_len()
    }

    /// Interleaves positions, normals and attributes for upload.
    #[must_use]
    pub fn interleaved(&self) -> Vec<TerrainVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .enumerate()
            .map(|(i, (&position, &normal))| TerrainVertex {
                position,
                normal,
                attribute: self.attributes.get(i).unwrap_or_default(),
            })
            .collect()
    }

    /// Index buffer as raw bytes.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coord_from_world() {
        assert_eq!(ChunkCoord::from_world(0.0, 0.0, 100.0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world(99.9, 99.9, 100.0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world(100.0, 250.0, 100.0), ChunkCoord::new(1, 2));
        assert_eq!(ChunkCoord::from_world(-0.1, -0.1, 100.0), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_world(-100.0, -100.0, 100.0), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_world(-100.1, 0.0, 100.0), ChunkCoord::new(-2, 0));
    }

    #[test]
    fn test_chunk_coord_origin_and_distance() {
        let coord = ChunkCoord::new(-3, 2);
        assert_eq!(coord.origin(100.0), (-300.0, 200.0));
        assert_eq!(ChunkCoord::new(3, 0).distance(ChunkCoord::default()), 3.0);
        assert_eq!(ChunkCoord::new(3, 4).distance(ChunkCoord::new(0, 0)), 5.0);
        assert_eq!(coord.offset(3, -2), ChunkCoord::new(0, 0));
    }

    #[test]
    fn test_texcoords_widen_to_three_components() {
        let attrs = VertexAttributes::TexCoords(vec![[0.25, 0.75]]);
        assert_eq!(attrs.get(0), Some([0.25, 0.75, 0.0]));
        assert_eq!(attrs.get(1), None);
    }

    #[test]
    fn test_terrain_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<TerrainVertex>(), 36);
    }
}
