//! Single fixed terrain tile centered on the world origin.
//!
//! Useful for scenes that do not stream: a hangar, a menu backdrop, tests.
//! It shares the builder and color rules with streamed chunks, but its
//! height query reads the field directly instead of the stored vertices.

use crate::builder::ChunkBuilder;
use crate::chunk::Chunk;
use crate::error::TerrainResult;
use crate::height::HeightField;

/// Centered `width` by `depth` tile.
#[derive(Debug)]
pub struct StaticTerrain {
    mesh: Chunk,
    field: HeightField,
}

impl StaticTerrain {
    /// Builds the tile spanning `[-width/2, width/2] x [-depth/2, depth/2]`.
    ///
    /// # Errors
    ///
    /// Same as [`ChunkBuilder::build_rect`].
    pub fn new(width: f64, depth: f64, segments: u32, field: HeightField) -> TerrainResult<Self> {
        Self::with_builder(width, depth, segments, field, ChunkBuilder::new())
    }

    /// Builds the tile with a configured builder (texture coordinates,
    /// material).
    ///
    /// # Errors
    ///
    /// Same as [`ChunkBuilder::build_rect`].
    pub fn with_builder(
        width: f64,
        depth: f64,
        segments: u32,
        field: HeightField,
        builder: ChunkBuilder,
    ) -> TerrainResult<Self> {
        let mesh = builder.build_rect(-width / 2.0, -depth / 2.0, width, depth, segments, &field)?;
        tracing::debug!(width, depth, segments, "static terrain built");
        Ok(Self { mesh, field })
    }

    /// The tile geometry.
    #[must_use]
    pub const fn mesh(&self) -> &Chunk {
        &self.mesh
    }

    /// The field the tile was built from.
    #[must_use]
    pub const fn field(&self) -> &HeightField {
        &self.field
    }

    /// Returns true if world `(x, z)` lies on the tile.
    #[must_use]
    pub fn contains(&self, x: f64, z: f64) -> bool {
        let (ox, oz) = self.mesh.origin();
        let (w, d) = self.mesh.extent();
        (ox..=ox + w).contains(&x) && (oz..=oz + d).contains(&z)
    }

    /// Field elevation at world `(x, z)`, on or off the tile.
    #[must_use]
    pub fn height_at(&self, x: f64, z: f64) -> f64 {
        self.field.elevation(x, z)
    }
}
