//! # Chunk Builder
//!
//! Samples a [`HeightSource`] over a regular grid and assembles the mesh.
//!
//! ## Layout
//!
//! `(segments + 1)²` vertices, row-major with x fastest. The far edge is
//! inclusive, so neighbouring chunks sample identical seam vertices.
//!
//! ## Winding
//!
//! For quad `(x, z)` with corners
//!
//! ```text
//! a = (x,   z)      d = (x+1, z)
//! b = (x,   z+1)    c = (x+1, z+1)
//! ```
//!
//! the triangles are `(a, b, d)` then `(b, c, d)`. With +y up this faces the
//! front side upward; renderers rely on it for culling.

use serde::{Deserialize, Serialize};

use crate::chunk::{Chunk, MaterialHandle, VertexAttributes};
use crate::error::{TerrainError, TerrainResult};
use crate::height::HeightSource;

/// Largest tessellation whose vertex indices still fit in `u32`.
pub const MAX_SEGMENTS: u32 = 65_534;

/// Which per-vertex attribute the builder emits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeMode {
    /// Shade-class vertex colors.
    #[default]
    VertexColor,
    /// Grid texture coordinates, for a material that supplies imagery.
    TexCoord,
}

/// Builds [`Chunk`]s from a height source.
///
/// Holds only presentation choices; the geometry itself depends solely on
/// the arguments to [`ChunkBuilder::build`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChunkBuilder {
    attributes: AttributeMode,
    material: Option<MaterialHandle>,
}

impl ChunkBuilder {
    /// Creates a builder emitting vertex colors and no material.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attributes: AttributeMode::VertexColor,
            material: None,
        }
    }

    /// Selects the attribute stream.
    #[must_use]
    pub const fn with_attributes(mut self, attributes: AttributeMode) -> Self {
        self.attributes = attributes;
        self
    }

    /// Attaches a shared material handle to every chunk built.
    #[must_use]
    pub const fn with_material(mut self, material: MaterialHandle) -> Self {
        self.material = Some(material);
        self
    }

    /// Attribute stream this builder emits.
    #[must_use]
    pub const fn attributes(&self) -> AttributeMode {
        self.attributes
    }

    /// Builds a square chunk with corner `(origin_x, origin_z)`.
    ///
    /// # Errors
    ///
    /// [`TerrainError::InvalidConfig`] for a zero or oversized `segments` or a
    /// non-positive `size`; [`TerrainError::Allocation`] if a buffer cannot
    /// be reserved. No chunk is produced on error.
    pub fn build<H>(
        &self,
        origin_x: f64,
        origin_z: f64,
        size: f64,
        segments: u32,
        source: &H,
    ) -> TerrainResult<Chunk>
    where
        H: HeightSource + ?Sized,
    {
        self.build_rect(origin_x, origin_z, size, size, segments, source)
    }

    /// Builds a rectangular tile spanning `size_x` by `size_z`.
    ///
    /// # Errors
    ///
    /// Same as [`ChunkBuilder::build`].
    pub fn build_rect<H>(
        &self,
        origin_x: f64,
        origin_z: f64,
        size_x: f64,
        size_z: f64,
        segments: u32,
        source: &H,
    ) -> TerrainResult<Chunk>
    where
        H: HeightSource + ?Sized,
    {
        if segments == 0 || segments > MAX_SEGMENTS {
            return Err(TerrainError::InvalidConfig(format!(
                "segments must be in 1..={MAX_SEGMENTS}, got {segments}"
            )));
        }
        if !(size_x > 0.0 && size_z > 0.0 && size_x.is_finite() && size_z.is_finite()) {
            return Err(TerrainError::InvalidConfig(format!(
                "chunk extent must be positive and finite, got {size_x} x {size_z}"
            )));
        }

        let row = segments as usize + 1;
        let vertex_count = row * row;
        let index_count = segments as usize * segments as usize * 6;

        let mut positions = reserve::<[f32; 3]>("position", vertex_count)?;
        let mut attributes = match self.attributes {
            AttributeMode::VertexColor => {
                VertexAttributes::Colors(reserve("color", vertex_count)?)
            }
            AttributeMode::TexCoord => {
                VertexAttributes::TexCoords(reserve("texcoord", vertex_count)?)
            }
        };
        let mut indices = reserve::<u32>("index", index_count)?;
        let mut normals = reserve::<[f32; 3]>("normal", vertex_count)?;

        let step_x = size_x / f64::from(segments);
        let step_z = size_z / f64::from(segments);
        let inv_segments = 1.0 / f64::from(segments);

        for iz in 0..=segments {
            let z = origin_z + f64::from(iz) * step_z;
            for ix in 0..=segments {
                let x = origin_x + f64::from(ix) * step_x;
                let sample = source.sample(x, z);

                positions.push([x as f32, sample.elevation as f32, z as f32]);
                match &mut attributes {
                    VertexAttributes::Colors(colors) => colors.push(sample.color()),
                    VertexAttributes::TexCoords(uvs) => uvs.push([
                        (f64::from(ix) * inv_segments) as f32,
                        (f64::from(iz) * inv_segments) as f32,
                    ]),
                }
            }
        }

        let stride = segments + 1;
        for z in 0..segments {
            for x in 0..segments {
                let a = x + stride * z;
                let b = x + stride * (z + 1);
                let c = (x + 1) + stride * (z + 1);
                let d = (x + 1) + stride * z;

                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        normals.resize(vertex_count, [0.0; 3]);
        accumulate_normals(&positions, &indices, &mut normals);

        Ok(Chunk::from_parts(
            (origin_x, origin_z),
            (size_x, size_z),
            segments,
            positions,
            normals,
            attributes,
            indices,
            self.material,
        ))
    }
}

/// Reserves exactly `len` elements, reporting failure instead of aborting.
fn reserve<T>(buffer: &'static str, len: usize) -> TerrainResult<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| TerrainError::Allocation {
        buffer,
        bytes: len.saturating_mul(std::mem::size_of::<T>()),
    })?;
    Ok(v)
}

/// Area-weighted smooth normals: every face adds its unnormalized normal
/// `(c - b) x (a - b)` to each of its vertices, then all are normalized.
fn accumulate_normals(positions: &[[f32; 3]], indices: &[u32], normals: &mut [[f32; 3]]) {
    for tri in indices.chunks_exact(3) {
        let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let (pa, pb, pc) = (positions[ia], positions[ib], positions[ic]);

        let cb = sub(pc, pb);
        let ab = sub(pa, pb);
        let face = cross(cb, ab);

        for i in [ia, ib, ic] {
            let n = &mut normals[i];
            n[0] += face[0];
            n[1] += face[1];
            n[2] += face[2];
        }
    }

    for n in normals.iter_mut() {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        *n = if len > 0.0 {
            [n[0] / len, n[1] / len, n[2] / len]
        } else {
            [0.0, 1.0, 0.0]
        };
    }
}

#[inline]
fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
