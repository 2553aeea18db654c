//! # Render Surface Boundary
//!
//! The streamer never draws anything. It hands finished chunks to a
//! [`RenderSurface`] and takes them back before releasing their buffers.

use crate::chunk::{Chunk, ChunkCoord};

/// Receiver of chunk meshes (the scene graph, a GPU uploader, a test probe).
///
/// Call order per coordinate is strictly `attach` → `detach`. A surface may
/// copy or upload whatever it needs during `attach` but must not expect the
/// chunk to outlive the matching `detach`.
pub trait RenderSurface {
    /// A fully built chunk became resident.
    fn attach(&mut self, coord: ChunkCoord, chunk: &Chunk);

    /// A resident chunk is about to be released.
    fn detach(&mut self, coord: ChunkCoord, chunk: &Chunk);
}

impl<S: RenderSurface + ?Sized> RenderSurface for &mut S {
    fn attach(&mut self, coord: ChunkCoord, chunk: &Chunk) {
        (**self).attach(coord, chunk);
    }

    fn detach(&mut self, coord: ChunkCoord, chunk: &Chunk) {
        (**self).detach(coord, chunk);
    }
}

/// Surface that ignores everything, for headless queries.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn attach(&mut self, _coord: ChunkCoord, _chunk: &Chunk) {}

    fn detach(&mut self, _coord: ChunkCoord, _chunk: &Chunk) {}
}
