//! # AERIE Procedural Terrain
//!
//! Deterministic terrain streaming for an unbounded landscape.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed and profile always produce the same mesh
//! 2. **Chunked**: The landscape is built in fixed-size square chunks
//! 3. **Streamable**: Chunks are built on entering range and released on leaving
//! 4. **Headless**: Rendering sits behind the [`RenderSurface`] trait
//!
//! ## Core Components
//!
//! - `HeightField`: Fractal simplex elevation and shading
//! - `ChunkBuilder`: Heightfield grid to indexed triangle mesh
//! - `ChunkCache`: Coordinate-keyed residency with a single reconcile step
//! - `TerrainStreamer`: Per-tick streaming around a moving focus
//! - `StaticTerrain`: One fixed tile centered on the origin
//!
//! ## Example
//!
//! ```rust
//! use aerie_procedural::{ChunkCoord, NullSurface, StreamingConfig, TerrainStreamer};
//!
//! let mut streamer = TerrainStreamer::new(StreamingConfig::default(), NullSurface).unwrap();
//!
//! // Vehicle at the origin
//! streamer.update(0.0, 0.0);
//!
//! assert!(streamer.is_resident(ChunkCoord::new(3, 0)));
//! assert!(!streamer.is_resident(ChunkCoord::new(3, 3)));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod builder;
pub mod cache;
pub mod chunk;
pub mod config;
pub mod error;
pub mod height;
pub mod noise;
pub mod streaming;
pub mod surface;
pub mod terrain;

pub use builder::{AttributeMode, ChunkBuilder, MAX_SEGMENTS};
pub use cache::{ChunkCache, TickReport};
pub use chunk::{Chunk, ChunkCoord, MaterialHandle, TerrainVertex, VertexAttributes};
pub use config::StreamingConfig;
pub use error::{TerrainError, TerrainResult};
pub use height::{HeightField, HeightSample, HeightSource, NoiseProfile, ShadeClass};
pub use noise::{SimplexNoise, WorldSeed};
pub use streaming::{DesiredSet, HeightQuery, StreamStats, TerrainStreamer};
pub use surface::{NullSurface, RenderSurface};
pub use terrain::StaticTerrain;
