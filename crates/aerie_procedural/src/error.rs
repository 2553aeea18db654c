//! # Terrain Error Types
//!
//! All errors that can occur while configuring or building terrain.

use thiserror::Error;

/// Errors that can occur in the terrain streaming core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TerrainError {
    /// A configuration value is out of range. Raised at construction, never
    /// per tick.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A geometry buffer could not be reserved. The chunk is not produced.
    #[error("failed to allocate {bytes} bytes for the {buffer} buffer")]
    Allocation {
        /// Which buffer failed.
        buffer: &'static str,
        /// Requested size in bytes.
        bytes: usize,
    },

    /// Configuration text could not be parsed.
    #[error("malformed configuration: {0}")]
    ConfigParse(String),
}

/// Result type for terrain operations.
pub type TerrainResult<T> = Result<T, TerrainError>;
