//! Driver error types.

use std::path::PathBuf;

use aerie_procedural::TerrainError;
use thiserror::Error;

/// Errors surfaced by the flythrough driver.
#[derive(Error, Debug)]
pub enum FlythroughError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The terrain core rejected the configuration.
    #[error(transparent)]
    Terrain(#[from] TerrainError),

    /// A flight path was described with unusable values.
    #[error("invalid flight path: {0}")]
    InvalidPath(String),

    /// A command-line argument could not be parsed.
    #[error("invalid argument {arg:?}: {reason}")]
    InvalidArgument {
        /// The raw argument.
        arg: String,
        /// What was expected.
        reason: &'static str,
    },
}

/// Result type for driver operations.
pub type FlythroughResult<T> = Result<T, FlythroughError>;
