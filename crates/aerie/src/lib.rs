//! # AERIE
//!
//! Headless driver for the terrain streamer: a scripted vehicle flies over
//! the landscape while a GPU-free surface accounts for every mesh.
//!
//! ## Per-Tick Order
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ 1. FlightPath advances the focus             │
//! │ 2. TerrainStreamer evicts stale chunks       │
//! │    └─ HeadlessSurface::detach                │
//! │ 3. TerrainStreamer builds missing chunks     │
//! │    └─ HeadlessSurface::attach                │
//! │ 4. Simulation records timing and totals      │
//! └──────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod flight;
pub mod headless;
pub mod simulation;

pub use error::{FlythroughError, FlythroughResult};
pub use flight::FlightPath;
pub use headless::{HeadlessSurface, LiveMesh};
pub use simulation::{RunSummary, Simulation, MAX_TICK_TIME};

/// Re-export of the streaming core.
pub use aerie_procedural as procedural;
