//! # Flythrough Simulation
//!
//! Owns the streamer and the flight path and runs them in lock step.

use std::time::{Duration, Instant};

use aerie_procedural::{StreamStats, StreamingConfig, TerrainStreamer, TickReport};

use crate::error::FlythroughResult;
use crate::flight::FlightPath;
use crate::headless::HeadlessSurface;

/// Tick time above which a warning is logged (two frames at 60 Hz).
pub const MAX_TICK_TIME: Duration = Duration::from_millis(33);

/// Totals over a [`Simulation::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Ticks executed.
    pub ticks: u64,
    /// Chunks built.
    pub built: u64,
    /// Chunks evicted.
    pub evicted: u64,
    /// Most builds in a single tick.
    pub max_built_in_tick: usize,
    /// Ticks that ended with deferred or failed builds.
    pub unconverged_ticks: u64,
    /// Ticks slower than [`MAX_TICK_TIME`].
    pub slow_ticks: u64,
    /// Slowest tick.
    pub worst_tick: Duration,
    /// Wall time of the run.
    pub elapsed: Duration,
    /// Final focus.
    pub final_position: (f64, f64),
}

/// Streamer plus flight path.
pub struct Simulation {
    streamer: TerrainStreamer<HeadlessSurface>,
    path: FlightPath,
}

impl Simulation {
    /// Creates a simulation and loads the terrain around the path start.
    ///
    /// # Errors
    ///
    /// Propagates configuration errors from the streamer.
    pub fn new(config: StreamingConfig, path: FlightPath) -> FlythroughResult<Self> {
        let mut streamer = TerrainStreamer::new(config, HeadlessSurface::new())?;
        let (x, z) = path.position();
        streamer.update(x, z);
        Ok(Self { streamer, path })
    }

    /// Advances the vehicle one tick and streams around its new position.
    pub fn step(&mut self) -> TickReport {
        let (x, z) = self.path.advance();
        self.streamer.update(x, z)
    }

    /// Runs `ticks` steps and summarizes them.
    pub fn run(&mut self, ticks: u64) -> RunSummary {
        let start = Instant::now();
        let mut summary = RunSummary::default();

        for tick in 0..ticks {
            let tick_start = Instant::now();
            let report = self.step();
            let tick_time = tick_start.elapsed();

            summary.ticks += 1;
            summary.built += report.built.len() as u64;
            summary.evicted += report.evicted.len() as u64;
            summary.max_built_in_tick = summary.max_built_in_tick.max(report.built.len());
            summary.worst_tick = summary.worst_tick.max(tick_time);
            if !report.is_converged() {
                summary.unconverged_ticks += 1;
            }
            if tick_time > MAX_TICK_TIME {
                summary.slow_ticks += 1;
                tracing::warn!(
                    tick,
                    ms = tick_time.as_secs_f64() * 1000.0,
                    built = report.built.len(),
                    "slow terrain tick"
                );
            }
        }

        summary.elapsed = start.elapsed();
        summary.final_position = self.path.position();
        tracing::info!(
            ticks = summary.ticks,
            built = summary.built,
            evicted = summary.evicted,
            resident = self.streamer.resident_count(),
            "flythrough finished"
        );
        summary
    }

    /// The streamer.
    #[must_use]
    pub const fn streamer(&self) -> &TerrainStreamer<HeadlessSurface> {
        &self.streamer
    }

    /// The render surface.
    #[must_use]
    pub const fn surface(&self) -> &HeadlessSurface {
        self.streamer.surface()
    }

    /// The flight path.
    #[must_use]
    pub const fn path(&self) -> &FlightPath {
        &self.path
    }

    /// Streamer counters.
    #[must_use]
    pub const fn stats(&self) -> StreamStats {
        self.streamer.stats()
    }

    /// Terrain height under the vehicle from the resident mesh.
    #[must_use]
    pub fn ground_height(&self) -> f64 {
        let (x, z) = self.path.position();
        self.streamer.height_at(x, z)
    }

    /// Releases every chunk and returns the surface for inspection.
    #[must_use]
    pub fn shutdown(mut self) -> HeadlessSurface {
        self.streamer.reset();
        self.streamer.into_surface()
    }
}
