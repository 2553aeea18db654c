//! # AERIE Flythrough
//!
//! Flies a vehicle east over the streamed landscape with no window and no
//! GPU, then prints what the streamer did.
//!
//! ```bash
//! # Defaults: 100-unit chunks, 50 segments, 300-unit load distance
//! flythrough
//!
//! # Custom terrain and a longer flight
//! flythrough terrain.toml 20000
//!
//! # Per-chunk tracing
//! RUST_LOG=aerie_procedural=trace flythrough
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use aerie::{FlightPath, FlythroughError, FlythroughResult, Simulation};
use aerie_procedural::StreamingConfig;
use tracing_subscriber::EnvFilter;

const DEFAULT_TICKS: u64 = 5_000;
/// Units per tick: 60 ticks per second at 240 units per second.
const CRUISE_SPEED: f64 = 4.0;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "flythrough failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> FlythroughResult<()> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => load_config(PathBuf::from(path))?,
        None => StreamingConfig::default(),
    };
    let ticks = match args.next() {
        Some(arg) => arg.parse().map_err(|_| FlythroughError::InvalidArgument {
            arg,
            reason: "tick count must be a non-negative integer",
        })?,
        None => DEFAULT_TICKS,
    };

    let path = FlightPath::straight((0.0, 0.0), (1.0, 0.25), CRUISE_SPEED)?;
    let mut sim = Simulation::new(config, path)?;
    let summary = sim.run(ticks);
    let ground = sim.ground_height();
    let stats = sim.stats();
    let peak = sim.surface().peak_live();
    let uploaded = sim.surface().bytes_uploaded();

    let surface = sim.shutdown();

    println!("ticks:            {}", summary.ticks);
    println!("final position:   ({:.1}, {:.1})", summary.final_position.0, summary.final_position.1);
    println!("ground below:     {ground:.3}");
    println!("chunks built:     {}", stats.generated_this_session);
    println!("chunks released:  {}", stats.unloaded_this_session);
    println!("failed builds:    {}", stats.failed_builds);
    println!("peak resident:    {peak}");
    println!("max builds/tick:  {}", summary.max_built_in_tick);
    println!("slow ticks:       {}", summary.slow_ticks);
    println!("worst tick:       {:?}", summary.worst_tick);
    println!("bytes uploaded:   {uploaded}");
    println!("elapsed:          {:?}", summary.elapsed);

    if surface.live_count() != 0 || surface.violations() != 0 {
        tracing::error!(
            live = surface.live_count(),
            violations = surface.violations(),
            "surface did not end empty"
        );
    }
    Ok(())
}

fn load_config(path: PathBuf) -> FlythroughResult<StreamingConfig> {
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(source) => return Err(FlythroughError::Io { path, source }),
    };
    let config = StreamingConfig::from_toml_str(&text)?;
    tracing::info!(path = %path.display(), "loaded terrain config");
    Ok(config)
}
