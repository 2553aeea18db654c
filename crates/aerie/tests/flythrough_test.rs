//! # Headless Flythrough Integration Test
//!
//! Full driver loop: scripted flight, streaming, headless surface accounting.

use aerie::{FlightPath, HeadlessSurface, Simulation};
use aerie_procedural::{ChunkCoord, StreamingConfig, WorldSeed};

fn config() -> StreamingConfig {
    StreamingConfig::test().with_seed(WorldSeed::new(2024))
}

/// Test: A long straight flight ends with an empty, consistent surface.
#[test]
fn test_straight_flight_releases_everything() {
    let path = FlightPath::straight((0.0, 0.0), (1.0, 0.5), 3.0).unwrap();
    let mut sim = Simulation::new(config(), path).unwrap();
    let disc = sim.streamer().resident_count();

    let summary = sim.run(2_000);
    assert_eq!(summary.ticks, 2_000);
    assert_eq!(summary.unconverged_ticks, 0);
    assert_eq!(sim.surface().live_count(), disc);
    assert_eq!(sim.surface().peak_live(), disc);

    let stats = sim.stats();
    let surface: HeadlessSurface = sim.shutdown();
    assert_eq!(surface.live_count(), 0);
    assert_eq!(surface.violations(), 0);
    assert_eq!(surface.attaches(), surface.detaches());
    assert_eq!(surface.attaches(), stats.generated_this_session);
}

/// Test: Hovering in place never rebuilds anything.
#[test]
fn test_hover_is_idle() {
    let path = FlightPath::straight((5.0, 5.0), (1.0, 0.0), 0.0).unwrap();
    let mut sim = Simulation::new(config(), path).unwrap();
    let attaches = sim.surface().attaches();

    let summary = sim.run(100);
    assert_eq!(summary.built, 0);
    assert_eq!(summary.evicted, 0);
    assert_eq!(sim.surface().attaches(), attaches);
}

/// Test: Looping a circuit revisits chunks, rebuilding each only on re-entry.
#[test]
fn test_circuit_reenters_chunks() {
    let far = 400.0;
    let path =
        FlightPath::circuit(vec![(0.0, 0.0), (far, 0.0), (far, far), (0.0, far)], 8.0).unwrap();
    let mut sim = Simulation::new(config(), path).unwrap();

    // 1600-unit loop at 8 per tick: two full laps.
    sim.run(400);

    let origin = ChunkCoord::new(0, 0);
    assert!(sim.streamer().is_resident(origin));
    // Loaded at start, dropped on leaving, reloaded on each return.
    assert_eq!(sim.surface().attach_count(origin), 3);
    assert_eq!(sim.surface().violations(), 0);
}

/// Test: The vehicle always has resident ground under it.
#[test]
fn test_ground_under_vehicle() {
    let path = FlightPath::straight((-100.0, 40.0), (-1.0, -1.0), 5.0).unwrap();
    let mut sim = Simulation::new(config(), path).unwrap();

    for _ in 0..300 {
        sim.step();
        let (x, z) = sim.path().position();
        let center = sim.streamer().center_of(x, z);
        assert!(sim.streamer().is_resident(center));

        // 16-unit chunks with 4 segments: the nearest vertex is on a 4-unit grid.
        let (ox, oz) = center.origin(16.0);
        let vx = ox + ((x - ox) / 4.0).round() * 4.0;
        let vz = oz + ((z - oz) / 4.0).round() * 4.0;
        let expected = sim.streamer().exact_height_at(vx, vz);

        let snapped = sim.ground_height();
        assert!((snapped - expected).abs() < 1e-4, "({x}, {z}): {snapped} vs {expected}");
    }
}
