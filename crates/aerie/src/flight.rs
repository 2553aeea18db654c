//! # Scripted Flight
//!
//! Stand-in for the piloted vehicle: produces one focus position per tick.

use crate::error::{FlythroughError, FlythroughResult};

/// Focus provider that moves at constant speed through waypoints.
///
/// A single-waypoint path with a heading flies in a straight line forever.
/// A multi-waypoint path loops back to the first waypoint after the last.
#[derive(Clone, Debug)]
pub struct FlightPath {
    waypoints: Vec<(f64, f64)>,
    heading: (f64, f64),
    speed: f64,
    position: (f64, f64),
    target: usize,
}

impl FlightPath {
    /// Straight line from `start` along `heading` (normalized internally).
    ///
    /// # Errors
    ///
    /// [`FlythroughError::InvalidPath`] for a zero heading or a speed that is
    /// negative or not finite.
    pub fn straight(start: (f64, f64), heading: (f64, f64), speed: f64) -> FlythroughResult<Self> {
        check_speed(speed)?;
        let length = heading.0.hypot(heading.1);
        if !(length.is_finite() && length > 0.0) {
            return Err(FlythroughError::InvalidPath(format!(
                "heading must be non-zero, got {heading:?}"
            )));
        }
        Ok(Self {
            waypoints: vec![start],
            heading: (heading.0 / length, heading.1 / length),
            speed,
            position: start,
            target: 0,
        })
    }

    /// Closed circuit through `waypoints`, starting at the first.
    ///
    /// # Errors
    ///
    /// [`FlythroughError::InvalidPath`] for fewer than two waypoints or a bad
    /// speed.
    pub fn circuit(waypoints: Vec<(f64, f64)>, speed: f64) -> FlythroughResult<Self> {
        check_speed(speed)?;
        if waypoints.len() < 2 {
            return Err(FlythroughError::InvalidPath(format!(
                "a circuit needs at least two waypoints, got {}",
                waypoints.len()
            )));
        }
        let position = waypoints[0];
        Ok(Self {
            waypoints,
            heading: (0.0, 0.0),
            speed,
            position,
            target: 1,
        })
    }

    /// Current focus.
    #[must_use]
    pub const fn position(&self) -> (f64, f64) {
        self.position
    }

    /// Units moved per tick.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Moves one tick forward and returns the new focus.
    pub fn advance(&mut self) -> (f64, f64) {
        if self.waypoints.len() < 2 {
            self.position.0 += self.heading.0 * self.speed;
            self.position.1 += self.heading.1 * self.speed;
            return self.position;
        }

        let mut remaining = self.speed;
        // Bounded by the waypoint count so a degenerate circuit (all points
        // equal) cannot spin.
        for _ in 0..=self.waypoints.len() {
            let target = self.waypoints[self.target];
            let dx = target.0 - self.position.0;
            let dz = target.1 - self.position.1;
            let gap = dx.hypot(dz);

            if gap > remaining {
                self.position.0 += dx / gap * remaining;
                self.position.1 += dz / gap * remaining;
                break;
            }

            self.position = target;
            remaining -= gap;
            self.target = (self.target + 1) % self.waypoints.len();
            if remaining <= 0.0 {
                break;
            }
        }
        self.position
    }
}

impl Iterator for FlightPath {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.advance())
    }
}

fn check_speed(speed: f64) -> FlythroughResult<()> {
    if speed.is_finite() && speed >= 0.0 {
        Ok(())
    } else {
        Err(FlythroughError::InvalidPath(format!(
            "speed must be finite and non-negative, got {speed}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_line() {
        let mut path = FlightPath::straight((0.0, 0.0), (3.0, 4.0), 5.0).unwrap();
        assert_eq!(path.advance(), (3.0, 4.0));
        assert_eq!(path.advance(), (6.0, 8.0));
    }

    #[test]
    fn test_circuit_turns_corners_and_loops() {
        let square = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        let mut path = FlightPath::circuit(square, 4.0).unwrap();

        assert_eq!(path.advance(), (4.0, 0.0));
        assert_eq!(path.advance(), (8.0, 0.0));
        // 2 units to the corner, 2 units up.
        assert_eq!(path.advance(), (10.0, 2.0));

        // 40-unit loop at 4 per tick: back at the start after 10 ticks.
        let mut path = FlightPath::circuit(
            vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            4.0,
        )
        .unwrap();
        let last = path.by_ref().take(10).last().unwrap();
        assert!(last.0.abs() < 1e-9 && last.1.abs() < 1e-9, "{last:?}");
    }

    #[test]
    fn test_degenerate_circuit_does_not_hang() {
        let mut path = FlightPath::circuit(vec![(1.0, 1.0), (1.0, 1.0)], 3.0).unwrap();
        assert_eq!(path.advance(), (1.0, 1.0));
    }

    #[test]
    fn test_rejects_bad_paths() {
        assert!(FlightPath::straight((0.0, 0.0), (0.0, 0.0), 1.0).is_err());
        assert!(FlightPath::straight((0.0, 0.0), (1.0, 0.0), -1.0).is_err());
        assert!(FlightPath::circuit(vec![(0.0, 0.0)], 1.0).is_err());
        assert!(FlightPath::circuit(vec![(0.0, 0.0), (1.0, 0.0)], f64::NAN).is_err());
    }
}
