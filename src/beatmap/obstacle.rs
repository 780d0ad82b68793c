//! Obstacle (wall) events.

use super::note::Lane;

/// A wall spanning one or more lanes for a number of beats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleEvent {
    /// Position in beats since map start.
    pub time: f64,
    /// Leftmost lane covered.
    pub lane: Lane,
    /// Number of lanes covered.
    pub width: u32,
    /// Length in beats.
    pub duration: f64,
}

impl ObstacleEvent {
    pub fn new(time: f64, lane: Lane, width: u32, duration: f64) -> Self {
        Self {
            time,
            lane,
            width,
            duration,
        }
    }

    /// Time at which the wall ends, in beats.
    pub fn end_time(&self) -> f64 {
        self.time + self.duration
    }

    /// Duration converted to seconds at the given tempo.
    pub fn duration_seconds(&self, bpm: f64) -> f64 {
        60.0 * self.duration / bpm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn end_time_adds_duration() {
        let wall = ObstacleEvent::new(4.0, Lane::new(1).unwrap(), 2, 1.5);
        assert_approx_eq!(wall.end_time(), 5.5);
    }

    #[test]
    fn duration_seconds_at_tempo() {
        let wall = ObstacleEvent::new(0.0, Lane::new(0).unwrap(), 1, 2.0);
        // 2 beats at 120 BPM = 1 second
        assert_approx_eq!(wall.duration_seconds(120.0), 1.0);
    }
}
