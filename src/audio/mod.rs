//! Audio clock contract — the externally advancing playback position the
//! scheduler corrects once per session.
//!
//! Decoding and output live outside this crate. The only thing the
//! synchronizer needs is a seek: [`AudioClock::seek_to_beat`] receives an
//! authored beat time and converts it to the clock's own units.
//! [`PlaybackClock`] is a simulated clock that advances with frame time at a
//! configurable drift rate.

use log::info;

/// A playback clock that can be repositioned.
pub trait AudioClock {
    /// Move the playback position to the moment authored as `beat`.
    fn seek_to_beat(&mut self, beat: f64);

    /// Current playback position in milliseconds.
    fn position_ms(&self) -> f64;
}

/// Simulated audio clock.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    ms_per_beat: f64,
    position_ms: f64,
    /// Playback speed relative to wall time; `1.0` is drift-free.
    rate: f64,
    /// Start delay still to elapse before the position moves.
    lead_in_ms: f64,
    seeks: Vec<f64>,
}

impl PlaybackClock {
    /// Create a clock for a song at `bpm`, positioned at zero.
    pub fn new(bpm: f64) -> Self {
        Self {
            ms_per_beat: 60_000.0 / bpm,
            position_ms: 0.0,
            rate: 1.0,
            lead_in_ms: 0.0,
            seeks: Vec::new(),
        }
    }

    /// Run at `rate` times wall speed, to simulate a drifting device clock.
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Hold position for `lead_in_ms` of wall time before playing.
    pub fn with_lead_in(mut self, lead_in_ms: f64) -> Self {
        self.lead_in_ms = lead_in_ms;
        self
    }

    /// Advance playback by `delta_ms` of wall time.
    pub fn advance(&mut self, delta_ms: f64) {
        let consumed = delta_ms.min(self.lead_in_ms);
        self.lead_in_ms -= consumed;
        self.position_ms += (delta_ms - consumed) * self.rate;
    }

    /// Beat positions of every seek performed, oldest first.
    pub fn seeks(&self) -> &[f64] {
        &self.seeks
    }
}

impl AudioClock for PlaybackClock {
    fn seek_to_beat(&mut self, beat: f64) {
        let target = beat * self.ms_per_beat;
        info!(
            "audio clock seek: {:.1} ms -> {:.1} ms (beat {beat})",
            self.position_ms, target
        );
        self.position_ms = target;
        self.lead_in_ms = 0.0;
        self.seeks.push(beat);
    }

    fn position_ms(&self) -> f64 {
        self.position_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn advances_with_wall_time() {
        let mut clock = PlaybackClock::new(120.0);
        clock.advance(250.0);
        clock.advance(250.0);
        assert_approx_eq!(clock.position_ms(), 500.0);
    }

    #[test]
    fn drift_rate_scales_advance() {
        let mut clock = PlaybackClock::new(120.0).with_rate(0.99);
        clock.advance(1000.0);
        assert_approx_eq!(clock.position_ms(), 990.0);
    }

    #[test]
    fn lead_in_holds_position() {
        let mut clock = PlaybackClock::new(120.0).with_lead_in(300.0);
        clock.advance(200.0);
        assert_approx_eq!(clock.position_ms(), 0.0);
        clock.advance(200.0);
        assert_approx_eq!(clock.position_ms(), 100.0);
    }

    #[test]
    fn seek_converts_beats_to_ms() {
        let mut clock = PlaybackClock::new(120.0);
        clock.advance(1234.0);
        clock.seek_to_beat(3.0);
        assert_approx_eq!(clock.position_ms(), 1500.0);
        assert_eq!(clock.seeks(), &[3.0]);
    }
}
