//! Simulation clock — the scheduler's monotonic high-water mark.
//!
//! The clock is advanced by caller-supplied elapsed-time deltas. Each advance
//! yields the half-open window `(from, to]` it covered; consecutive windows
//! are contiguous and never overlap, so an instant belongs to exactly one
//! window no matter how the caller slices time.

use log::warn;

/// The open-closed interval `(from, to]` in milliseconds covered by one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub from: f64,
    pub to: f64,
}

impl Window {
    /// Whether `ms` lies in `(from, to]`.
    pub fn contains(&self, ms: f64) -> bool {
        ms > self.from && ms <= self.to
    }

    /// Whether `ms` lies at or before the lower bound (processed by an
    /// earlier step).
    pub fn is_before(&self, ms: f64) -> bool {
        ms <= self.from
    }

    /// Width of the window in milliseconds.
    pub fn len(&self) -> f64 {
        self.to - self.from
    }

    /// Whether the window covers no time at all.
    pub fn is_empty(&self) -> bool {
        self.to <= self.from
    }
}

/// Monotonic simulation clock in milliseconds.
#[derive(Debug, Clone, Default)]
pub struct SimulationClock {
    last_processed_ms: f64,
}

impl SimulationClock {
    /// Create a clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// High-water mark: everything at or before this instant has been
    /// processed.
    pub fn last_processed_ms(&self) -> f64 {
        self.last_processed_ms
    }

    /// Advance by `delta_ms` and return the window covered.
    ///
    /// Negative or non-finite deltas would break monotonicity; they are
    /// logged and treated as zero.
    pub fn advance(&mut self, delta_ms: f64) -> Window {
        let delta = if delta_ms.is_finite() && delta_ms >= 0.0 {
            delta_ms
        } else {
            warn!("ignoring invalid scheduler delta {delta_ms} ms");
            0.0
        };

        let from = self.last_processed_ms;
        self.last_processed_ms = from + delta;
        Window {
            from,
            to: self.last_processed_ms,
        }
    }

    /// Return to time zero.
    pub fn reset(&mut self) {
        self.last_processed_ms = 0.0;
    }
}
