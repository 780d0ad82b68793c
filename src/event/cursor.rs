//! Cursor-based consumption of a time-sorted event slice.
//!
//! Because a beat map's sequences are ascending by time and the simulation
//! clock never moves backwards, everything before the cursor is known to be
//! processed. Each step therefore only looks at events from the cursor
//! onward instead of rescanning the whole sequence.

use crate::beatmap::{NoteEvent, ObstacleEvent};

use super::clock::Window;

/// Anything with an authored time in beats.
pub trait Timed {
    fn time(&self) -> f64;
}

impl Timed for NoteEvent {
    fn time(&self) -> f64 {
        self.time
    }
}

impl Timed for ObstacleEvent {
    fn time(&self) -> f64 {
        self.time
    }
}

/// Read position into one sorted event sequence.
#[derive(Debug, Clone, Default)]
pub struct EventCursor {
    position: usize,
}

impl EventCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the next event due in `window` without consuming it.
    ///
    /// Events due at or before the window's lower bound are skipped for
    /// good. Returns the event's index and due time in milliseconds.
    pub fn peek_due<T: Timed>(
        &mut self,
        events: &[T],
        ms_per_beat: f64,
        window: Window,
    ) -> Option<(usize, f64)> {
        while let Some(event) = events.get(self.position) {
            let due_ms = event.time() * ms_per_beat;
            if window.is_before(due_ms) {
                self.position += 1;
                continue;
            }
            return window.contains(due_ms).then_some((self.position, due_ms));
        }
        None
    }

    /// Consume the event at the cursor.
    pub fn bump(&mut self) {
        self.position += 1;
    }

    /// Index of the next unconsumed event.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of events at or after the cursor.
    pub fn remaining(&self, len: usize) -> usize {
        len.saturating_sub(self.position)
    }

    /// Rewind to the first event.
    pub fn reset(&mut self) {
        self.position = 0;
    }
}
