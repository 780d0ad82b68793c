//! Event scheduler — turns elapsed time into due beat-map events.
//!
//! The [`EventScheduler`] sits between a loaded [`BeatMap`] and the spawning
//! layer. Each call to [`EventScheduler::advance`] moves the
//! [`SimulationClock`] forward by the caller's frame delta and yields every
//! note and obstacle whose `time * ms_per_beat` falls in the open-closed
//! window `(last_processed, last_processed + delta]`, in ascending time
//! order across both sequences.
//!
//! Windows are contiguous and never overlap, so each event fires exactly
//! once regardless of how the caller slices time. The scheduler does not
//! sort: it relies on the map's ordering invariant.

pub mod clock;
pub mod cursor;
pub mod types;

pub use clock::{SimulationClock, Window};
pub use cursor::{EventCursor, Timed};
pub use types::DueEvent;

use std::sync::Arc;

use crate::beatmap::BeatMap;

/// Steps through one beat map in time order.
#[derive(Debug, Clone)]
pub struct EventScheduler {
    map: Arc<BeatMap>,
    clock: SimulationClock,
    notes: EventCursor,
    obstacles: EventCursor,
}

impl EventScheduler {
    /// Create a scheduler positioned at time zero.
    pub fn new(map: Arc<BeatMap>) -> Self {
        Self {
            map,
            clock: SimulationClock::new(),
            notes: EventCursor::new(),
            obstacles: EventCursor::new(),
        }
    }

    /// The map being scheduled.
    pub fn map(&self) -> &Arc<BeatMap> {
        &self.map
    }

    /// High-water mark of processed time in milliseconds.
    pub fn last_processed_ms(&self) -> f64 {
        self.clock.last_processed_ms()
    }

    /// Number of events (notes and obstacles) not yet consumed.
    pub fn remaining(&self) -> usize {
        self.notes.remaining(self.map.note_count())
            + self.obstacles.remaining(self.map.obstacle_count())
    }

    /// Whether every event has been consumed.
    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    /// Advance the clock by `delta_ms` and return the events due in the
    /// covered window.
    ///
    /// The window is committed immediately. The returned iterator is lazy
    /// and single-use: due events not pulled before it is dropped count as
    /// consumed and will not be offered again.
    pub fn advance(&mut self, delta_ms: f64) -> DueEvents<'_> {
        let window = self.clock.advance(delta_ms);
        DueEvents {
            map: &self.map,
            ms_per_beat: self.map.ms_per_beat(),
            window,
            notes: &mut self.notes,
            obstacles: &mut self.obstacles,
        }
    }

    /// Rewind to time zero with every event pending again.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.notes.reset();
        self.obstacles.reset();
    }
}

/// Lazy, time-ordered merge of the notes and obstacles due in one window.
pub struct DueEvents<'a> {
    map: &'a BeatMap,
    ms_per_beat: f64,
    window: Window,
    notes: &'a mut EventCursor,
    obstacles: &'a mut EventCursor,
}

impl DueEvents<'_> {
    /// The window this step covers.
    pub fn window(&self) -> Window {
        self.window
    }
}

impl Iterator for DueEvents<'_> {
    type Item = DueEvent;

    fn next(&mut self) -> Option<DueEvent> {
        let note = self
            .notes
            .peek_due(self.map.notes(), self.ms_per_beat, self.window);
        let obstacle = self
            .obstacles
            .peek_due(self.map.obstacles(), self.ms_per_beat, self.window);

        // Ties go to the note.
        let take_note = match (note, obstacle) {
            (None, None) => return None,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some((_, n)), Some((_, o))) => n <= o,
        };

        if take_note {
            let (index, due_ms) = note?;
            self.notes.bump();
            Some(DueEvent::Note {
                event: self.map.notes()[index],
                due_ms,
            })
        } else {
            let (index, due_ms) = obstacle?;
            self.obstacles.bump();
            Some(DueEvent::Obstacle {
                event: self.map.obstacles()[index],
                due_ms,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beatmap::{CutDirection, Lane, Layer, NoteEvent, NoteType, ObstacleEvent};

    fn note(time: f64) -> NoteEvent {
        NoteEvent::new(
            time,
            Lane::new(0).unwrap(),
            Layer::new(0).unwrap(),
            CutDirection::Up,
            NoteType::A,
        )
    }

    fn wall(time: f64) -> ObstacleEvent {
        ObstacleEvent::new(time, Lane::new(0).unwrap(), 1, 1.0)
    }

    fn make_scheduler(notes: &[f64], walls: &[f64]) -> EventScheduler {
        let map = BeatMap::new(
            120.0,
            notes.iter().copied().map(note).collect(),
            walls.iter().copied().map(wall).collect(),
        )
        .unwrap();
        EventScheduler::new(Arc::new(map))
    }

    fn beats(events: impl Iterator<Item = DueEvent>) -> Vec<f64> {
        events.map(|e| e.beat()).collect()
    }

    #[test]
    fn creation() {
        let s = make_scheduler(&[1.0, 2.0], &[3.0]);
        assert_eq!(s.last_processed_ms(), 0.0);
        assert_eq!(s.remaining(), 3);
        assert!(!s.is_finished());
    }

    #[test]
    fn note_fires_on_step_covering_its_time() {
        // 120 BPM → 500 ms per beat; note at beat 1 is due at 500 ms.
        let mut s = make_scheduler(&[1.0], &[]);
        assert!(beats(s.advance(200.0)).is_empty());
        assert!(beats(s.advance(200.0)).is_empty());
        let due: Vec<_> = s.advance(200.0).collect();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].due_ms(), 500.0);
        assert_eq!(s.last_processed_ms(), 600.0);
    }

    #[test]
    fn upper_bound_inclusive_lower_exclusive() {
        let mut s = make_scheduler(&[1.0, 2.0], &[]);
        assert_eq!(beats(s.advance(500.0)), vec![1.0]);
        assert_eq!(beats(s.advance(500.0)), vec![2.0]);
        assert!(beats(s.advance(500.0)).is_empty());
    }

    #[test]
    fn zero_delta_yields_nothing() {
        let mut s = make_scheduler(&[1.0], &[]);
        s.advance(499.0).for_each(drop);
        assert!(beats(s.advance(0.0)).is_empty());
        assert_eq!(s.last_processed_ms(), 499.0);
        assert_eq!(s.remaining(), 1);
    }

    #[test]
    fn event_at_time_zero_never_fires() {
        let mut s = make_scheduler(&[0.0, 1.0], &[]);
        assert_eq!(beats(s.advance(10_000.0)), vec![1.0]);
        assert!(s.is_finished());
    }

    #[test]
    fn merges_sequences_in_time_order() {
        let mut s = make_scheduler(&[1.0, 3.0], &[2.0, 3.0, 4.0]);
        let due: Vec<_> = s.advance(2000.0).collect();
        let kinds: Vec<_> = due.iter().map(|e| (e.beat(), e.is_note())).collect();
        assert_eq!(
            kinds,
            vec![
                (1.0, true),
                (2.0, false),
                (3.0, true),
                (3.0, false),
                (4.0, false)
            ]
        );
    }

    #[test]
    fn simultaneous_notes_keep_map_order() {
        let mut s = make_scheduler(&[1.0, 1.0, 1.0], &[]);
        assert_eq!(s.advance(500.0).count(), 3);
    }

    #[test]
    fn dropped_iterator_consumes_window() {
        let mut s = make_scheduler(&[1.0, 1.5], &[]);
        let first = s.advance(1000.0).next();
        assert_eq!(first.map(|e| e.beat()), Some(1.0));
        // Beat 1.5 was due in the committed window but never pulled.
        assert!(beats(s.advance(1000.0)).is_empty());
        assert!(s.is_finished());
    }

    #[test]
    fn window_reported() {
        let mut s = make_scheduler(&[], &[]);
        s.advance(100.0).for_each(drop);
        let events = s.advance(50.0);
        assert_eq!(
            events.window(),
            Window {
                from: 100.0,
                to: 150.0
            }
        );
    }

    #[test]
    fn reset_replays_from_start() {
        let mut s = make_scheduler(&[1.0, 2.0], &[]);
        assert_eq!(s.advance(5000.0).count(), 2);
        s.reset();
        assert_eq!(s.last_processed_ms(), 0.0);
        assert_eq!(s.advance(5000.0).count(), 2);
    }
}
