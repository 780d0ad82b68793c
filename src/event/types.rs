//! Due events — beat-map events whose scheduled time fell inside the
//! window just advanced.

use crate::beatmap::{NoteEvent, ObstacleEvent};

/// A beat-map event that became due during a scheduler step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DueEvent {
    Note { event: NoteEvent, due_ms: f64 },
    Obstacle { event: ObstacleEvent, due_ms: f64 },
}

impl DueEvent {
    /// Scheduled time in milliseconds since map start.
    pub fn due_ms(&self) -> f64 {
        match self {
            DueEvent::Note { due_ms, .. } | DueEvent::Obstacle { due_ms, .. } => *due_ms,
        }
    }

    /// Authored time in beats.
    pub fn beat(&self) -> f64 {
        match self {
            DueEvent::Note { event, .. } => event.time,
            DueEvent::Obstacle { event, .. } => event.time,
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(self, DueEvent::Note { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beatmap::{CutDirection, Lane, Layer, NoteType};

    #[test]
    fn accessors() {
        let note = NoteEvent::new(
            2.0,
            Lane::new(1).unwrap(),
            Layer::new(0).unwrap(),
            CutDirection::Up,
            NoteType::B,
        );
        let due = DueEvent::Note {
            event: note,
            due_ms: 1000.0,
        };
        assert_eq!(due.due_ms(), 1000.0);
        assert_eq!(due.beat(), 2.0);
        assert!(due.is_note());

        let wall = DueEvent::Obstacle {
            event: ObstacleEvent::new(3.0, Lane::new(0).unwrap(), 1, 1.0),
            due_ms: 1500.0,
        };
        assert!(!wall.is_note());
        assert_eq!(wall.beat(), 3.0);
    }
}
