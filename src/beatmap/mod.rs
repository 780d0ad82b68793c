//! Beat map data model — tempo plus time-sorted notes and obstacles.
//!
//! A [`BeatMap`] is immutable once built. Both event sequences are ascending
//! by time for the map's whole lifetime; the scheduler relies on this and
//! never re-sorts during playback. Loading a different map replaces the
//! instance rather than mutating it.

pub mod document;
pub mod error;
pub mod note;
pub mod obstacle;
pub mod synth;

pub use document::{MapDocument, RawNote, RawObstacle};
pub use error::{MapError, Sequence};
pub use note::{CutDirection, Lane, Layer, NoteEvent, NoteType, LANE_COUNT, LAYER_COUNT};
pub use obstacle::ObstacleEvent;

/// Milliseconds in one minute, for tempo conversion.
const MS_PER_MINUTE: f64 = 60_000.0;

/// An immutable, validated beat map.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatMap {
    bpm: f64,
    notes: Vec<NoteEvent>,
    obstacles: Vec<ObstacleEvent>,
}

impl BeatMap {
    /// Build a map from typed events.
    ///
    /// Rejects a non-positive tempo and any sequence that is not ascending
    /// by time.
    pub fn new(
        bpm: f64,
        notes: Vec<NoteEvent>,
        obstacles: Vec<ObstacleEvent>,
    ) -> Result<Self, MapError> {
        validate_tempo(bpm)?;
        if let Some(index) = first_unsorted(notes.iter().map(|n| n.time)) {
            return Err(MapError::Unsorted {
                sequence: Sequence::Notes,
                index,
            });
        }
        if let Some(index) = first_unsorted(obstacles.iter().map(|o| o.time)) {
            return Err(MapError::Unsorted {
                sequence: Sequence::Obstacles,
                index,
            });
        }
        Ok(Self {
            bpm,
            notes,
            obstacles,
        })
    }

    /// Convert a raw document, validating every field and sorting both
    /// sequences by time.
    ///
    /// The sort is stable, so events sharing a timestamp keep their
    /// authored order.
    pub fn from_document(doc: &MapDocument) -> Result<Self, MapError> {
        validate_tempo(doc.beats_per_minute)?;

        let mut notes = doc
            .notes
            .iter()
            .enumerate()
            .map(|(i, raw)| convert_note(i, raw))
            .collect::<Result<Vec<_>, _>>()?;
        let mut obstacles = doc
            .obstacles
            .iter()
            .enumerate()
            .map(|(i, raw)| convert_obstacle(i, raw))
            .collect::<Result<Vec<_>, _>>()?;

        notes.sort_by(|a, b| a.time.total_cmp(&b.time));
        obstacles.sort_by(|a, b| a.time.total_cmp(&b.time));

        Ok(Self {
            bpm: doc.beats_per_minute,
            notes,
            obstacles,
        })
    }

    /// Parse and convert a JSON map document.
    pub fn from_json(text: &str) -> Result<Self, MapError> {
        let doc = MapDocument::from_json(text)?;
        Self::from_document(&doc)
    }

    /// Convert back into the wire representation.
    pub fn to_document(&self) -> MapDocument {
        MapDocument {
            beats_per_minute: self.bpm,
            notes: self
                .notes
                .iter()
                .map(|n| RawNote {
                    time: n.time,
                    line_index: n.lane.index() as i64,
                    line_layer: n.layer.index() as i64,
                    cut_direction: n.cut_direction.index() as i64,
                    note_type: n.note_type.raw(),
                })
                .collect(),
            obstacles: self
                .obstacles
                .iter()
                .map(|o| RawObstacle {
                    time: o.time,
                    line_index: o.lane.index() as i64,
                    width: o.width as i64,
                    duration: o.duration,
                })
                .collect(),
        }
    }

    /// Tempo in beats per minute.
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Duration of one beat in milliseconds.
    pub fn ms_per_beat(&self) -> f64 {
        MS_PER_MINUTE / self.bpm
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    pub fn obstacles(&self) -> &[ObstacleEvent] {
        &self.obstacles
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    /// Whether the map has no events at all.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.obstacles.is_empty()
    }

    /// Time of the last event (note or obstacle start) in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        let last_note = self.notes.last().map(|n| n.time);
        let last_obstacle = self.obstacles.last().map(|o| o.time);
        let last = match (last_note, last_obstacle) {
            (Some(a), Some(b)) => a.max(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => 0.0,
        };
        last * self.ms_per_beat()
    }

    /// Whether both sequences are ascending by time.
    pub fn is_sorted(&self) -> bool {
        first_unsorted(self.notes.iter().map(|n| n.time)).is_none()
            && first_unsorted(self.obstacles.iter().map(|o| o.time)).is_none()
    }
}

fn validate_tempo(bpm: f64) -> Result<(), MapError> {
    if bpm.is_finite() && bpm > 0.0 {
        Ok(())
    } else {
        Err(MapError::InvalidTempo(bpm))
    }
}

/// Index of the first element that is smaller than its predecessor.
fn first_unsorted(times: impl Iterator<Item = f64>) -> Option<usize> {
    let mut prev = f64::NEG_INFINITY;
    for (i, t) in times.enumerate() {
        if t < prev {
            return Some(i);
        }
        prev = t;
    }
    None
}

fn validate_time(sequence: Sequence, index: usize, time: f64) -> Result<f64, MapError> {
    if time.is_finite() {
        Ok(time)
    } else {
        Err(MapError::field(sequence, index, "_time", time))
    }
}

fn convert_note(index: usize, raw: &RawNote) -> Result<NoteEvent, MapError> {
    let seq = Sequence::Notes;
    let time = validate_time(seq, index, raw.time)?;
    let lane = Lane::new(raw.line_index)
        .ok_or_else(|| MapError::field(seq, index, "_lineIndex", raw.line_index as f64))?;
    let layer = Layer::new(raw.line_layer)
        .ok_or_else(|| MapError::field(seq, index, "_lineLayer", raw.line_layer as f64))?;
    let cut_direction = CutDirection::from_raw(raw.cut_direction)
        .ok_or_else(|| MapError::field(seq, index, "_cutDirection", raw.cut_direction as f64))?;
    let note_type = NoteType::from_raw(raw.note_type)
        .ok_or_else(|| MapError::field(seq, index, "_type", raw.note_type as f64))?;
    Ok(NoteEvent::new(time, lane, layer, cut_direction, note_type))
}

fn convert_obstacle(index: usize, raw: &RawObstacle) -> Result<ObstacleEvent, MapError> {
    let seq = Sequence::Obstacles;
    let time = validate_time(seq, index, raw.time)?;
    let lane = Lane::new(raw.line_index)
        .ok_or_else(|| MapError::field(seq, index, "_lineIndex", raw.line_index as f64))?;
    let width = u32::try_from(raw.width)
        .map_err(|_| MapError::field(seq, index, "_width", raw.width as f64))?;
    if !raw.duration.is_finite() {
        return Err(MapError::field(seq, index, "_duration", raw.duration));
    }
    Ok(ObstacleEvent::new(time, lane, width, raw.duration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn raw_note(time: f64, line_index: i64) -> RawNote {
        RawNote {
            time,
            line_index,
            line_layer: 0,
            cut_direction: 1,
            note_type: 0,
        }
    }

    fn note(time: f64) -> NoteEvent {
        NoteEvent::new(
            time,
            Lane::new(0).unwrap(),
            Layer::new(0).unwrap(),
            CutDirection::Down,
            NoteType::A,
        )
    }

    fn doc(notes: Vec<RawNote>) -> MapDocument {
        MapDocument {
            beats_per_minute: 120.0,
            notes,
            obstacles: Vec::new(),
        }
    }

    #[test]
    fn ms_per_beat_at_120() {
        let map = BeatMap::new(120.0, Vec::new(), Vec::new()).unwrap();
        assert_approx_eq!(map.ms_per_beat(), 500.0);
    }

    #[test]
    fn rejects_bad_tempo() {
        assert_eq!(
            BeatMap::new(0.0, Vec::new(), Vec::new()),
            Err(MapError::InvalidTempo(0.0))
        );
        assert!(BeatMap::new(-60.0, Vec::new(), Vec::new()).is_err());
        assert!(BeatMap::new(f64::NAN, Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn new_rejects_unsorted_notes() {
        let err = BeatMap::new(120.0, vec![note(2.0), note(1.0)], Vec::new()).unwrap_err();
        assert_eq!(
            err,
            MapError::Unsorted {
                sequence: Sequence::Notes,
                index: 1
            }
        );
    }

    #[test]
    fn from_document_sorts_stably() {
        let notes = vec![raw_note(2.0, 0), raw_note(1.0, 1), raw_note(1.0, 2)];
        let map = BeatMap::from_document(&doc(notes)).unwrap();
        assert!(map.is_sorted());
        let lanes: Vec<_> = map.notes().iter().map(|n| n.lane.index()).collect();
        assert_eq!(lanes, vec![1, 2, 0]);
    }

    #[test]
    fn from_document_rejects_out_of_range_lane() {
        let err = BeatMap::from_document(&doc(vec![raw_note(0.0, 0), raw_note(1.0, 4)]))
            .unwrap_err();
        assert_eq!(err, MapError::field(Sequence::Notes, 1, "_lineIndex", 4));
    }

    #[test]
    fn from_document_rejects_unknown_note_type() {
        let mut raw = raw_note(0.0, 0);
        raw.note_type = 2;
        assert!(matches!(
            BeatMap::from_document(&doc(vec![raw])),
            Err(MapError::InvalidField { field: "_type", .. })
        ));
    }

    #[test]
    fn from_document_rejects_negative_width() {
        let d = MapDocument {
            beats_per_minute: 120.0,
            notes: Vec::new(),
            obstacles: vec![RawObstacle {
                time: 1.0,
                line_index: 0,
                width: -1,
                duration: 1.0,
            }],
        };
        assert!(matches!(
            BeatMap::from_document(&d),
            Err(MapError::InvalidField { field: "_width", .. })
        ));
    }

    #[test]
    fn from_json_parse_error() {
        assert!(matches!(
            BeatMap::from_json("{not json"),
            Err(MapError::Parse(_))
        ));
    }

    #[test]
    fn document_conversion_preserves_events() {
        let map = BeatMap::from_document(&doc(vec![raw_note(0.5, 3), raw_note(1.0, 1)])).unwrap();
        let again = BeatMap::from_document(&map.to_document()).unwrap();
        assert_eq!(map, again);
    }

    #[test]
    fn duration_uses_latest_event() {
        let map = BeatMap::new(
            60.0,
            vec![note(1.0), note(3.0)],
            vec![ObstacleEvent::new(4.0, Lane::new(0).unwrap(), 1, 1.0)],
        )
        .unwrap();
        assert_approx_eq!(map.duration_ms(), 4000.0);
        assert_eq!(map.note_count(), 2);
        assert_eq!(map.obstacle_count(), 1);
        assert!(!map.is_empty());
    }
}
