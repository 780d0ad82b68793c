//! Note events and their validated index types.
//!
//! Lane, row, cut direction and note type arrive as raw integers in the map
//! document. They are checked once at load so that every later table lookup
//! indexes in bounds by construction.

/// Number of horizontal lanes.
pub const LANE_COUNT: usize = 4;

/// Number of vertical rows.
pub const LAYER_COUNT: usize = 3;

/// One of the four horizontal lanes, `0..=3` from left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lane(u8);

impl Lane {
    pub fn new(index: i64) -> Option<Self> {
        (0..LANE_COUNT as i64)
            .contains(&index)
            .then_some(Self(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One of the three vertical rows, `0..=2` from bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layer(u8);

impl Layer {
    pub fn new(index: i64) -> Option<Self> {
        (0..LAYER_COUNT as i64)
            .contains(&index)
            .then_some(Self(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The direction a note must be cut in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CutDirection {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
    /// Omnidirectional: any cut direction is accepted.
    Any,
}

impl CutDirection {
    pub const ALL: [CutDirection; 9] = [
        CutDirection::Up,
        CutDirection::Down,
        CutDirection::Left,
        CutDirection::Right,
        CutDirection::UpLeft,
        CutDirection::UpRight,
        CutDirection::DownLeft,
        CutDirection::DownRight,
        CutDirection::Any,
    ];

    pub fn from_raw(raw: i64) -> Option<Self> {
        usize::try_from(raw)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Position in the orientation table.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_omnidirectional(self) -> bool {
        self == CutDirection::Any
    }
}

/// Which hand/colour a note belongs to, or a mine to avoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteType {
    /// Raw `0`, the red saber.
    A,
    /// Raw `1`, the blue saber.
    B,
    /// Raw `3`.
    Mine,
}

impl NoteType {
    /// Map a raw `_type`. Anything other than `0`, `1` or `3` is `None`, and
    /// the loader rejects the whole map rather than guessing a colour.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(NoteType::A),
            1 => Some(NoteType::B),
            3 => Some(NoteType::Mine),
            _ => None,
        }
    }

    pub fn raw(self) -> i64 {
        match self {
            NoteType::A => 0,
            NoteType::B => 1,
            NoteType::Mine => 3,
        }
    }
}

/// A single note on the beat map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// Position in beats since map start.
    pub time: f64,
    pub lane: Lane,
    pub layer: Layer,
    pub cut_direction: CutDirection,
    pub note_type: NoteType,
}

impl NoteEvent {
    pub fn new(
        time: f64,
        lane: Lane,
        layer: Layer,
        cut_direction: CutDirection,
        note_type: NoteType,
    ) -> Self {
        Self {
            time,
            lane,
            layer,
            cut_direction,
            note_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_bounds() {
        assert!(Lane::new(-1).is_none());
        assert_eq!(Lane::new(0).map(Lane::index), Some(0));
        assert_eq!(Lane::new(3).map(Lane::index), Some(3));
        assert!(Lane::new(4).is_none());
    }

    #[test]
    fn layer_bounds() {
        assert_eq!(Layer::new(2).map(Layer::index), Some(2));
        assert!(Layer::new(3).is_none());
    }

    #[test]
    fn cut_direction_table_order() {
        assert_eq!(CutDirection::from_raw(0), Some(CutDirection::Up));
        assert_eq!(CutDirection::from_raw(7), Some(CutDirection::DownRight));
        assert_eq!(CutDirection::from_raw(8), Some(CutDirection::Any));
        assert!(CutDirection::from_raw(9).is_none());
        assert!(CutDirection::from_raw(-1).is_none());
        for (i, dir) in CutDirection::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
        }
    }

    #[test]
    fn only_any_is_omnidirectional() {
        let omni: Vec<_> = CutDirection::ALL
            .iter()
            .filter(|d| d.is_omnidirectional())
            .collect();
        assert_eq!(omni, vec![&CutDirection::Any]);
    }

    #[test]
    fn note_type_raw_values() {
        assert_eq!(NoteType::from_raw(0), Some(NoteType::A));
        assert_eq!(NoteType::from_raw(1), Some(NoteType::B));
        assert_eq!(NoteType::from_raw(2), None);
        assert_eq!(NoteType::from_raw(3), Some(NoteType::Mine));
        assert_eq!(NoteType::Mine.raw(), 3);
    }
}
