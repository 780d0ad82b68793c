//! Error types for beat map construction and validation.

use std::fmt;

/// Which event sequence an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    Notes,
    Obstacles,
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sequence::Notes => write!(f, "_notes"),
            Sequence::Obstacles => write!(f, "_obstacles"),
        }
    }
}

/// An error that occurred while building a [`BeatMap`](super::BeatMap).
#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    /// Tempo is zero, negative, or not finite.
    InvalidTempo(f64),
    /// An event field is outside its allowed range.
    InvalidField {
        sequence: Sequence,
        index: usize,
        field: &'static str,
        value: f64,
    },
    /// A sequence is not ascending by time.
    Unsorted { sequence: Sequence, index: usize },
    /// The document could not be parsed.
    Parse(String),
}

impl MapError {
    pub(crate) fn field(
        sequence: Sequence,
        index: usize,
        field: &'static str,
        value: impl Into<f64>,
    ) -> Self {
        Self::InvalidField {
            sequence,
            index,
            field,
            value: value.into(),
        }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::InvalidTempo(bpm) => write!(f, "invalid tempo: {bpm} BPM"),
            MapError::InvalidField {
                sequence,
                index,
                field,
                value,
            } => write!(f, "{sequence}[{index}]: {field} out of range ({value})"),
            MapError::Unsorted { sequence, index } => {
                write!(f, "{sequence}[{index}]: events not ascending by time")
            }
            MapError::Parse(msg) => write!(f, "malformed beat map document: {msg}"),
        }
    }
}

impl std::error::Error for MapError {}

impl From<serde_json::Error> for MapError {
    fn from(err: serde_json::Error) -> Self {
        MapError::Parse(err.to_string())
    }
}
