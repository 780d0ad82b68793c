//! Wire format of a beat map document.
//!
//! Mirrors the JSON the map loader receives: underscore-prefixed fields,
//! raw integers for indices. Unknown fields (`_version`, `_events`, ...) are
//! ignored. Conversion into typed events happens in
//! [`BeatMap::from_document`](super::BeatMap::from_document).

use serde::{Deserialize, Serialize};

/// A raw map document as parsed from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    #[serde(rename = "_beatsPerMinute")]
    pub beats_per_minute: f64,
    #[serde(rename = "_notes", default)]
    pub notes: Vec<RawNote>,
    #[serde(rename = "_obstacles", default)]
    pub obstacles: Vec<RawObstacle>,
}

/// A note entry exactly as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawNote {
    #[serde(rename = "_time")]
    pub time: f64,
    #[serde(rename = "_lineIndex")]
    pub line_index: i64,
    #[serde(rename = "_lineLayer")]
    pub line_layer: i64,
    #[serde(rename = "_cutDirection")]
    pub cut_direction: i64,
    #[serde(rename = "_type")]
    pub note_type: i64,
}

/// An obstacle entry exactly as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawObstacle {
    #[serde(rename = "_time")]
    pub time: f64,
    #[serde(rename = "_lineIndex")]
    pub line_index: i64,
    #[serde(rename = "_width")]
    pub width: i64,
    #[serde(rename = "_duration")]
    pub duration: f64,
}

impl MapDocument {
    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serialize the document back to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
