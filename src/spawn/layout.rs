//! Fixed placement tables for spawned notes.
//!
//! Indices come from validated [`Lane`], [`Layer`] and [`CutDirection`]
//! values, so every lookup is in bounds by construction.

use crate::beatmap::{CutDirection, Lane, Layer, LANE_COUNT, LAYER_COUNT};

/// Rotation about the forward axis per cut direction, in degrees.
pub const ORIENTATIONS_DEG: [f32; 9] = [180.0, 0.0, 270.0, 90.0, 225.0, 135.0, 315.0, 45.0, 0.0];

/// Horizontal offset of each lane.
pub const HORIZONTAL_POSITIONS: [f32; LANE_COUNT] = [-0.60, -0.25, 0.25, 0.60];

/// Height of each row.
pub const VERTICAL_POSITIONS: [f32; LAYER_COUNT] = [1.00, 1.35, 1.70];

pub fn horizontal(lane: Lane) -> f32 {
    HORIZONTAL_POSITIONS[lane.index()]
}

pub fn vertical(layer: Layer) -> f32 {
    VERTICAL_POSITIONS[layer.index()]
}

pub fn rotation_degrees(cut: CutDirection) -> f32 {
    ORIENTATIONS_DEG[cut.index()]
}

/// Depth at which entities spawn: far enough ahead that travelling at
/// `speed` units per second takes `anticipation_secs` to reach the origin.
pub fn spawn_depth(anticipation_secs: f64, speed: f64) -> f32 {
    -(anticipation_secs * speed) as f32
}
