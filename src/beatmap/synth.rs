//! Synthetic beat maps — deterministic, seeded note patterns.
//!
//! Used by the CLI `generate`/`simulate` commands and by tests that need a
//! realistic map without shipping map files.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{
    BeatMap, CutDirection, Lane, Layer, MapError, NoteEvent, NoteType, ObstacleEvent, LANE_COUNT,
    LAYER_COUNT,
};

/// Shape of a generated map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthParams {
    pub bpm: f64,
    /// Length of the map in beats.
    pub beats: u32,
    /// Notes per beat (1 = quarter notes, 2 = eighths, ...).
    pub subdivision: u32,
    /// Probability in `0.0..=1.0` that a slot holds a note.
    pub density: f64,
    /// Probability that a placed note is a mine.
    pub mine_chance: f64,
    /// Place a one-lane wall every this many beats. `0` disables walls.
    pub wall_every: u32,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            beats: 64,
            subdivision: 2,
            density: 0.6,
            mine_chance: 0.05,
            wall_every: 8,
        }
    }
}

/// Generate a map from `params`. Identical seeds yield identical maps.
///
/// The first note always lands on beat 1 so the map has a drift-correction
/// anchor early on.
pub fn generate(params: &SynthParams, seed: u64) -> Result<BeatMap, MapError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let subdivision = params.subdivision.max(1);
    let step = 1.0 / subdivision as f64;
    let mut notes = Vec::new();

    for slot in subdivision..params.beats * subdivision {
        let time = slot as f64 * step;
        let first = notes.is_empty();
        if !first && !rng.gen_bool(params.density.clamp(0.0, 1.0)) {
            continue;
        }

        let note_type = if !first && rng.gen_bool(params.mine_chance.clamp(0.0, 1.0)) {
            NoteType::Mine
        } else if rng.gen_bool(0.5) {
            NoteType::A
        } else {
            NoteType::B
        };
        let (Some(lane), Some(layer)) = (
            Lane::new(rng.gen_range(0..LANE_COUNT as i64)),
            Layer::new(rng.gen_range(0..LAYER_COUNT as i64)),
        ) else {
            continue;
        };
        let cut = CutDirection::ALL[rng.gen_range(0..CutDirection::ALL.len())];
        notes.push(NoteEvent::new(time, lane, layer, cut, note_type));
    }

    let mut obstacles = Vec::new();
    if params.wall_every > 0 {
        let mut beat = params.wall_every;
        while beat < params.beats {
            let lane = if rng.gen_bool(0.5) { 0 } else { 3 };
            if let Some(lane) = Lane::new(lane) {
                obstacles.push(ObstacleEvent::new(beat as f64, lane, 1, 2.0));
            }
            beat += params.wall_every;
        }
    }

    BeatMap::new(params.bpm, notes, obstacles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_map() {
        let params = SynthParams::default();
        assert_eq!(generate(&params, 7).unwrap(), generate(&params, 7).unwrap());
    }

    #[test]
    fn different_seed_different_map() {
        let params = SynthParams::default();
        assert_ne!(generate(&params, 1).unwrap(), generate(&params, 2).unwrap());
    }

    #[test]
    fn generated_map_is_sorted_and_anchored() {
        let map = generate(&SynthParams::default(), 42).unwrap();
        assert!(map.is_sorted());
        let first = map.notes()[0];
        assert_eq!(first.time, 1.0);
        assert_ne!(first.note_type, NoteType::Mine);
    }

    #[test]
    fn walls_can_be_disabled() {
        let params = SynthParams {
            wall_every: 0,
            ..SynthParams::default()
        };
        assert_eq!(generate(&params, 3).unwrap().obstacle_count(), 0);
    }

    #[test]
    fn full_density_fills_every_slot() {
        let params = SynthParams {
            beats: 5,
            subdivision: 2,
            density: 1.0,
            ..SynthParams::default()
        };
        // slots 2..10 → 8 notes
        assert_eq!(generate(&params, 0).unwrap().note_count(), 8);
    }

    #[test]
    fn invalid_tempo_is_rejected() {
        let params = SynthParams {
            bpm: 0.0,
            ..SynthParams::default()
        };
        assert!(generate(&params, 0).is_err());
    }
}
