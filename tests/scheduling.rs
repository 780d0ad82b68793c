//! Scheduler timing: reference scenarios plus exactly-once and step-size
//! independence properties.

use std::sync::Arc;

use proptest::prelude::*;

use beatsync::beatmap::{BeatMap, CutDirection, Lane, Layer, NoteEvent, NoteType, ObstacleEvent};
use beatsync::event::{DueEvent, EventScheduler};

fn note(time: f64, lane: i64) -> NoteEvent {
    NoteEvent::new(
        time,
        Lane::new(lane).unwrap(),
        Layer::new(0).unwrap(),
        CutDirection::Down,
        NoteType::A,
    )
}

fn wall(time: f64) -> ObstacleEvent {
    ObstacleEvent::new(time, Lane::new(0).unwrap(), 1, 1.0)
}

fn scheduler(bpm: f64, notes: Vec<NoteEvent>, walls: Vec<ObstacleEvent>) -> EventScheduler {
    EventScheduler::new(Arc::new(BeatMap::new(bpm, notes, walls).unwrap()))
}

/// Run the scheduler over `deltas` and collect every due event in order.
fn run(s: &mut EventScheduler, deltas: &[f64]) -> Vec<DueEvent> {
    deltas.iter().flat_map(|&d| s.advance(d).collect::<Vec<_>>()).collect()
}

// =============================================================================
// Reference scenarios
// =============================================================================

#[test]
fn note_at_beat_one_fires_on_step_ending_at_600() {
    // 120 BPM → 500 ms per beat.
    let mut s = scheduler(120.0, vec![note(1.0, 0)], Vec::new());
    let mut fired_at = None;
    for _ in 0..10 {
        let fired = s.advance(200.0).count();
        if fired > 0 {
            assert_eq!(fired, 1);
            fired_at = Some(s.last_processed_ms());
            break;
        }
    }
    assert_eq!(fired_at, Some(600.0));
}

#[test]
fn zero_delta_is_idempotent() {
    let mut s = scheduler(120.0, vec![note(1.0, 0), note(2.0, 1)], Vec::new());
    assert_eq!(s.advance(500.0).count(), 1);
    for _ in 0..10 {
        assert_eq!(s.advance(0.0).count(), 0);
        assert_eq!(s.last_processed_ms(), 500.0);
    }
    assert_eq!(s.advance(500.0).count(), 1);
}

#[test]
fn obstacles_and_notes_interleave_by_time() {
    let mut s = scheduler(
        60.0,
        vec![note(1.0, 0), note(2.5, 1)],
        vec![wall(0.5), wall(2.0)],
    );
    let due = run(&mut s, &[3000.0]);
    let times: Vec<_> = due.iter().map(|e| e.due_ms()).collect();
    assert_eq!(times, vec![500.0, 1000.0, 2000.0, 2500.0]);
    assert!(!due[0].is_note());
    assert!(due[1].is_note());
}

#[test]
fn frame_sized_steps_fire_every_note_once() {
    let notes: Vec<_> = (1..=64).map(|i| note(i as f64 * 0.5, i % 4)).collect();
    let mut s = scheduler(128.0, notes, Vec::new());
    let mut fired = Vec::new();
    while !s.is_finished() {
        fired.extend(s.advance(1000.0 / 60.0).map(|e| e.beat()));
    }
    let expected: Vec<_> = (1..=64).map(|i| i as f64 * 0.5).collect();
    assert_eq!(fired, expected);
}

// =============================================================================
// Properties
// =============================================================================

fn sorted_times() -> impl Strategy<Value = Vec<f64>> {
    // Quarter-beat grid keeps due times exact at 120 BPM.
    prop::collection::vec(1u32..200, 0..40).prop_map(|mut v| {
        v.sort_unstable();
        v.into_iter().map(|q| q as f64 * 0.25).collect()
    })
}

proptest! {
    #[test]
    fn step_size_independence(
        note_times in sorted_times(),
        wall_times in sorted_times(),
        deltas in prop::collection::vec(0u32..400, 1..200),
    ) {
        let notes: Vec<_> = note_times.iter().map(|&t| note(t, 0)).collect();
        let walls: Vec<_> = wall_times.iter().map(|&t| wall(t)).collect();
        let deltas: Vec<f64> = deltas.into_iter().map(f64::from).collect();
        let total: f64 = deltas.iter().sum();

        let mut stepped = scheduler(120.0, notes.clone(), walls.clone());
        let mut single = scheduler(120.0, notes, walls);

        let a = run(&mut stepped, &deltas);
        let b = run(&mut single, &[total]);
        prop_assert_eq!(a, b);
        prop_assert_eq!(stepped.last_processed_ms(), single.last_processed_ms());
    }

    #[test]
    fn every_event_fires_exactly_once(
        note_times in sorted_times(),
        deltas in prop::collection::vec(1u32..300, 1..100),
    ) {
        let notes: Vec<_> = note_times.iter().map(|&t| note(t, 0)).collect();
        let mut s = scheduler(120.0, notes, Vec::new());

        let mut fired = run(&mut s, &deltas.into_iter().map(f64::from).collect::<Vec<_>>());
        // Finish the map.
        fired.extend(s.advance(200.0 * 500.0));

        let beats: Vec<_> = fired.iter().map(|e| e.beat()).collect();
        prop_assert_eq!(beats, note_times);
        prop_assert!(s.is_finished());
    }

    #[test]
    fn due_times_are_non_decreasing(
        note_times in sorted_times(),
        wall_times in sorted_times(),
        deltas in prop::collection::vec(0u32..500, 1..100),
    ) {
        let notes: Vec<_> = note_times.iter().map(|&t| note(t, 1)).collect();
        let walls: Vec<_> = wall_times.iter().map(|&t| wall(t)).collect();
        let mut s = scheduler(120.0, notes, walls);

        let fired = run(&mut s, &deltas.into_iter().map(f64::from).collect::<Vec<_>>());
        prop_assert!(fired.windows(2).all(|w| w[0].due_ms() <= w[1].due_ms()));
    }
}
