//! Materializer — turns a due note into a positioned, moving entity.
//!
//! For each note the [`Materializer`] picks a [`PoolKey`], checks an entity
//! out of the pool, fills its reusable [`EntityAttributes`] buffer (speed,
//! lane/row position at spawn depth, rotation from the cut direction) and
//! hands it to the scene to activate. A pool that cannot serve the request
//! drops the note: it is logged and never retried.

pub mod key;
pub mod layout;

pub use key::{Category, Colour, PoolKey, Variant};

use log::{trace, warn};

use crate::beatmap::{NoteEvent, ObstacleEvent};
use crate::pool::{EntityPool, PoolError};
use crate::scene::{EntityAttributes, Scene};

/// Spawns entities for due notes.
#[derive(Debug, Clone)]
pub struct Materializer {
    speed: f32,
    spawn_depth: f32,
    scratch: EntityAttributes,
}

impl Materializer {
    /// Create a materializer.
    ///
    /// - `beat_speed`: travel speed in units per second
    /// - `anticipation_secs`: time an entity takes from spawn to the origin
    pub fn new(beat_speed: f64, anticipation_secs: f64) -> Self {
        Self {
            speed: beat_speed as f32,
            spawn_depth: layout::spawn_depth(anticipation_secs, beat_speed),
            scratch: EntityAttributes::default(),
        }
    }

    /// Depth at which entities are placed.
    pub fn spawn_depth(&self) -> f32 {
        self.spawn_depth
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Attributes written by the most recent successful spawn.
    pub fn last_attributes(&self) -> &EntityAttributes {
        &self.scratch
    }

    /// Spawn the entity for `note`.
    ///
    /// On pool failure nothing is assigned or activated and the error is
    /// returned after being logged.
    pub fn materialize<P, S>(
        &mut self,
        note: &NoteEvent,
        pool: &mut P,
        scene: &mut S,
    ) -> Result<P::Handle, PoolError>
    where
        P: EntityPool,
        S: Scene<P::Handle>,
    {
        let key = PoolKey::for_note(note);
        let handle = pool.request_entity(key).map_err(|err| {
            warn!("dropping note at beat {}: {err}", note.time);
            err
        })?;

        self.scratch.key = key;
        self.scratch.colour = key.category.colour();
        self.scratch.speed = self.speed;
        self.scratch.position = [
            layout::horizontal(note.lane),
            layout::vertical(note.layer),
            self.spawn_depth,
        ];
        self.scratch.rotation_z = layout::rotation_degrees(note.cut_direction).to_radians();

        scene.assign(&handle, &self.scratch);
        scene.activate(&handle);
        trace!("spawned {key} for beat {} as {handle:?}", note.time);
        Ok(handle)
    }

    /// Obstacles are scheduled like notes but have no visual representation
    /// yet: wall geometry is an open extension point.
    pub fn materialize_obstacle(&mut self, obstacle: &ObstacleEvent) {
        trace!(
            "obstacle at beat {} (lane {}, width {}) not rendered",
            obstacle.time,
            obstacle.lane.index(),
            obstacle.width
        );
    }
}
