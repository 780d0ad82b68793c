//! Scene contract — where spawned entities get their attributes, start
//! moving, and report how far they have travelled.
//!
//! The scheduler never renders anything itself. It writes an
//! [`EntityAttributes`] record and calls [`Scene::activate`]; motion from
//! then on belongs to the scene. [`SimScene`] is a headless scene that moves
//! entities along +z at their configured speed, used by the CLI and tests.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use log::trace;

use crate::pool::EntityPool;
use crate::spawn::{Category, Colour, PoolKey, Variant};

/// Position in scene units: `[x, y, z]`, with -z pointing away from the
/// listener.
pub type Vec3 = [f32; 3];

/// Attributes the spawning layer sets on an entity before activating it.
///
/// One instance is owned by the materializer and overwritten for every
/// spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityAttributes {
    pub key: PoolKey,
    pub colour: Option<Colour>,
    /// Travel speed in units per second.
    pub speed: f32,
    pub position: Vec3,
    /// Rotation about the forward axis, in radians.
    pub rotation_z: f32,
}

impl Default for EntityAttributes {
    fn default() -> Self {
        Self {
            key: PoolKey::new(Variant::Round, Category::Red),
            colour: None,
            speed: 0.0,
            position: [0.0; 3],
            rotation_z: 0.0,
        }
    }
}

/// Outbound rendering contract for entities identified by `H`.
pub trait Scene<H> {
    /// Copy spawn attributes onto the entity.
    fn assign(&mut self, handle: &H, attrs: &EntityAttributes);

    /// Start the entity's forward motion.
    fn activate(&mut self, handle: &H);

    /// Current depth (z) of the entity, if the scene knows it. An entity
    /// that was released reports where it left, for as long as the scene
    /// remembers it.
    fn depth(&self, handle: &H) -> Option<f32>;

    /// Depth of the camera/listener.
    fn listener_depth(&self) -> f32;
}

#[derive(Debug, Clone, Copy)]
struct SimEntity {
    attrs: EntityAttributes,
    active: bool,
}

/// Released entities still answered for by [`SimScene::depth`].
const RETIRED_LIMIT: usize = 64;

/// Headless scene: entities move along +z at `speed` units per second.
#[derive(Debug, Clone)]
pub struct SimScene<H> {
    entities: HashMap<H, SimEntity>,
    listener_depth: f32,
    despawn_depth: f32,
    /// Scratch list reused by `advance`.
    finished: Vec<H>,
    /// Released handles, oldest first.
    retired: VecDeque<H>,
}

impl<H: Clone + Eq + Hash> SimScene<H> {
    /// Create a scene with the listener at `listener_depth`. Entities are
    /// deactivated and handed back to their pool once they pass
    /// `despawn_depth`.
    pub fn new(listener_depth: f32, despawn_depth: f32) -> Self {
        Self {
            entities: HashMap::new(),
            listener_depth,
            despawn_depth,
            finished: Vec::new(),
            retired: VecDeque::new(),
        }
    }

    /// Move every active entity forward by `delta_ms` worth of travel and
    /// release the ones that went past the despawn depth.
    ///
    /// Released entities keep their last position, so a handle held
    /// elsewhere can still see where its entity left the scene. Only the
    /// most recent releases are kept; older ones are forgotten.
    ///
    /// Returns how many entities were released.
    pub fn advance<P>(&mut self, delta_ms: f64, pool: &mut P) -> usize
    where
        P: EntityPool<Handle = H>,
    {
        let dt = (delta_ms / 1000.0) as f32;
        self.finished.clear();
        for (handle, entity) in self.entities.iter_mut() {
            if !entity.active {
                continue;
            }
            entity.attrs.position[2] += entity.attrs.speed * dt;
            if entity.attrs.position[2] >= self.despawn_depth {
                entity.active = false;
                self.finished.push(handle.clone());
            }
        }
        for handle in &self.finished {
            pool.release(handle);
            self.retired.push_back(handle.clone());
        }
        while self.retired.len() > RETIRED_LIMIT {
            let Some(old) = self.retired.pop_front() else {
                break;
            };
            if self.entities.get(&old).is_some_and(|e| !e.active) {
                self.entities.remove(&old);
            }
        }
        self.finished.len()
    }

    /// Attributes last assigned to `handle`.
    pub fn attributes(&self, handle: &H) -> Option<&EntityAttributes> {
        self.entities.get(handle).map(|e| &e.attrs)
    }

    pub fn is_active(&self, handle: &H) -> bool {
        self.entities.get(handle).is_some_and(|e| e.active)
    }

    /// Number of entities currently moving.
    pub fn active_count(&self) -> usize {
        self.entities.values().filter(|e| e.active).count()
    }
}

impl<H: Clone + Eq + Hash + std::fmt::Debug> Scene<H> for SimScene<H> {
    fn assign(&mut self, handle: &H, attrs: &EntityAttributes) {
        self.entities.insert(
            handle.clone(),
            SimEntity {
                attrs: *attrs,
                active: false,
            },
        );
    }

    fn activate(&mut self, handle: &H) {
        match self.entities.get_mut(handle) {
            Some(entity) => entity.active = true,
            None => trace!("activate on unassigned entity {handle:?}"),
        }
    }

    fn depth(&self, handle: &H) -> Option<f32> {
        self.entities.get(handle).map(|e| e.attrs.position[2])
    }

    fn listener_depth(&self) -> f32 {
        self.listener_depth
    }
}
