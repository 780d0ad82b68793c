//! Entity pools — bounded sets of reusable visual-object handles.
//!
//! The spawning layer only depends on the [`EntityPool`] contract: request a
//! handle for a [`PoolKey`], release it when its traversal is over. Running
//! dry or asking for an unconfigured key is reported as a [`PoolError`],
//! never a panic.
//!
//! [`FixedPool`] is the bundled implementation: every slot is allocated up
//! front and request/release only move indices on a free list. Each checkout
//! of a slot gets a fresh generation, so a handle kept after release never
//! names the entity that later reuses the slot.

use std::fmt;

use log::debug;

use crate::spawn::PoolKey;

/// Why a pool could not hand out an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// Every entity of this key is checked out.
    Exhausted(PoolKey),
    /// No pool is configured for this key.
    UnknownCategory(PoolKey),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::Exhausted(key) => write!(f, "pool {key} exhausted"),
            PoolError::UnknownCategory(key) => write!(f, "pool {key} unavailable"),
        }
    }
}

impl std::error::Error for PoolError {}

/// Request/release contract the spawning layer depends on.
pub trait EntityPool {
    type Handle: Clone + fmt::Debug;

    /// Check out one entity of the given key.
    fn request_entity(&mut self, key: PoolKey) -> Result<Self::Handle, PoolError>;

    /// Return a checked-out entity. Releasing an entity that is not checked
    /// out is ignored.
    fn release(&mut self, handle: &Self::Handle);

    /// Number of entities of `key` currently free.
    fn available(&self, key: PoolKey) -> usize;
}

/// Handle into a [`FixedPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    pub key: PoolKey,
    pub slot: usize,
    /// Checkout count of `slot` when this handle was issued.
    pub generation: u32,
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}@{}", self.key, self.slot, self.generation)
    }
}

/// Slots for one key.
#[derive(Debug, Clone)]
struct Slots {
    free: Vec<usize>,
    checked_out: Vec<bool>,
    generations: Vec<u32>,
}

impl Slots {
    fn with_capacity(capacity: usize) -> Self {
        // Pop order hands out slot 0 first.
        let free = (0..capacity).rev().collect();
        Self {
            free,
            checked_out: vec![false; capacity],
            generations: vec![0; capacity],
        }
    }
}

/// A pool with a fixed number of pre-allocated slots per configured key.
#[derive(Debug, Clone)]
pub struct FixedPool {
    slots: [Option<Slots>; PoolKey::COUNT],
}

impl FixedPool {
    /// A pool with no keys configured.
    pub fn empty() -> Self {
        Self {
            slots: Default::default(),
        }
    }

    /// A pool with `capacity` slots for every key.
    pub fn uniform(capacity: usize) -> Self {
        Self::from_capacities(PoolKey::ALL.into_iter().map(|key| (key, capacity)))
    }

    /// A pool with the given capacity per key. Keys not listed stay
    /// unconfigured.
    pub fn from_capacities(capacities: impl IntoIterator<Item = (PoolKey, usize)>) -> Self {
        let mut pool = Self::empty();
        for (key, capacity) in capacities {
            pool.configure(key, capacity);
        }
        pool
    }

    /// (Re)configure one key with `capacity` fresh slots.
    pub fn configure(&mut self, key: PoolKey, capacity: usize) {
        self.slots[key.index()] = Some(Slots::with_capacity(capacity));
    }

    /// Total slots configured for `key`.
    pub fn capacity(&self, key: PoolKey) -> usize {
        self.slots[key.index()]
            .as_ref()
            .map_or(0, |s| s.checked_out.len())
    }

    /// Number of entities of `key` currently checked out.
    pub fn in_use(&self, key: PoolKey) -> usize {
        self.capacity(key) - self.available(key)
    }
}

impl Default for FixedPool {
    fn default() -> Self {
        Self::empty()
    }
}

impl EntityPool for FixedPool {
    type Handle = EntityId;

    fn request_entity(&mut self, key: PoolKey) -> Result<EntityId, PoolError> {
        let slots = self.slots[key.index()]
            .as_mut()
            .ok_or(PoolError::UnknownCategory(key))?;
        let slot = slots.free.pop().ok_or(PoolError::Exhausted(key))?;
        slots.checked_out[slot] = true;
        let generation = slots.generations[slot].wrapping_add(1);
        slots.generations[slot] = generation;
        Ok(EntityId {
            key,
            slot,
            generation,
        })
    }

    fn release(&mut self, handle: &EntityId) {
        let Some(slots) = self.slots[handle.key.index()].as_mut() else {
            return;
        };
        let current = slots.generations.get(handle.slot).copied();
        match slots.checked_out.get_mut(handle.slot) {
            Some(flag) if *flag && current == Some(handle.generation) => {
                *flag = false;
                slots.free.push(handle.slot);
            }
            _ => debug!("ignoring release of idle or stale entity {handle}"),
        }
    }

    fn available(&self, key: PoolKey) -> usize {
        self.slots[key.index()].as_ref().map_or(0, |s| s.free.len())
    }
}
