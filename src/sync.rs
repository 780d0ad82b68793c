//! Clock synchronizer — one-shot drift correction of the audio clock.
//!
//! The first entity spawned in a session is tracked together with its
//! authored beat. Once that entity has travelled to (or past) the
//! listener's depth, the audio clock is snapped to the authored beat and
//! correction is disabled for the rest of the session.

use log::{debug, info};

use crate::audio::AudioClock;
use crate::scene::Scene;

/// The entity used as the drift-correction reference.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEntity<H> {
    pub handle: H,
    /// Authored time in beats.
    pub beat: f64,
}

/// Result of one synchronization check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncOutcome {
    /// Nothing tracked yet, or already synced.
    Idle,
    /// The tracked entity has not reached the listener.
    Pending,
    /// The audio clock was just moved to `beat`.
    Synced { beat: f64 },
}

/// Per-session drift-correction state.
#[derive(Debug, Clone)]
pub struct ClockSynchronizer<H> {
    tracked: Option<TrackedEntity<H>>,
    audio_synced: bool,
}

impl<H> ClockSynchronizer<H> {
    pub fn new() -> Self {
        Self {
            tracked: None,
            audio_synced: false,
        }
    }

    /// Track `handle` if nothing is tracked yet. Later calls are ignored.
    ///
    /// Returns whether the entity became the tracked reference.
    pub fn track(&mut self, handle: H, beat: f64) -> bool {
        if self.tracked.is_some() {
            return false;
        }
        self.tracked = Some(TrackedEntity { handle, beat });
        true
    }

    pub fn tracked(&self) -> Option<&TrackedEntity<H>> {
        self.tracked.as_ref()
    }

    pub fn is_synced(&self) -> bool {
        self.audio_synced
    }

    /// Seek the audio clock if the tracked entity has reached the listener.
    ///
    /// An entity whose depth the scene cannot report is treated as not yet
    /// arrived.
    pub fn check<S, A>(&mut self, scene: &S, audio: &mut A) -> SyncOutcome
    where
        S: Scene<H> + ?Sized,
        A: AudioClock + ?Sized,
    {
        if self.audio_synced {
            return SyncOutcome::Idle;
        }
        let Some(tracked) = &self.tracked else {
            return SyncOutcome::Idle;
        };

        let listener = scene.listener_depth();
        match scene.depth(&tracked.handle) {
            Some(depth) if depth >= listener => {}
            Some(_) => return SyncOutcome::Pending,
            None => {
                debug!("tracked entity has no depth yet");
                return SyncOutcome::Pending;
            }
        }

        self.audio_synced = true;
        let beat = tracked.beat;
        info!("first entity reached listener; syncing audio to beat {beat}");
        audio.seek_to_beat(beat);
        SyncOutcome::Synced { beat }
    }
}

impl<H> Default for ClockSynchronizer<H> {
    fn default() -> Self {
        Self::new()
    }
}
