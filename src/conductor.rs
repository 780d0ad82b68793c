//! Conductor — drives one beat-map session per frame.
//!
//! The conductor owns the injected collaborators (entity pool, scene,
//! optional audio clock) and at most one [`Session`]: the loaded map with
//! its scheduler position, materializer buffer and drift-correction state.
//! Loading a map builds a fresh session and swaps it in whole, so a new map
//! can never run against stale scheduler or sync state.
//!
//! Each [`Conductor::tick`] advances the scheduler, materializes due notes
//! in time order, then runs the one-shot clock check. Without a map or an
//! audio clock the tick does nothing at all.

use std::sync::Arc;

use log::{debug, info};

use crate::audio::AudioClock;
use crate::beatmap::BeatMap;
use crate::config::SyncConfig;
use crate::event::{DueEvent, EventScheduler, Window};
use crate::loader::LoaderEvent;
use crate::pool::EntityPool;
use crate::scene::Scene;
use crate::spawn::Materializer;
use crate::sync::{ClockSynchronizer, SyncOutcome, TrackedEntity};

/// Everything tied to one loaded map.
#[derive(Debug, Clone)]
pub struct Session<H> {
    scheduler: EventScheduler,
    materializer: Materializer,
    sync: ClockSynchronizer<H>,
}

impl<H> Session<H> {
    fn new(map: Arc<BeatMap>, config: &SyncConfig) -> Self {
        Self {
            scheduler: EventScheduler::new(map),
            materializer: Materializer::new(config.beat_speed, config.beat_anticipation_time),
            sync: ClockSynchronizer::new(),
        }
    }

    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    pub fn materializer(&self) -> &Materializer {
        &self.materializer
    }

    pub fn sync(&self) -> &ClockSynchronizer<H> {
        &self.sync
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Window processed, or `None` if the tick was skipped.
    pub window: Option<Window>,
    /// Notes that got an entity.
    pub spawned: usize,
    /// Notes dropped because their pool could not serve them.
    pub dropped: usize,
    /// Obstacles that came due.
    pub obstacles: usize,
    pub sync: SyncOutcome,
}

impl TickReport {
    fn skipped() -> Self {
        Self {
            window: None,
            spawned: 0,
            dropped: 0,
            obstacles: 0,
            sync: SyncOutcome::Idle,
        }
    }

    /// Whether the tick did nothing because a precondition was missing.
    pub fn is_skipped(&self) -> bool {
        self.window.is_none()
    }
}

/// Frame-driven owner of a beat-map session and its collaborators.
pub struct Conductor<P: EntityPool, S, A> {
    config: SyncConfig,
    pool: P,
    scene: S,
    audio: Option<A>,
    session: Option<Session<P::Handle>>,
}

impl<P, S, A> Conductor<P, S, A>
where
    P: EntityPool,
    S: Scene<P::Handle>,
    A: AudioClock,
{
    /// Create a conductor with no map and no audio clock.
    pub fn new(config: SyncConfig, pool: P, scene: S) -> Self {
        Self {
            config,
            pool,
            scene,
            audio: None,
            session: None,
        }
    }

    /// Provide the audio clock. Ticks are skipped until one is attached.
    pub fn attach_audio(&mut self, audio: A) {
        self.audio = Some(audio);
    }

    /// Remove and return the audio clock.
    pub fn detach_audio(&mut self) -> Option<A> {
        self.audio.take()
    }

    /// Replace the current session with a fresh one for `map`.
    ///
    /// Scheduler position, tracked entity and sync flag all start over,
    /// even if the previous session had already synced.
    pub fn load_map(&mut self, map: Arc<BeatMap>) {
        info!(
            "loading map: {} notes, {} obstacles at {} BPM",
            map.note_count(),
            map.obstacle_count(),
            map.bpm()
        );
        self.session = Some(Session::new(map, &self.config));
    }

    /// Drop the current session. Ticks are skipped until a map is loaded.
    pub fn unload_map(&mut self) {
        self.session = None;
    }

    /// Apply a loader notification. Returns whether a new map was loaded.
    pub fn handle_loader_event(&mut self, event: LoaderEvent) -> bool {
        match event {
            LoaderEvent::Started { key } => {
                debug!("loader started {key}");
                false
            }
            LoaderEvent::Finished { key, map } => {
                debug!("loader finished {key}");
                self.load_map(map);
                true
            }
            LoaderEvent::Failed { key, error } => {
                debug!("loader failed {key}: {error}");
                false
            }
        }
    }

    /// Advance the session by `delta_ms` of frame time.
    pub fn tick(&mut self, delta_ms: f64) -> TickReport {
        let Some(session) = self.session.as_mut() else {
            return TickReport::skipped();
        };
        let Some(audio) = self.audio.as_mut() else {
            return TickReport::skipped();
        };

        let Session {
            scheduler,
            materializer,
            sync,
        } = session;

        let due = scheduler.advance(delta_ms);
        let mut report = TickReport {
            window: Some(due.window()),
            ..TickReport::skipped()
        };

        for event in due {
            match event {
                DueEvent::Note { event: note, .. } => {
                    match materializer.materialize(&note, &mut self.pool, &mut self.scene) {
                        Ok(handle) => {
                            report.spawned += 1;
                            if sync.track(handle, note.time) {
                                debug!("tracking note at beat {} for sync", note.time);
                            }
                        }
                        Err(_) => report.dropped += 1,
                    }
                }
                DueEvent::Obstacle { event: obstacle, .. } => {
                    materializer.materialize_obstacle(&obstacle);
                    report.obstacles += 1;
                }
            }
        }

        report.sync = sync.check(&self.scene, audio);
        report
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session<P::Handle>> {
        self.session.as_ref()
    }

    /// The loaded map, if any.
    pub fn map(&self) -> Option<&Arc<BeatMap>> {
        self.session.as_ref().map(|s| s.scheduler.map())
    }

    /// Scheduler high-water mark; zero without a map.
    pub fn last_processed_ms(&self) -> f64 {
        self.session
            .as_ref()
            .map_or(0.0, |s| s.scheduler.last_processed_ms())
    }

    pub fn tracked(&self) -> Option<&TrackedEntity<P::Handle>> {
        self.session.as_ref().and_then(|s| s.sync.tracked())
    }

    pub fn is_synced(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.sync.is_synced())
    }

    /// Whether every event of the loaded map has been scheduled.
    pub fn is_finished(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.scheduler.is_finished())
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut P {
        &mut self.pool
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Split borrow of scene and pool, for advancing entity motion.
    pub fn scene_and_pool_mut(&mut self) -> (&mut S, &mut P) {
        (&mut self.scene, &mut self.pool)
    }

    pub fn audio(&self) -> Option<&A> {
        self.audio.as_ref()
    }

    pub fn audio_mut(&mut self) -> Option<&mut A> {
        self.audio.as_mut()
    }
}
