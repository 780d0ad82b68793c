//! Map loading — fetch a beat map document by retrieval key, parse it, and
//! announce progress over a channel.
//!
//! The scheduler never waits on loading. A [`BeatMapLoader`] emits
//! [`LoaderEvent::Started`] before fetching and [`LoaderEvent::Finished`]
//! with the ready map afterwards; whoever owns the conductor drains the
//! channel each frame and swaps the map in.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;

use log::{info, warn};

use crate::beatmap::{BeatMap, MapError};

#[cfg(feature = "fetch")]
mod http;
#[cfg(feature = "fetch")]
pub use http::HttpSource;

/// An error fetching or decoding a map.
#[derive(Debug)]
pub enum LoadError {
    /// Map id or difficulty was empty or contained a path separator.
    InvalidKey(String),
    Io(std::io::Error),
    /// Transport-level failure from a remote source.
    Fetch(String),
    Map(MapError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::InvalidKey(msg) => write!(f, "invalid retrieval key: {msg}"),
            LoadError::Io(e) => write!(f, "cannot read map: {e}"),
            LoadError::Fetch(msg) => write!(f, "cannot fetch map: {msg}"),
            LoadError::Map(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Map(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<MapError> for LoadError {
    fn from(e: MapError) -> Self {
        LoadError::Map(e)
    }
}

/// Identifies one map document: a map id plus a difficulty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RetrievalKey {
    map_id: String,
    difficulty: String,
}

impl RetrievalKey {
    pub fn new(map_id: &str, difficulty: &str) -> Result<Self, LoadError> {
        for (what, part) in [("map id", map_id), ("difficulty", difficulty)] {
            if part.is_empty() {
                return Err(LoadError::InvalidKey(format!("{what} is empty")));
            }
            if part.contains(['/', '\\']) || part == ".." {
                return Err(LoadError::InvalidKey(format!(
                    "{what} '{part}' is not a single path segment"
                )));
            }
        }
        Ok(Self {
            map_id: map_id.to_string(),
            difficulty: difficulty.to_string(),
        })
    }

    pub fn map_id(&self) -> &str {
        &self.map_id
    }

    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    /// Relative document path: `{map_id}/{difficulty}.json`.
    pub fn path(&self) -> String {
        format!("{}/{}.json", self.map_id, self.difficulty)
    }
}

impl fmt::Display for RetrievalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Somewhere map documents can be fetched from.
pub trait MapSource {
    /// Return the raw JSON text of the document for `key`.
    fn fetch(&self, key: &RetrievalKey) -> Result<String, LoadError>;
}

/// Reads map documents from a local directory laid out as
/// `{root}/{map_id}/{difficulty}.json`.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &RetrievalKey) -> PathBuf {
        self.root
            .join(key.map_id())
            .join(format!("{}.json", key.difficulty()))
    }
}

impl MapSource for DirSource {
    fn fetch(&self, key: &RetrievalKey) -> Result<String, LoadError> {
        Ok(std::fs::read_to_string(self.path_for(key))?)
    }
}

/// Progress notifications from a loader.
#[derive(Debug, Clone)]
pub enum LoaderEvent {
    Started { key: RetrievalKey },
    Finished { key: RetrievalKey, map: Arc<BeatMap> },
    Failed { key: RetrievalKey, error: String },
}

/// Sender half, handed to the loader.
pub type LoaderSender = mpsc::Sender<LoaderEvent>;

/// Receiver half, polled by the frame loop.
pub struct LoaderReceiver {
    rx: mpsc::Receiver<LoaderEvent>,
}

impl LoaderReceiver {
    /// Non-blocking poll for the next loader event.
    pub fn poll(&self) -> Option<LoaderEvent> {
        self.rx.try_recv().ok()
    }

    /// Drain all pending events.
    pub fn drain(&self) -> Vec<LoaderEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Create a new loader channel pair.
pub fn loader_channel() -> (LoaderSender, LoaderReceiver) {
    let (tx, rx) = mpsc::channel();
    (tx, LoaderReceiver { rx })
}

/// Fetches and decodes maps from a [`MapSource`].
pub struct BeatMapLoader<S> {
    source: S,
    events: Option<LoaderSender>,
}

impl<S: MapSource> BeatMapLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            events: None,
        }
    }

    /// Announce progress on `sender`.
    pub fn with_events(mut self, sender: LoaderSender) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch, parse, validate and sort the map for `key`.
    pub fn load(&self, key: &RetrievalKey) -> Result<Arc<BeatMap>, LoadError> {
        self.emit(LoaderEvent::Started { key: key.clone() });
        info!("fetching {key}...");

        let result = self
            .source
            .fetch(key)
            .and_then(|text| BeatMap::from_json(&text).map_err(LoadError::from));

        match result {
            Ok(map) => {
                let map = Arc::new(map);
                info!(
                    "loaded {key}: {} notes, {} obstacles at {} BPM",
                    map.note_count(),
                    map.obstacle_count(),
                    map.bpm()
                );
                self.emit(LoaderEvent::Finished {
                    key: key.clone(),
                    map: Arc::clone(&map),
                });
                Ok(map)
            }
            Err(e) => {
                warn!("failed to load {key}: {e}");
                self.emit(LoaderEvent::Failed {
                    key: key.clone(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn emit(&self, event: LoaderEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver just means nobody is listening.
            let _ = tx.send(event);
        }
    }
}
