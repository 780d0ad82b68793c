//! Configuration — spawn timing, pool sizes, and map selection loaded from
//! ~/.beatsync/config.yaml.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::loader::RetrievalKey;
use crate::pool::FixedPool;
use crate::spawn::PoolKey;

/// An error loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config: {e}"),
            ConfigError::Parse(e) => write!(f, "malformed config: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds between an entity spawning and reaching the listener.
    #[serde(alias = "beatAnticipationTime", alias = "beatAnticipationTimeSeconds")]
    pub beat_anticipation_time: f64,
    /// Entity travel speed in units per second.
    #[serde(alias = "beatSpeed")]
    pub beat_speed: f64,
    /// Map identifier, used only to build the retrieval key.
    #[serde(alias = "challengeId")]
    pub map_id: Option<String>,
    /// Difficulty name, used only to build the retrieval key.
    pub difficulty: Option<String>,
    /// Slots per pool key unless overridden in `pools`.
    pub pool_size: usize,
    /// Per-key capacity overrides, keyed by pool name (e.g. `beat-dot-red`).
    pub pools: BTreeMap<String, usize>,
    /// Depth of the camera/listener.
    pub listener_depth: f32,
    /// Depth past which the simulated scene returns entities to the pool.
    pub despawn_depth: f32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            beat_anticipation_time: 2.0,
            beat_speed: 4.0,
            map_id: None,
            difficulty: None,
            pool_size: 16,
            pools: BTreeMap::new(),
            listener_depth: 0.0,
            despawn_depth: 2.0,
        }
    }
}

impl SyncConfig {
    /// Standard config path (~/.beatsync/config.yaml).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".beatsync").join("config.yaml"))
    }

    /// Load config from the standard path.
    /// Returns None if the file doesn't exist or can't be parsed.
    pub fn load() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            return None;
        }
        match Self::load_from(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("{}: {e}; using defaults", path.display());
                None
            }
        }
    }

    /// Load and validate config from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: SyncConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write config as YAML, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Check value ranges and pool names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.beat_speed.is_finite() && self.beat_speed > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "beat_speed must be positive, got {}",
                self.beat_speed
            )));
        }
        if !(self.beat_anticipation_time.is_finite() && self.beat_anticipation_time >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "beat_anticipation_time must be non-negative, got {}",
                self.beat_anticipation_time
            )));
        }
        if !(self.listener_depth.is_finite() && self.despawn_depth.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "listener_depth and despawn_depth must be finite, got {} and {}",
                self.listener_depth, self.despawn_depth
            )));
        }
        if self.despawn_depth <= self.listener_depth {
            return Err(ConfigError::Invalid(format!(
                "despawn_depth ({}) must lie beyond listener_depth ({})",
                self.despawn_depth, self.listener_depth
            )));
        }
        if let Some(name) = self.pools.keys().find(|n| PoolKey::from_name(n).is_none()) {
            return Err(ConfigError::Invalid(format!("unknown pool '{name}'")));
        }
        Ok(())
    }

    /// Capacity configured for `key`.
    pub fn pool_capacity(&self, key: PoolKey) -> usize {
        self.pools
            .get(&key.name())
            .copied()
            .unwrap_or(self.pool_size)
    }

    /// Build a pool with the configured capacities.
    pub fn build_pool(&self) -> FixedPool {
        FixedPool::from_capacities(PoolKey::ALL.into_iter().map(|k| (k, self.pool_capacity(k))))
    }

    /// Retrieval key for the configured map, if both parts are set.
    pub fn retrieval_key(&self) -> Option<RetrievalKey> {
        let map_id = self.map_id.as_deref()?;
        let difficulty = self.difficulty.as_deref()?;
        RetrievalKey::new(map_id, difficulty).ok()
    }
}
