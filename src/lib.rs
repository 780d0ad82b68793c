//! Beatsync — beat-map scheduling and audio clock synchronization for
//! rhythm games.

pub mod audio;
pub mod beatmap;
pub mod conductor;
pub mod config;
pub mod event;
pub mod loader;
pub mod pool;
pub mod scene;
pub mod spawn;
pub mod sync;
