//! Playable clip handles.
//!
//! Every loaded clip gets one [`ClipHandle`]. Dropping the handle releases
//! it; the [`HandleRegistry`] counts issues and releases so a reload can be
//! checked for leaks or double releases.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmix_model::camera::CameraAngle;
use dashmix_model::clip::ClipFile;

#[derive(Debug, Default)]
struct Counters {
    next_id: AtomicU64,
    issued: AtomicU64,
    released: AtomicU64,
}

/// Issues clip handles and tracks how many are still alive.
#[derive(Debug, Clone, Default)]
pub struct HandleRegistry {
    counters: Arc<Counters>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a handle for one clip, positioned at the start.
    pub fn open(&self, clip: &ClipFile) -> ClipHandle {
        let id = self.counters.next_id.fetch_add(1, Ordering::Relaxed);
        self.counters.issued.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(id, path = %clip.path.display(), angle = %clip.angle, "Opened clip handle");
        ClipHandle {
            id,
            path: clip.path.clone(),
            angle: clip.angle,
            position_secs: 0.0,
            rate: 1.0,
            counters: Arc::clone(&self.counters),
        }
    }

    pub fn issued(&self) -> u64 {
        self.counters.issued.load(Ordering::Relaxed)
    }

    pub fn released(&self) -> u64 {
        self.counters.released.load(Ordering::Relaxed)
    }

    /// Handles issued and not yet released.
    pub fn live(&self) -> u64 {
        self.issued().saturating_sub(self.released())
    }
}

/// A playable resource for one camera clip, with its own playhead.
#[derive(Debug)]
pub struct ClipHandle {
    id: u64,
    path: PathBuf,
    angle: CameraAngle,
    position_secs: f64,
    rate: f64,
    counters: Arc<Counters>,
}

impl ClipHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn angle(&self) -> CameraAngle {
        self.angle
    }

    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn seek(&mut self, position_secs: f64) {
        self.position_secs = position_secs.max(0.0);
    }

    pub fn set_rate(&mut self, rate: f64) {
        if rate > 0.0 && rate.is_finite() {
            self.rate = rate;
        }
    }

    /// Advance this clip's playhead by `elapsed_secs` of wall time.
    pub fn advance(&mut self, elapsed_secs: f64) {
        if elapsed_secs > 0.0 {
            self.position_secs += elapsed_secs * self.rate;
        }
    }
}

impl Drop for ClipHandle {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(id = self.id, path = %self.path.display(), "Released clip handle");
    }
}
