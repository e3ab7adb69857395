//! Playback clock and multi-camera sync utilities.
//!
//! Every camera of a loaded event plays the same wall-clock span, so the
//! session keeps one shared playhead. This module provides:
//! - A tick-driven playback clock (position, play state, rate)
//! - Drift measurement between a reference playhead and a follower
//! - Timestamp conversions

/// Shared playhead for all cameras of a loaded event.
///
/// The clock never reads system time itself; callers advance it with
/// [`PlaybackClock::tick`] so playback is deterministic under test.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    position_secs: f64,
    duration_secs: f64,
    playing: bool,
    rate: f64,
}

impl PlaybackClock {
    /// Create a paused clock at position zero for media of the given length.
    pub fn new(duration_secs: f64) -> Self {
        Self {
            position_secs: 0.0,
            duration_secs: duration_secs.max(0.0),
            playing: false,
            rate: 1.0,
        }
    }

    /// Current playhead position in seconds.
    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    /// Total media length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Flip between playing and paused. Returns the new play state.
    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// Jump to an absolute position, clamped to the media bounds.
    pub fn seek(&mut self, position_secs: f64) {
        self.position_secs = position_secs.clamp(0.0, self.duration_secs);
    }

    /// Change the playback rate. Non-positive rates are ignored.
    pub fn set_rate(&mut self, rate: f64) {
        if rate > 0.0 && rate.is_finite() {
            self.rate = rate;
        }
    }

    /// Advance the playhead by `elapsed_secs` of wall time.
    ///
    /// Reaching the end pauses the clock. Returns the new position.
    pub fn tick(&mut self, elapsed_secs: f64) -> f64 {
        if self.playing && elapsed_secs > 0.0 {
            self.position_secs += elapsed_secs * self.rate;
            if self.position_secs >= self.duration_secs {
                self.position_secs = self.duration_secs;
                self.playing = false;
            }
        }
        self.position_secs
    }

    /// Convert nanoseconds to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }

    /// Convert seconds to nanoseconds.
    pub fn secs_to_ns(secs: f64) -> u64 {
        (secs * 1_000_000_000.0) as u64
    }
}

/// Drift between the reference playhead and one follower camera.
#[derive(Debug, Clone, Copy)]
pub struct DriftMeasurement {
    /// Reference playhead position (seconds).
    pub reference_secs: f64,
    /// Follower playhead position (seconds).
    pub measured_secs: f64,
}

impl DriftMeasurement {
    /// Drift in seconds (positive = follower is ahead).
    pub fn drift_secs(&self) -> f64 {
        self.measured_secs - self.reference_secs
    }

    /// Drift in milliseconds.
    pub fn drift_ms(&self) -> f64 {
        self.drift_secs() * 1000.0
    }

    /// Whether drift exceeds an acceptable threshold.
    pub fn exceeds_threshold_secs(&self, threshold_secs: f64) -> bool {
        self.drift_secs().abs() > threshold_secs
    }
}
