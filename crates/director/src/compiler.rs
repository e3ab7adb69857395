//! Segment compiler: interaction timeline to disjoint time segments.
//!
//! # Algorithm
//!
//! 1. **Start** with every camera visible, no primary, output cursor at 0.
//! 2. **Lead-in**: if the first interaction is later than 0, the default
//!    state covers `[0, first.timestamp)`.
//! 3. **Replay** each interaction through [`CameraStates::apply`], pairing it
//!    with the next interaction's timestamp (or the total duration for the
//!    last one).
//! 4. **Emit** a segment when the step has positive duration and at least
//!    one camera is visible; only emitted segments advance the output cursor.
//!
//! Timestamps are playhead positions in the clips. A seek is stamped where
//! the playhead left and its step is measured from where it landed, so the
//! step's source range is `[target, next.timestamp)`. Seeks move the source
//! cursor (`source_start`), never the output cursor, so the output timeline
//! stays gap-free and ordered. Source ranges never run past the total
//! duration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use dashmix_common::error::{DashmixError, DashmixResult};
use dashmix_model::camera::CameraIndex;
use dashmix_model::timeline::Timeline;

use crate::state::CameraStates;

/// A stretch of output time with one fixed camera configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Output start time (seconds).
    pub start: f64,
    /// Output end time (seconds, exclusive).
    pub end: f64,
    /// Clip time this segment starts reading from.
    pub source_start: f64,
    /// Primary camera, if one has been chosen.
    pub active_camera: Option<CameraIndex>,
    /// Cameras shown during this segment. Never empty.
    pub visible: BTreeSet<CameraIndex>,
    /// Index of the interaction that produced this segment; `None` for the
    /// default-state segment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<usize>,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Compiles timelines for one loaded camera set.
#[derive(Debug, Clone, Copy)]
pub struct SegmentCompiler {
    camera_count: usize,
    total_duration: f64,
}

impl SegmentCompiler {
    pub fn new(camera_count: usize, total_duration: f64) -> Self {
        Self {
            camera_count,
            total_duration,
        }
    }

    /// Compile a timeline into ordered, disjoint segments.
    ///
    /// Returns [`DashmixError::EmptyComposition`] when nothing is emitted;
    /// callers fall back to the standard layout.
    pub fn compile(&self, timeline: &Timeline) -> DashmixResult<Vec<Segment>> {
        let mut emitter = Emitter::new(self.total_duration);
        let mut states = CameraStates::initialize(self.camera_count);
        let interactions = timeline.as_slice();

        match interactions.first() {
            None => emitter.emit(&states, None, 0.0, self.total_duration, 0.0),
            Some(first) if first.timestamp > 0.0 => {
                emitter.emit(&states, None, 0.0, first.timestamp, 0.0)
            }
            Some(_) => {}
        }

        for (idx, interaction) in interactions.iter().enumerate() {
            states.apply(interaction);
            let next = interactions
                .get(idx + 1)
                .map(|next| next.timestamp)
                .unwrap_or(self.total_duration);
            // Timestamps are playhead positions; a seek's step starts at its target.
            let from = interaction.source_position();
            emitter.emit(&states, Some(idx), from, next - from, interaction.timestamp);
        }

        let segments = emitter.finish();
        if segments.is_empty() {
            tracing::warn!(
                interactions = interactions.len(),
                cameras = self.camera_count,
                total_duration = self.total_duration,
                "Timeline compiled to no segments"
            );
            return Err(DashmixError::EmptyComposition);
        }

        tracing::debug!(
            interactions = interactions.len(),
            segments = segments.len(),
            output_secs = segments.last().map(|s| s.end).unwrap_or(0.0),
            "Compiled timeline"
        );
        Ok(segments)
    }
}

/// Compile with a one-off [`SegmentCompiler`].
pub fn compile_segments(
    timeline: &Timeline,
    camera_count: usize,
    total_duration: f64,
) -> DashmixResult<Vec<Segment>> {
    SegmentCompiler::new(camera_count, total_duration).compile(timeline)
}

struct Emitter {
    total_duration: f64,
    current: f64,
    segments: Vec<Segment>,
}

impl Emitter {
    fn new(total_duration: f64) -> Self {
        Self {
            total_duration,
            current: 0.0,
            segments: Vec::new(),
        }
    }

    fn emit(
        &mut self,
        states: &CameraStates,
        origin: Option<usize>,
        source_start: f64,
        duration: f64,
        at: f64,
    ) {
        if !duration.is_finite() || duration <= 0.0 {
            return;
        }
        let visible = states.visible_set();
        if visible.is_empty() {
            tracing::debug!(at, "No visible cameras, skipping step");
            return;
        }

        let duration = duration.min(self.total_duration - source_start);
        if duration <= 0.0 {
            return;
        }
        let start = self.current;
        let end = start + duration;

        self.segments.push(Segment {
            start,
            end,
            source_start,
            active_camera: states.active_camera(),
            visible,
            origin,
        });
        self.current = end;
    }

    fn finish(self) -> Vec<Segment> {
        self.segments
    }
}
