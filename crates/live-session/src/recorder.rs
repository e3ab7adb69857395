//! Interaction recorder.
//!
//! Appending to the timeline and updating camera state happen in one call,
//! so the two never diverge.

use dashmix_common::error::DashmixResult;
use dashmix_director::state::CameraStates;
use dashmix_model::camera::CameraIndex;
use dashmix_model::interaction::{Interaction, InteractionExtra, InteractionKind, Seconds};
use dashmix_model::timeline::Timeline;

use crate::writer::InteractionWriter;

/// Records interactions for the currently loaded camera set.
pub struct InteractionRecorder {
    timeline: Timeline,
    states: CameraStates,
    writer: Option<InteractionWriter>,
}

impl InteractionRecorder {
    pub fn new(camera_count: usize) -> Self {
        Self {
            timeline: Timeline::new(),
            states: CameraStates::initialize(camera_count),
            writer: None,
        }
    }

    /// Persist every subsequent interaction through `writer`.
    pub fn attach_writer(&mut self, writer: InteractionWriter) {
        tracing::info!(path = %writer.path().display(), "Recording session to file");
        self.writer = Some(writer);
    }

    pub fn detach_writer(&mut self) -> Option<InteractionWriter> {
        self.writer.take()
    }

    /// Record one interaction.
    pub fn record(
        &mut self,
        kind: InteractionKind,
        camera: Option<CameraIndex>,
        timestamp: Seconds,
        extra: InteractionExtra,
    ) -> DashmixResult<()> {
        self.record_interaction(Interaction::new(kind, camera, timestamp, extra))
    }

    /// Append an already-built interaction and apply its state effect.
    ///
    /// The interaction is kept in memory even when the session file write
    /// fails; the write error is returned to the caller.
    pub fn record_interaction(&mut self, interaction: Interaction) -> DashmixResult<()> {
        let applied = self.states.apply(&interaction);
        tracing::info!(applied, "{interaction}");

        let persisted = match self.writer.as_mut() {
            Some(writer) => writer.write(&interaction),
            None => Ok(()),
        };
        self.timeline.push(interaction);
        persisted
    }

    /// Clear the timeline and reset state for a new camera set.
    pub fn reset(&mut self, camera_count: usize) {
        self.timeline.clear();
        self.states.reinitialize(camera_count);
        self.writer = None;
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn states(&self) -> &CameraStates {
        &self.states
    }

    pub fn into_timeline(self) -> Timeline {
        self.timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmix_director::compiler::compile_segments;

    #[test]
    fn test_record_updates_state_and_timeline_together() {
        let mut recorder = InteractionRecorder::new(4);
        recorder
            .record(InteractionKind::SwitchActive, Some(2), 1.0, InteractionExtra::default())
            .unwrap();
        recorder
            .record_interaction(Interaction::set_hidden(3.0, 0, true))
            .unwrap();

        assert_eq!(recorder.timeline().len(), 2);
        assert_eq!(recorder.states().active_camera(), Some(2));
        assert!(!recorder.states().visible_set().contains(&0));
    }

    #[test]
    fn test_same_timestamp_not_deduplicated() {
        let mut recorder = InteractionRecorder::new(2);
        recorder
            .record_interaction(Interaction::toggle_visibility(2.0, 1))
            .unwrap();
        recorder
            .record_interaction(Interaction::toggle_visibility(2.0, 1))
            .unwrap();
        assert_eq!(recorder.timeline().len(), 2);
        assert!(recorder.states().visible_set().contains(&1));
    }

    #[test]
    fn test_live_state_matches_compiled_tail() {
        let mut recorder = InteractionRecorder::new(3);
        recorder.record_interaction(Interaction::switch_active(0.0, 1)).unwrap();
        recorder.record_interaction(Interaction::set_hidden(4.0, 2, true)).unwrap();

        let segments = compile_segments(recorder.timeline(), 3, 10.0).unwrap();
        let last = segments.last().unwrap();
        assert_eq!(last.visible, recorder.states().visible_set());
        assert_eq!(last.active_camera, recorder.states().active_camera());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut recorder = InteractionRecorder::new(4);
        recorder.record_interaction(Interaction::switch_active(0.0, 3)).unwrap();
        recorder.reset(2);
        assert!(recorder.timeline().is_empty());
        assert_eq!(recorder.states(), &CameraStates::initialize(2));
    }
}
