//! Per-event live session context.

use std::path::Path;

use dashmix_common::clock::{DriftMeasurement, PlaybackClock};
use dashmix_common::config::PlaybackDefaults;
use dashmix_common::error::{DashmixError, DashmixResult};
use dashmix_director::state::CameraStates;
use dashmix_model::camera::{CameraIndex, CameraSet};
use dashmix_model::clip::DashcamEvent;
use dashmix_model::interaction::{Interaction, Seconds};
use dashmix_model::timeline::{SessionHeader, Timeline};

use crate::handles::{ClipHandle, HandleRegistry};
use crate::recorder::InteractionRecorder;
use crate::writer::InteractionWriter;

/// A camera whose playhead drifted past the tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncCorrection {
    pub camera: CameraIndex,
    /// Signed drift against the shared playhead.
    pub drift_secs: f64,
    /// Position the camera should be moved to.
    pub target_secs: f64,
}

/// Everything owned while one event is loaded for playback.
///
/// All user actions go through here: each one is recorded with the current
/// playhead as its timestamp, then applied to playback.
pub struct LiveSession {
    event: DashcamEvent,
    cameras: CameraSet,
    registry: HandleRegistry,
    handles: Vec<ClipHandle>,
    recorder: InteractionRecorder,
    clock: PlaybackClock,
    sync_tolerance_secs: f64,
}

impl LiveSession {
    /// Load an event: open one handle per clip and start a fresh timeline.
    pub fn load(
        event: DashcamEvent,
        registry: HandleRegistry,
        playback: &PlaybackDefaults,
    ) -> DashmixResult<Self> {
        if event.clips.is_empty() {
            return Err(DashmixError::MissingCameraAngles);
        }

        let cameras = event.camera_set();
        let handles = event.clips.iter().map(|clip| registry.open(clip)).collect();
        let clock = PlaybackClock::new(event.total_duration_secs().unwrap_or(0.0));

        tracing::info!(
            event = %event.key,
            cameras = cameras.len(),
            duration_secs = clock.duration_secs(),
            "Loaded event"
        );

        Ok(Self {
            recorder: InteractionRecorder::new(cameras.len()),
            event,
            cameras,
            registry,
            handles,
            clock,
            sync_tolerance_secs: playback.sync_tolerance_secs,
        })
    }

    /// Swap in another event. Old handles are released, state and timeline
    /// start over.
    pub fn reload(&mut self, event: DashcamEvent) -> DashmixResult<()> {
        if event.clips.is_empty() {
            return Err(DashmixError::MissingCameraAngles);
        }

        self.handles.clear();
        self.cameras = event.camera_set();
        self.handles = event.clips.iter().map(|clip| self.registry.open(clip)).collect();
        self.clock = PlaybackClock::new(event.total_duration_secs().unwrap_or(0.0));
        self.recorder.reset(self.cameras.len());

        tracing::info!(
            event = %event.key,
            cameras = self.cameras.len(),
            live_handles = self.registry.live(),
            "Reloaded event"
        );
        self.event = event;
        Ok(())
    }

    /// Mirror every recorded interaction into a session file.
    pub fn record_to(&mut self, path: impl AsRef<Path>) -> DashmixResult<()> {
        let header = SessionHeader::new(self.event.key.clone(), &self.cameras);
        let writer = InteractionWriter::create(path.as_ref(), &header)?;
        self.recorder.attach_writer(writer);
        Ok(())
    }

    pub fn switch_active(&mut self, camera: CameraIndex) -> DashmixResult<()> {
        self.check_camera(camera)?;
        self.record(Interaction::switch_active(self.now(), camera))
    }

    pub fn toggle_visibility(&mut self, camera: CameraIndex) -> DashmixResult<()> {
        self.check_camera(camera)?;
        self.record(Interaction::toggle_visibility(self.now(), camera))
    }

    pub fn set_hidden(&mut self, camera: CameraIndex, hidden: bool) -> DashmixResult<()> {
        self.check_camera(camera)?;
        self.record(Interaction::set_hidden(self.now(), camera, hidden))
    }

    pub fn play(&mut self) -> DashmixResult<()> {
        self.clock.play();
        self.record(Interaction::play(self.now()))
    }

    pub fn pause(&mut self) -> DashmixResult<()> {
        self.clock.pause();
        self.record(Interaction::pause(self.now()))
    }

    pub fn play_pause(&mut self) -> DashmixResult<()> {
        self.clock.toggle();
        self.record(Interaction::play_pause(self.now()))
    }

    /// Jump every camera to `position`. The interaction is stamped with the
    /// playhead before the jump.
    pub fn seek(&mut self, position: Seconds) -> DashmixResult<()> {
        let at = self.now();
        self.clock.seek(position);
        let target = self.clock.position_secs();
        for handle in &mut self.handles {
            handle.seek(target);
        }
        self.record(Interaction::seek(at, target))
    }

    pub fn set_playback_rate(&mut self, camera: CameraIndex, rate: f64) -> DashmixResult<()> {
        self.check_camera(camera)?;
        if !(rate.is_finite() && rate > 0.0) {
            return Err(DashmixError::session(format!("Invalid playback rate: {rate}")));
        }
        self.handles[camera].set_rate(rate);
        self.record(Interaction::playback_rate(self.now(), camera, rate))
    }

    /// Advance playback by `elapsed_secs` of wall time. Returns the playhead.
    pub fn tick(&mut self, elapsed_secs: f64) -> Seconds {
        if self.clock.is_playing() {
            for handle in &mut self.handles {
                handle.advance(elapsed_secs);
            }
        }
        self.clock.tick(elapsed_secs)
    }

    /// Cameras whose playhead drifted from the shared one by more than the
    /// sync tolerance.
    pub fn sync_corrections(&self) -> Vec<SyncCorrection> {
        let reference = self.clock.position_secs();
        self.handles
            .iter()
            .enumerate()
            .filter_map(|(camera, handle)| {
                let drift = DriftMeasurement {
                    reference_secs: reference,
                    measured_secs: handle.position_secs(),
                };
                drift
                    .exceeds_threshold_secs(self.sync_tolerance_secs)
                    .then(|| SyncCorrection {
                        camera,
                        drift_secs: drift.drift_secs(),
                        target_secs: reference,
                    })
            })
            .collect()
    }

    /// Re-seek drifted cameras to the shared playhead.
    pub fn resync(&mut self) -> Vec<SyncCorrection> {
        let corrections = self.sync_corrections();
        for correction in &corrections {
            tracing::debug!(
                camera = correction.camera,
                drift_secs = correction.drift_secs,
                "Resyncing camera"
            );
            self.handles[correction.camera].seek(correction.target_secs);
        }
        corrections
    }

    /// End the session, releasing every handle. Returns the recorded timeline.
    pub fn finish(self) -> Timeline {
        tracing::info!(
            event = %self.event.key,
            interactions = self.recorder.timeline().len(),
            "Session finished"
        );
        self.recorder.into_timeline()
    }

    pub fn event(&self) -> &DashcamEvent {
        &self.event
    }

    pub fn cameras(&self) -> &CameraSet {
        &self.cameras
    }

    pub fn handles(&self) -> &[ClipHandle] {
        &self.handles
    }

    pub fn timeline(&self) -> &Timeline {
        self.recorder.timeline()
    }

    pub fn states(&self) -> &CameraStates {
        self.recorder.states()
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    fn now(&self) -> Seconds {
        self.clock.position_secs()
    }

    fn record(&mut self, interaction: Interaction) -> DashmixResult<()> {
        self.recorder.record_interaction(interaction)
    }

    fn check_camera(&self, camera: CameraIndex) -> DashmixResult<()> {
        if camera < self.cameras.len() {
            Ok(())
        } else {
            Err(DashmixError::session(format!(
                "Camera {camera} is not loaded ({} cameras)",
                self.cameras.len()
            )))
        }
    }
}
