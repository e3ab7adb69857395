//! Visibility and active-camera state tracking.
//!
//! The live session and the segment compiler both drive camera state
//! through [`CameraStates::apply`], so what the user saw and what gets
//! exported come from the same rules.

use std::collections::BTreeSet;

use dashmix_model::camera::CameraIndex;
use dashmix_model::interaction::{Interaction, InteractionKind};

/// Mutable state of one camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Whether this camera is the primary view.
    pub is_active: bool,
    /// Whether the user hid this camera.
    pub is_hidden: bool,
    /// Timestamp of the last time this camera became primary.
    pub last_active_time: f64,
    /// Playback rate multiplier.
    pub playback_rate: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            is_active: false,
            is_hidden: false,
            last_active_time: 0.0,
            playback_rate: 1.0,
        }
    }
}

/// State of every camera in the loaded event plus the global play flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraStates {
    cameras: Vec<CameraState>,
    is_playing: bool,
}

impl CameraStates {
    /// Fresh state for `camera_count` cameras: all visible, none primary.
    pub fn initialize(camera_count: usize) -> Self {
        Self {
            cameras: vec![CameraState::default(); camera_count],
            is_playing: false,
        }
    }

    /// Reset to defaults for a newly loaded camera set.
    pub fn reinitialize(&mut self, camera_count: usize) {
        *self = Self::initialize(camera_count);
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    pub fn get(&self, camera: CameraIndex) -> Option<&CameraState> {
        self.cameras.get(camera)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Indices of cameras that are not hidden.
    pub fn visible_set(&self) -> BTreeSet<CameraIndex> {
        self.cameras
            .iter()
            .enumerate()
            .filter(|(_, state)| !state.is_hidden)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// The primary camera, if one was chosen.
    pub fn active_camera(&self) -> Option<CameraIndex> {
        self.cameras.iter().position(|state| state.is_active)
    }

    /// Apply one interaction. Returns `false` when the interaction names a
    /// camera that does not exist; state is left untouched in that case.
    pub fn apply(&mut self, interaction: &Interaction) -> bool {
        match interaction.kind {
            InteractionKind::SwitchActive => {
                let Some(camera) = self.known_camera(interaction) else {
                    return false;
                };
                for (idx, state) in self.cameras.iter_mut().enumerate() {
                    state.is_active = idx == camera;
                }
                self.cameras[camera].last_active_time = interaction.timestamp;
            }
            InteractionKind::ToggleVisibility => {
                if let Some(visible) = &interaction.extra.visible {
                    if let Some(bad) = visible.iter().find(|idx| **idx >= self.cameras.len()) {
                        tracing::warn!(camera = bad, "Visible snapshot names an unknown camera");
                    }
                    for (idx, state) in self.cameras.iter_mut().enumerate() {
                        state.is_hidden = !visible.contains(&idx);
                    }
                    return true;
                }
                let Some(camera) = self.known_camera(interaction) else {
                    return false;
                };
                let state = &mut self.cameras[camera];
                state.is_hidden = interaction.extra.is_hidden.unwrap_or(!state.is_hidden);
            }
            InteractionKind::PlayPause => self.is_playing = !self.is_playing,
            InteractionKind::Play => self.is_playing = true,
            InteractionKind::Pause => self.is_playing = false,
            InteractionKind::Seek => {}
            InteractionKind::ChangePlaybackRate => {
                let Some(camera) = self.known_camera(interaction) else {
                    return false;
                };
                if let Some(rate) = interaction.extra.rate.filter(|r| *r > 0.0 && r.is_finite()) {
                    self.cameras[camera].playback_rate = rate;
                }
            }
        }
        true
    }

    fn known_camera(&self, interaction: &Interaction) -> Option<CameraIndex> {
        match interaction.camera {
            Some(camera) if camera < self.cameras.len() => Some(camera),
            other => {
                tracing::warn!(
                    camera = ?other,
                    cameras = self.cameras.len(),
                    kind = ?interaction.kind,
                    "Ignoring interaction for unknown camera"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_defaults() {
        let states = CameraStates::initialize(4);
        assert_eq!(states.camera_count(), 4);
        assert_eq!(states.visible_set().len(), 4);
        assert_eq!(states.active_camera(), None);
        assert_eq!(states.get(2), Some(&CameraState::default()));
        assert!(!states.is_playing());
    }

    #[test]
    fn test_switch_active_is_exclusive() {
        let mut states = CameraStates::initialize(3);
        states.apply(&Interaction::switch_active(1.0, 0));
        states.apply(&Interaction::switch_active(4.5, 2));
        assert_eq!(states.active_camera(), Some(2));
        assert!(!states.get(0).unwrap().is_active);
        assert_eq!(states.get(2).unwrap().last_active_time, 4.5);
        assert_eq!(states.get(0).unwrap().last_active_time, 1.0);
    }

    #[test]
    fn test_toggle_flips_without_explicit_flag() {
        let mut states = CameraStates::initialize(2);
        states.apply(&Interaction::toggle_visibility(1.0, 1));
        assert!(states.get(1).unwrap().is_hidden);
        states.apply(&Interaction::toggle_visibility(2.0, 1));
        assert!(!states.get(1).unwrap().is_hidden);
    }

    #[test]
    fn test_explicit_hidden_pair_restores_visibility() {
        let mut states = CameraStates::initialize(4);
        states.apply(&Interaction::set_hidden(1.0, 3, true));
        states.apply(&Interaction::set_hidden(1.0, 3, true));
        assert!(!states.visible_set().contains(&3));
        states.apply(&Interaction::set_hidden(2.0, 3, false));
        assert!(states.visible_set().contains(&3));
    }

    #[test]
    fn test_visible_snapshot_replaces_set() {
        let mut states = CameraStates::initialize(4);
        states.apply(&Interaction::visible_snapshot(0.0, vec![1, 3, 9]));
        assert_eq!(states.visible_set().into_iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_play_flags() {
        let mut states = CameraStates::initialize(1);
        states.apply(&Interaction::play_pause(0.0));
        assert!(states.is_playing());
        states.apply(&Interaction::pause(1.0));
        assert!(!states.is_playing());
        states.apply(&Interaction::play(2.0));
        assert!(states.is_playing());
    }

    #[test]
    fn test_playback_rate() {
        let mut states = CameraStates::initialize(2);
        states.apply(&Interaction::playback_rate(0.0, 1, 2.0));
        assert_eq!(states.get(1).unwrap().playback_rate, 2.0);
        states.apply(&Interaction::playback_rate(0.0, 1, -1.0));
        assert_eq!(states.get(1).unwrap().playback_rate, 2.0);
    }

    #[test]
    fn test_unknown_camera_is_ignored() {
        let mut states = CameraStates::initialize(2);
        assert!(!states.apply(&Interaction::switch_active(0.0, 5)));
        assert!(!states.apply(&Interaction::toggle_visibility(0.0, 2)));
        assert_eq!(states, CameraStates::initialize(2));
    }

    #[test]
    fn test_reinitialize_clears_previous_event() {
        let mut states = CameraStates::initialize(4);
        states.apply(&Interaction::switch_active(0.0, 3));
        states.apply(&Interaction::play(0.0));
        states.reinitialize(2);
        assert_eq!(states, CameraStates::initialize(2));
    }
}
