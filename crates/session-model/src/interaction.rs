//! Interaction types for the DashMix timeline.
//!
//! An interaction is one user action during live playback: picking a
//! primary camera, hiding or showing a camera, play/pause, seeking, or a
//! rate change. Interactions are immutable once recorded. Timestamps are
//! playhead positions in seconds.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::camera::CameraIndex;

/// Playhead position in seconds.
pub type Seconds = f64;

/// What the user did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// Designate a camera as the primary (full-frame) view.
    SwitchActive,
    /// Hide or show a camera.
    ToggleVisibility,
    /// Flip between playing and paused.
    PlayPause,
    Play,
    Pause,
    /// Jump the playhead.
    Seek,
    /// Change one camera's playback rate.
    ChangePlaybackRate,
}

/// Kind-specific payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionExtra {
    /// Explicit hidden flag for `toggle_visibility`; absent means flip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hidden: Option<bool>,

    /// Full visible-set snapshot replacing the current one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<Vec<CameraIndex>>,

    /// Playback rate for `change_playback_rate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,

    /// Seek target; defaults to the interaction timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Seconds>,
}

impl InteractionExtra {
    pub fn is_empty(&self) -> bool {
        self.is_hidden.is_none()
            && self.visible.is_none()
            && self.rate.is_none()
            && self.position.is_none()
    }
}

/// A single recorded user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Playhead position when the action happened.
    #[serde(rename = "t")]
    pub timestamp: Seconds,

    #[serde(rename = "type")]
    pub kind: InteractionKind,

    /// Subject camera, if the action targets one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraIndex>,

    #[serde(default, skip_serializing_if = "InteractionExtra::is_empty")]
    pub extra: InteractionExtra,
}

impl Interaction {
    pub fn new(
        kind: InteractionKind,
        camera: Option<CameraIndex>,
        timestamp: Seconds,
        extra: InteractionExtra,
    ) -> Self {
        Self {
            timestamp,
            kind,
            camera,
            extra,
        }
    }

    pub fn switch_active(timestamp: Seconds, camera: CameraIndex) -> Self {
        Self::new(
            InteractionKind::SwitchActive,
            Some(camera),
            timestamp,
            InteractionExtra::default(),
        )
    }

    /// Flip a camera's visibility.
    pub fn toggle_visibility(timestamp: Seconds, camera: CameraIndex) -> Self {
        Self::new(
            InteractionKind::ToggleVisibility,
            Some(camera),
            timestamp,
            InteractionExtra::default(),
        )
    }

    /// Set a camera's visibility explicitly.
    pub fn set_hidden(timestamp: Seconds, camera: CameraIndex, hidden: bool) -> Self {
        Self::new(
            InteractionKind::ToggleVisibility,
            Some(camera),
            timestamp,
            InteractionExtra {
                is_hidden: Some(hidden),
                ..Default::default()
            },
        )
    }

    /// Replace the whole visible set at once.
    pub fn visible_snapshot(timestamp: Seconds, visible: Vec<CameraIndex>) -> Self {
        Self::new(
            InteractionKind::ToggleVisibility,
            None,
            timestamp,
            InteractionExtra {
                visible: Some(visible),
                ..Default::default()
            },
        )
    }

    pub fn play_pause(timestamp: Seconds) -> Self {
        Self::new(
            InteractionKind::PlayPause,
            None,
            timestamp,
            InteractionExtra::default(),
        )
    }

    pub fn play(timestamp: Seconds) -> Self {
        Self::new(InteractionKind::Play, None, timestamp, InteractionExtra::default())
    }

    pub fn pause(timestamp: Seconds) -> Self {
        Self::new(InteractionKind::Pause, None, timestamp, InteractionExtra::default())
    }

    pub fn seek(timestamp: Seconds, position: Seconds) -> Self {
        Self::new(
            InteractionKind::Seek,
            None,
            timestamp,
            InteractionExtra {
                position: Some(position),
                ..Default::default()
            },
        )
    }

    pub fn playback_rate(timestamp: Seconds, camera: CameraIndex, rate: f64) -> Self {
        Self::new(
            InteractionKind::ChangePlaybackRate,
            Some(camera),
            timestamp,
            InteractionExtra {
                rate: Some(rate),
                ..Default::default()
            },
        )
    }

    /// Clip time this interaction leaves the playhead at.
    pub fn source_position(&self) -> Seconds {
        match self.kind {
            InteractionKind::Seek => self.extra.position.unwrap_or(self.timestamp),
            _ => self.timestamp,
        }
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}s] ", self.timestamp)?;
        match (self.kind, self.camera) {
            (InteractionKind::SwitchActive, Some(cam)) => write!(f, "camera {cam} set as primary"),
            (InteractionKind::ToggleVisibility, _) if self.extra.visible.is_some() => {
                write!(f, "visible cameras set to {:?}", self.extra.visible.as_deref().unwrap_or(&[]))
            }
            (InteractionKind::ToggleVisibility, Some(cam)) => match self.extra.is_hidden {
                Some(true) => write!(f, "camera {cam} hidden"),
                Some(false) => write!(f, "camera {cam} shown"),
                None => write!(f, "camera {cam} visibility toggled"),
            },
            (InteractionKind::PlayPause, _) => f.write_str("play/pause toggled"),
            (InteractionKind::Play, _) => f.write_str("playback started"),
            (InteractionKind::Pause, _) => f.write_str("playback paused"),
            (InteractionKind::Seek, _) => write!(f, "seek to {:.3}s", self.source_position()),
            (InteractionKind::ChangePlaybackRate, Some(cam)) => {
                write!(f, "camera {cam} rate set to {}", self.extra.rate.unwrap_or(1.0))
            }
            (kind, None) => write!(f, "{kind:?} without a camera"),
        }
    }
}
