pub mod check;
pub mod compile;
pub mod export;
pub mod info;
pub mod record;
pub mod scan;
pub mod validate;

use std::path::Path;

use anyhow::Context;

use dashmix_common::config::AppConfig;
use dashmix_model::camera::{CameraIndex, CameraSet};
use dashmix_model::clip::{scan_clip_folder, ClipFolder, DashcamEvent};
use dashmix_model::timeline::{SavedSession, SessionHeader, Timeline};
use dashmix_render_engine::ffmpeg::probe_duration;

/// Clip folder from the flag, or the configured default.
pub fn clip_folder(config: &AppConfig, flag: Option<&str>) -> anyhow::Result<ClipFolder> {
    flag.unwrap_or(&config.clip_folder)
        .parse()
        .map_err(anyhow::Error::msg)
}

/// Scan `root` and pick the event at `index` (newest first).
pub fn select_event(root: &Path, folder: ClipFolder, index: usize) -> anyhow::Result<DashcamEvent> {
    let events = scan_clip_folder(root, folder)
        .with_context(|| format!("Failed to scan {}", root.display()))?;

    let count = events.len();
    if count == 0 {
        anyhow::bail!(
            "No {} events found under {}",
            folder.dir_name(),
            root.display()
        );
    }
    events
        .into_iter()
        .nth(index)
        .ok_or_else(|| anyhow::anyhow!("Event index {index} out of range ({count} events)"))
}

/// Fill in clip durations with ffprobe. Clips that fail to probe keep
/// `None` and are reported.
pub async fn probe_event(event: &mut DashcamEvent) {
    for clip in &mut event.clips {
        match probe_duration(&clip.path).await {
            Ok(duration) => clip.duration_secs = Some(duration),
            Err(e) => tracing::warn!(path = %clip.path.display(), error = %e, "Could not probe clip"),
        }
    }
}

/// Load a saved timeline with its camera indices rewritten to `event`'s
/// camera order.
pub fn load_timeline(path: &Path, event: &DashcamEvent) -> anyhow::Result<SavedSession> {
    let mut session = SavedSession::load(path)
        .map_err(|e| anyhow::anyhow!("Failed to load timeline: {e}"))?;

    if let Some(header) = &session.header {
        let cameras = event.camera_set();
        if header.cameras.as_slice() != cameras.angles() {
            tracing::warn!(
                timeline_event = %header.event_key,
                event = %event.key,
                "Timeline was recorded with a different camera order, remapping"
            );
            session.timeline = remap_timeline(&session.timeline, header, &cameras);
        }
    }
    Ok(session)
}

/// Rewrite camera indices recorded under `header` to indices into `cameras`.
///
/// Interactions whose camera isn't in `cameras` are dropped. Missing
/// cameras are removed from visible-set snapshots.
fn remap_timeline(timeline: &Timeline, header: &SessionHeader, cameras: &CameraSet) -> Timeline {
    let remap = |index: CameraIndex| {
        header
            .cameras
            .get(index)
            .and_then(|angle| cameras.index_of(*angle))
    };

    timeline
        .iter()
        .filter_map(|interaction| {
            let mut interaction = interaction.clone();
            if let Some(camera) = interaction.camera {
                match remap(camera) {
                    Some(mapped) => interaction.camera = Some(mapped),
                    None => {
                        tracing::warn!(
                            at = interaction.timestamp,
                            camera,
                            kind = ?interaction.kind,
                            "Camera is not in this event, dropping interaction"
                        );
                        return None;
                    }
                }
            }
            if let Some(visible) = &mut interaction.extra.visible {
                *visible = visible.iter().filter_map(|c| remap(*c)).collect();
            }
            Some(interaction)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmix_model::camera::CameraAngle;
    use dashmix_model::interaction::Interaction;

    fn header(cameras: Vec<CameraAngle>) -> SessionHeader {
        SessionHeader {
            schema_version: "1".to_string(),
            event_key: "2024-01-15_10-30-00".to_string(),
            cameras,
            started_at: "2024-01-15T10:30:00Z".to_string(),
        }
    }

    #[test]
    fn test_remap_follows_camera_angles() {
        let recorded = header(vec![
            CameraAngle::Rear,
            CameraAngle::Front,
            CameraAngle::Left,
            CameraAngle::Right,
        ]);
        let cameras = CameraSet::from_discovery([
            CameraAngle::Rear,
            CameraAngle::Front,
            CameraAngle::Right,
        ]);
        let timeline: Timeline = vec![
            Interaction::switch_active(1.0, 3),
            Interaction::set_hidden(2.0, 2, true),
            Interaction::visible_snapshot(3.0, vec![0, 2, 3]),
            Interaction::switch_active(4.0, 1),
        ]
        .into();

        let remapped = remap_timeline(&timeline, &recorded, &cameras);
        let remapped = remapped.as_slice();

        // The left camera's interaction is gone; right moved from 3 to 2.
        assert_eq!(remapped.len(), 3);
        assert_eq!(remapped[0].camera, Some(2));
        assert_eq!(remapped[1].extra.visible, Some(vec![0, 2]));
        assert_eq!(remapped[1].timestamp, 3.0);
        assert_eq!(remapped[2].camera, Some(1));
    }

    #[test]
    fn test_remap_resolves_reordered_cameras() {
        let recorded = header(vec![CameraAngle::Front, CameraAngle::Rear]);
        let cameras = CameraSet::from_discovery([CameraAngle::Rear, CameraAngle::Front]);
        let timeline: Timeline = vec![
            Interaction::switch_active(0.0, 0),
            Interaction::play(0.0),
            Interaction::visible_snapshot(5.0, vec![1]),
        ]
        .into();

        let remapped = remap_timeline(&timeline, &recorded, &cameras);
        let remapped = remapped.as_slice();
        assert_eq!(remapped.len(), 3);
        assert_eq!(remapped[0].camera, Some(1));
        assert_eq!(remapped[1].camera, None);
        assert_eq!(remapped[2].extra.visible, Some(vec![0]));
    }
}
