//! Clip file discovery and grouping into events.
//!
//! Dashcams write one file per camera per minute, named
//! `<YYYY-MM-DD>_<HH-MM-SS>-<angle>.mp4`. Files sharing the timestamp part
//! form one [`DashcamEvent`].

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::camera::{CameraAngle, CameraSet};
use crate::error::ModelError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Top-level clip folders written by the dashcam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipFolder {
    RecentClips,
    SentryClips,
    SavedClips,
}

impl ClipFolder {
    pub const ALL: [ClipFolder; 3] = [
        ClipFolder::RecentClips,
        ClipFolder::SentryClips,
        ClipFolder::SavedClips,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            Self::RecentClips => "RecentClips",
            Self::SentryClips => "SentryClips",
            Self::SavedClips => "SavedClips",
        }
    }

    /// Detect the clip folder a file belongs to from its path components.
    pub fn of_path(path: &Path) -> Option<Self> {
        path.components().find_map(|component| {
            let name = component.as_os_str().to_str()?;
            Self::ALL.into_iter().find(|folder| folder.dir_name() == name)
        })
    }
}

impl FromStr for ClipFolder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|folder| folder.dir_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown clip folder: {s}. Use: RecentClips, SentryClips, SavedClips"))
    }
}

/// The parsed parts of a clip filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipName {
    /// Timestamp substring used as the grouping key.
    pub key: String,
    /// Parsed recording time.
    pub recorded_at: NaiveDateTime,
    /// Camera angle tag.
    pub angle: CameraAngle,
}

/// Parse `2024-01-15_10-30-00-front.mp4` style names.
pub fn parse_clip_name(file_name: &str) -> Result<ClipName, ModelError> {
    let invalid = || ModelError::InvalidClipName {
        name: file_name.to_string(),
    };

    let stem = file_name.strip_suffix(".mp4").ok_or_else(invalid)?;
    let (key, tag) = stem.rsplit_once('-').ok_or_else(invalid)?;
    let angle = CameraAngle::from_tag(tag).ok_or_else(invalid)?;
    let recorded_at = NaiveDateTime::parse_from_str(key, TIMESTAMP_FORMAT).map_err(|_| invalid())?;

    Ok(ClipName {
        key: key.to_string(),
        recorded_at,
        angle,
    })
}

/// One camera's clip within an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipFile {
    /// Filesystem path of the clip.
    pub path: PathBuf,

    /// Camera angle parsed from the filename.
    pub angle: CameraAngle,

    /// Duration in seconds, once probed.
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

/// A group of same-timestamp clips, one per camera angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashcamEvent {
    /// Timestamp substring shared by all clips.
    pub key: String,

    /// Parsed recording time.
    pub recorded_at: NaiveDateTime,

    /// Clips in discovery order. Position is the camera index.
    pub clips: Vec<ClipFile>,
}

impl DashcamEvent {
    fn new(name: &ClipName) -> Self {
        Self {
            key: name.key.clone(),
            recorded_at: name.recorded_at,
            clips: Vec::new(),
        }
    }

    /// Add a clip. A second file for an already-present angle replaces the
    /// first in place so index assignment stays stable.
    fn insert(&mut self, clip: ClipFile) {
        match self.clips.iter_mut().find(|c| c.angle == clip.angle) {
            Some(existing) => *existing = clip,
            None => self.clips.push(clip),
        }
    }

    /// Index→angle mapping for this event.
    pub fn camera_set(&self) -> CameraSet {
        CameraSet::from_discovery(self.clips.iter().map(|c| c.angle))
    }

    pub fn clip(&self, angle: CameraAngle) -> Option<&ClipFile> {
        self.clips.iter().find(|c| c.angle == angle)
    }

    /// Length of the longest probed clip, or `None` if nothing was probed.
    pub fn total_duration_secs(&self) -> Option<f64> {
        self.clips
            .iter()
            .filter_map(|c| c.duration_secs)
            .fold(None, |acc, d| Some(acc.map_or(d, |a: f64| a.max(d))))
    }

    /// Human-readable recording time.
    pub fn display_timestamp(&self) -> String {
        self.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Deterministic download name for an export of this event.
    pub fn export_file_name(&self) -> String {
        format!("dashcam_{}.mp4", self.recorded_at.format(TIMESTAMP_FORMAT))
    }
}

/// Group clip paths into events, newest first.
///
/// Paths whose file name is not a recognizable clip are skipped.
pub fn group_clips_by_event<I, P>(paths: I) -> Vec<DashcamEvent>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut events: Vec<DashcamEvent> = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let name = match parse_clip_name(file_name) {
            Ok(name) => name,
            Err(_) => continue,
        };

        let clip = ClipFile {
            path: path.to_path_buf(),
            angle: name.angle,
            duration_secs: None,
        };

        match events.iter_mut().find(|e| e.key == name.key) {
            Some(event) => event.insert(clip),
            None => {
                let mut event = DashcamEvent::new(&name);
                event.insert(clip);
                events.push(event);
            }
        }
    }

    events.sort_by(|a, b| b.key.cmp(&a.key));
    events
}

/// Recursively collect clips under `root` that live in the given clip folder.
pub fn scan_clip_folder(root: &Path, folder: ClipFolder) -> Result<Vec<DashcamEvent>, ModelError> {
    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    let in_folder = files
        .into_iter()
        .filter(|path| ClipFolder::of_path(path) == Some(folder));
    Ok(group_clips_by_event(in_folder))
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ModelError> {
    let io_err = |source| ModelError::IoError {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = std::fs::read_dir(dir)
        .map_err(io_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// Step through a list of events with wrap-around at both ends.
pub fn navigate_events(current: usize, direction: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (current as isize + direction).rem_euclid(len as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clip_name() {
        let name = parse_clip_name("2024-01-15_10-30-00-left_repeater.mp4").unwrap();
        assert_eq!(name.key, "2024-01-15_10-30-00");
        assert_eq!(name.angle, CameraAngle::Left);
        assert_eq!(
            name.recorded_at.format("%H:%M:%S").to_string(),
            "10:30:00"
        );
    }

    #[test]
    fn test_parse_clip_name_rejects_garbage() {
        assert!(parse_clip_name("2024-01-15_10-30-00-front.mov").is_err());
        assert!(parse_clip_name("event.json").is_err());
        assert!(parse_clip_name("2024-01-15_10-30-00-roof.mp4").is_err());
        assert!(parse_clip_name("yesterday-front.mp4").is_err());
    }

    #[test]
    fn test_grouping_keeps_discovery_order_and_sorts_newest_first() {
        let events = group_clips_by_event([
            "clips/2024-01-15_10-30-00-back.mp4",
            "clips/2024-01-15_10-31-00-front.mp4",
            "clips/2024-01-15_10-30-00-front.mp4",
            "clips/thumb.png",
            "clips/2024-01-15_10-30-00-right_repeater.mp4",
        ]);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].key, "2024-01-15_10-31-00");
        let older = &events[1];
        let angles: Vec<_> = older.clips.iter().map(|c| c.angle).collect();
        assert_eq!(
            angles,
            vec![CameraAngle::Rear, CameraAngle::Front, CameraAngle::Right]
        );
        assert_eq!(older.camera_set().canonical_order(), vec![1, 0, 2]);
    }

    #[test]
    fn test_duplicate_angle_replaces_in_place() {
        let events = group_clips_by_event([
            "a/2024-01-15_10-30-00-front.mp4",
            "a/2024-01-15_10-30-00-back.mp4",
            "b/2024-01-15_10-30-00-front.mp4",
        ]);
        let event = &events[0];
        assert_eq!(event.clips.len(), 2);
        assert_eq!(event.clips[0].path, PathBuf::from("b/2024-01-15_10-30-00-front.mp4"));
    }

    #[test]
    fn test_total_duration_is_longest_clip() {
        let mut events = group_clips_by_event([
            "2024-01-15_10-30-00-front.mp4",
            "2024-01-15_10-30-00-back.mp4",
        ]);
        let event = &mut events[0];
        assert_eq!(event.total_duration_secs(), None);
        event.clips[0].duration_secs = Some(59.8);
        event.clips[1].duration_secs = Some(60.1);
        assert_eq!(event.total_duration_secs(), Some(60.1));
    }

    #[test]
    fn test_export_file_name_is_deterministic() {
        let events = group_clips_by_event(["2024-01-15_10-30-00-front.mp4"]);
        assert_eq!(
            events[0].export_file_name(),
            "dashcam_2024-01-15_10-30-00.mp4"
        );
        assert_eq!(events[0].display_timestamp(), "2024-01-15 10:30:00");
    }

    #[test]
    fn test_clip_folder_detection() {
        let path = Path::new("/media/usb/TeslaCam/SentryClips/2024-01-15_10-30-00/x.mp4");
        assert_eq!(ClipFolder::of_path(path), Some(ClipFolder::SentryClips));
        assert_eq!(ClipFolder::of_path(Path::new("/tmp/x.mp4")), None);
        assert_eq!("savedclips".parse::<ClipFolder>(), Ok(ClipFolder::SavedClips));
    }

    #[test]
    fn test_scan_clip_folder_filters_by_kind() {
        let dir = std::env::temp_dir().join("dashmix_test_scan");
        let _ = std::fs::remove_dir_all(&dir);
        let recent = dir.join("TeslaCam").join("RecentClips");
        let saved = dir.join("TeslaCam").join("SavedClips").join("2024-01-14_09-00-00");
        std::fs::create_dir_all(&recent).unwrap();
        std::fs::create_dir_all(&saved).unwrap();
        std::fs::write(recent.join("2024-01-15_10-30-00-front.mp4"), b"").unwrap();
        std::fs::write(recent.join("2024-01-15_10-30-00-back.mp4"), b"").unwrap();
        std::fs::write(saved.join("2024-01-14_09-00-00-front.mp4"), b"").unwrap();

        let events = scan_clip_folder(&dir, ClipFolder::RecentClips).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].clips.len(), 2);

        let events = scan_clip_folder(&dir, ClipFolder::SavedClips).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, "2024-01-14_09-00-00");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_navigation_wraps() {
        assert_eq!(navigate_events(0, -1, 3), 2);
        assert_eq!(navigate_events(2, 1, 3), 0);
        assert_eq!(navigate_events(1, 1, 3), 2);
        assert_eq!(navigate_events(0, 1, 0), 0);
    }
}
