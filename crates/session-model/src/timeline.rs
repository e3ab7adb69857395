//! The interaction timeline and its on-disk format.
//!
//! Timelines are stored as append-only JSONL: an optional `# {header}`
//! comment line followed by one interaction per line, in recording order.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::{CameraAngle, CameraSet};
use crate::error::ModelError;
use crate::interaction::Interaction;

/// Current session file schema.
pub const SESSION_SCHEMA_VERSION: &str = "1.0";

/// Ordered log of everything the user did during one live session.
///
/// Order is append order; nothing is ever sorted or deduplicated, so two
/// interactions at the same timestamp keep the order they were recorded in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    interactions: Vec<Interaction>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, interaction: Interaction) {
        self.interactions.push(interaction);
    }

    pub fn clear(&mut self) {
        self.interactions.clear();
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interaction> {
        self.interactions.iter()
    }

    pub fn as_slice(&self) -> &[Interaction] {
        &self.interactions
    }

    pub fn last(&self) -> Option<&Interaction> {
        self.interactions.last()
    }

    /// Indices of interactions stamped earlier than the playhead position
    /// their predecessor left. The predecessor's step compiles to nothing.
    /// A seek's own timestamp is where the playhead left, so the
    /// interaction after a backward seek is not a regression.
    pub fn regressions(&self) -> Vec<usize> {
        self.interactions
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[1].timestamp < pair[0].source_position())
            .map(|(i, _)| i + 1)
            .collect()
    }
}

impl From<Vec<Interaction>> for Timeline {
    fn from(interactions: Vec<Interaction>) -> Self {
        Self { interactions }
    }
}

impl FromIterator<Interaction> for Timeline {
    fn from_iter<T: IntoIterator<Item = Interaction>>(iter: T) -> Self {
        Self {
            interactions: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Interaction;
    type IntoIter = std::slice::Iter<'a, Interaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.interactions.iter()
    }
}

/// Metadata written as the first line of a session file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Timestamp key of the event the session was recorded against.
    pub event_key: String,

    /// Camera angles in index order at recording time.
    pub cameras: Vec<CameraAngle>,

    /// Wall-clock time the session started (RFC 3339).
    pub started_at: String,
}

impl SessionHeader {
    pub fn new(event_key: impl Into<String>, cameras: &CameraSet) -> Self {
        Self {
            schema_version: SESSION_SCHEMA_VERSION.to_string(),
            event_key: event_key.into(),
            cameras: cameras.indices().filter_map(|i| cameras.angle(i)).collect(),
            started_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn camera_set(&self) -> CameraSet {
        CameraSet::from_discovery(self.cameras.iter().copied())
    }
}

/// A timeline loaded from disk together with its header, if any.
#[derive(Debug, Clone)]
pub struct SavedSession {
    pub header: Option<SessionHeader>,
    pub timeline: Timeline,
}

impl SavedSession {
    /// Load a session JSONL file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let parse_err = |source| ModelError::ParseError {
            path: path.to_path_buf(),
            source,
        };

        let header = match parse_header(&content) {
            Some(raw) => Some(serde_json::from_str::<SessionHeader>(raw).map_err(parse_err)?),
            None => None,
        };
        let timeline = parse_timeline(&content).map_err(parse_err)?;

        if let Some(header) = &header {
            if let Some(bad) = timeline
                .iter()
                .filter_map(|i| i.camera)
                .find(|cam| *cam >= header.cameras.len())
            {
                return Err(ModelError::ValidationError {
                    message: format!(
                        "interaction references camera {bad} but the header lists {} cameras",
                        header.cameras.len()
                    ),
                });
            }
        }

        Ok(Self { header, timeline })
    }

    /// Write the session to disk, header first.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        let parse_err = |source| ModelError::ParseError {
            path: path.to_path_buf(),
            source,
        };

        let mut output = String::new();
        if let Some(header) = &self.header {
            output.push_str("# ");
            output.push_str(&serde_json::to_string(header).map_err(parse_err)?);
            output.push('\n');
        }
        output.push_str(&serialize_timeline(&self.timeline).map_err(parse_err)?);

        std::fs::write(path, output).map_err(|e| ModelError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Parse interactions from JSONL content, skipping blank and `#` lines.
pub fn parse_timeline(jsonl: &str) -> Result<Timeline, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize interactions to JSONL.
pub fn serialize_timeline(timeline: &Timeline) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for interaction in timeline {
        output.push_str(&serde_json::to_string(interaction)?);
        output.push('\n');
    }
    Ok(output)
}

/// The JSON body of the first `# ` line, if present.
fn parse_header(content: &str) -> Option<&str> {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.strip_prefix('#'))
        .map(str::trim)
        .filter(|raw| raw.starts_with('{'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::InteractionKind;

    #[test]
    fn test_parse_timeline_skips_header_comment() {
        let jsonl = "# {\"schema_version\":\"1.0\"}\n\n{\"t\":0.0,\"type\":\"switch_active\",\"camera\":0}\n";
        let timeline = parse_timeline(jsonl).unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.as_slice()[0].kind, InteractionKind::SwitchActive);
    }

    #[test]
    fn test_same_timestamp_keeps_insertion_order() {
        let timeline: Timeline = vec![
            Interaction::switch_active(2.0, 1),
            Interaction::switch_active(2.0, 3),
        ]
        .into();
        let jsonl = serialize_timeline(&timeline).unwrap();
        let parsed = parse_timeline(&jsonl).unwrap();
        assert_eq!(parsed.as_slice()[0].camera, Some(1));
        assert_eq!(parsed.as_slice()[1].camera, Some(3));
    }

    #[test]
    fn test_regressions_reported() {
        let timeline: Timeline = vec![
            Interaction::play(0.0),
            Interaction::switch_active(5.0, 1),
            Interaction::switch_active(3.0, 2),
            Interaction::pause(3.0),
        ]
        .into();
        assert_eq!(timeline.regressions(), vec![2]);
    }

    #[test]
    fn test_backward_seek_is_not_a_regression() {
        let timeline: Timeline = vec![
            Interaction::play(0.0),
            Interaction::seek(20.0, 5.0),
            Interaction::switch_active(7.0, 1),
            Interaction::switch_active(4.0, 0),
        ]
        .into();
        assert_eq!(timeline.regressions(), vec![3]);
    }

    #[test]
    fn test_saved_session_save_and_load() {
        let dir = std::env::temp_dir().join("dashmix_test_session");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("session.jsonl");

        let cameras = CameraSet::from_discovery([CameraAngle::Front, CameraAngle::Rear]);
        let session = SavedSession {
            header: Some(SessionHeader::new("2024-01-15_10-30-00", &cameras)),
            timeline: vec![
                Interaction::switch_active(0.0, 1),
                Interaction::set_hidden(4.0, 0, true),
            ]
            .into(),
        };
        session.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# {"));

        let loaded = SavedSession::load(&path).unwrap();
        let header = loaded.header.unwrap();
        assert_eq!(header.event_key, "2024-01-15_10-30-00");
        assert_eq!(header.camera_set(), cameras);
        assert_eq!(loaded.timeline, session.timeline);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_saved_session_rejects_unknown_camera() {
        let dir = std::env::temp_dir().join("dashmix_test_session_bad");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("session.jsonl");

        let header = SessionHeader::new(
            "2024-01-15_10-30-00",
            &CameraSet::from_discovery([CameraAngle::Front]),
        );
        let content = format!(
            "# {}\n{{\"t\":1.0,\"type\":\"switch_active\",\"camera\":3}}\n",
            serde_json::to_string(&header).unwrap()
        );
        std::fs::write(&path, content).unwrap();

        let err = SavedSession::load(&path).unwrap_err();
        assert!(matches!(err, ModelError::ValidationError { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }
}
