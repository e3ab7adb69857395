//! Camera angles and per-event camera index assignment.
//!
//! A camera is identified by the integer index it received when its clip was
//! discovered, not by its angle. The angle is kept alongside as auxiliary
//! data for canonical ordering and layout decisions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a camera within one loaded event (order of discovery).
pub type CameraIndex = usize;

/// One of the four fixed dashcam angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraAngle {
    Front,
    Rear,
    Left,
    Right,
}

impl CameraAngle {
    /// Canonical export order: front, rear, left, right.
    pub const CANONICAL: [CameraAngle; 4] = [
        CameraAngle::Front,
        CameraAngle::Rear,
        CameraAngle::Left,
        CameraAngle::Right,
    ];

    /// Parse a filename tag or UI label. Accepts both the on-disk tags
    /// (`back`, `left_repeater`, `right_repeater`) and the short labels.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "front" => Some(Self::Front),
            "back" | "rear" => Some(Self::Rear),
            "left_repeater" | "left" => Some(Self::Left),
            "right_repeater" | "right" => Some(Self::Right),
            _ => None,
        }
    }

    /// Tag used in clip filenames.
    pub fn file_tag(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Rear => "back",
            Self::Left => "left_repeater",
            Self::Right => "right_repeater",
        }
    }

    /// Short label shown in the grid UI.
    pub fn label(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Rear => "rear",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Position in the canonical order.
    pub fn canonical_rank(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CameraAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The index→angle mapping for one loaded event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSet {
    angles: Vec<CameraAngle>,
}

impl CameraSet {
    /// Build from angles in discovery order. Index `i` is `angles[i]`.
    pub fn from_discovery(angles: impl IntoIterator<Item = CameraAngle>) -> Self {
        Self {
            angles: angles.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    pub fn angles(&self) -> &[CameraAngle] {
        &self.angles
    }

    pub fn angle(&self, index: CameraIndex) -> Option<CameraAngle> {
        self.angles.get(index).copied()
    }

    pub fn index_of(&self, angle: CameraAngle) -> Option<CameraIndex> {
        self.angles.iter().position(|a| *a == angle)
    }

    /// All indices in discovery order.
    pub fn indices(&self) -> impl Iterator<Item = CameraIndex> + '_ {
        0..self.angles.len()
    }

    /// Camera indices sorted into canonical angle order. Missing angles are
    /// skipped, not padded.
    pub fn canonical_order(&self) -> Vec<CameraIndex> {
        CameraAngle::CANONICAL
            .iter()
            .filter_map(|angle| self.index_of(*angle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_aliases() {
        assert_eq!(CameraAngle::from_tag("back"), Some(CameraAngle::Rear));
        assert_eq!(CameraAngle::from_tag("Rear"), Some(CameraAngle::Rear));
        assert_eq!(
            CameraAngle::from_tag("left_repeater"),
            Some(CameraAngle::Left)
        );
        assert_eq!(CameraAngle::from_tag("right"), Some(CameraAngle::Right));
        assert_eq!(CameraAngle::from_tag("pillar"), None);
    }

    #[test]
    fn test_file_tag_parses_back() {
        for angle in CameraAngle::CANONICAL {
            assert_eq!(CameraAngle::from_tag(angle.file_tag()), Some(angle));
        }
    }

    #[test]
    fn test_canonical_order_skips_missing() {
        let set = CameraSet::from_discovery([
            CameraAngle::Right,
            CameraAngle::Front,
            CameraAngle::Left,
        ]);
        // front is index 1, left is 2, right is 0; rear is absent
        assert_eq!(set.canonical_order(), vec![1, 2, 0]);
        assert_eq!(set.angle(0), Some(CameraAngle::Right));
        assert_eq!(set.angle(3), None);
    }
}
