//! Composition plan builder.
//!
//! Maps each compiled segment onto screen regions:
//!
//! | Visible | Layout                                                        |
//! |---------|---------------------------------------------------------------|
//! | 1       | full frame                                                    |
//! | 2       | left/right halves, ascending camera index                    |
//! | 3-4     | primary full frame, others ascending into overlay quadrants   |
//!
//! The primary is the active camera when it is visible, otherwise the lowest
//! visible index.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use dashmix_common::error::{DashmixError, DashmixResult};
use dashmix_model::camera::{CameraAngle, CameraIndex, CameraSet};
use dashmix_model::export::ExportMode;
use dashmix_model::layout::{Region, Slot};
use dashmix_model::timeline::Timeline;

use crate::compiler::{Segment, SegmentCompiler};

/// One camera drawn into one region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub camera: CameraIndex,
    pub slot: Slot,
    pub region: Region,
}

impl Placement {
    fn new(camera: CameraIndex, slot: Slot) -> Self {
        Self {
            camera,
            slot,
            region: slot.region(),
        }
    }
}

/// A segment with its spatial layout resolved.
///
/// Placements are in draw order: the full-frame or left-half camera first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentLayout {
    pub start: f64,
    pub end: f64,
    pub source_start: f64,
    pub placements: Vec<Placement>,
}

impl SegmentLayout {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A camera's clip as a render input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSource {
    pub camera: CameraIndex,
    pub angle: CameraAngle,
    /// Position among the render inputs.
    pub input: usize,
}

/// Everything a render backend needs to draw the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionPlan {
    /// Present cameras in canonical angle order.
    pub sources: Vec<PlanSource>,
    /// Time-ordered, disjoint segment layouts.
    pub segments: Vec<SegmentLayout>,
}

impl CompositionPlan {
    /// Output length in seconds.
    pub fn duration(&self) -> f64 {
        self.segments.last().map(|s| s.end).unwrap_or(0.0)
    }

    /// Render input index for a camera.
    pub fn input_of(&self, camera: CameraIndex) -> Option<usize> {
        self.sources
            .iter()
            .find(|source| source.camera == camera)
            .map(|source| source.input)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Assign regions to the visible cameras of one segment.
pub fn layout_cameras(
    active: Option<CameraIndex>,
    visible: &BTreeSet<CameraIndex>,
) -> Vec<Placement> {
    let ordered: Vec<CameraIndex> = visible.iter().copied().collect();
    match ordered.as_slice() {
        [] => Vec::new(),
        [only] => vec![Placement::new(*only, Slot::Full)],
        [left, right] => vec![
            Placement::new(*left, Slot::LeftHalf),
            Placement::new(*right, Slot::RightHalf),
        ],
        [lowest, ..] => {
            let primary = active.filter(|cam| visible.contains(cam)).unwrap_or(*lowest);
            let mut placements = vec![Placement::new(primary, Slot::Full)];
            placements.extend(
                ordered
                    .iter()
                    .copied()
                    .filter(|cam| *cam != primary)
                    .zip(Slot::OVERLAY_QUADRANTS)
                    .map(|(cam, slot)| Placement::new(cam, slot)),
            );
            placements
        }
    }
}

/// Build a plan from compiled segments.
pub fn build_plan(segments: &[Segment], cameras: &CameraSet) -> CompositionPlan {
    let sources = cameras
        .canonical_order()
        .into_iter()
        .enumerate()
        .filter_map(|(input, camera)| {
            cameras.angle(camera).map(|angle| PlanSource {
                camera,
                angle,
                input,
            })
        })
        .collect();

    let segments = segments
        .iter()
        .map(|segment| SegmentLayout {
            start: segment.start,
            end: segment.end,
            source_start: segment.source_start,
            placements: layout_cameras(segment.active_camera, &segment.visible),
        })
        .collect();

    CompositionPlan { sources, segments }
}

/// The fixed dashboard layout: front (or the first canonical angle present)
/// full frame, every other camera as an overlay, for the whole duration.
pub fn standard_plan(cameras: &CameraSet, total_duration: f64) -> DashmixResult<CompositionPlan> {
    if cameras.is_empty() {
        return Err(DashmixError::MissingCameraAngles);
    }
    if !total_duration.is_finite() || total_duration <= 0.0 {
        return Err(DashmixError::EmptyComposition);
    }

    let segment = Segment {
        start: 0.0,
        end: total_duration,
        source_start: 0.0,
        active_camera: cameras.canonical_order().first().copied(),
        visible: cameras.indices().collect(),
        origin: None,
    };
    Ok(build_plan(&[segment], cameras))
}

/// A plan plus whether the standard layout was substituted.
#[derive(Debug, Clone)]
pub struct ResolvedPlan {
    pub plan: CompositionPlan,
    pub fell_back: bool,
}

/// Produce the plan for an export mode, falling back to the standard layout
/// when a custom timeline compiles to nothing.
pub fn resolve_plan(
    mode: ExportMode,
    timeline: &Timeline,
    cameras: &CameraSet,
    total_duration: f64,
) -> DashmixResult<ResolvedPlan> {
    if mode == ExportMode::Standard {
        return Ok(ResolvedPlan {
            plan: standard_plan(cameras, total_duration)?,
            fell_back: false,
        });
    }

    match SegmentCompiler::new(cameras.len(), total_duration).compile(timeline) {
        Ok(segments) => Ok(ResolvedPlan {
            plan: build_plan(&segments, cameras),
            fell_back: false,
        }),
        Err(DashmixError::EmptyComposition) => {
            tracing::warn!("Custom timeline produced no segments, using standard layout");
            Ok(ResolvedPlan {
                plan: standard_plan(cameras, total_duration)?,
                fell_back: true,
            })
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmix_model::interaction::Interaction;

    fn set(items: &[CameraIndex]) -> BTreeSet<CameraIndex> {
        items.iter().copied().collect()
    }

    fn slots(placements: &[Placement]) -> Vec<(CameraIndex, Slot)> {
        placements.iter().map(|p| (p.camera, p.slot)).collect()
    }

    fn tesla_discovery() -> CameraSet {
        // Files sort alphabetically: back, front, left_repeater, right_repeater.
        CameraSet::from_discovery([
            CameraAngle::Rear,
            CameraAngle::Front,
            CameraAngle::Left,
            CameraAngle::Right,
        ])
    }

    #[test]
    fn test_single_camera_full_frame() {
        assert_eq!(
            slots(&layout_cameras(Some(0), &set(&[2]))),
            vec![(2, Slot::Full)]
        );
    }

    #[test]
    fn test_two_cameras_split_by_index() {
        assert_eq!(
            slots(&layout_cameras(Some(3), &set(&[3, 1]))),
            vec![(1, Slot::LeftHalf), (3, Slot::RightHalf)]
        );
    }

    #[test]
    fn test_active_camera_takes_full_frame() {
        assert_eq!(
            slots(&layout_cameras(Some(2), &set(&[0, 1, 2, 3]))),
            vec![
                (2, Slot::Full),
                (0, Slot::TopRight),
                (1, Slot::BottomLeft),
                (3, Slot::BottomRight),
            ]
        );
    }

    #[test]
    fn test_hidden_active_falls_back_to_lowest() {
        assert_eq!(
            slots(&layout_cameras(Some(0), &set(&[1, 2, 3]))),
            vec![(1, Slot::Full), (2, Slot::TopRight), (3, Slot::BottomLeft)]
        );
        assert_eq!(
            slots(&layout_cameras(None, &set(&[0, 2, 3]))),
            vec![(0, Slot::Full), (2, Slot::TopRight), (3, Slot::BottomLeft)]
        );
    }

    #[test]
    fn test_sources_in_canonical_order() {
        let plan = standard_plan(&tesla_discovery(), 60.0).unwrap();
        let angles: Vec<CameraAngle> = plan.sources.iter().map(|s| s.angle).collect();
        assert_eq!(angles, CameraAngle::CANONICAL.to_vec());
        assert_eq!(plan.input_of(1), Some(0));
        assert_eq!(plan.input_of(0), Some(1));
    }

    #[test]
    fn test_standard_plan_front_is_primary() {
        let plan = standard_plan(&tesla_discovery(), 60.0).unwrap();
        assert_eq!(plan.segments.len(), 1);
        assert_eq!(plan.duration(), 60.0);
        let primary = plan.segments[0].placements[0];
        assert_eq!(primary.slot, Slot::Full);
        assert_eq!(primary.camera, 1);
    }

    #[test]
    fn test_missing_angles_are_skipped() {
        let cameras = CameraSet::from_discovery([CameraAngle::Right, CameraAngle::Front]);
        let plan = standard_plan(&cameras, 10.0).unwrap();
        assert_eq!(plan.sources.len(), 2);
        assert_eq!(plan.sources[0].angle, CameraAngle::Front);
        assert_eq!(plan.sources[1].angle, CameraAngle::Right);
        assert_eq!(plan.sources[1].input, 1);
    }

    #[test]
    fn test_standard_plan_requires_cameras() {
        let err = standard_plan(&CameraSet::default(), 10.0).unwrap_err();
        assert!(matches!(err, DashmixError::MissingCameraAngles));
    }

    #[test]
    fn test_identical_neighbours_are_not_merged() {
        let timeline: Timeline = vec![
            Interaction::switch_active(0.0, 0),
            Interaction::play(3.0),
        ]
        .into();
        let resolved = resolve_plan(ExportMode::Custom, &timeline, &tesla_discovery(), 9.0).unwrap();
        assert!(!resolved.fell_back);
        assert_eq!(resolved.plan.segments.len(), 2);
        assert_eq!(
            resolved.plan.segments[0].placements,
            resolved.plan.segments[1].placements
        );
    }

    #[test]
    fn test_resolve_falls_back_on_empty_composition() {
        let timeline: Timeline = vec![Interaction::visible_snapshot(0.0, vec![])].into();
        let resolved = resolve_plan(ExportMode::Custom, &timeline, &tesla_discovery(), 9.0).unwrap();
        assert!(resolved.fell_back);
        assert_eq!(resolved.plan.segments[0].placements.len(), 4);
    }

    #[test]
    fn test_standard_mode_ignores_timeline() {
        let timeline: Timeline = vec![Interaction::switch_active(0.0, 3)].into();
        let resolved =
            resolve_plan(ExportMode::Standard, &timeline, &tesla_discovery(), 9.0).unwrap();
        assert_eq!(resolved.plan.segments[0].placements[0].camera, 1);
    }
}
