use dashmix_director::compiler::{compile_segments, Segment};
use dashmix_director::plan::layout_cameras;
use dashmix_director::state::CameraStates;
use dashmix_model::interaction::Interaction;
use dashmix_model::layout::Slot;
use dashmix_model::timeline::Timeline;
use proptest::prelude::*;

const EPS: f64 = 1e-9;

fn quarter_seconds(max: u32) -> impl Strategy<Value = f64> + Clone {
    (0..max).prop_map(|q| q as f64 / 4.0)
}

fn any_interaction() -> impl Strategy<Value = Interaction> {
    let t = quarter_seconds(240);
    let cam = 0usize..5;
    prop_oneof![
        (t.clone(), cam.clone()).prop_map(|(t, c)| Interaction::switch_active(t, c)),
        (t.clone(), cam.clone()).prop_map(|(t, c)| Interaction::toggle_visibility(t, c)),
        (t.clone(), cam.clone(), any::<bool>()).prop_map(|(t, c, h)| Interaction::set_hidden(t, c, h)),
        (t.clone(), prop::collection::vec(0usize..5, 0..4))
            .prop_map(|(t, v)| Interaction::visible_snapshot(t, v)),
        t.clone().prop_map(Interaction::play_pause),
        (t.clone(), quarter_seconds(240)).prop_map(|(t, p)| Interaction::seek(t, p)),
        (t, cam, 1u32..8).prop_map(|(t, c, r)| Interaction::playback_rate(t, c, r as f64 / 2.0)),
    ]
}

fn replay_prefix(timeline: &Timeline, camera_count: usize, origin: Option<usize>) -> CameraStates {
    let mut states = CameraStates::initialize(camera_count);
    if let Some(last) = origin {
        for interaction in &timeline.as_slice()[..=last] {
            states.apply(interaction);
        }
    }
    states
}

fn assert_ordered(segments: &[Segment], total: f64) -> Result<(), TestCaseError> {
    prop_assert!(!segments.is_empty());
    prop_assert_eq!(segments[0].start, 0.0);
    for segment in segments {
        prop_assert!(segment.start < segment.end);
        prop_assert!(segment.source_start >= 0.0);
        prop_assert!(segment.source_start + segment.duration() <= total + EPS);
        prop_assert!(!segment.visible.is_empty());
    }
    for pair in segments.windows(2) {
        prop_assert_eq!(pair[0].end, pair[1].start);
    }
    Ok(())
}

proptest! {
    #[test]
    fn segments_are_ordered_and_disjoint(
        interactions in prop::collection::vec(any_interaction(), 0..40),
        camera_count in 1usize..=4,
        total in quarter_seconds(400).prop_filter("positive", |t| *t > 0.0),
    ) {
        let timeline = Timeline::from(interactions);
        if let Ok(segments) = compile_segments(&timeline, camera_count, total) {
            assert_ordered(&segments, total)?;
        }
    }

    #[test]
    fn visible_set_matches_incremental_replay(
        interactions in prop::collection::vec(any_interaction(), 0..40),
        camera_count in 1usize..=4,
        total in quarter_seconds(400).prop_filter("positive", |t| *t > 0.0),
    ) {
        let timeline = Timeline::from(interactions);
        if let Ok(segments) = compile_segments(&timeline, camera_count, total) {
            for segment in &segments {
                let states = replay_prefix(&timeline, camera_count, segment.origin);
                prop_assert_eq!(&segment.visible, &states.visible_set());
                prop_assert_eq!(segment.active_camera, states.active_camera());
            }
        }
    }

    #[test]
    fn monotonic_always_visible_timeline_covers_whole_duration(
        mut stamps in prop::collection::vec(quarter_seconds(240), 1..30),
        cams in prop::collection::vec(0usize..4, 30),
        total in quarter_seconds(400).prop_filter("positive", |t| *t > 0.0),
    ) {
        stamps.sort_by(|a, b| a.total_cmp(b));
        let timeline: Timeline = stamps
            .iter()
            .zip(&cams)
            .map(|(t, c)| Interaction::switch_active(*t, *c))
            .collect();

        let segments = compile_segments(&timeline, 4, total).unwrap();
        assert_ordered(&segments, total)?;
        let end = segments.last().map(|s| s.end).unwrap_or(0.0);
        prop_assert!((end - total).abs() < EPS);
    }

    #[test]
    fn layout_places_every_visible_camera_once(
        visible in prop::collection::btree_set(0usize..4, 1..=4),
        active in prop::option::of(0usize..4),
    ) {
        let placements = layout_cameras(active, &visible);
        prop_assert_eq!(placements.len(), visible.len());

        let placed: std::collections::BTreeSet<usize> = placements.iter().map(|p| p.camera).collect();
        prop_assert_eq!(&placed, &visible);

        let overlays: Vec<_> = placements.iter().filter(|p| p.slot != Slot::Full).collect();
        for (i, a) in overlays.iter().enumerate() {
            for b in overlays.iter().skip(i + 1) {
                prop_assert!(!a.region.overlaps(&b.region));
            }
        }
    }
}

#[test]
fn empty_timeline_is_one_full_segment() {
    for camera_count in 1..=4 {
        let segments = compile_segments(&Timeline::new(), camera_count, 12.5).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!((segments[0].start, segments[0].end), (0.0, 12.5));
        assert_eq!(segments[0].visible.len(), camera_count);
    }
}
