use std::path::PathBuf;

use dashmix_director::compiler::compile_segments;
use dashmix_director::plan::{build_plan, CompositionPlan};
use dashmix_model::camera::CameraAngle;
use dashmix_model::timeline::SavedSession;

fn load_fixture_session() -> SavedSession {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("sample-session")
        .join("timeline.jsonl");

    SavedSession::load(path).expect("fixture session should load")
}

fn signature(plan: &CompositionPlan) -> String {
    plan.segments
        .iter()
        .map(|segment| {
            let placements = segment
                .placements
                .iter()
                .map(|p| format!("{}/{:?}", p.camera, p.slot))
                .collect::<Vec<_>>()
                .join(",");
            format!(
                "{:.2}-{:.2}@{:.2}:{}",
                segment.start, segment.end, segment.source_start, placements
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn sample_session_plan_signature_is_stable() {
    let session = load_fixture_session();
    let header = session.header.expect("fixture has a header");
    let cameras = header.camera_set();
    assert_eq!(cameras.len(), 4);

    let segments = compile_segments(&session.timeline, cameras.len(), 60.0).unwrap();
    let plan = build_plan(&segments, &cameras);

    let expected = "\
0.00-8.50@0.00:1/Full,0/TopRight,2/BottomLeft,3/BottomRight
8.50-15.00@8.50:1/Full,2/TopRight,3/BottomLeft
15.00-22.25@15.00:1/LeftHalf,2/RightHalf
22.25-25.25@30.00:1/LeftHalf,2/RightHalf
25.25-30.75@33.00:2/Full,1/TopRight,3/BottomLeft
30.75-36.25@38.50:2/Full
36.25-41.25@47.00:1/Full
41.25-46.25@52.00:1/Full
46.25-49.25@57.00:1/Full";

    assert_eq!(signature(&plan), expected);
    assert!(session.timeline.regressions().is_empty());
    assert_eq!(plan.duration(), 49.25);
}

#[test]
fn sample_session_sources_follow_canonical_order() {
    let session = load_fixture_session();
    let cameras = session.header.expect("fixture has a header").camera_set();
    let segments = compile_segments(&session.timeline, cameras.len(), 60.0).unwrap();
    let plan = build_plan(&segments, &cameras);

    let order: Vec<(usize, CameraAngle)> = plan.sources.iter().map(|s| (s.camera, s.angle)).collect();
    assert_eq!(
        order,
        vec![
            (1, CameraAngle::Front),
            (0, CameraAngle::Rear),
            (2, CameraAngle::Left),
            (3, CameraAngle::Right),
        ]
    );
}
