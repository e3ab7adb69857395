//! Validate a saved interaction timeline.

use std::path::PathBuf;

use dashmix_director::compiler::compile_segments;
use dashmix_model::interaction::{Interaction, InteractionKind};
use dashmix_model::timeline::SavedSession;

pub fn run(path: PathBuf, duration: Option<f64>) -> anyhow::Result<()> {
    println!("Validating timeline at: {}", path.display());

    let session =
        SavedSession::load(&path).map_err(|e| anyhow::anyhow!("Failed to load timeline: {e}"))?;
    let timeline = &session.timeline;

    let camera_count = match &session.header {
        Some(header) => {
            println!("  Event: {}", header.event_key);
            println!("  Schema: {}", header.schema_version);
            println!("  Started: {}", header.started_at);
            let cameras: Vec<&str> = header.cameras.iter().map(|c| c.label()).collect();
            println!("  Cameras: {}", cameras.join(", "));
            Some(header.cameras.len())
        }
        None => {
            println!("  Header: none");
            None
        }
    };
    println!("  Interactions: {}", timeline.len());
    if let Some(last) = timeline.last() {
        println!("  Last timestamp: {:.3}s", last.timestamp);
    }

    let mut issues = Vec::new();
    for index in timeline.regressions() {
        issues.push(format!(
            "#{index}: timestamp goes backwards ({:.3}s), previous step is dropped",
            timeline.as_slice()[index].timestamp
        ));
    }
    for (index, interaction) in timeline.iter().enumerate() {
        if let Some(problem) = check_interaction(interaction, camera_count) {
            issues.push(format!("#{index}: {problem}"));
        }
    }

    if issues.is_empty() {
        println!("\nTimeline is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!(
            "\n{} issue(s) found. Affected steps are ignored on export.",
            issues.len()
        );
    }

    if let (Some(total), Some(count)) = (duration, camera_count) {
        match compile_segments(timeline, count, total) {
            Ok(segments) => {
                println!("\nCompiles to {} segment(s) over {total:.1}s.", segments.len());
            }
            Err(e) => println!("\nDoes not compile: {e}. Export falls back to the standard layout."),
        }
    }

    Ok(())
}

fn check_interaction(interaction: &Interaction, camera_count: Option<usize>) -> Option<String> {
    if !interaction.timestamp.is_finite() || interaction.timestamp < 0.0 {
        return Some(format!("invalid timestamp {}", interaction.timestamp));
    }

    let needs_camera = matches!(
        interaction.kind,
        InteractionKind::SwitchActive | InteractionKind::ChangePlaybackRate
    ) || (interaction.kind == InteractionKind::ToggleVisibility
        && interaction.extra.visible.is_none());
    match interaction.camera {
        None if needs_camera => return Some(format!("{:?} without a camera", interaction.kind)),
        Some(camera) if camera_count.is_some_and(|n| camera >= n) => {
            return Some(format!("unknown camera {camera}"));
        }
        _ => {}
    }

    if let (Some(visible), Some(n)) = (&interaction.extra.visible, camera_count) {
        if let Some(camera) = visible.iter().find(|c| **c >= n) {
            return Some(format!("visible set names unknown camera {camera}"));
        }
    }

    if interaction.kind == InteractionKind::ChangePlaybackRate {
        match interaction.extra.rate {
            Some(rate) if rate.is_finite() && rate > 0.0 => {}
            other => return Some(format!("invalid playback rate {other:?}")),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_interaction_flags_unknown_cameras() {
        assert!(check_interaction(&Interaction::switch_active(1.0, 5), Some(4)).is_some());
        assert!(check_interaction(&Interaction::switch_active(1.0, 3), Some(4)).is_none());
        assert!(check_interaction(&Interaction::visible_snapshot(1.0, vec![0, 9]), Some(4)).is_some());
        // Without a header, indices can't be checked.
        assert!(check_interaction(&Interaction::switch_active(1.0, 5), None).is_none());
    }

    #[test]
    fn test_check_interaction_flags_bad_rates() {
        assert!(check_interaction(&Interaction::playback_rate(2.0, 0, 0.0), Some(4)).is_some());
        assert!(check_interaction(&Interaction::playback_rate(2.0, 0, 2.0), Some(4)).is_none());
        assert!(check_interaction(&Interaction::play_pause(-1.0), Some(4)).is_some());
    }
}
