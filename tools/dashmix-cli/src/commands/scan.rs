//! List events in a clip folder.

use std::path::PathBuf;

use serde::Serialize;

use dashmix_common::config::AppConfig;
use dashmix_model::camera::CameraAngle;
use dashmix_model::clip::scan_clip_folder;

#[derive(Serialize)]
struct EventSummary {
    index: usize,
    key: String,
    recorded_at: String,
    cameras: Vec<CameraAngle>,
}

pub fn run(config: &AppConfig, dir: PathBuf, folder: Option<String>, json: bool) -> anyhow::Result<()> {
    let folder = super::clip_folder(config, folder.as_deref())?;
    let events = scan_clip_folder(&dir, folder)
        .map_err(|e| anyhow::anyhow!("Failed to scan {}: {e}", dir.display()))?;

    let summaries: Vec<EventSummary> = events
        .iter()
        .enumerate()
        .map(|(index, event)| EventSummary {
            index,
            key: event.key.clone(),
            recorded_at: event.display_timestamp(),
            cameras: event.camera_set().angles().to_vec(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("{} in {}", folder.dir_name(), dir.display());
    println!("{}", "=".repeat(50));
    if summaries.is_empty() {
        println!("No events found.");
        return Ok(());
    }
    for summary in &summaries {
        let cameras: Vec<&str> = summary.cameras.iter().map(|c| c.label()).collect();
        println!(
            "  [{:>3}] {}  {}",
            summary.index,
            summary.recorded_at,
            cameras.join(", ")
        );
    }
    println!("\n{} event(s).", summaries.len());

    Ok(())
}
