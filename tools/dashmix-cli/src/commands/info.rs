//! Show event information.

use std::path::PathBuf;

use dashmix_common::config::AppConfig;
use dashmix_model::clip::{navigate_events, scan_clip_folder};

pub async fn run(
    config: &AppConfig,
    dir: PathBuf,
    event: usize,
    folder: Option<String>,
) -> anyhow::Result<()> {
    let folder = super::clip_folder(config, folder.as_deref())?;
    let events = scan_clip_folder(&dir, folder)
        .map_err(|e| anyhow::anyhow!("Failed to scan {}: {e}", dir.display()))?;
    let total_events = events.len();
    let mut selected = events.into_iter().nth(event).ok_or_else(|| {
        anyhow::anyhow!("Event index {event} out of range ({total_events} events)")
    })?;
    super::probe_event(&mut selected).await;

    println!("Event: {}", selected.key);
    println!("  Recorded: {}", selected.display_timestamp());
    println!("  Position: {} of {}", event + 1, total_events);
    println!(
        "  Previous / next: {} / {}",
        navigate_events(event, -1, total_events),
        navigate_events(event, 1, total_events)
    );
    println!();

    let cameras = selected.camera_set();
    println!("Cameras ({}):", cameras.len());
    for (index, clip) in selected.clips.iter().enumerate() {
        let duration = clip
            .duration_secs
            .map(|d| format!("{d:.1}s"))
            .unwrap_or_else(|| "unknown".to_string());
        println!(
            "  [{index}] {:<6} {duration:>8}  {}",
            clip.angle.label(),
            clip.path.display()
        );
    }
    println!();

    let canonical: Vec<&str> = cameras
        .canonical_order()
        .into_iter()
        .filter_map(|i| cameras.angle(i))
        .map(|a| a.label())
        .collect();
    println!("Export order: {}", canonical.join(", "));
    match selected.total_duration_secs() {
        Some(total) => println!("Duration: {total:.1}s"),
        None => println!("Duration: unknown (ffprobe unavailable?)"),
    }
    println!("Export name: {}", selected.export_file_name());

    Ok(())
}
