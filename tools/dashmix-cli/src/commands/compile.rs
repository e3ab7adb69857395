//! Compile a timeline into a composition plan.

use std::path::PathBuf;

use dashmix_common::config::AppConfig;
use dashmix_director::plan::resolve_plan;
use dashmix_model::export::ExportMode;
use dashmix_model::timeline::Timeline;

pub async fn run(
    config: &AppConfig,
    dir: PathBuf,
    timeline: Option<PathBuf>,
    event: usize,
    folder: Option<String>,
    mode: Option<String>,
    duration: Option<f64>,
) -> anyhow::Result<()> {
    let folder = super::clip_folder(config, folder.as_deref())?;
    let mut selected = super::select_event(&dir, folder, event)?;

    let total = match duration {
        Some(d) => d,
        None => {
            super::probe_event(&mut selected).await;
            selected
                .total_duration_secs()
                .ok_or_else(|| anyhow::anyhow!("No clip duration available; pass --duration"))?
        }
    };

    let timeline = match &timeline {
        Some(path) => super::load_timeline(path, &selected)?.timeline,
        None => Timeline::new(),
    };
    let mode: ExportMode = match (mode, timeline.is_empty()) {
        (Some(m), _) => m.parse().map_err(anyhow::Error::msg)?,
        (None, true) => ExportMode::Standard,
        (None, false) => config.export.mode.parse().map_err(anyhow::Error::msg)?,
    };

    let resolved = resolve_plan(mode, &timeline, &selected.camera_set(), total)?;
    if resolved.fell_back {
        eprintln!("Timeline produced no segments; using the standard layout.");
    }
    println!("{}", serde_json::to_string_pretty(&resolved.plan)?);

    Ok(())
}
