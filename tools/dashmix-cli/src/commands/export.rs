//! Export an event to video.

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context;

use dashmix_common::config::AppConfig;
use dashmix_model::export::{ExportMode, ExportSettings, Resolution};
use dashmix_model::timeline::Timeline;
use dashmix_render_engine::export::{
    ExportObserver, ExportOrchestrator, ExportRequest, ExportState, SourceClip,
};
use dashmix_render_engine::ffmpeg::FfmpegBackend;

pub struct ExportArgs {
    pub dir: PathBuf,
    pub timeline: Option<PathBuf>,
    pub event: usize,
    pub folder: Option<String>,
    pub mode: Option<String>,
    pub resolution: Option<String>,
    pub crf: Option<u8>,
    pub preset: Option<String>,
    pub output: Option<PathBuf>,
}

/// Prints progress on a single terminal line.
struct ConsoleObserver;

impl ExportObserver for ConsoleObserver {
    fn on_state(&self, state: ExportState) {
        tracing::debug!(?state, "Export state changed");
    }

    fn on_progress(&self, percent: u8, fps: f64, speed: f64) {
        print!("\r  Progress: {percent:>3}% ({fps:.1} fps, {speed:.2}x)  ");
        let _ = std::io::stdout().flush();
    }

    fn on_log(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn on_error(&self, message: &str) {
        println!("\nExport failed: {message}");
    }

    fn on_cancelled(&self) {
        println!("\nExport cancelled.");
    }
}

pub async fn run(config: &AppConfig, args: ExportArgs) -> anyhow::Result<()> {
    let folder = super::clip_folder(config, args.folder.as_deref())?;
    let mut event = super::select_event(&args.dir, folder, args.event)?;
    println!("Exporting event: {}", event.display_timestamp());

    super::probe_event(&mut event).await;
    let total = event
        .total_duration_secs()
        .ok_or_else(|| anyhow::anyhow!("No clip duration available (is ffprobe installed?)"))?;

    let timeline = match &args.timeline {
        Some(path) => super::load_timeline(path, &event)?.timeline,
        None => Timeline::new(),
    };

    let defaults = &config.export;
    let mode: ExportMode = match (args.mode.as_deref(), args.timeline.is_some()) {
        (Some(m), _) => m.parse().map_err(anyhow::Error::msg)?,
        (None, false) => ExportMode::Standard,
        (None, true) => defaults.mode.parse().map_err(anyhow::Error::msg)?,
    };
    let resolution: Resolution = args
        .resolution
        .as_deref()
        .unwrap_or(&defaults.resolution)
        .parse()?;
    let settings = ExportSettings {
        mode,
        resolution,
        crf: args.crf.unwrap_or(defaults.crf),
        preset: args.preset.unwrap_or_else(|| defaults.preset.clone()),
    };

    let output_path = args
        .output
        .unwrap_or_else(|| defaults.output_dir.join(event.export_file_name()));

    let mut sources = Vec::with_capacity(event.clips.len());
    for clip in &event.clips {
        let bytes = tokio::fs::read(&clip.path)
            .await
            .with_context(|| format!("Failed to read {}", clip.path.display()))?;
        sources.push(SourceClip {
            angle: clip.angle,
            bytes,
        });
    }

    println!("  Output: {}", output_path.display());
    println!("  Mode: {:?}", settings.mode);
    println!("  Resolution: {}", settings.resolution);
    println!("  Duration: {total:.1}s");

    let request = ExportRequest {
        sources,
        timeline,
        settings,
        total_duration_secs: total,
        output_name: event.export_file_name(),
    };

    let mut orchestrator = ExportOrchestrator::new(FfmpegBackend::new());
    let cancel = orchestrator.cancel_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let state = orchestrator.export(request, &ConsoleObserver).await;
    ctrl_c.abort();

    match state {
        ExportState::Succeeded => {
            let bytes = orchestrator
                .take_output()
                .ok_or_else(|| anyhow::anyhow!("Export finished without output"))?;
            if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&output_path, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            println!("\nExport complete: {}", output_path.display());
            Ok(())
        }
        ExportState::Cancelled => Ok(()),
        _ => Err(anyhow::anyhow!(
            "{}",
            orchestrator.last_error().unwrap_or("export failed")
        )),
    }
}
