//! Filter-graph compositor: turns a composition plan into an encoder command.
//!
//! Each segment is drawn on its own black canvas: every placed camera is
//! trimmed to the segment's source window, scaled to its region and
//! overlaid. Segments are then concatenated in time order.
//!
//! ```text
//! [0:v] ─ split ─┬─ trim/scale ─┐
//! [1:v] ─ split ─┼─ trim/scale ─┼─ overlay on color ─ [seg0] ─┐
//!                └─ trim/scale ─┴─ overlay on color ─ [seg1] ─┴─ concat ─ [vout]
//! ```

use std::fmt::Write as _;

use dashmix_common::error::{DashmixError, DashmixResult};
use dashmix_director::plan::CompositionPlan;
use dashmix_model::export::{ExportSettings, Resolution};

use crate::backend::RenderCommand;

/// Canvas frame rate.
const CANVAS_FPS: u32 = 30;

/// Name a source is written under for a render input.
pub fn input_name(input: usize) -> String {
    format!("input{input}.mp4")
}

/// Build the `-filter_complex` graph for a plan. The graph's output label
/// is `[vout]`.
pub fn build_filter_graph(plan: &CompositionPlan, resolution: Resolution) -> DashmixResult<String> {
    if plan.is_empty() {
        return Err(DashmixError::EmptyComposition);
    }

    // Every use of an input needs its own branch.
    let mut uses = vec![0usize; plan.sources.len()];
    let mut branches = Vec::with_capacity(plan.segments.len());
    for segment in &plan.segments {
        let mut seg_branches = Vec::with_capacity(segment.placements.len());
        for placement in &segment.placements {
            let input = plan.input_of(placement.camera).ok_or_else(|| {
                DashmixError::render(format!(
                    "Camera {} is placed but has no source",
                    placement.camera
                ))
            })?;
            seg_branches.push((input, uses[input]));
            uses[input] += 1;
        }
        branches.push(seg_branches);
    }

    let mut graph = Vec::new();
    for (input, count) in uses.iter().enumerate() {
        match count {
            0 => {}
            1 => graph.push(format!("[{input}:v]null[s{input}_0]")),
            n => {
                let mut chain = format!("[{input}:v]split={n}");
                for k in 0..*n {
                    let _ = write!(chain, "[s{input}_{k}]");
                }
                graph.push(chain);
            }
        }
    }

    let (width, height) = (resolution.width, resolution.height);
    for (idx, (segment, seg_branches)) in plan.segments.iter().zip(&branches).enumerate() {
        let duration = segment.duration();
        graph.push(format!(
            "color=c=black:s={width}x{height}:r={CANVAS_FPS}:d={duration:.3}[bg{idx}]"
        ));

        let mut base = format!("bg{idx}");
        for (j, (placement, (input, branch))) in
            segment.placements.iter().zip(seg_branches).enumerate()
        {
            let rect = placement.region.to_pixels(width, height);
            graph.push(format!(
                "[s{input}_{branch}]trim=start={:.3}:duration={duration:.3},setpts=PTS-STARTPTS,scale={}:{}[v{idx}_{j}]",
                segment.source_start, rect.width, rect.height
            ));
            let out = format!("c{idx}_{j}");
            graph.push(format!(
                "[{base}][v{idx}_{j}]overlay=x={}:y={}:eof_action=repeat[{out}]",
                rect.x, rect.y
            ));
            base = out;
        }
        graph.push(format!("[{base}]setsar=1[seg{idx}]"));
    }

    let mut concat = String::new();
    for idx in 0..plan.segments.len() {
        let _ = write!(concat, "[seg{idx}]");
    }
    let _ = write!(concat, "concat=n={}:v=1:a=0[vout]", plan.segments.len());
    graph.push(concat);

    Ok(graph.join(";"))
}

/// Build the full encoder command for a plan.
pub fn build_command(
    plan: &CompositionPlan,
    settings: &ExportSettings,
    output: &str,
) -> DashmixResult<RenderCommand> {
    let graph = build_filter_graph(plan, settings.resolution)?;
    let inputs: Vec<String> = plan.sources.iter().map(|s| input_name(s.input)).collect();

    let mut args: Vec<String> = [
        "-y",
        "-hide_banner",
        "-loglevel",
        "error",
        "-nostats",
        "-progress",
        "pipe:1",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    for input in &inputs {
        args.push("-i".to_string());
        args.push(input.clone());
    }

    args.extend([
        "-filter_complex".to_string(),
        graph,
        "-map".to_string(),
        "[vout]".to_string(),
        "-an".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-crf".to_string(),
        settings.crf.to_string(),
        "-preset".to_string(),
        settings.preset.clone(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        output.to_string(),
    ]);

    Ok(RenderCommand {
        args,
        inputs,
        output: output.to_string(),
        duration_secs: plan.duration(),
    })
}
