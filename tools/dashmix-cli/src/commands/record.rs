//! Drive a live session from a command script.
//!
//! One command per line, `#` starts a comment:
//!
//! ```text
//! play
//! tick 4.5          # advance playback by 4.5s of wall time
//! switch 2
//! hide 1 | show 1 | toggle 1
//! rate 0 2.0
//! seek 12
//! pause | playpause | resync
//! ```

use std::io::Read as _;
use std::path::PathBuf;

use anyhow::Context;

use dashmix_common::config::AppConfig;
use dashmix_model::camera::CameraIndex;
use dashmix_session::{HandleRegistry, LiveSession};

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScriptCommand {
    Switch(CameraIndex),
    Toggle(CameraIndex),
    Hide(CameraIndex),
    Show(CameraIndex),
    Play,
    Pause,
    PlayPause,
    Seek(f64),
    Rate(CameraIndex, f64),
    Tick(f64),
    Resync,
}

fn parse_line(line: &str) -> anyhow::Result<Option<ScriptCommand>> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default().to_ascii_lowercase();
    let args: Vec<&str> = words.collect();

    let camera = |i: usize| -> anyhow::Result<CameraIndex> {
        let raw = args
            .get(i)
            .ok_or_else(|| anyhow::anyhow!("`{verb}` needs a camera index"))?;
        raw.parse()
            .map_err(|_| anyhow::anyhow!("Invalid camera index: {raw}"))
    };
    let number = |i: usize| -> anyhow::Result<f64> {
        let raw = args
            .get(i)
            .ok_or_else(|| anyhow::anyhow!("`{verb}` needs a number"))?;
        raw.parse()
            .map_err(|_| anyhow::anyhow!("Invalid number: {raw}"))
    };

    let command = match verb.as_str() {
        "switch" => ScriptCommand::Switch(camera(0)?),
        "toggle" => ScriptCommand::Toggle(camera(0)?),
        "hide" => ScriptCommand::Hide(camera(0)?),
        "show" => ScriptCommand::Show(camera(0)?),
        "play" => ScriptCommand::Play,
        "pause" => ScriptCommand::Pause,
        "playpause" => ScriptCommand::PlayPause,
        "seek" => ScriptCommand::Seek(number(0)?),
        "rate" => ScriptCommand::Rate(camera(0)?, number(1)?),
        "tick" => ScriptCommand::Tick(number(0)?),
        "resync" => ScriptCommand::Resync,
        other => anyhow::bail!("Unknown command: {other}"),
    };
    Ok(Some(command))
}

fn apply(session: &mut LiveSession, command: ScriptCommand) -> anyhow::Result<()> {
    match command {
        ScriptCommand::Switch(camera) => session.switch_active(camera)?,
        ScriptCommand::Toggle(camera) => session.toggle_visibility(camera)?,
        ScriptCommand::Hide(camera) => session.set_hidden(camera, true)?,
        ScriptCommand::Show(camera) => session.set_hidden(camera, false)?,
        ScriptCommand::Play => session.play()?,
        ScriptCommand::Pause => session.pause()?,
        ScriptCommand::PlayPause => session.play_pause()?,
        ScriptCommand::Seek(position) => session.seek(position)?,
        ScriptCommand::Rate(camera, rate) => session.set_playback_rate(camera, rate)?,
        ScriptCommand::Tick(elapsed) => {
            session.tick(elapsed);
        }
        ScriptCommand::Resync => {
            for correction in session.resync() {
                println!(
                    "  resync camera {} ({:+.3}s drift)",
                    correction.camera, correction.drift_secs
                );
            }
        }
    }
    Ok(())
}

pub async fn run(
    config: &AppConfig,
    dir: PathBuf,
    output: PathBuf,
    script: Option<PathBuf>,
    event: usize,
    folder: Option<String>,
) -> anyhow::Result<()> {
    let folder = super::clip_folder(config, folder.as_deref())?;
    let mut selected = super::select_event(&dir, folder, event)?;
    super::probe_event(&mut selected).await;

    let source = match &script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    println!("Recording session for event: {}", selected.display_timestamp());
    println!("  Output: {}", output.display());

    let mut session = LiveSession::load(selected, HandleRegistry::new(), &config.playback)?;
    session.record_to(&output)?;

    for (number, line) in source.lines().enumerate() {
        let Some(command) = parse_line(line).with_context(|| format!("line {}", number + 1))? else {
            continue;
        };
        if let Err(e) = apply(&mut session, command) {
            println!("  line {}: {e}", number + 1);
        }
    }

    let position = session.clock().position_secs();
    let timeline = session.finish();
    println!(
        "\nRecorded {} interaction(s), playhead at {position:.2}s.",
        timeline.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("switch 2").unwrap(), Some(ScriptCommand::Switch(2)));
        assert_eq!(
            parse_line("  RATE 1 0.5 # slow down").unwrap(),
            Some(ScriptCommand::Rate(1, 0.5))
        );
        assert_eq!(parse_line("tick 4.5").unwrap(), Some(ScriptCommand::Tick(4.5)));
        assert_eq!(parse_line("# just a comment").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
    }

    #[test]
    fn test_parse_line_rejects_bad_input() {
        assert!(parse_line("switch").is_err());
        assert!(parse_line("seek soon").is_err());
        assert!(parse_line("rewind 3").is_err());
    }
}
