//! Encoder progress parsing.
//!
//! ffmpeg's `-progress` output is a stream of `key=value` lines; every
//! block ends with a `progress=continue` or `progress=end` line.

use serde::{Deserialize, Serialize};

/// One progress snapshot from the encoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderProgress {
    /// Output time encoded so far (seconds).
    pub out_time_secs: f64,
    /// Frames encoded so far.
    pub frame: u64,
    /// Current encoding frame rate.
    pub fps: f64,
    /// Encoding speed relative to realtime (1.5 = 1.5x).
    pub speed: f64,
    /// Whether the encoder reported the end of output.
    pub complete: bool,
}

impl RenderProgress {
    /// Fraction of `total_secs` encoded, in `[0.0, 1.0]`.
    pub fn ratio(&self, total_secs: f64) -> f64 {
        if self.complete {
            return 1.0;
        }
        if total_secs <= 0.0 {
            return 0.0;
        }
        (self.out_time_secs / total_secs).clamp(0.0, 1.0)
    }

    /// [`ratio`](Self::ratio) as a whole percentage.
    pub fn percent(&self, total_secs: f64) -> u8 {
        (self.ratio(total_secs) * 100.0).round() as u8
    }
}

/// Accumulates `key=value` lines into [`RenderProgress`] snapshots.
#[derive(Debug, Default)]
pub struct ProgressParser {
    current: RenderProgress,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line. Returns a snapshot when the line closes a block.
    pub fn feed(&mut self, line: &str) -> Option<RenderProgress> {
        let (key, value) = line.trim().split_once('=')?;
        let value = value.trim();
        match key {
            // ffmpeg reports microseconds under both names.
            "out_time_us" | "out_time_ms" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.current.out_time_secs = (us / 1_000_000.0).max(0.0);
                }
            }
            "frame" => {
                if let Ok(frame) = value.parse() {
                    self.current.frame = frame;
                }
            }
            "fps" => {
                if let Ok(fps) = value.parse() {
                    self.current.fps = fps;
                }
            }
            "speed" => {
                if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                    self.current.speed = speed;
                }
            }
            "progress" => {
                self.current.complete = value == "end";
                return Some(self.current.clone());
            }
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_produces_snapshot() {
        let mut parser = ProgressParser::new();
        let block = "frame=150\nfps=48.5\nout_time_us=5000000\nspeed=1.62x\n";
        for line in block.lines() {
            assert!(parser.feed(line).is_none());
        }
        let snapshot = parser.feed("progress=continue").unwrap();
        assert_eq!(snapshot.frame, 150);
        assert_eq!(snapshot.fps, 48.5);
        assert_eq!(snapshot.out_time_secs, 5.0);
        assert!((snapshot.speed - 1.62).abs() < 1e-9);
        assert!(!snapshot.complete);
        assert_eq!(snapshot.percent(20.0), 25);
    }

    #[test]
    fn test_unparsable_values_keep_previous() {
        let mut parser = ProgressParser::new();
        parser.feed("speed=2x");
        parser.feed("speed=N/A");
        parser.feed("out_time_us=N/A");
        let snapshot = parser.feed("progress=continue").unwrap();
        assert_eq!(snapshot.speed, 2.0);
        assert_eq!(snapshot.out_time_secs, 0.0);
    }

    #[test]
    fn test_end_is_complete() {
        let mut parser = ProgressParser::new();
        parser.feed("out_time_us=1000000");
        let snapshot = parser.feed("progress=end").unwrap();
        assert!(snapshot.complete);
        assert_eq!(snapshot.ratio(60.0), 1.0);
    }

    #[test]
    fn test_ratio_is_clamped() {
        let progress = RenderProgress {
            out_time_secs: 90.0,
            ..Default::default()
        };
        assert_eq!(progress.ratio(60.0), 1.0);
        assert_eq!(progress.ratio(0.0), 0.0);
    }
}
