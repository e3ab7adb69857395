//! Export settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Which composition an export renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Fixed dashboard layout: first camera full, the rest as corner overlays.
    Standard,
    /// Replay of the recorded interaction timeline.
    #[default]
    Custom,
}

impl FromStr for ExportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("Unknown export mode: {s}. Use: standard, custom")),
        }
    }
}

/// Output frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Sizes offered by the export dialog.
    pub const PRESETS: [(Resolution, &'static str); 4] = [
        (Resolution::new(1280, 960), "Original"),
        (Resolution::new(1280, 720), "Landscape"),
        (Resolution::new(720, 1280), "Portrait"),
        (Resolution::new(720, 720), "Square"),
    ];

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::PRESETS[0].0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidResolution {
            value: s.to_string(),
        };
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let width = w.trim().parse::<u32>().map_err(|_| invalid())?;
        let height = h.trim().parse::<u32>().map_err(|_| invalid())?;
        if width < 2 || height < 2 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

/// Everything the render backend needs besides sources and the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub mode: ExportMode,
    pub resolution: Resolution,
    /// x264 constant rate factor.
    pub crf: u8,
    /// x264 preset.
    pub preset: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            mode: ExportMode::Custom,
            resolution: Resolution::default(),
            crf: 23,
            preset: "medium".to_string(),
        }
    }
}
