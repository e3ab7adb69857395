//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Which dashcam clip folder to scan (`RecentClips`, `SentryClips`, `SavedClips`).
    pub clip_folder: String,

    /// Default export parameters.
    pub export: ExportDefaults,

    /// Live playback parameters.
    pub playback: PlaybackDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default export parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Output resolution as `WIDTHxHEIGHT`.
    pub resolution: String,

    /// x264 constant rate factor.
    pub crf: u8,

    /// x264 preset.
    pub preset: String,

    /// `standard` or `custom`.
    pub mode: String,

    /// Directory exports are written to.
    pub output_dir: PathBuf,
}

/// Live playback parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackDefaults {
    /// Maximum drift (seconds) tolerated between camera playheads before re-seek.
    pub sync_tolerance_secs: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "dashmix=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            clip_folder: "RecentClips".to_string(),
            export: ExportDefaults::default(),
            playback: PlaybackDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            resolution: "1280x960".to_string(),
            crf: 23,
            preset: "medium".to_string(),
            mode: "custom".to_string(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl Default for PlaybackDefaults {
    fn default() -> Self {
        Self {
            sync_tolerance_secs: 0.1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("dashmix").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.clip_folder, "RecentClips");
        assert_eq!(config.export.resolution, "1280x960");
        assert_eq!(config.export.crf, 23);
        assert!((config.playback.sync_tolerance_secs - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_partial_config_fills_missing_fields() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"clip_folder":"SentryClips","export":{"crf":18}}"#).unwrap();
        assert_eq!(parsed.clip_folder, "SentryClips");
        assert_eq!(parsed.export.crf, 18);
        assert_eq!(parsed.export.preset, "medium");
        assert_eq!(parsed.logging.level, "info");
    }
}
