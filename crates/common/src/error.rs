//! Error types shared across DashMix crates.

use std::path::PathBuf;

/// Top-level error type for DashMix operations.
#[derive(Debug, thiserror::Error)]
pub enum DashmixError {
    /// No recognizable camera clip could be resolved for an export.
    #[error("No camera angles found")]
    MissingCameraAngles,

    /// The interaction timeline compiled to zero segments.
    #[error("Timeline produced an empty composition")]
    EmptyComposition,

    #[error("Render backend failed to load: {message}")]
    BackendLoad { message: String },

    #[error("Render backend failed: {message}")]
    BackendRun { message: String },

    #[error("Export cancelled by user")]
    Cancelled,

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using DashmixError.
pub type DashmixResult<T> = Result<T, DashmixError>;

impl DashmixError {
    pub fn backend_load(msg: impl Into<String>) -> Self {
        Self::BackendLoad {
            message: msg.into(),
        }
    }

    pub fn backend_run(msg: impl Into<String>) -> Self {
        Self::BackendRun {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error represents a user cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_human_readable() {
        assert_eq!(
            DashmixError::MissingCameraAngles.to_string(),
            "No camera angles found"
        );
        assert!(DashmixError::backend_run("exit status 1")
            .to_string()
            .contains("exit status 1"));
        assert!(DashmixError::backend_load("ffmpeg missing")
            .to_string()
            .starts_with("Render backend failed to load"));
    }

    #[test]
    fn test_cancelled_is_not_a_failure_variant() {
        assert!(DashmixError::Cancelled.is_cancelled());
        assert!(!DashmixError::EmptyComposition.is_cancelled());
    }
}
