//! Errors raised while reading or interpreting session data.

use std::path::PathBuf;

/// Errors that can occur when working with clips, timelines, and settings.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Not a dashcam clip name: {name}")]
    InvalidClipName { name: String },

    #[error("Invalid resolution '{value}', expected WIDTHxHEIGHT")]
    InvalidResolution { value: String },

    #[error("Invalid session file: {message}")]
    ValidationError { message: String },
}
