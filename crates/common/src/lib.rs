//! DashMix Common Utilities
//!
//! Shared infrastructure for all DashMix crates:
//! - Error types and result aliases
//! - Playback clock and multi-camera sync utilities
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
