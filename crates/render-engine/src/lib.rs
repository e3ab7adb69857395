//! DashMix Render Engine
//!
//! Turns a composition plan plus the camera clips of one event into a
//! single encoded video.
//!
//! # Pipeline Architecture
//!
//! ```text
//! clips ──────────┐
//!                 ├── canonical order (front, rear, left, right)
//! timeline ──┐    │          │
//!            ├── plan ───────┼── filter graph (trim/scale/overlay/concat)
//! settings ──┘               │
//!                            ▼
//!                      render backend (ffmpeg, H.264)
//!                            │
//!                            ▼
//!                 dashcam_<date>_<time>.mp4
//! ```

pub mod backend;
pub mod compositor;
pub mod export;
pub mod ffmpeg;
pub mod progress;

pub use backend::{CancelHandle, RenderBackend, RenderCommand};
pub use export::*;
pub use ffmpeg::FfmpegBackend;
pub use progress::{ProgressParser, RenderProgress};
