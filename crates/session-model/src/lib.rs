//! DashMix Session Model
//!
//! Defines the core data contracts for DashMix sessions:
//! - **Cameras:** The four fixed dashcam angles and per-event index assignment
//! - **Clips:** Filename parsing and grouping of clip files into events
//! - **Interactions:** Timestamped user actions recorded during live playback
//! - **Timeline:** The ordered interaction log and its JSONL persistence
//! - **Layout:** Normalized screen regions used by composition plans
//! - **Export:** Resolution presets and encoder settings
//!
//! All region coordinates are normalized to `[0.0, 1.0]` relative to the
//! output frame so plans survive resolution changes.

pub mod camera;
pub mod clip;
pub mod error;
pub mod export;
pub mod interaction;
pub mod layout;
pub mod timeline;

pub use camera::*;
pub use clip::*;
pub use error::*;
pub use export::*;
pub use interaction::*;
pub use layout::*;
pub use timeline::*;
