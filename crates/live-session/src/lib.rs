//! DashMix live session.
//!
//! Owns everything that exists while one event is loaded for playback:
//! the clip handles, the shared playhead, and the interaction recorder
//! that keeps the timeline and camera state in lockstep.

pub mod handles;
pub mod live;
pub mod recorder;
pub mod writer;

pub use handles::{ClipHandle, HandleRegistry};
pub use live::{LiveSession, SyncCorrection};
pub use recorder::InteractionRecorder;
pub use writer::InteractionWriter;
