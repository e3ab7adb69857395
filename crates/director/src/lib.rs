//! DashMix Director
//!
//! Turns a recorded interaction timeline into a composition plan:
//! - **State Tracker:** Per-camera hidden/active/rate state driven by interactions
//! - **Segment Compiler:** Replays the timeline into disjoint time segments
//! - **Plan Builder:** Assigns every visible camera a screen region per segment
//!
//! This crate is pure computation with no I/O and no rendering.
//! All inputs are data; all outputs are data.

pub mod compiler;
pub mod plan;
pub mod state;

pub use compiler::{compile_segments, Segment, SegmentCompiler};
pub use plan::{
    build_plan, layout_cameras, resolve_plan, standard_plan, CompositionPlan, Placement,
    PlanSource, ResolvedPlan, SegmentLayout,
};
pub use state::{CameraState, CameraStates};
