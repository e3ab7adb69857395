//! Export orchestration.
//!
//! Drives one export through its states:
//!
//! ```text
//! Idle → Preparing → Rendering → Succeeded | Failed | Cancelled
//! ```
//!
//! Preparing resolves sources into canonical order and builds the plan;
//! a Preparing failure never reaches Rendering.

use dashmix_common::error::{DashmixError, DashmixResult};
use dashmix_director::plan::{resolve_plan, CompositionPlan};
use dashmix_model::camera::{CameraAngle, CameraSet};
use dashmix_model::export::ExportSettings;
use dashmix_model::timeline::Timeline;

use crate::backend::{CancelHandle, RenderBackend, RenderCommand};
use crate::compositor::{build_command, input_name};
use crate::progress::RenderProgress;

/// Where an export currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Preparing,
    Rendering,
    Succeeded,
    Failed,
    Cancelled,
}

impl ExportState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// One camera's clip, already loaded.
#[derive(Debug, Clone)]
pub struct SourceClip {
    pub angle: CameraAngle,
    pub bytes: Vec<u8>,
}

/// Everything needed to export one event.
///
/// `sources` are in camera index order: the index a clip has here is the
/// index the timeline's interactions refer to.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub sources: Vec<SourceClip>,
    pub timeline: Timeline,
    pub settings: ExportSettings,
    /// Length of the longest clip.
    pub total_duration_secs: f64,
    /// Name of the encoded output.
    pub output_name: String,
}

impl ExportRequest {
    pub fn cameras(&self) -> CameraSet {
        CameraSet::from_discovery(self.sources.iter().map(|s| s.angle))
    }
}

/// Receives export progress. Every method defaults to doing nothing.
pub trait ExportObserver: Send + Sync {
    fn on_state(&self, _state: ExportState) {}
    fn on_progress(&self, _percent: u8, _fps: f64, _speed: f64) {}
    fn on_log(&self, _message: &str) {}
    fn on_complete(&self, _output: &[u8]) {}
    fn on_error(&self, _message: &str) {}
    fn on_cancelled(&self) {}
}

/// Observer that only logs through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ExportObserver for TracingObserver {
    fn on_state(&self, state: ExportState) {
        tracing::debug!(?state, "Export state changed");
    }

    fn on_progress(&self, percent: u8, fps: f64, speed: f64) {
        tracing::info!(percent, fps, speed, "Export progress");
    }

    fn on_log(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn on_complete(&self, output: &[u8]) {
        tracing::info!(bytes = output.len(), "Export complete");
    }

    fn on_error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn on_cancelled(&self) {
        tracing::warn!("Export cancelled");
    }
}

/// Runs exports against one render backend.
pub struct ExportOrchestrator<B: RenderBackend> {
    backend: B,
    state: ExportState,
    cancel: CancelHandle,
    plan: Option<CompositionPlan>,
    command: Option<RenderCommand>,
    output: Option<Vec<u8>>,
    last_error: Option<String>,
}

impl<B: RenderBackend> ExportOrchestrator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: ExportState::Idle,
            cancel: CancelHandle::new(),
            plan: None,
            command: None,
            output: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    /// A handle that cancels the running export from anywhere.
    ///
    /// A cancel issued while no export is running applies to the next
    /// [`export`](Self::export). The flag is cleared once an export reaches
    /// its final state.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Human-readable reason for the last failure.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Plan of the export in progress. Cleared once it finishes.
    pub fn plan(&self) -> Option<&CompositionPlan> {
        self.plan.as_ref()
    }

    /// Command of the export in progress. Cleared once it finishes.
    pub fn command(&self) -> Option<&RenderCommand> {
        self.command.as_ref()
    }

    /// Take the encoded output of the last successful export.
    pub fn take_output(&mut self) -> Option<Vec<u8>> {
        self.output.take()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run one export to completion. Returns the final state.
    pub async fn export(
        &mut self,
        request: ExportRequest,
        observer: &dyn ExportObserver,
    ) -> ExportState {
        self.output = None;
        self.last_error = None;

        tracing::info!(
            output = %request.output_name,
            mode = ?request.settings.mode,
            resolution = %request.settings.resolution,
            sources = request.sources.len(),
            interactions = request.timeline.len(),
            "Starting export"
        );

        self.transition(ExportState::Preparing, observer);
        let result = match self.prepare(&request, observer).await {
            Ok(command) => {
                self.transition(ExportState::Rendering, observer);
                self.render(&command, observer).await
            }
            Err(e) => Err(e),
        };

        let final_state = match result {
            Ok(bytes) => {
                observer.on_complete(&bytes);
                self.output = Some(bytes);
                ExportState::Succeeded
            }
            Err(DashmixError::Cancelled) => {
                observer.on_cancelled();
                ExportState::Cancelled
            }
            Err(e) => {
                let message = e.to_string();
                observer.on_error(&message);
                self.last_error = Some(message);
                ExportState::Failed
            }
        };

        self.plan = None;
        self.command = None;
        if let Err(e) = self.backend.cleanup().await {
            tracing::warn!(error = %e, backend = self.backend.name(), "Backend cleanup failed");
        }

        self.transition(final_state, observer);
        self.cancel.reset();
        final_state
    }

    async fn prepare(
        &mut self,
        request: &ExportRequest,
        observer: &dyn ExportObserver,
    ) -> DashmixResult<RenderCommand> {
        if self.cancel.is_cancelled() {
            return Err(DashmixError::Cancelled);
        }
        if request.sources.is_empty() {
            return Err(DashmixError::MissingCameraAngles);
        }

        observer.on_log(&format!("Loading {} backend", self.backend.name()));
        self.backend.load().await?;

        let cameras = request.cameras();
        let resolved = resolve_plan(
            request.settings.mode,
            &request.timeline,
            &cameras,
            request.total_duration_secs,
        )?;
        if resolved.fell_back {
            observer.on_log("No segments from interactions, using standard layout");
        }
        let plan = resolved.plan;

        for source in &plan.sources {
            if self.cancel.is_cancelled() {
                return Err(DashmixError::Cancelled);
            }
            let clip = &request.sources[source.camera];
            observer.on_log(&format!("Writing {} camera", source.angle.label()));
            self.backend
                .write_source(&input_name(source.input), &clip.bytes)
                .await?;
        }

        let command = build_command(&plan, &request.settings, &request.output_name)?;
        tracing::debug!(
            segments = plan.segments.len(),
            duration_secs = command.duration_secs,
            "Composition plan ready"
        );
        self.plan = Some(plan);
        self.command = Some(command.clone());
        Ok(command)
    }

    async fn render(
        &mut self,
        command: &RenderCommand,
        observer: &dyn ExportObserver,
    ) -> DashmixResult<Vec<u8>> {
        if self.cancel.is_cancelled() {
            return Err(DashmixError::Cancelled);
        }

        let total = command.duration_secs;
        let on_progress = |progress: RenderProgress| {
            observer.on_progress(progress.percent(total), progress.fps, progress.speed);
        };

        self.backend.run(command, &on_progress, &self.cancel).await?;

        // A cancel that lands after the encoder's last report still wins.
        if self.cancel.is_cancelled() {
            return Err(DashmixError::Cancelled);
        }

        self.backend.read_output(&command.output).await
    }

    fn transition(&mut self, state: ExportState, observer: &dyn ExportObserver) {
        tracing::debug!(from = ?self.state, to = ?state, "Export state");
        self.state = state;
        observer.on_state(state);
    }
}
