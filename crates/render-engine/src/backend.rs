//! Render backend contract.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmix_common::error::DashmixResult;

use crate::progress::RenderProgress;

/// Shared cancellation flag. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// A fully built encoder invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCommand {
    /// Arguments after the program name.
    pub args: Vec<String>,
    /// Source names the arguments refer to, in input order.
    pub inputs: Vec<String>,
    /// Name of the file the encoder writes.
    pub output: String,
    /// Expected output length, used for the progress ratio.
    pub duration_secs: f64,
}

/// An encode/overlay engine that sees named files and a command.
///
/// Backends work in their own file namespace: sources are written in by
/// name, the output is read back by name.
#[async_trait::async_trait]
pub trait RenderBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Make the backend ready. Fails with `BackendLoad` when unavailable.
    async fn load(&mut self) -> DashmixResult<()>;

    /// Store a source file under `name`.
    async fn write_source(&mut self, name: &str, bytes: &[u8]) -> DashmixResult<()>;

    /// Run the encoder. Must check `cancel` on every progress report and,
    /// once it is set, stop the encoder, discard partial output and return
    /// `Cancelled`.
    async fn run(
        &mut self,
        command: &RenderCommand,
        progress: &(dyn Fn(RenderProgress) + Send + Sync),
        cancel: &CancelHandle,
    ) -> DashmixResult<()>;

    /// Read a file the encoder produced.
    async fn read_output(&mut self, name: &str) -> DashmixResult<Vec<u8>>;

    /// Drop every file written or produced so far.
    async fn cleanup(&mut self) -> DashmixResult<()> {
        Ok(())
    }
}
