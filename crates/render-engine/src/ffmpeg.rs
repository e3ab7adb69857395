//! ffmpeg render backend.
//!
//! Runs the `ffmpeg` binary inside a private work directory. Sources are
//! written into the directory by name and the output is read back by name.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use dashmix_common::error::{DashmixError, DashmixResult};

use crate::backend::{CancelHandle, RenderBackend, RenderCommand};
use crate::progress::{ProgressParser, RenderProgress};

/// Backend driving a local ffmpeg install.
#[derive(Debug)]
pub struct FfmpegBackend {
    binary: String,
    work_dir: PathBuf,
    loaded: bool,
}

impl FfmpegBackend {
    /// Backend using `ffmpeg` from `PATH` and a fresh temp work directory.
    pub fn new() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!(
            "dashmix-render-{}-{nanos:08x}",
            std::process::id()
        ));
        Self::with_work_dir(dir)
    }

    pub fn with_work_dir(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: "ffmpeg".to_string(),
            work_dir: work_dir.into(),
            loaded: false,
        }
    }

    /// Use a specific ffmpeg binary.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn ensure_loaded(&self) -> DashmixResult<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(DashmixError::backend_run("ffmpeg backend used before load()"))
        }
    }

    fn resolve(&self, name: &str) -> DashmixResult<PathBuf> {
        let path = Path::new(name);
        if path.components().count() != 1 || path.is_absolute() {
            return Err(DashmixError::render(format!("Invalid work file name: {name}")));
        }
        Ok(self.work_dir.join(path))
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RenderBackend for FfmpegBackend {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn load(&mut self) -> DashmixResult<()> {
        if !command_exists(&self.binary).await {
            return Err(DashmixError::backend_load(format!(
                "{} not found in PATH",
                self.binary
            )));
        }
        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(|e| DashmixError::backend_load(format!("Failed to create work dir: {e}")))?;

        tracing::info!(
            binary = %self.binary,
            work_dir = %self.work_dir.display(),
            "ffmpeg backend ready"
        );
        self.loaded = true;
        Ok(())
    }

    async fn write_source(&mut self, name: &str, bytes: &[u8]) -> DashmixResult<()> {
        self.ensure_loaded()?;
        let path = self.resolve(name)?;
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(name, bytes = bytes.len(), "Wrote render source");
        Ok(())
    }

    async fn run(
        &mut self,
        command: &RenderCommand,
        progress: &(dyn Fn(RenderProgress) + Send + Sync),
        cancel: &CancelHandle,
    ) -> DashmixResult<()> {
        self.ensure_loaded()?;
        let output_path = self.resolve(&command.output)?;

        tracing::debug!(args = ?command.args, "Running ffmpeg");
        let started = Instant::now();
        let mut child = Command::new(&self.binary)
            .args(&command.args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DashmixError::backend_run(format!("Failed to start ffmpeg: {e}")))?;

        tracing::info!(
            pid = child.id(),
            inputs = command.inputs.len(),
            duration_secs = command.duration_secs,
            "ffmpeg process started"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DashmixError::backend_run("Failed to capture ffmpeg stdout"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| DashmixError::backend_run("Failed to capture ffmpeg stderr"))?;

        // Drain stderr so ffmpeg never blocks on a full pipe.
        let stderr_task = tokio::spawn(async move {
            let mut output = String::new();
            match stderr.read_to_string(&mut output).await {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut lines = BufReader::new(stdout).lines();
        let mut parser = ProgressParser::new();
        let mut cancelled = false;
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| DashmixError::backend_run(format!("Failed reading ffmpeg progress: {e}")))?
        {
            let Some(snapshot) = parser.feed(&line) else {
                continue;
            };
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            progress(snapshot);
        }

        if cancelled || cancel.is_cancelled() {
            tracing::info!(
                elapsed_secs = started.elapsed().as_secs_f64(),
                "Export cancelled, stopping ffmpeg"
            );
            let _ = child.kill().await;
            stderr_task.abort();
            let _ = tokio::fs::remove_file(&output_path).await;
            return Err(DashmixError::Cancelled);
        }

        let status = child
            .wait()
            .await
            .map_err(|e| DashmixError::backend_run(format!("Failed to wait on ffmpeg: {e}")))?;
        let stderr_output = stderr_task
            .await
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            let _ = tokio::fs::remove_file(&output_path).await;
            return Err(DashmixError::backend_run(format!(
                "ffmpeg exited with {status}: {}",
                stderr_output.trim()
            )));
        }

        tracing::info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            "ffmpeg finished"
        );
        Ok(())
    }

    async fn read_output(&mut self, name: &str) -> DashmixResult<Vec<u8>> {
        self.ensure_loaded()?;
        let path = self.resolve(name)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DashmixError::FileNotFound { path },
            _ => DashmixError::Io(e),
        })
    }

    async fn cleanup(&mut self) -> DashmixResult<()> {
        if tokio::fs::try_exists(&self.work_dir).await.unwrap_or(false) {
            tokio::fs::remove_dir_all(&self.work_dir).await?;
        }
        self.loaded = false;
        Ok(())
    }
}

/// Whether `binary` resolves on `PATH`.
pub async fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Media duration in seconds, via `ffprobe`.
pub async fn probe_duration(path: &Path) -> DashmixResult<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .await
        .map_err(|e| DashmixError::render(format!("Failed to run ffprobe: {e}")))?;

    if !output.status.success() {
        return Err(DashmixError::render(format!(
            "ffprobe failed for {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    parse_probe_duration(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
        DashmixError::render(format!("ffprobe returned no duration for {}", path.display()))
    })
}

fn parse_probe_duration(raw: &str) -> Option<f64> {
    raw.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
}
