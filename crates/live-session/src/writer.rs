//! Append-only interaction writer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use dashmix_common::error::{DashmixError, DashmixResult};
use dashmix_model::interaction::Interaction;
use dashmix_model::timeline::SessionHeader;

/// Writes interactions to a JSONL session file as they are recorded.
///
/// Interactions arrive at human pace, so every line is flushed.
pub struct InteractionWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    interactions_written: u64,
}

impl InteractionWriter {
    /// Create the session file, writing the header as the first line.
    pub fn create(path: impl Into<PathBuf>, header: &SessionHeader) -> DashmixResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        let mut writer = BufWriter::new(file);
        let header_json = serde_json::to_string(header)?;
        writeln!(writer, "# {header_json}")
            .map_err(|e| DashmixError::session(format!("Failed to write header: {e}")))?;

        let mut this = Self {
            writer,
            path,
            interactions_written: 0,
        };
        this.flush()?;
        Ok(this)
    }

    /// Append one interaction.
    pub fn write(&mut self, interaction: &Interaction) -> DashmixResult<()> {
        let json = serde_json::to_string(interaction)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| DashmixError::session(format!("Failed to write interaction: {e}")))?;
        self.interactions_written += 1;
        self.flush()
    }

    pub fn flush(&mut self) -> DashmixResult<()> {
        self.writer
            .flush()
            .map_err(|e| DashmixError::session(format!("Failed to flush session file: {e}")))
    }

    pub fn interactions_written(&self) -> u64 {
        self.interactions_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InteractionWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
