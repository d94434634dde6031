//! JSONL writer
//!
//! Lines are streamed into a temporary sibling of the destination and moved
//! into place by `finish`, so an interrupted run never leaves a truncated
//! JSONL file behind.

use crate::atomic::temp_path;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct JsonlWriter {
    path: PathBuf,
    tmp_path: PathBuf,
    writer: BufWriter<File>,
    lines: usize,
}

impl JsonlWriter {
    /// Start writing to `path`. The parent directory must already exist.
    pub fn create(path: &Path) -> Result<Self> {
        let tmp_path = temp_path(path);
        let file = File::create(&tmp_path)
            .with_context(|| format!("Failed to create JSONL file: {}", tmp_path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            tmp_path,
            writer: BufWriter::new(file),
            lines: 0,
        })
    }

    /// Append one object as a single compact line
    pub fn write_object(&mut self, object: &Map<String, Value>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, object)
            .with_context(|| format!("Failed to write line {} of {}", self.lines + 1, self.path.display()))?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    /// Number of lines written so far
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Flush and move the file into place. Returns the number of lines.
    pub fn finish(self) -> Result<usize> {
        let file = self
            .writer
            .into_inner()
            .map_err(|e| e.into_error())
            .with_context(|| format!("Failed to flush {}", self.tmp_path.display()))?;
        file.sync_all()?;
        drop(file);

        fs::rename(&self.tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&self.tmp_path);
            anyhow::Error::new(e).context(format!("Failed to move {} into place", self.path.display()))
        })?;

        Ok(self.lines)
    }

    /// Discard everything written so far
    pub fn abandon(self) {
        drop(self.writer);
        let _ = fs::remove_file(&self.tmp_path);
    }
}
