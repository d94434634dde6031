//! Atomic file writes
//!
//! Content is written to a sibling `.tmp` file and renamed over the
//! destination, so readers never observe a half-written document.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Suffix appended to the destination file name while it is being written
pub const TEMP_SUFFIX: &str = ".tmp";

/// Path of the temporary sibling used while writing `path`
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(OsString::new);
    name.push(TEMP_SUFFIX);
    path.with_file_name(name)
}

/// Write `contents` to `path`, replacing any existing file atomically
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = temp_path(path);

    let written = File::create(&tmp)
        .with_context(|| format!("Failed to create {}", tmp.display()))
        .and_then(|mut file| {
            file.write_all(contents)
                .and_then(|_| file.sync_all())
                .with_context(|| format!("Failed to write {}", tmp.display()))
        });

    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        anyhow::Error::new(e).context(format!("Failed to move {} into place", path.display()))
    })
}
