//! Per-file fingerprint document
//!
//! One `FingerprintRecord` is written per audio file as `<uuid>.json`.
//! The tool payload is flattened next to the identifier fields.

use crate::atomic::write_atomic;
use crate::payload::FingerprintPayload;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Key holding the asset identifier
pub const UUID_KEY: &str = "uuid";

/// Key holding the audio path the record was computed from
pub const SOURCE_PATH_KEY: &str = "source_path";

/// Complete per-file document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    pub uuid: Uuid,
    pub source_path: String,
    #[serde(flatten)]
    pub payload: FingerprintPayload,
}

impl FingerprintRecord {
    /// Create a record, dropping payload keys that would shadow the
    /// identifier fields
    pub fn new(uuid: Uuid, source_path: impl Into<String>, mut payload: FingerprintPayload) -> Self {
        for key in [UUID_KEY, SOURCE_PATH_KEY] {
            if payload.remove(key).is_some() {
                log::warn!("Dropping reserved key '{}' from fingerprint payload", key);
            }
        }

        Self {
            uuid,
            source_path: source_path.into(),
            payload,
        }
    }

    /// Document file name for this record: `<uuid>.json`
    pub fn file_name(&self) -> String {
        format!("{}.json", self.uuid)
    }

    /// Full document path inside `dir`
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }

    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save to JSON file, replacing any previous version atomically
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let mut json_str = self.to_json_pretty()?;
        json_str.push('\n');
        write_atomic(path, json_str.as_bytes())
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json_str = std::fs::read_to_string(path)?;
        let record: FingerprintRecord = serde_json::from_str(&json_str)?;
        Ok(record)
    }
}
