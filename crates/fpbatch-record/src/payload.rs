//! Output of the external fingerprinting tool
//!
//! The payload is treated as opaque key/value data. Only the presence of the
//! duration and fingerprint fields is checked.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key under which fpcalc reports the audio duration (seconds)
pub const DURATION_KEY: &str = "DURATION";

/// Key under which fpcalc reports the encoded fingerprint
pub const FINGERPRINT_KEY: &str = "FINGERPRINT";

/// Key/value fields reported by the fingerprinting tool.
///
/// Stored in a `BTreeMap` so serialization order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingerprintPayload {
    fields: BTreeMap<String, String>,
}

impl FingerprintPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a payload with the two required fields
    pub fn with_fingerprint(duration: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        let mut payload = Self::new();
        payload.insert(DURATION_KEY, duration);
        payload.insert(FINGERPRINT_KEY, fingerprint);
        payload
    }

    /// Parse `KEY=VALUE` lines as printed by fpcalc.
    ///
    /// Lines without `=` are ignored. Values may themselves contain `=`
    /// (base64 padding), so only the first one splits.
    pub fn parse_fpcalc_output(output: &str) -> Self {
        let mut payload = Self::new();
        for line in output.lines() {
            if let Some((key, value)) = line.trim().split_once('=') {
                let key = key.trim();
                if !key.is_empty() {
                    payload.insert(key, value.trim());
                }
            }
        }
        payload
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.get(FINGERPRINT_KEY)
    }

    /// Duration in seconds, if present and numeric
    pub fn duration_secs(&self) -> Option<f64> {
        self.get(DURATION_KEY).and_then(|d| d.parse().ok())
    }

    /// First required field that is absent or empty
    pub fn missing_required(&self) -> Option<&'static str> {
        [DURATION_KEY, FINGERPRINT_KEY]
            .into_iter()
            .find(|key| self.get(key).map_or(true, str::is_empty))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
