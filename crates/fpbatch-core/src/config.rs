//! Batch configuration
//!
//! Optional TOML file with one table per stage. Every field has a default,
//! so an empty file (or no file at all) yields a working setup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BatchConfig {
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub collator: CollatorConfig,
}

/// Fingerprint extraction settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    /// fpcalc binary, looked up on PATH unless absolute
    #[serde(default = "default_fpcalc_path")]
    pub fpcalc_path: String,
    /// Extra arguments placed before the audio path (e.g. `["-length", "120"]`)
    #[serde(default)]
    pub fpcalc_args: Vec<String>,
    /// Audio extensions picked up when the input is a directory
    #[serde(default = "default_audio_extensions")]
    pub extensions: Vec<String>,
    /// Leave files whose `<uuid>.json` already exists untouched
    #[serde(default = "default_skip_existing")]
    pub skip_existing: bool,
    /// Per-file limit for the external tool in seconds, 0 disables it
    #[serde(default)]
    pub timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            fpcalc_path: default_fpcalc_path(),
            fpcalc_args: Vec::new(),
            extensions: default_audio_extensions(),
            skip_existing: default_skip_existing(),
            timeout_secs: 0,
        }
    }
}

impl ExtractorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

fn default_fpcalc_path() -> String {
    "fpcalc".to_string()
}

fn default_audio_extensions() -> Vec<String> {
    ["wav", "mp3", "flac", "webm", "mp4", "m4a"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_skip_existing() -> bool {
    true
}

/// JSONL collation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollatorConfig {
    /// Extension of the per-file documents, without the dot
    #[serde(default = "default_document_extension")]
    pub extension: String,
    /// Descend into subdirectories
    #[serde(default = "default_recursive")]
    pub recursive: bool,
    /// Add a `PATH` key with the source document path to every line
    #[serde(default)]
    pub include_path: bool,
}

impl Default for CollatorConfig {
    fn default() -> Self {
        Self {
            extension: default_document_extension(),
            recursive: default_recursive(),
            include_path: false,
        }
    }
}

fn default_document_extension() -> String {
    "json".to_string()
}

fn default_recursive() -> bool {
    true
}

impl BatchConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: BatchConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?;
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.extractor.fpcalc_path.trim().is_empty() {
            anyhow::bail!("extractor.fpcalc_path must not be empty");
        }
        if self.extractor.extensions.is_empty() {
            anyhow::bail!("extractor.extensions must list at least one extension");
        }
        if self.collator.extension.trim().is_empty() {
            anyhow::bail!("collator.extension must not be empty");
        }
        if self.collator.extension.starts_with('.') {
            anyhow::bail!("collator.extension must not start with '.'");
        }
        Ok(())
    }
}
