//! Fingerprint extraction stage
//!
//! Fingerprints each audio file with a `FingerprintProvider` and writes one
//! `<uuid>.json` document per file. A failing file is reported and skipped;
//! only problems with the output directory abort the run.

use crate::error::{BatchError, ItemFailure};
use crate::identifier::extract_identifier;
use crate::provider::FingerprintProvider;
use fpbatch_record::FingerprintRecord;
use indicatif::ProgressBar;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// What happened to a single audio file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Written { uuid: Uuid, document: PathBuf },
    /// The document already existed and recomputation was not requested
    Skipped { uuid: Uuid, document: PathBuf },
}

/// Summary of an extraction run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionReport {
    pub total: usize,
    pub written: usize,
    pub skipped: usize,
    pub failures: Vec<ItemFailure>,
}

impl ExtractionReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Extractor<P> {
    provider: P,
    output_dir: PathBuf,
    skip_existing: bool,
    progress: ProgressBar,
}

impl<P: FingerprintProvider> Extractor<P> {
    /// Create an extractor writing into `output_dir`. Existing documents
    /// are skipped unless `skip_existing(false)` is set.
    pub fn new(provider: P, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            output_dir: output_dir.into(),
            skip_existing: true,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    /// Advance `bar` once per audio file
    pub fn progress(mut self, bar: ProgressBar) -> Self {
        self.progress = bar;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the document for `uuid`
    pub fn document_path(&self, uuid: &Uuid) -> PathBuf {
        self.output_dir.join(format!("{}.json", uuid))
    }

    /// Process every path in order.
    ///
    /// Returns `Err` only when the output directory cannot be prepared.
    /// Per-file failures land in the report.
    pub fn run(&self, audio_paths: &[PathBuf]) -> Result<ExtractionReport, BatchError> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| BatchError::write_failure(&self.output_dir, e))?;

        let total = audio_paths.len();
        let mut report = ExtractionReport {
            total,
            ..Default::default()
        };
        let mut produced: HashMap<Uuid, PathBuf> = HashMap::new();
        self.progress.set_length(total as u64);

        for (index, path) in audio_paths.iter().enumerate() {
            log::info!("[{}/{}] {}", index + 1, total, path.display());
            if let Some(name) = path.file_name() {
                self.progress.set_message(name.to_string_lossy().into_owned());
            }

            let result = self.identify(path, &produced).and_then(|uuid| self.process(path, uuid));
            match result {
                Ok(ItemOutcome::Written { uuid, document }) => {
                    log::debug!("  wrote {}", document.display());
                    produced.insert(uuid, path.clone());
                    report.written += 1;
                }
                Ok(ItemOutcome::Skipped { uuid, document }) => {
                    log::debug!("  skipped, {} already exists", document.display());
                    produced.insert(uuid, path.clone());
                    report.skipped += 1;
                }
                Err(err) => {
                    log::error!("{}", err);
                    report.failures.push(ItemFailure::new(path, &err));
                }
            }
            self.progress.inc(1);
        }
        self.progress.finish_and_clear();

        log::info!(
            "Extraction finished: {} written, {} skipped, {} failed of {}",
            report.written,
            report.skipped,
            report.failed(),
            total
        );

        Ok(report)
    }

    /// Fingerprint one file under a known identifier and write its document
    pub fn process(&self, path: &Path, uuid: Uuid) -> Result<ItemOutcome, BatchError> {
        let document = self.document_path(&uuid);

        if self.skip_existing && document.is_file() {
            return Ok(ItemOutcome::Skipped { uuid, document });
        }

        let payload = self
            .provider
            .fingerprint(path)
            .map_err(|source| BatchError::DecodeFailure {
                path: path.to_path_buf(),
                source,
            })?;

        let record = FingerprintRecord::new(uuid, path.display().to_string(), payload);
        record
            .save(&document)
            .map_err(|e| BatchError::write_failure(&document, e))?;

        Ok(ItemOutcome::Written { uuid, document })
    }

    fn identify(&self, path: &Path, produced: &HashMap<Uuid, PathBuf>) -> Result<Uuid, BatchError> {
        let uuid = extract_identifier(path).map_err(|source| BatchError::InvalidIdentifier {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(first) = produced.get(&uuid) {
            return Err(BatchError::DuplicateIdentifier {
                path: path.to_path_buf(),
                uuid,
                first: first.clone(),
            });
        }

        Ok(uuid)
    }
}
