//! JSONL collation stage
//!
//! Reads every per-file document under a directory in path order and
//! writes each one as a compact line of a single JSONL file.

use crate::config::CollatorConfig;
use crate::error::{BatchError, ItemFailure};
use crate::input::find_documents;
use fpbatch_record::JsonlWriter;
use indicatif::ProgressBar;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Key added to each line when `include_path` is set
pub const PATH_KEY: &str = "PATH";

/// Summary of a collation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollationReport {
    /// Documents considered
    pub found: usize,
    /// Lines written
    pub records: usize,
    pub failures: Vec<ItemFailure>,
}

impl CollationReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Collator {
    config: CollatorConfig,
    progress: ProgressBar,
}

impl Collator {
    pub fn new(config: CollatorConfig) -> Self {
        Self {
            config,
            progress: ProgressBar::hidden(),
        }
    }

    /// Advance `bar` once per document
    pub fn progress(mut self, bar: ProgressBar) -> Self {
        self.progress = bar;
        self
    }

    /// Collate `input_dir` into `output`.
    ///
    /// The output is always created, even when no documents are found.
    /// Unparsable or unreadable documents are reported and left out; a
    /// missing input directory, an output that would overwrite one of the
    /// documents, or an unwritable output aborts the run.
    pub fn run(&self, input_dir: &Path, output: &Path) -> Result<CollationReport, BatchError> {
        if !input_dir.is_dir() {
            return Err(BatchError::InputNotFound(input_dir.to_path_buf()));
        }

        let listing = find_documents(input_dir, &self.config.extension, self.config.recursive)?;
        if let Some(document) = listing.documents.iter().find(|d| is_same_file(d, output)) {
            return Err(BatchError::write_failure(
                output,
                format!("output would overwrite source document {}", document.display()),
            ));
        }

        let documents = listing.documents;
        log::info!("Found {} documents in {}", documents.len(), input_dir.display());

        let mut report = CollationReport {
            found: documents.len() + listing.unreadable.len(),
            ..Default::default()
        };
        for err in listing.unreadable {
            log::error!("{}", err);
            report.failures.push(ItemFailure::new(err.path(), &err));
        }

        let mut writer = JsonlWriter::create(output).map_err(|e| BatchError::write_failure(output, e))?;
        self.progress.set_length(documents.len() as u64);

        for document in &documents {
            self.progress.inc(1);
            let object = match load_document(document, self.config.include_path) {
                Ok(object) => object,
                Err(err) => {
                    log::error!("{}", err);
                    report.failures.push(ItemFailure::new(document, &err));
                    continue;
                }
            };

            if let Err(e) = writer.write_object(&object) {
                writer.abandon();
                self.progress.abandon();
                return Err(BatchError::write_failure(output, e));
            }
            report.records += 1;
        }
        self.progress.finish_and_clear();

        writer.finish().map_err(|e| BatchError::write_failure(output, e))?;

        log::info!(
            "Saved {} records to {} ({} failed)",
            report.records,
            output.display(),
            report.failed()
        );

        Ok(report)
    }
}

/// Read one document and check that it holds exactly one JSON object
pub fn load_document(path: &Path, include_path: bool) -> Result<Map<String, Value>, BatchError> {
    let parse_failure = |reason: String| BatchError::ParseFailure {
        path: path.to_path_buf(),
        reason,
    };

    let content = fs::read_to_string(path).map_err(|e| parse_failure(e.to_string()))?;
    let value: Value = serde_json::from_str(&content).map_err(|e| parse_failure(e.to_string()))?;

    match value {
        Value::Object(mut object) => {
            if include_path {
                object.insert(PATH_KEY.to_string(), Value::String(path.display().to_string()));
            }
            Ok(object)
        }
        other => Err(parse_failure(format!(
            "expected a JSON object, found {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
