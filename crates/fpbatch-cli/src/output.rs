//! Logging setup, progress bars and JSON run summaries
//!
//! Diagnostics and the progress bar go to stderr; the summary of a run is
//! printed as JSON on stdout so it can be consumed by other tooling.

use anyhow::Result;
use fpbatch_core::{CollationReport, ExtractionReport};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde_json::{json, Value};
use std::path::Path;

/// Initialize logger. Failures are always shown; `verbose` adds progress.
/// `RUST_LOG` takes precedence over both.
pub fn init_logger(verbose: bool) {
    let log_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

/// Progress bar on stderr. Hidden in verbose mode so it does not fight
/// with the log lines; indicatif also stays silent when stderr is not a
/// terminal.
pub fn create_progress_bar(msg: &str, verbose: bool) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    if verbose {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    } else {
        let style = ProgressStyle::default_bar()
            .template("{prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        pb.set_style(style);
    }
    pb.set_prefix(msg.to_string());
    pb
}

fn status(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "partial_failure"
    }
}

pub fn extraction_summary(input: &Path, output_dir: &Path, report: &ExtractionReport) -> Value {
    json!({
        "status": status(report.is_success()),
        "input": input.display().to_string(),
        "output_dir": output_dir.display().to_string(),
        "total": report.total,
        "written": report.written,
        "skipped": report.skipped,
        "failed": report.failed(),
        "failures": report.failures,
    })
}

pub fn collation_summary(input_dir: &Path, output: &Path, report: &CollationReport) -> Value {
    json!({
        "status": status(report.is_success()),
        "input_dir": input_dir.display().to_string(),
        "output": output.display().to_string(),
        "found": report.found,
        "records": report.records,
        "failed": report.failed(),
        "failures": report.failures,
    })
}

/// Turn per-file failures into a non-zero exit
pub fn check_extraction(report: &ExtractionReport) -> Result<()> {
    if !report.is_success() {
        anyhow::bail!("{} of {} files failed to fingerprint", report.failed(), report.total);
    }
    Ok(())
}

/// Turn unreadable or unparsable documents into a non-zero exit
pub fn check_collation(report: &CollationReport) -> Result<()> {
    if !report.is_success() {
        anyhow::bail!("{} of {} documents could not be collated", report.failed(), report.found);
    }
    Ok(())
}

/// Print a summary as pretty JSON on stdout
pub fn print_json_summary(summary: &Value) {
    match serde_json::to_string_pretty(summary) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing summary: {}", e),
    }
}
