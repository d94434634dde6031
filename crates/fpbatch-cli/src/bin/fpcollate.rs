//! fpcollate - Merge per-file JSON documents into one JSONL file
//!
//! Usage: fpcollate -i <json_dir> -o <output.jsonl>

use anyhow::{Context, Result};
use clap::Parser;
use fpbatch_cli::output::{
    check_collation, collation_summary, create_progress_bar, init_logger, print_json_summary,
};
use fpbatch_core::{BatchConfig, CollationReport, Collator};
use indicatif::ProgressBar;
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "fpcollate")]
#[command(about = "Collate a directory of JSON documents into a JSONL file", long_about = None)]
struct Args {
    /// Directory containing the per-file JSON documents
    #[arg(short, long)]
    input_dir: String,

    /// Destination JSONL file
    #[arg(short, long)]
    output: String,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// Document extension, without the dot (overrides the config file)
    #[arg(long)]
    extension: Option<String>,

    /// Only read documents directly inside the input directory
    #[arg(long)]
    no_recursive: bool,

    /// Add a PATH key with the source document path to every line
    #[arg(long)]
    with_path: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(args.verbose);

    let config = load_config(&args)?;
    let progress = create_progress_bar("Collating", args.verbose);
    let report = run_fpcollate(Path::new(&args.input_dir), Path::new(&args.output), &config, progress)?;

    check_collation(&report)
}

/// Load the config file (if any) and apply command line overrides
fn load_config(args: &Args) -> Result<BatchConfig> {
    let mut config = BatchConfig::load_or_default(args.config.as_deref().map(Path::new))
        .context("Failed to load configuration")?;

    if let Some(extension) = &args.extension {
        config.collator.extension = extension.clone();
    }
    if args.no_recursive {
        config.collator.recursive = false;
    }
    if args.with_path {
        config.collator.include_path = true;
    }

    config.validate()?;
    Ok(config)
}

fn run_fpcollate(
    input_dir: &Path,
    output: &Path,
    config: &BatchConfig,
    progress: ProgressBar,
) -> Result<CollationReport> {
    let collator = Collator::new(config.collator.clone()).progress(progress);
    let report = collator.run(input_dir, output)?;

    print_json_summary(&collation_summary(input_dir, output, &report));

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["fpcollate", "-i", "fp", "-o", "all.jsonl"]);
        assert_eq!(args.input_dir, "fp");
        assert_eq!(args.output, "all.jsonl");
        assert!(!args.with_path);
        assert!(!args.no_recursive);

        let args = Args::parse_from([
            "fpcollate",
            "--input-dir",
            "fp",
            "--output",
            "all.jsonl",
            "--extension",
            "fp.json",
            "--no-recursive",
            "--with-path",
        ]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.collator.extension, "fp.json");
        assert!(!config.collator.recursive);
        assert!(config.collator.include_path);
    }

    #[test]
    fn test_invalid_extension_override() {
        let args = Args::parse_from(["fpcollate", "-i", "fp", "-o", "o.jsonl", "--extension", ".json"]);
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn test_missing_input_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_fpcollate(
            &dir.path().join("missing"),
            &dir.path().join("out.jsonl"),
            &BatchConfig::default(),
            ProgressBar::hidden(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("input not found"));
    }

    #[test]
    fn test_with_path_lines() {
        let dir = tempfile::tempdir().unwrap();
        let fp_dir = dir.path().join("fp");
        fs::create_dir_all(&fp_dir).unwrap();
        fs::write(fp_dir.join("a.json"), r#"{"uuid": "a"}"#).unwrap();

        let mut config = BatchConfig::default();
        config.collator.include_path = true;
        let output = dir.path().join("out.jsonl");
        let report = run_fpcollate(&fp_dir, &output, &config, ProgressBar::hidden()).unwrap();
        assert_eq!(report.records, 1);
        assert!(check_collation(&report).is_ok());

        let line: serde_json::Value =
            serde_json::from_str(fs::read_to_string(&output).unwrap().trim_end()).unwrap();
        assert_eq!(line["PATH"], fp_dir.join("a.json").display().to_string());
    }

    #[test]
    fn test_parse_failure_gives_error_exit() {
        let dir = tempfile::tempdir().unwrap();
        let fp_dir = dir.path().join("fp");
        fs::create_dir_all(&fp_dir).unwrap();
        fs::write(fp_dir.join("a.json"), r#"{"uuid": "a"}"#).unwrap();
        fs::write(fp_dir.join("b.json"), "{").unwrap();

        let output = dir.path().join("out.jsonl");
        let report =
            run_fpcollate(&fp_dir, &output, &BatchConfig::default(), ProgressBar::hidden()).unwrap();

        assert_eq!(report.records, 1);
        assert!(output.is_file());
        let err = check_collation(&report).unwrap_err();
        assert!(err.to_string().contains("1 of 2 documents"));
    }
}
