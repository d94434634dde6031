//! fpextract - Fingerprint audio files into per-file JSON documents
//!
//! Usage: fpextract -i <list.txt|audio_dir> -o <output_dir>

use anyhow::{Context, Result};
use clap::Parser;
use fpbatch_cli::output::{
    check_extraction, create_progress_bar, extraction_summary, init_logger, print_json_summary,
};
use fpbatch_core::input::collect_audio_paths;
use fpbatch_core::{BatchConfig, ExtractionReport, Extractor, FpcalcProvider};
use indicatif::ProgressBar;
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "fpextract")]
#[command(about = "Fingerprint audio files with fpcalc and write one <uuid>.json per file", long_about = None)]
struct Args {
    /// Text file listing audio paths (one per line) or a directory of audio files
    #[arg(short, long)]
    input: String,

    /// Output directory for the <uuid>.json documents
    #[arg(short, long)]
    output_dir: String,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<String>,

    /// fpcalc binary to run (overrides the config file)
    #[arg(long)]
    fpcalc: Option<String>,

    /// Recompute documents that already exist
    #[arg(long)]
    force: bool,

    /// Per-file timeout for fpcalc in seconds (0 disables it)
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(args.verbose);

    let config = load_config(&args)?;
    let progress = create_progress_bar("Fingerprinting", args.verbose);
    let report = run_fpextract(Path::new(&args.input), Path::new(&args.output_dir), &config, progress)?;

    check_extraction(&report)
}

/// Load the config file (if any) and apply command line overrides
fn load_config(args: &Args) -> Result<BatchConfig> {
    let mut config = BatchConfig::load_or_default(args.config.as_deref().map(Path::new))
        .context("Failed to load configuration")?;

    if let Some(fpcalc) = &args.fpcalc {
        config.extractor.fpcalc_path = fpcalc.clone();
    }
    if let Some(timeout) = args.timeout {
        config.extractor.timeout_secs = timeout;
    }
    if args.force {
        config.extractor.skip_existing = false;
    }

    config.validate()?;
    Ok(config)
}

fn run_fpextract(
    input: &Path,
    output_dir: &Path,
    config: &BatchConfig,
    progress: ProgressBar,
) -> Result<ExtractionReport> {
    let audio_paths = collect_audio_paths(input, &config.extractor.extensions)?;
    log::info!("Found {} audio files to process", audio_paths.len());

    if audio_paths.is_empty() {
        log::warn!("No audio files found in {}", input.display());
    }

    let provider = FpcalcProvider::from_config(&config.extractor);
    if !audio_paths.is_empty() && !provider.is_available() {
        log::warn!(
            "'{}' could not be started; install Chromaprint or pass --fpcalc",
            provider.binary()
        );
    }

    let extractor = Extractor::new(provider, output_dir)
        .skip_existing(config.extractor.skip_existing)
        .progress(progress);
    let report = extractor.run(&audio_paths)?;

    print_json_summary(&extraction_summary(input, output_dir, &report));

    Ok(report)
}
