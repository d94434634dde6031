//! Input discovery
//!
//! Resolves the extractor input (a list file or a directory of audio) into
//! an ordered list of audio paths, and enumerates per-file documents for
//! the collator in a stable order.

use crate::error::BatchError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Resolve the extractor input.
///
/// A file is read as a list of paths; a directory is walked recursively
/// for files with one of `extensions` (case-insensitive).
pub fn collect_audio_paths(input: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, BatchError> {
    if !input.exists() {
        return Err(BatchError::InputNotFound(input.to_path_buf()));
    }

    if input.is_dir() {
        find_audio_files(input, extensions)
    } else {
        read_list_file(input)
    }
}

/// Read a list file: one path per line
pub fn read_list_file(path: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => BatchError::InputNotFound(path.to_path_buf()),
        _ => BatchError::InputUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    Ok(parse_list(&content))
}

/// Trim lines, skip blanks, and drop repeated paths keeping the first one
pub fn parse_list(content: &str) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.to_string()))
        .map(PathBuf::from)
        .collect()
}

/// Walk `dir` recursively for audio files, sorted by path
pub fn find_audio_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, BatchError> {
    let (files, errors) = walk_files(dir, true)?;
    for error in errors {
        log::warn!("Skipping unreadable entry under {}: {}", dir.display(), error);
    }

    let mut files: Vec<PathBuf> = files
        .into_iter()
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Documents found under a directory, plus the entries that could not be read
#[derive(Debug, Default)]
pub struct DocumentListing {
    pub documents: Vec<PathBuf>,
    /// `InputUnreadable` for each document or directory the walk could not open
    pub unreadable: Vec<BatchError>,
}

/// List per-file documents named `*.<extension>` under `dir`, sorted by path.
///
/// Names are matched on their raw bytes so non-UTF-8 file names are kept.
/// Walk errors on matching names or on directories are returned in
/// `unreadable`; a dangling link to some other kind of file is ignored.
pub fn find_documents(dir: &Path, extension: &str, recursive: bool) -> Result<DocumentListing, BatchError> {
    let suffix = format!(".{}", extension);
    let (files, errors) = walk_files(dir, recursive)?;

    let mut documents: Vec<PathBuf> = files
        .into_iter()
        .filter(|path| has_suffix(path, &suffix))
        .collect();
    documents.sort();

    let mut unreadable = Vec::new();
    for error in errors {
        let path = error.path().map(Path::to_path_buf);
        let relevant = match &path {
            Some(p) => has_suffix(p, &suffix) || p.is_dir(),
            None => true,
        };
        if relevant {
            unreadable.push(BatchError::InputUnreadable {
                path: path.unwrap_or_else(|| dir.to_path_buf()),
                reason: error.to_string(),
            });
        } else {
            log::debug!("Ignoring unreadable entry under {}: {}", dir.display(), error);
        }
    }

    Ok(DocumentListing { documents, unreadable })
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .map(|name| {
            let name = name.as_encoded_bytes();
            name.len() > suffix.len() && name.ends_with(suffix.as_bytes())
        })
        .unwrap_or(false)
}

/// Files under `dir`, and the walk errors met along the way
fn walk_files(dir: &Path, recursive: bool) -> Result<(Vec<PathBuf>, Vec<walkdir::Error>), BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::InputNotFound(dir.to_path_buf()));
    }
    // Fail early when the top level itself cannot be listed
    fs::read_dir(dir).map_err(|e| BatchError::InputUnreadable {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut walker = WalkDir::new(dir).min_depth(1).follow_links(true).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    let mut errors = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => errors.push(e),
        }
    }
    Ok((files, errors))
}
