//! Asset identifiers embedded in file names
//!
//! Audio files carry a hyphenated UUID somewhere in their stem, e.g.
//! `a-6f1c2b9e-3d4a-4f5b-8c7d-0e1f2a3b4c5d.flac`. The UUID names the
//! per-file document and survives renames of the surrounding text.

use crate::error::IdentifierError;
use std::path::Path;
use uuid::Uuid;

const HYPHENATED_LEN: usize = 36;
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// Extract the UUID embedded in the file stem of `path`.
///
/// When the stem contains more than one UUID the right-most one wins. A
/// candidate directly adjacent to another hex digit is not a match, so a
/// longer hex run never yields a shifted identifier.
pub fn extract_identifier(path: &Path) -> Result<Uuid, IdentifierError> {
    let stem = path
        .file_stem()
        .ok_or_else(|| IdentifierError::MissingFileName(path.display().to_string()))?
        .to_string_lossy();

    find_uuid(&stem).ok_or_else(|| IdentifierError::NoIdentifier(stem.into_owned()))
}

fn find_uuid(text: &str) -> Option<Uuid> {
    let bytes = text.as_bytes();
    if bytes.len() < HYPHENATED_LEN {
        return None;
    }

    (0..=bytes.len() - HYPHENATED_LEN).rev().find_map(|start| {
        let end = start + HYPHENATED_LEN;
        let before = start.checked_sub(1).map(|i| bytes[i]);
        let after = bytes.get(end).copied();
        if before.map_or(false, |b| b.is_ascii_hexdigit())
            || after.map_or(false, |b| b.is_ascii_hexdigit())
        {
            return None;
        }

        let window = &bytes[start..end];
        if !is_hyphenated_shape(window) {
            return None;
        }
        // Shape check guarantees ASCII, so the window is valid UTF-8
        std::str::from_utf8(window)
            .ok()
            .and_then(|candidate| Uuid::parse_str(candidate).ok())
    })
}

fn is_hyphenated_shape(window: &[u8]) -> bool {
    window.iter().enumerate().all(|(i, b)| {
        if HYPHEN_POSITIONS.contains(&i) {
            *b == b'-'
        } else {
            b.is_ascii_hexdigit()
        }
    })
}
