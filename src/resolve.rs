//! Ordered slide discovery.
//!
//! Turns a directory of exported slide images into the ordered sequence the
//! compositor consumes. Order matters: index 0 becomes the cover, so sorting
//! is numeric on the embedded slide number (see [`naming::sequence_number`]),
//! never lexical (`Slide10` must come after `Slide9`).
//!
//! ```text
//! export/
//! ├── Slide1.JPG    → 0 (cover)
//! ├── Slide2.JPG    → 1
//! ├── Slide10.JPG   → 9
//! ├── Slide9.JPG    → 8
//! └── notes.txt     (ignored: extension does not match)
//! ```

use crate::naming;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No slide images found in {0}")]
    Empty(PathBuf),
    #[error("Slide filename has no sequence number: {0}")]
    Malformed(PathBuf),
}

/// Normalize an extension filter: `"*.jpg"`, `".jpg"` and `"jpg"` are equivalent.
fn normalize_extension(pattern: &str) -> &str {
    let pattern = pattern.strip_prefix('*').unwrap_or(pattern);
    pattern.strip_prefix('.').unwrap_or(pattern)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Resolve the ordered slide sequence in `dir`.
///
/// Matches regular files (non-recursive) whose extension equals `extension`
/// case-insensitively, sorts them by embedded sequence number (ties broken by
/// filename), and keeps at most `max_items`.
///
/// Every matched file must carry a sequence number, even ones that would be
/// truncated away: an unkeyed file makes the whole order ambiguous.
pub fn resolve(
    dir: &Path,
    extension: &str,
    max_items: usize,
) -> Result<Vec<PathBuf>, ResolveError> {
    let extension = normalize_extension(extension);

    let mut keyed = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !has_extension(&path, extension) {
            continue;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let key = naming::sequence_number(&stem)
            .ok_or_else(|| ResolveError::Malformed(path.clone()))?;
        keyed.push((key, path));
    }

    if keyed.is_empty() {
        return Err(ResolveError::Empty(dir.to_path_buf()));
    }

    keyed.sort_by(|(ka, pa), (kb, pb)| {
        ka.cmp(kb)
            .then_with(|| pa.file_name().cmp(&pb.file_name()))
    });

    Ok(keyed
        .into_iter()
        .take(max_items)
        .map(|(_, path)| path)
        .collect())
}
