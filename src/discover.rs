//! Candidate discovery for the CLI.
//!
//! Walks a directory (one level, or the whole tree with `recursive`) and
//! returns the JPEG and PNG files in it, ordered by file name within each
//! directory. Hidden entries are skipped, which also keeps any stray
//! `.resize-*` scratch files out of a run.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Extensions the resizer accepts, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("Directory not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Does `path` carry one of [`IMAGE_EXTENSIONS`]?
pub fn is_candidate(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|c| ext.eq_ignore_ascii_case(c)))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// List resizable images under `root`.
pub fn discover(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, DiscoverError> {
    if !root.is_dir() {
        return Err(DiscoverError::NotFound(root.to_path_buf()));
    }

    let mut walker = WalkDir::new(root).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker.into_iter().filter_entry(|e| !is_hidden(e)) {
        let entry = entry?;
        if entry.file_type().is_file() && is_candidate(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
