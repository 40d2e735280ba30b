//! Filesystem adapter for file selection
//!
//! The staging logic in dc-core works on names plus bytes and never touches
//! the disk. This module is the thin edge that turns paths (CLI arguments or
//! the manager view's path input) into candidates for `select_files`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dc_core::PendingFile;

/// Read each path into a selection candidate.
///
/// Unreadable paths are reported alongside the candidates instead of
/// aborting the whole selection; the caller decides how to surface them.
pub fn read_candidates(paths: &[PathBuf]) -> (Vec<PendingFile>, Vec<(PathBuf, io::Error)>) {
    let mut candidates = Vec::new();
    let mut failures = Vec::new();

    for path in paths {
        match fs::read(path) {
            Ok(bytes) => candidates.push(PendingFile::new(candidate_name(path), bytes)),
            Err(error) => failures.push((path.clone(), error)),
        }
    }

    (candidates, failures)
}

/// The candidate name is the final path component, matching what the
/// server will use as the table name.
fn candidate_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
