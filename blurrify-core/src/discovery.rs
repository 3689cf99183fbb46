//! Discovery of input videos eligible for processing.
//!
//! Scans the top level of the input directory for .mp4 files
//! (case-insensitive); subdirectories are not searched. Results come back
//! lexicographically sorted so the batch order is deterministic.

use crate::config::VIDEO_EXT;
use crate::error::CoreResult;
use std::path::{Path, PathBuf};

/// Finds video files eligible for processing in `input_dir`, sorted by
/// path. An empty directory yields an empty list, not an error.
pub fn find_processable_files(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(input_dir)?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();

            if !path.is_file() {
                return None;
            }

            path.extension()
                .and_then(|ext| ext.to_str())
                .filter(|ext| ext.eq_ignore_ascii_case(VIDEO_EXT))
                .map(|_| path.clone())
        })
        .collect();
    files.sort();
    Ok(files)
}
