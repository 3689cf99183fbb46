//! Checkpoint ledger making the batch resumable at video granularity.
//!
//! The ledger is a JSON array of basenames persisted under the assets
//! directory. A video whose basename appears in the ledger is skipped
//! entirely on subsequent runs. `mark_done` rewrites the whole file as a
//! sorted array; there is no atomic swap, so a crash between truncate and
//! write can lose the ledger. A malformed ledger fails fast rather than
//! silently resetting the set.

use crate::error::{CoreError, CoreResult};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Persisted set of fully processed video basenames.
#[derive(Debug)]
pub struct CheckpointLedger {
    path: PathBuf,
    done: BTreeSet<String>,
}

impl CheckpointLedger {
    /// Loads the ledger from `path`. A missing file yields an empty set.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let done = match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str::<BTreeSet<String>>(&contents).map_err(|e| {
                CoreError::Checkpoint(format!(
                    "malformed ledger at '{}': {e}",
                    path.display()
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: path.to_path_buf(),
            done,
        })
    }

    /// Whether `basename` has already been fully processed.
    pub fn contains(&self, basename: &str) -> bool {
        self.done.contains(basename)
    }

    /// Number of recorded basenames.
    pub fn len(&self) -> usize {
        self.done.len()
    }

    /// Whether no video has completed yet.
    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    /// Records `basename` as fully processed and rewrites the persisted file
    /// as a sorted JSON array.
    pub fn mark_done(&mut self, basename: &str) -> CoreResult<()> {
        self.done.insert(basename.to_string());
        // BTreeSet serializes in sorted order.
        let json = serde_json::to_string_pretty(&self.done)
            .map_err(|e| CoreError::Checkpoint(format!("failed to encode ledger: {e}")))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
