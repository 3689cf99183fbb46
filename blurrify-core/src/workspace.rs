//! Scratch directory management with scoped, advisory cleanup.
//!
//! Stage artifacts (audio, segments, frames) all live flat inside one
//! workspace directory and are told apart by extension. Each stage that
//! repopulates an extension clears it first, so the workspace holds
//! artifacts for at most one (video, stage) pair at a time. Cleanup is
//! advisory: individual deletion failures are logged and swallowed, since
//! partial cleanup must not abort the batch. Directory creation, by
//! contrast, is required setup and propagates failures.
//!
//! Cleanup is extension-scoped, not a full wipe: files of untracked
//! extensions can persist across runs. `clean` is the broader sweep run at
//! startup and shutdown.

use crate::config::{CoreConfig, PLAYLIST_NAME};
use crate::error::CoreResult;
use log::debug;
use std::path::Path;

/// Owns the scratch directory of a run.
#[derive(Debug)]
pub struct TempWorkspace<'a> {
    config: &'a CoreConfig,
}

impl<'a> TempWorkspace<'a> {
    pub fn new(config: &'a CoreConfig) -> Self {
        Self { config }
    }

    /// Creates the workspace and output directories. Failures propagate.
    pub fn prepare(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.config.tmp_dir)?;
        std::fs::create_dir_all(&self.config.output_dir)?;
        Ok(())
    }

    /// Removes all workspace files with the given extension
    /// (case-insensitive). Best effort.
    pub fn clear(&self, extension: &str) {
        remove_matching(&self.config.tmp_dir, |path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(extension))
        });
    }

    /// Removes every regular file in the workspace plus the transient
    /// playlist under the assets directory. Best effort.
    pub fn clean(&self) {
        remove_matching(&self.config.tmp_dir, |_| true);
        remove_matching(&self.config.assets_dir, |path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n == PLAYLIST_NAME)
        });
    }
}

/// Deletes regular files in `dir` accepted by `matches`, swallowing all errors.
fn remove_matching(dir: &Path, matches: impl Fn(&Path) -> bool) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("skipping cleanup of '{}': {e}", dir.display());
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() && matches(&path) {
            if let Err(e) = std::fs::remove_file(&path) {
                debug!("failed to remove '{}': {e}", path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(dir: &Path) -> CoreConfig {
        CoreConfig::new(
            dir.join("assets"),
            dir.join("in"),
            dir.join("out"),
            dir.join("tmp"),
        )
    }

    fn touch(path: &Path) {
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_prepare_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        TempWorkspace::new(&config).prepare().unwrap();
        assert!(config.tmp_dir.is_dir());
        assert!(config.output_dir.is_dir());
    }

    #[test]
    fn test_clear_is_extension_scoped() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let ws = TempWorkspace::new(&config);
        ws.prepare().unwrap();

        touch(&config.tmp_dir.join("FRAME_000000001.bmp"));
        touch(&config.tmp_dir.join("FRAME_000000002.BMP"));
        touch(&config.tmp_dir.join("CLIP0.ts"));
        touch(&config.tmp_dir.join("audio.flac"));

        ws.clear("bmp");

        assert!(!config.tmp_dir.join("FRAME_000000001.bmp").exists());
        // Case-insensitive match, like the original glob on FAT-ish names.
        assert!(!config.tmp_dir.join("FRAME_000000002.BMP").exists());
        assert!(config.tmp_dir.join("CLIP0.ts").exists());
        assert!(config.tmp_dir.join("audio.flac").exists());
    }

    #[test]
    fn test_clear_on_missing_directory_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        // prepare() never called; must not panic or error
        TempWorkspace::new(&config).clear("bmp");
    }

    #[test]
    fn test_clean_wipes_workspace_and_playlist() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let ws = TempWorkspace::new(&config);
        ws.prepare().unwrap();
        std::fs::create_dir_all(&config.assets_dir).unwrap();

        touch(&config.tmp_dir.join("CLIP0.ts"));
        touch(&config.tmp_dir.join("audio.flac"));
        touch(&config.assets_dir.join(PLAYLIST_NAME));
        touch(&config.assets_dir.join("model.bin"));

        ws.clean();

        assert!(!config.tmp_dir.join("CLIP0.ts").exists());
        assert!(!config.tmp_dir.join("audio.flac").exists());
        assert!(!config.assets_dir.join(PLAYLIST_NAME).exists());
        // Only the playlist is swept from the assets dir.
        assert!(config.assets_dir.join("model.bin").exists());
    }

    #[test]
    fn test_clean_leaves_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let ws = TempWorkspace::new(&config);
        ws.prepare().unwrap();

        let sub: PathBuf = config.tmp_dir.join("nested");
        std::fs::create_dir_all(&sub).unwrap();
        ws.clean();
        assert!(sub.is_dir());
    }
}
