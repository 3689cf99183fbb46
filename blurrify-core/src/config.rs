//! Core configuration structures and naming constants.
//!
//! `CoreConfig` holds the resolved directory paths and the policy knobs used
//! throughout the pipeline. Instances are created by consumers of the library
//! (like blurrify-cli) and passed by reference into every component; nothing
//! here is mutated after construction.

use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

// ---- Workspace naming conventions ----

/// Extension of the extracted audio track.
pub const AUDIO_EXT: &str = "flac";
/// Extension of the time-based segment containers.
pub const SEGMENT_EXT: &str = "ts";
/// Extension of the rasterized frame images.
pub const FRAME_EXT: &str = "bmp";
/// Extension of the processed videos (input and muxed output).
pub const VIDEO_EXT: &str = "mp4";

/// ffmpeg image2 pattern for sequentially numbered frame files.
pub const FRAME_PATTERN: &str = "FRAME_%09d.bmp";
/// Prefix shared by all frame files, used when collecting them back.
pub const FRAME_PREFIX: &str = "FRAME_";
/// Name of the concatenated (not yet muxed) video stream.
pub const CONCAT_VIDEO: &str = "VIDEO.ts";
/// Transient playlist consumed by the concatenation stage.
pub const PLAYLIST_NAME: &str = "input.txt";
/// Checkpoint ledger file, stored under the assets directory.
pub const LEDGER_NAME: &str = "processed.json";
/// Detector model file, stored under the assets directory.
pub const MODEL_NAME: &str = "model.bin";

/// Returns the filename of segment `index` (`CLIP0.ts` .. `CLIP<n>.ts`).
pub fn segment_name(index: usize) -> String {
    format!("CLIP{index}.{SEGMENT_EXT}")
}

// ---- Policy defaults ----

/// Number of equal-duration segments each video is split into. The original
/// tool hardcoded 10; kept as a configurable parameter.
pub const DEFAULT_SEGMENT_COUNT: usize = 10;
/// Frame sampling rate used when rasterizing segments.
pub const DEFAULT_FRAME_RATE: u32 = 60;
/// Default parallelism of the detection worker pool.
pub const DEFAULT_DETECTION_WORKERS: usize = 10;

/// Main configuration for the blurrify-core library.
///
/// All paths are expected to be absolute and resolved before construction.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory holding the detector model, ledger and playlist
    pub assets_dir: PathBuf,

    /// Directory scanned for input videos
    pub input_dir: PathBuf,

    /// Directory receiving the muxed output videos
    pub output_dir: PathBuf,

    /// Scratch directory for audio, segment and frame artifacts
    pub tmp_dir: PathBuf,

    /// How many segments each video is split into
    pub segment_count: usize,

    /// Frame sampling rate for rasterization
    pub frame_rate: u32,

    /// Worker count of the detection pool
    pub detection_workers: usize,
}

impl CoreConfig {
    /// Creates a configuration with default policy knobs for the given paths.
    pub fn new(
        assets_dir: PathBuf,
        input_dir: PathBuf,
        output_dir: PathBuf,
        tmp_dir: PathBuf,
    ) -> Self {
        Self {
            assets_dir,
            input_dir,
            output_dir,
            tmp_dir,
            segment_count: DEFAULT_SEGMENT_COUNT,
            frame_rate: DEFAULT_FRAME_RATE,
            detection_workers: DEFAULT_DETECTION_WORKERS,
        }
    }

    /// Validates the policy knobs. Paths are validated lazily by the stages
    /// that touch them.
    pub fn validate(&self) -> CoreResult<()> {
        if self.segment_count == 0 {
            return Err(CoreError::Config("segment_count must be at least 1".into()));
        }
        if self.detection_workers == 0 {
            return Err(CoreError::Config(
                "detection_workers must be at least 1".into(),
            ));
        }
        if self.frame_rate == 0 {
            return Err(CoreError::Config("frame_rate must be at least 1".into()));
        }
        Ok(())
    }

    /// Path of the checkpoint ledger file.
    pub fn ledger_path(&self) -> PathBuf {
        self.assets_dir.join(LEDGER_NAME)
    }

    /// Path of the detector model file.
    pub fn model_path(&self) -> PathBuf {
        self.assets_dir.join(MODEL_NAME)
    }

    /// Path of the transient concat playlist.
    pub fn playlist_path(&self) -> PathBuf {
        self.assets_dir.join(PLAYLIST_NAME)
    }

    /// Path of segment `index` inside the workspace.
    pub fn segment_path(&self, index: usize) -> PathBuf {
        self.tmp_dir.join(segment_name(index))
    }

    /// Derives the output path for an input video basename.
    pub fn output_path(&self, basename: &str) -> PathBuf {
        let stem = Path::new(basename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| basename.to_string());
        self.output_dir.join(format!("{stem}.{VIDEO_EXT}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CoreConfig {
        CoreConfig::new(
            PathBuf::from("/a"),
            PathBuf::from("/i"),
            PathBuf::from("/o"),
            PathBuf::from("/t"),
        )
    }

    #[test]
    fn test_defaults() {
        let c = config();
        assert_eq!(c.segment_count, 10);
        assert_eq!(c.frame_rate, 60);
        assert_eq!(c.detection_workers, 10);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_knobs() {
        let mut c = config();
        c.segment_count = 0;
        assert!(c.validate().is_err());

        let mut c = config();
        c.detection_workers = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_derived_paths() {
        let c = config();
        assert_eq!(c.ledger_path(), PathBuf::from("/a/processed.json"));
        assert_eq!(c.segment_path(3), PathBuf::from("/t/CLIP3.ts"));
        assert_eq!(c.output_path("holiday.mp4"), PathBuf::from("/o/holiday.mp4"));
        assert_eq!(c.output_path("clip.mkv"), PathBuf::from("/o/clip.mp4"));
    }

    #[test]
    fn test_segment_name() {
        assert_eq!(segment_name(0), "CLIP0.ts");
        assert_eq!(segment_name(9), "CLIP9.ts");
    }
}
