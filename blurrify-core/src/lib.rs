//! Core library for batch license-plate redaction of video files.
//!
//! This crate drives ffmpeg through a fixed multi-stage workflow per video
//! (audio extraction, time-based segmentation, frame rasterization,
//! parallel detection and blur, reassembly, concatenation, muxing),
//! rendering every external invocation's streamed output as a normalized
//! progress signal. A persisted checkpoint ledger makes the batch resumable
//! at video granularity.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use blurrify_core::{CheckpointLedger, CoreConfig, SeetaDetectorLoader, process_videos};
//! use std::path::PathBuf;
//!
//! let config = CoreConfig::new(
//!     PathBuf::from("/path/to/assets"),
//!     PathBuf::from("/path/to/videos"),
//!     PathBuf::from("/path/to/videos/blurred"),
//!     PathBuf::from("/path/to/tmp"),
//! );
//! config.validate().unwrap();
//!
//! let mut ledger = CheckpointLedger::load(&config.ledger_path()).unwrap();
//! let loader = SeetaDetectorLoader::new(config.model_path());
//! let report = process_videos(&config, &mut ledger, &loader).unwrap();
//! println!("completed {} video(s)", report.completed.len());
//! ```

pub mod checkpoint;
pub mod config;
pub mod detection;
pub mod discovery;
pub mod error;
pub mod external;
pub mod pipeline;
pub mod progress;
pub mod workspace;

// Re-exports for public API
pub use checkpoint::CheckpointLedger;
pub use config::CoreConfig;
pub use detection::{Detector, DetectorLoader, Region, SeetaDetectorLoader};
pub use discovery::find_processable_files;
pub use error::{CoreError, CoreResult};
pub use pipeline::{BatchReport, VideoOutcome, process_videos};
pub use progress::{ProgressShape, parse_progress, run_with_progress};
pub use workspace::TempWorkspace;
