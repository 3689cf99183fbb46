//! The stage-sequencing state machine driving the redaction workflow.
//!
//! Per video, strictly sequential and never re-entrant:
//!
//! ```text
//! ExtractAudio -> Segment -> for each segment {
//!     ClearFrames -> ExtractFrames -> Detect -> Reassemble
//! } -> Concat -> Mux -> Checkpointed
//! ```
//!
//! At most one video and one stage is in flight at any time; the only
//! intra-stage parallelism is the detection worker pool. A stage failure
//! aborts the current video only (its ledger entry stays unwritten so a
//! rerun retries it from the start) and the batch moves on to the next
//! video.

use crate::checkpoint::CheckpointLedger;
use crate::config::{
    AUDIO_EXT, CONCAT_VIDEO, CoreConfig, FRAME_EXT, FRAME_PATTERN, FRAME_PREFIX, SEGMENT_EXT,
};
use crate::detection::{DetectorLoader, run_batch};
use crate::discovery::find_processable_files;
use crate::error::CoreResult;
use crate::external::{check_dependency, ffmpeg, probe};
use crate::progress::{ProgressShape, run_with_progress};
use crate::workspace::TempWorkspace;
use console::style;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Result of one fully processed video.
#[derive(Debug, Clone)]
pub struct VideoOutcome {
    pub filename: String,
    pub output_path: PathBuf,
    pub elapsed: Duration,
    pub frames_processed: usize,
    /// Per-frame detection error descriptions, aggregated across segments.
    pub frame_errors: Vec<String>,
}

/// Structured summary of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub completed: Vec<VideoOutcome>,
    /// Videos skipped because they were already in the ledger.
    pub skipped: usize,
    /// (basename, error) pairs for videos whose pipeline aborted.
    pub failed: Vec<(String, String)>,
}

/// Processes every pending video in the input directory.
///
/// Videos already recorded in `ledger` are skipped entirely. Stage errors
/// abort only the video they occur in; a ledger persistence failure is
/// fatal to the batch.
pub fn process_videos(
    config: &CoreConfig,
    ledger: &mut CheckpointLedger,
    loader: &dyn DetectorLoader,
) -> CoreResult<BatchReport> {
    config.validate()?;
    check_dependency("ffmpeg")?;
    check_dependency("ffprobe")?;
    info!("{}", style("External dependency check passed.").green());

    let workspace = TempWorkspace::new(config);
    workspace.prepare()?;

    let files = find_processable_files(&config.input_dir)?;
    let pending = select_pending(&files, ledger);
    let mut report = BatchReport {
        skipped: files.len() - pending.len(),
        ..BatchReport::default()
    };
    info!(
        "Found {} video(s), {} already processed.",
        files.len(),
        report.skipped
    );

    for input_path in pending {
        let basename = match input_path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        info!(
            "{}",
            style(format!("######## Processing {basename} ########")).cyan().bold()
        );

        let start = Instant::now();
        match process_one(config, &workspace, loader, &input_path, &basename) {
            Ok(mut outcome) => {
                outcome.elapsed = start.elapsed();
                ledger.mark_done(&basename)?;
                report.completed.push(outcome);
            }
            Err(e) => {
                error!("{}", style(format!("failed to process {basename}: {e}")).red());
                report.failed.push((basename, e.to_string()));
            }
        }
    }
    Ok(report)
}

/// Drives one video through every stage. Checkpointing is the caller's job
/// and happens only after this returns Ok.
fn process_one(
    config: &CoreConfig,
    workspace: &TempWorkspace<'_>,
    loader: &dyn DetectorLoader,
    input_path: &Path,
    basename: &str,
) -> CoreResult<VideoOutcome> {
    let frame_pattern = config.tmp_dir.join(FRAME_PATTERN);

    // --- ExtractAudio ---
    workspace.clear(AUDIO_EXT);
    let duration = probe::duration_secs(input_path)?;
    let audio_path = audio_path(config, basename);
    run_with_progress(
        ffmpeg::extract_audio(input_path, &audio_path),
        duration * 1000.0,
        ProgressShape::time_offset(),
        "Extracting audio",
    )?;

    // --- Segment ---
    workspace.clear(SEGMENT_EXT);
    let segment_duration = duration / config.segment_count as f64;
    run_with_progress(
        ffmpeg::segment(
            input_path,
            segment_duration,
            &config.tmp_dir.join(format!("CLIP%01d.{SEGMENT_EXT}")),
        ),
        duration,
        ProgressShape::clock_time(),
        "Creating clips",
    )?;

    // --- Per segment: ClearFrames -> ExtractFrames -> Detect -> Reassemble ---
    let mut frames_processed = 0;
    let mut frame_errors = Vec::new();
    for index in 0..config.segment_count {
        let clip = config.segment_path(index);
        if !clip.is_file() {
            // Degenerate inputs (near-zero duration) can come up short.
            warn!("segment {} was not produced, skipping", clip.display());
            continue;
        }

        workspace.clear(FRAME_EXT);
        let clip_duration = probe::duration_secs(&clip)?;
        run_with_progress(
            ffmpeg::extract_frames(&clip, config.frame_rate, &frame_pattern),
            clip_duration,
            ProgressShape::clock_time(),
            &format!("Extracting CLIP{index} frames"),
        )?;

        let frames = collect_frames(&config.tmp_dir)?;
        let results = run_batch(&frames, loader, config.detection_workers);
        for (frame, result) in frames.iter().zip(&results) {
            if let Some(message) = result {
                warn!("detection error on '{}': {message}", frame.display());
                frame_errors.push(message.clone());
            }
        }
        frames_processed += frames.len();

        run_with_progress(
            ffmpeg::reassemble(&frame_pattern, config.frame_rate, &clip),
            frames.len() as f64,
            ProgressShape::frame_count(),
            &format!("Merging CLIP{index} frames"),
        )?;
    }

    // --- Concat ---
    let segments: Vec<PathBuf> = (0..config.segment_count)
        .map(|i| config.segment_path(i))
        .filter(|p| p.is_file())
        .collect();
    let mut total_frames = 0u64;
    for segment in &segments {
        total_frames += probe::frame_count(segment)?;
    }
    let playlist_path = config.playlist_path();
    std::fs::write(&playlist_path, build_playlist(&segments))?;
    let concat_output = config.tmp_dir.join(CONCAT_VIDEO);
    run_with_progress(
        ffmpeg::concat(&playlist_path, &concat_output),
        total_frames as f64,
        ProgressShape::frame_count(),
        "Merging clips",
    )?;

    // --- Mux ---
    let mux_duration = probe::duration_secs(&concat_output)?;
    let output_path = config.output_path(basename);
    run_with_progress(
        ffmpeg::mux(&concat_output, &audio_path, &output_path),
        mux_duration,
        ProgressShape::clock_time(),
        "Muxing video and audio",
    )?;

    Ok(VideoOutcome {
        filename: basename.to_string(),
        output_path,
        elapsed: Duration::ZERO, // filled in by the caller
        frames_processed,
        frame_errors,
    })
}

/// Filters out videos already recorded in the ledger, preserving order.
fn select_pending(files: &[PathBuf], ledger: &CheckpointLedger) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| !ledger.contains(name))
        })
        .cloned()
        .collect()
}

/// Path of the extracted audio track for a video basename.
fn audio_path(config: &CoreConfig, basename: &str) -> PathBuf {
    let stem = Path::new(basename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| basename.to_string());
    config.tmp_dir.join(format!("{stem}.{AUDIO_EXT}"))
}

/// Renders the concat-demuxer playlist: one `file '<path>'` line per
/// segment, in index order.
fn build_playlist(segments: &[PathBuf]) -> String {
    let mut playlist = String::new();
    for segment in segments {
        playlist.push_str(&format!("file '{}'\n", segment.display()));
    }
    playlist
}

/// Collects the frame files currently present in the workspace, sorted by
/// name (and therefore by frame index, thanks to the zero padding).
fn collect_frames(tmp_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let mut frames: Vec<PathBuf> = std::fs::read_dir(tmp_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_str()?;
            (path.is_file()
                && name.starts_with(FRAME_PREFIX)
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(FRAME_EXT)))
            .then_some(path)
        })
        .collect();
    frames.sort();
    Ok(frames)
}
