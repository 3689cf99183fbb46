//! Builders for the six ffmpeg invocation shapes the pipeline drives.
//!
//! Every command emits line-oriented progress on stdout (`-progress pipe:1
//! -nostats`) and overwrites its output (`-y`); the progress monitor owns
//! spawning and scraping. Builders are pure so the argument lists can be
//! unit tested without running anything.
//!
//! The original tool encoded with NVENC; these builders use libx264 for
//! portability since codec behavior is out of scope (see DESIGN.md).

use std::path::Path;
use std::process::Command;

/// Arguments shared by every invocation, appended after the output path.
fn progress_args(cmd: &mut Command) {
    cmd.args(["-y", "-progress", "pipe:1", "-nostats", "-hide_banner"]);
}

/// Pulls the audio track losslessly into 48 kHz 32-bit FLAC.
pub fn extract_audio(input: &Path, output: &Path) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-i")
        .arg(input)
        .args(["-vn", "-acodec", "flac", "-ar", "48000", "-sample_fmt", "s32"])
        .arg(output);
    progress_args(&mut cmd);
    cmd
}

/// Splits the input into time-based segments with reset per-segment
/// timestamps, without re-encoding. `output_pattern` is an ffmpeg segment
/// pattern like `CLIP%01d.ts`.
pub fn segment(input: &Path, segment_duration: f64, output_pattern: &Path) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-i")
        .arg(input)
        .args(["-c", "copy", "-f", "segment", "-segment_time"])
        .arg(format!("{segment_duration}"))
        .args(["-reset_timestamps", "1"])
        .arg(output_pattern);
    progress_args(&mut cmd);
    cmd
}

/// Rasterizes a segment into sequentially numbered image files at a fixed
/// frame rate. `frame_pattern` is an image2 pattern like `FRAME_%09d.bmp`.
pub fn extract_frames(input: &Path, frame_rate: u32, frame_pattern: &Path) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-i")
        .arg(input)
        .arg("-vf")
        .arg(format!("fps={frame_rate}"))
        .arg(frame_pattern);
    progress_args(&mut cmd);
    cmd
}

/// Re-encodes the (possibly modified) frame sequence back into a segment
/// container, losslessly.
pub fn reassemble(frame_pattern: &Path, frame_rate: u32, output: &Path) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-framerate")
        .arg(frame_rate.to_string())
        .arg("-i")
        .arg(frame_pattern)
        .args(["-c:v", "libx264", "-preset", "veryfast", "-qp", "0", "-pix_fmt", "yuv420p"])
        .arg(output);
    progress_args(&mut cmd);
    cmd
}

/// Concatenates the segments enumerated by `playlist` without re-encoding.
pub fn concat(playlist: &Path, output: &Path) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-f", "concat", "-safe", "0", "-i"])
        .arg(playlist)
        .args(["-c", "copy"])
        .arg(output);
    progress_args(&mut cmd);
    cmd
}

/// Muxes the concatenated video stream with the extracted audio track into
/// the final output container: exactly one video and one audio stream,
/// truncated to the shorter of the two.
pub fn mux(video: &Path, audio: &Path, output: &Path) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-i")
        .arg(video)
        .arg("-i")
        .arg(audio)
        .args(["-c:v", "libx264", "-crf", "16", "-preset", "medium"])
        .args(["-c:a", "aac", "-b:a", "320k"])
        .args(["-map", "0:v:0", "-map", "1:a:0", "-shortest"])
        .arg(output);
    progress_args(&mut cmd);
    cmd
}
