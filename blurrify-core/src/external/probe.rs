//! Media metadata probing via ffprobe.

use crate::error::{CoreError, CoreResult};
use std::path::Path;

fn probe_error(path: &Path, message: impl Into<String>) -> CoreError {
    CoreError::Probe {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

/// Total duration of the media file, in seconds.
pub fn duration_secs(path: &Path) -> CoreResult<f64> {
    let info = ffprobe::ffprobe(path).map_err(|e| probe_error(path, e.to_string()))?;
    info.format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| probe_error(path, "no duration in format metadata"))
}

/// Number of frames in the first video stream. Containers that do not carry
/// an `nb_frames` tag (transport streams, typically) fall back to
/// `duration * avg_frame_rate`.
pub fn frame_count(path: &Path) -> CoreResult<u64> {
    let info = ffprobe::ffprobe(path).map_err(|e| probe_error(path, e.to_string()))?;
    let stream = info
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| probe_error(path, "no video stream"))?;

    if let Some(count) = stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.parse::<u64>().ok())
    {
        return Ok(count);
    }

    let rate = parse_frame_rate(&stream.avg_frame_rate)
        .ok_or_else(|| probe_error(path, "no usable frame rate"))?;
    let duration = info
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| probe_error(path, "no duration for frame-count fallback"))?;
    Ok((duration * rate).round() as u64)
}

/// Parses an ffprobe rational frame rate like `60/1` or `60000/1001`.
fn parse_frame_rate(rate: &str) -> Option<f64> {
    let (num, den) = rate.split_once('/')?;
    let num: f64 = num.parse().ok()?;
    let den: f64 = den.parse().ok()?;
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}
