//! Generic progress monitor for blocking external commands.
//!
//! Every ffmpeg invocation in the pipeline emits line-oriented progress on
//! stdout (`-progress pipe:1 -nostats`). The stages differ only in which
//! line pattern to scrape, how to parse the captured value and what the
//! total is; the control flow is identical, so there is exactly one routine
//! here, parameterized by a [`ProgressShape`].
//!
//! Line scraping is kept as a pure function ([`parse_progress`]) and the
//! percent fold as an iterator fold ([`drive_progress`]) so both can be unit
//! tested with synthetic line streams, without spawning real tools.

use crate::error::{CoreError, CoreResult};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use regex::Regex;
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::LazyLock;

/// Sentinel ffmpeg emits on its progress stream when it is done.
const PROGRESS_END: &str = "progress=end";

static OUT_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"out_time_ms=(\d+)").expect("valid regex"));
static CLOCK_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"time=(\d+:\d+:\d+\.\d+)").expect("valid regex"));
static FRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"frame=\s*(\d+)").expect("valid regex"));

/// Parses a single captured value into the unit the total is expressed in.
pub type ValueParser = fn(&str) -> Option<f64>;

/// One of the line shapes ffmpeg progress output comes in: a pattern with a
/// single capture group plus a parser for the captured text.
#[derive(Clone, Copy)]
pub struct ProgressShape {
    pattern: &'static Regex,
    parser: ValueParser,
}

impl ProgressShape {
    /// `out_time_ms=<n>` offset lines, totals expressed in the same unit.
    pub fn time_offset() -> Self {
        Self {
            pattern: &OUT_TIME_RE,
            parser: parse_number,
        }
    }

    /// `time=HH:MM:SS.ff` elapsed-time lines, totals expressed in seconds.
    pub fn clock_time() -> Self {
        Self {
            pattern: &CLOCK_TIME_RE,
            parser: parse_clock_time,
        }
    }

    /// `frame= <n>` counter lines, totals expressed in frames.
    pub fn frame_count() -> Self {
        Self {
            pattern: &FRAME_RE,
            parser: parse_number,
        }
    }
}

/// Applies `pattern` to one output line and parses the first capture group.
/// Returns `None` when the line does not match or the value does not parse.
pub fn parse_progress(line: &str, pattern: &Regex, parser: ValueParser) -> Option<f64> {
    let caps = pattern.captures(line)?;
    parser(caps.get(1)?.as_str())
}

/// Parses a plain non-negative number (frame counters, time offsets).
fn parse_number(s: &str) -> Option<f64> {
    s.parse::<u64>().ok().map(|v| v as f64)
}

/// Parses an `H:MM:SS.ff` clock time into seconds.
fn parse_clock_time(s: &str) -> Option<f64> {
    let mut parts = s.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Folds a stream of output lines into a monotonic percent signal.
///
/// For each matching line, `percent = floor(current / total * 100)` (clamped
/// to 100); the sink is driven only when the percent exceeds the last
/// reported one, so it never regresses and never repeats a value. The
/// `progress=end` sentinel short-circuits the stream. The sink always ends
/// at exactly 100, even when the last observed sample rounded below it.
pub fn drive_progress<I, S>(lines: I, total: f64, shape: ProgressShape, mut sink: S)
where
    I: IntoIterator<Item = String>,
    S: FnMut(u64),
{
    let mut last: u64 = 0;
    for line in lines {
        if let Some(value) = parse_progress(&line, shape.pattern, shape.parser) {
            // Degenerate totals (near-zero videos) skip straight to the
            // final forced 100.
            if total > 0.0 {
                let percent = ((value / total) * 100.0).floor().min(100.0) as u64;
                if percent > last {
                    sink(percent);
                    last = percent;
                }
            }
        } else if line.contains(PROGRESS_END) {
            break;
        }
    }
    if last < 100 {
        sink(100);
    }
}

/// Runs `cmd` to completion, rendering its streamed progress as a 0-100%
/// bar labelled `label`. Stdout is scraped line by line against `shape`;
/// stderr is discarded. Blocks until the process exits and surfaces a
/// non-success exit status as [`CoreError::CommandFailed`].
pub fn run_with_progress(
    mut cmd: Command,
    total: f64,
    shape: ProgressShape,
    label: &str,
) -> CoreResult<()> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    debug!("spawning '{program}' for: {label}");

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| CoreError::CommandStart(program.clone(), e))?;

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{msg:<32} {bar:40.cyan/blue} {pos:>3}%")
            .expect("valid progress template"),
    );
    bar.set_message(label.to_string());

    let stdout = BufReader::new(child.stdout.take().expect("stdout was piped"));
    drive_progress(
        stdout.lines().map_while(|line| line.ok()),
        total,
        shape,
        |percent| bar.set_position(percent),
    );

    let status = child
        .wait()
        .map_err(|e| CoreError::CommandStart(program.clone(), e))?;

    bar.set_position(100);
    bar.finish();

    if !status.success() {
        return Err(CoreError::CommandFailed(program, status));
    }
    Ok(())
}
