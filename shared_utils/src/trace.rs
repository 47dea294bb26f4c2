//! Trace Writer
//!
//! Turns frame records into the text trace read by ns-3's `UdpTraceClient`:
//! one line per frame, single-space separated, newline terminated.

use crate::errors::{Result, TraceError};
use crate::symbol_map::FrameTypeMap;
use crate::types::{FrameRecord, TraceLine};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const OUTPUT_EXTENSION: &str = "ns-3-vtrace";

/// Reference point for each line's send time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBase {
    /// Milliseconds since the first frame.
    #[default]
    #[serde(alias = "first_frame")]
    First,
    /// Milliseconds since the previous frame.
    #[serde(alias = "previous_frame")]
    Previous,
}

/// Column layout of a trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceLayout {
    /// `<offset ms> <size> <type>`
    #[default]
    Simple,
    /// `<frame no> <type> <time ms> <size>`, the column order of ns-3 trace files.
    Ns3,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceOptions {
    pub time_base: TimeBase,
    pub layout: TraceLayout,
    pub symbols: FrameTypeMap,
}

fn offset_ms(current: f64, reference: f64) -> u64 {
    let ms = ((current - reference) * 1000.0).round();
    if ms > 0.0 {
        ms as u64
    } else {
        0
    }
}

/// Computes one trace line per frame, in input order.
pub fn build_trace(frames: &[FrameRecord], options: &TraceOptions) -> Result<Vec<TraceLine>> {
    let first = frames.first().ok_or(TraceError::EmptyInput)?;

    let mut previous = first.presentation_time;
    let lines = frames
        .iter()
        .map(|frame| {
            let reference = match options.time_base {
                TimeBase::First => first.presentation_time,
                TimeBase::Previous => previous,
            };
            previous = frame.presentation_time;
            TraceLine {
                send_time_offset_ms: offset_ms(frame.presentation_time, reference),
                size_bytes: frame.size_bytes,
                frame_type: frame.frame_type,
                coded_index: frame.coded_index,
            }
        })
        .collect();

    Ok(lines)
}

pub fn format_line(line: &TraceLine, options: &TraceOptions) -> String {
    let symbol = options.symbols.symbol(line.frame_type);
    match options.layout {
        TraceLayout::Simple => format!("{} {} {}", line.send_time_offset_ms, line.size_bytes, symbol),
        TraceLayout::Ns3 => format!(
            "{} {} {} {}",
            line.coded_index, symbol, line.send_time_offset_ms, line.size_bytes
        ),
    }
}

pub fn format_trace(lines: &[TraceLine], options: &TraceOptions) -> String {
    let mut out = String::with_capacity(lines.len() * 16);
    for line in lines {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{}", format_line(line, options));
    }
    out
}

/// Writes the trace for `frames` to `dest` and returns the number of lines.
///
/// The file only appears once it is complete: content goes to a temporary
/// file next to `dest`, which is renamed over it at the end. Empty input is
/// rejected before anything touches the filesystem.
pub fn write_trace(frames: &[FrameRecord], dest: &Path, options: &TraceOptions) -> Result<usize> {
    let lines = build_trace(frames, options)?;
    let contents = format_trace(&lines, options);

    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".vtrace-").suffix(".tmp");
    // Temp files default to 0600; traces get the usual umask-filtered mode.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder
        .tempfile_in(dir)
        .map_err(|e| TraceError::io(dest, e))?;

    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| TraceError::io(dest, e))?;

    tmp.persist(dest).map_err(|e| TraceError::io(dest, e.error))?;

    debug!(
        output = %dest.display(),
        lines = lines.len(),
        bytes = contents.len(),
        "Trace written"
    );
    Ok(lines.len())
}

/// `<output_dir>/<input stem>.ns-3-vtrace`
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_else(|| OsStr::new("trace"));
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(OUTPUT_EXTENSION);
    output_dir.join(name)
}
