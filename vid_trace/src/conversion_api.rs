//! Batch conversion of video files into traces.
//!
//! Each input is probed and written on its own; a failure only affects the
//! file that caused it.

use crate::config::TraceConfig;
use rayon::prelude::*;
use shared_utils::{
    collect_files, create_progress_bar, output_path_for, print_summary_report, sanitize_inputs,
    write_trace, BatchResult, FailureKind, FrameRecord, ProbeTool, ProgressBar, TraceError,
};
use std::ops::{BitOr, BitOrAssign};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Process exit code; the bits of every failure seen are or-ed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExitFlags(u8);

impl ExitFlags {
    pub const SUCCESS: ExitFlags = ExitFlags(0b0000);
    pub const NO_VALID_FILE: ExitFlags = ExitFlags(0b0001);
    pub const PROBE_NOT_FOUND: ExitFlags = ExitFlags(0b0010);
    pub const PROBE_ERROR: ExitFlags = ExitFlags(0b0100);
    pub const TRANSFORM_ERROR: ExitFlags = ExitFlags(0b1000);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: ExitFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    pub fn from_error(e: &TraceError) -> Self {
        match e {
            TraceError::ToolNotFound(_) => Self::PROBE_NOT_FOUND,
            TraceError::ProbeFailure { .. } => Self::PROBE_ERROR,
            _ => Self::TRANSFORM_ERROR,
        }
    }

    pub fn from_batch(result: &BatchResult) -> Self {
        let mut flags = Self::SUCCESS;
        if result.has_failure(FailureKind::Probe) {
            flags |= Self::PROBE_ERROR;
        }
        if result.has_failure(FailureKind::Transform) {
            flags |= Self::TRANSFORM_ERROR;
        }
        flags
    }
}

impl BitOr for ExitFlags {
    type Output = ExitFlags;

    fn bitor(self, rhs: ExitFlags) -> ExitFlags {
        ExitFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ExitFlags {
    fn bitor_assign(&mut self, rhs: ExitFlags) {
        self.0 |= rhs.0;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Converted { output: PathBuf, lines: usize },
    /// The trace already exists and `force` is off.
    Skipped { output: PathBuf },
}

/// Probes one input with `extract` and writes its trace into `output_dir`.
pub fn convert_file<F>(input: &Path, extract: &F, config: &TraceConfig) -> shared_utils::Result<FileOutcome>
where
    F: Fn(&Path) -> shared_utils::Result<Vec<FrameRecord>>,
{
    let output = output_path_for(input, &config.output_dir);
    if output.exists() && !config.force {
        return Ok(FileOutcome::Skipped { output });
    }

    info!(input = %input.display(), "Starting work");
    let frames = extract(input)?;
    let lines = write_trace(&frames, &output, &config.trace_options())?;
    Ok(FileOutcome::Converted { output, lines })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Converts every file, `config.jobs` at a time, and tallies the outcomes in
/// input order.
pub fn run_batch<F>(files: &[PathBuf], extract: F, config: &TraceConfig, pb: &ProgressBar) -> BatchResult
where
    F: Fn(&Path) -> shared_utils::Result<Vec<FrameRecord>> + Sync,
{
    let work = || -> Vec<shared_utils::Result<FileOutcome>> {
        files
            .par_iter()
            .map(|file| {
                let outcome = convert_file(file, &extract, config);
                pb.inc(1);
                pb.set_message(file_label(file));
                outcome
            })
            .collect()
    };

    let outcomes = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .build()
    {
        Ok(pool) => pool.install(work),
        Err(e) => {
            warn!(error = %e, "Failed to create thread pool, using the global one");
            work()
        }
    };

    let mut result = BatchResult::new();
    for (file, outcome) in files.iter().zip(outcomes) {
        match outcome {
            Ok(FileOutcome::Converted { output, lines }) => {
                info!(
                    input = %file.display(),
                    output = %output.display(),
                    lines,
                    "Finished work"
                );
                result.success(lines);
            }
            Ok(FileOutcome::Skipped { output }) => {
                info!(
                    input = %file.display(),
                    output = %output.display(),
                    "Output exists, skipping (use --force to overwrite)"
                );
                result.skip();
            }
            Err(e) => {
                error!(input = %file.display(), error = %e, "Conversion failed");
                result.fail(file.clone(), &e);
            }
        }
    }
    result
}

/// Command-line paths first, then the files found in `input_dir`.
pub fn gather_inputs(explicit: &[PathBuf], config: &TraceConfig) -> Vec<PathBuf> {
    let mut inputs = explicit.to_vec();
    if config.input_dir.is_dir() {
        inputs.extend(collect_files(&config.input_dir, config.recursive));
    } else {
        warn!(path = %config.input_dir.display(), "Input directory does not exist");
    }
    inputs
}

pub fn prepare_output_dir(config: &TraceConfig) -> shared_utils::Result<()> {
    std::fs::create_dir_all(&config.output_dir).map_err(|e| TraceError::io(&config.output_dir, e))
}

/// Full run: resolve ffprobe, pick the inputs, convert them and print the
/// summary.
pub fn run(explicit_inputs: &[PathBuf], config: &TraceConfig, quiet: bool) -> ExitFlags {
    let probe = match ProbeTool::resolve(config.probe_path.as_deref()) {
        Ok(probe) => probe,
        Err(e) => {
            error!(error = %e, "ffprobe executable could not be found");
            return ExitFlags::from_error(&e);
        }
    };
    info!(ffprobe = %probe.path().display(), "Using ffprobe");

    let candidates = gather_inputs(explicit_inputs, config);
    if candidates.is_empty() {
        error!("No files were given, use --help for help");
        return ExitFlags::NO_VALID_FILE;
    }

    let inputs = sanitize_inputs(&candidates, config.extensions.as_slice()).accepted;
    if inputs.is_empty() {
        error!("No valid files are left");
        return ExitFlags::NO_VALID_FILE;
    }

    if let Err(e) = prepare_output_dir(config) {
        error!(error = %e, "Cannot create output directory");
        return ExitFlags::from_error(&e);
    }

    info!(files = inputs.len(), "Found video files to process");
    let start = Instant::now();
    let pb = create_progress_bar(inputs.len() as u64, "Tracing", quiet);
    let result = run_batch(&inputs, |path| probe.probe_frames(path), config, &pb);
    pb.finish_and_clear();

    print_summary_report(&result, start.elapsed());
    ExitFlags::from_batch(&result)
}
