//! Logging Module
//!
//! tracing-based logging shared by the vid-trace binaries:
//! - a daily rolling log file (system temp directory by default)
//! - colored human output on stderr
//! - `RUST_LOG` overrides the configured level
//!
//! # Examples
//!
//! ```no_run
//! use shared_utils::logging::{init_logging, LogConfig};
//! use tracing::info;
//!
//! init_logging("vid_trace", LogConfig::default()).expect("Failed to initialize logging");
//! info!("Program started");
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory for log files (system temp directory by default).
    pub log_dir: PathBuf,
    /// Number of log files kept per program.
    pub max_files: usize,
    pub level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: std::env::temp_dir(),
            max_files: 5,
            level: Level::INFO,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.log_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn verbose(self, verbose: bool) -> Self {
        if verbose {
            self.with_level(Level::DEBUG)
        } else {
            self
        }
    }
}

fn default_directive(level: Level) -> String {
    level.to_string().to_lowercase()
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(level)))
}

/// Installs the global subscriber: `{program_name}.log` in `log_dir`, plus
/// stderr.
///
/// Fails instead of panicking when a subscriber is already installed.
pub fn init_logging(program_name: &str, config: LogConfig) -> Result<()> {
    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

    let log_file_name = format!("{}.log", program_name);

    // Rotation is time based; old files are pruned by count below.
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(log_file_name.as_str())
        .build(&config.log_dir)
        .with_context(|| format!("Failed to open log file in {:?}", config.log_dir))?;

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter(config.level))
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Logging already initialized")?;

    tracing::debug!(
        program = program_name,
        log_dir = ?config.log_dir,
        log_file = log_file_name,
        max_files = config.max_files,
        level = ?config.level,
        "Logging system initialized"
    );

    if let Err(e) = cleanup_old_logs(&config.log_dir, program_name, config.max_files) {
        tracing::warn!(error = %e, "Failed to clean up old log files");
    }

    Ok(())
}

/// Installs a stderr-only subscriber, for when [`init_logging`] could not set
/// up its log file.
pub fn init_stderr_logging(level: Level) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(false),
        )
        .try_init()
        .context("Logging already initialized")
}

/// Deletes all but the `max_files` most recent `{program_name}.log*` files.
fn cleanup_old_logs(log_dir: &Path, program_name: &str, max_files: usize) -> Result<()> {
    let log_files = matching_log_files(log_dir, program_name)?;

    for path in files_to_prune(log_files, max_files) {
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::warn!(path = ?path, error = %e, "Failed to remove old log file");
        } else {
            tracing::debug!(path = ?path, "Removed old log file");
        }
    }

    Ok(())
}

fn matching_log_files(
    log_dir: &Path,
    program_name: &str,
) -> Result<Vec<(PathBuf, std::time::SystemTime)>> {
    let prefix = format!("{}.log", program_name);
    let entries = std::fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read log directory: {:?}", log_dir))?;

    let mut log_files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with(&prefix))
            .unwrap_or(false);
        if !matches {
            continue;
        }
        if let Ok(modified) = std::fs::metadata(&path).and_then(|m| m.modified()) {
            log_files.push((path, modified));
        }
    }
    Ok(log_files)
}

fn files_to_prune(
    mut log_files: Vec<(PathBuf, std::time::SystemTime)>,
    max_files: usize,
) -> Vec<PathBuf> {
    // Newest first.
    log_files.sort_by(|a, b| b.1.cmp(&a.1));
    log_files
        .into_iter()
        .skip(max_files)
        .map(|(path, _)| path)
        .collect()
}
