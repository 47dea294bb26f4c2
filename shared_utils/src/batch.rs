//! Batch Processing Module
//!
//! Input discovery and per-file bookkeeping for batch conversions. A failed
//! file is recorded and the batch moves on.

use crate::errors::TraceError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4"];

pub fn has_extension(path: &Path, extensions: &[impl AsRef<str>]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.as_ref().eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

/// Lists regular files under `dir`, skipping dotfiles such as `.gitignore`.
///
/// The result is sorted so batches run in a stable order.
pub fn collect_files(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let walker = if recursive {
        WalkDir::new(dir).follow_links(true)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| !is_hidden(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// ffprobe could not run or gave an unusable report.
    Probe,
    /// The report was fine but no trace could be written.
    Transform,
}

impl From<&TraceError> for FailureKind {
    fn from(e: &TraceError) -> Self {
        if e.is_probe_failure() {
            FailureKind::Probe
        } else {
            FailureKind::Transform
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchError {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub lines_written: usize,
    pub errors: Vec<BatchError>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            lines_written: 0,
            errors: Vec::new(),
        }
    }

    pub fn success(&mut self, lines: usize) {
        self.total += 1;
        self.succeeded += 1;
        self.lines_written += lines;
    }

    pub fn fail(&mut self, path: PathBuf, error: &TraceError) {
        self.total += 1;
        self.failed += 1;
        self.errors.push(BatchError {
            path,
            kind: FailureKind::from(error),
            message: error.to_string(),
        });
    }

    pub fn skip(&mut self) {
        self.total += 1;
        self.skipped += 1;
    }

    pub fn has_failure(&self, kind: FailureKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }
}

impl Default for BatchResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_result_new() {
        let result = BatchResult::new();
        assert_eq!(result.total, 0);
        assert_eq!(result.succeeded, 0);
        assert_eq!(result.failed, 0);
        assert_eq!(result.skipped, 0);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_batch_result_mixed() {
        let mut result = BatchResult::new();
        result.success(10);
        result.success(5);
        result.fail(
            PathBuf::from("bad.mp4"),
            &TraceError::probe("bad.mp4", "exit code Some(1)"),
        );
        result.fail(PathBuf::from("empty.mp4"), &TraceError::EmptyInput);
        result.skip();

        assert_eq!(result.total, 5);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.lines_written, 15);
        assert_eq!(
            result.total,
            result.succeeded + result.failed + result.skipped
        );
        assert_eq!(result.errors[0].kind, FailureKind::Probe);
        assert_eq!(result.errors[1].kind, FailureKind::Transform);
        assert!(result.has_failure(FailureKind::Probe));
    }

    #[test]
    fn test_success_rate() {
        let mut result = BatchResult::new();
        assert!((result.success_rate() - 100.0).abs() < 0.01);
        result.success(1);
        result.fail(PathBuf::from("x.mp4"), &TraceError::EmptyInput);
        assert!((result.success_rate() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("a.mp4"), VIDEO_EXTENSIONS));
        assert!(has_extension(Path::new("a.MP4"), VIDEO_EXTENSIONS));
        assert!(!has_extension(Path::new("a.mkv"), VIDEO_EXTENSIONS));
        assert!(!has_extension(Path::new("mp4"), VIDEO_EXTENSIONS));
        assert!(has_extension(Path::new("a.mkv"), &["mp4".to_string(), "mkv".to_string()]));
    }

    #[test]
    fn test_collect_files_skips_dotfiles_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "*").unwrap();
        std::fs::write(dir.path().join("b.mp4"), "").unwrap();
        std::fs::write(dir.path().join("a.mp4"), "").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.mp4"), "").unwrap();

        let flat = collect_files(dir.path(), false);
        assert_eq!(
            flat,
            vec![dir.path().join("a.mp4"), dir.path().join("b.mp4")]
        );

        let deep = collect_files(dir.path(), true);
        assert_eq!(deep.len(), 3);
        assert!(deep.contains(&dir.path().join("nested").join("c.mp4")));
    }
}
