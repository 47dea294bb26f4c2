use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("ffprobe failed for {}: {reason}", .path.display())]
    ProbeFailure { path: PathBuf, reason: String },

    #[error("No frames to write")]
    EmptyInput,

    #[error("Failed to write {}: {source}", .path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TraceError {
    pub fn probe(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        TraceError::ProbeFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TraceError::IoFailure {
            path: path.into(),
            source,
        }
    }

    /// Probe failures come from the extraction step; everything past it
    /// counts as a transform failure.
    pub fn is_probe_failure(&self) -> bool {
        matches!(
            self,
            TraceError::ProbeFailure { .. } | TraceError::ToolNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TraceError>;
