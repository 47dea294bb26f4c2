//! FFprobe wrapper module
//!
//! Locates the ffprobe executable and runs it over one input file to get the
//! per-frame report of its first video stream.

use crate::errors::{Result, TraceError};
use crate::ffprobe_json::parse_frames_json;
use crate::types::FrameRecord;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, warn};

pub const FFPROBE_BINARY: &str = "ffprobe";

/// A resolved ffprobe executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTool {
    path: PathBuf,
}

impl ProbeTool {
    /// Uses `path` as is, without checking that it exists.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolves the executable from an optional override, falling back to a
    /// `PATH` lookup when the override is absent or does not exist.
    pub fn resolve(override_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = override_path {
            if path.is_file() {
                debug!(path = %path.display(), "Using ffprobe override");
                return Ok(Self::at(path));
            }
            warn!(
                path = %path.display(),
                "ffprobe override does not exist, searching PATH instead"
            );
        }

        which::which(FFPROBE_BINARY)
            .map(Self::at)
            .map_err(|e| {
                TraceError::ToolNotFound(format!(
                    "{} not found on PATH ({}). Install ffmpeg or pass --ffprobe-path",
                    FFPROBE_BINARY, e
                ))
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn frames_command(&self, input: &Path) -> Command {
        let mut cmd = Command::new(&self.path);
        cmd.args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-print_format",
            "json=compact=1",
            "-show_streams",
            "-show_frames",
            "--",
        ])
        .arg(input)
        .stdin(Stdio::null());
        cmd
    }

    /// Probes `input` and returns its video frames in report order.
    ///
    /// Any spawn failure, non-zero exit or unusable report is a
    /// [`TraceError::ProbeFailure`].
    pub fn probe_frames(&self, input: &Path) -> Result<Vec<FrameRecord>> {
        let start = Instant::now();
        let output = self
            .frames_command(input)
            .output()
            .map_err(|e| TraceError::probe(input, format!("failed to run {}: {}", self.path.display(), e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(
            input = %input.display(),
            exit_code = ?output.status.code(),
            duration_secs = start.elapsed().as_secs_f64(),
            stdout_bytes = output.stdout.len(),
            stderr = %stderr.trim(),
            "ffprobe finished"
        );

        if !output.status.success() {
            let reason = if stderr.trim().is_empty() {
                format!("exit code {:?}", output.status.code())
            } else {
                format!("exit code {:?}: {}", output.status.code(), stderr.trim())
            };
            return Err(TraceError::probe(input, reason));
        }

        parse_frames_json(&output.stdout).map_err(|reason| TraceError::probe(input, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_keeps_path() {
        let tool = ProbeTool::at("/opt/ffmpeg/bin/ffprobe");
        assert_eq!(tool.path(), Path::new("/opt/ffmpeg/bin/ffprobe"));
    }

    #[test]
    fn test_resolve_prefers_existing_override() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("my-ffprobe");
        std::fs::write(&fake, b"").unwrap();

        let tool = ProbeTool::resolve(Some(fake.as_path())).unwrap();
        assert_eq!(tool.path(), fake.as_path());
    }

    #[test]
    fn test_missing_binary_is_probe_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tool = ProbeTool::at(dir.path().join("does-not-exist"));
        let err = tool.probe_frames(Path::new("clip.mp4")).unwrap_err();
        assert!(matches!(err, TraceError::ProbeFailure { .. }), "{:?}", err);
    }

    #[test]
    fn test_command_arguments() {
        let tool = ProbeTool::at("ffprobe");
        let cmd = tool.frames_command(Path::new("-odd-name.mp4"));
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-print_format",
                "json=compact=1",
                "-show_streams",
                "-show_frames",
                "--",
                "-odd-name.mp4",
            ]
        );
    }
}

#[cfg(all(test, unix))]
mod script_tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn fake_probe(dir: &Path, body: &str) -> ProbeTool {
        let path = dir.join("ffprobe");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        ProbeTool::at(path)
    }

    #[test]
    fn test_nonzero_exit_is_probe_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_probe(dir.path(), "echo 'moov atom not found' >&2\nexit 1");
        let err = tool.probe_frames(Path::new("broken.mp4")).unwrap_err();
        match err {
            TraceError::ProbeFailure { path, reason } => {
                assert_eq!(path, PathBuf::from("broken.mp4"));
                assert!(reason.contains("moov atom not found"), "{}", reason);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_successful_probe() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_probe(
            dir.path(),
            r#"echo '{"streams":[{"codec_type":"video"}],"frames":[{"pts_time":"0.0","pkt_size":"1200","pict_type":"I"},{"pts_time":"0.033","pkt_size":"400","pict_type":"P"}]}'"#,
        );
        let frames = tool.probe_frames(Path::new("clip.mp4")).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].size_bytes, 400);
    }

    #[test]
    fn test_garbage_output_is_probe_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_probe(dir.path(), "echo 'not json'");
        let err = tool.probe_frames(Path::new("clip.mp4")).unwrap_err();
        assert!(matches!(err, TraceError::ProbeFailure { .. }));
    }
}
