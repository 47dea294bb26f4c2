//! Input Path Validation Module
//!
//! Filters the candidate input list before any probing starts. Each dropped
//! path is logged with the reason; the first occurrence of a duplicate wins.

use crate::batch::has_extension;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    NotFound,
    NotAFile,
    /// Resolves to the same file as an earlier input.
    SameFile { kept: PathBuf },
    /// Same file stem as an earlier input, so both would map to one output.
    SameBasename { kept: PathBuf },
    WrongExtension,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotFound => write!(f, "path does not exist"),
            RejectReason::NotAFile => write!(f, "path is not a file"),
            RejectReason::SameFile { kept } => {
                write!(f, "same file as '{}', only the first is kept", kept.display())
            }
            RejectReason::SameBasename { kept } => write!(
                f,
                "same output name as '{}', only the first is kept",
                kept.display()
            ),
            RejectReason::WrongExtension => write!(f, "unsupported file extension"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SanitizedInputs {
    pub accepted: Vec<PathBuf>,
    pub rejected: Vec<(PathBuf, RejectReason)>,
}

fn check(
    path: &Path,
    extensions: &[impl AsRef<str>],
    by_basename: &HashMap<String, PathBuf>,
    by_realpath: &HashMap<PathBuf, PathBuf>,
) -> Result<(String, PathBuf), RejectReason> {
    let metadata = std::fs::metadata(path).map_err(|_| RejectReason::NotFound)?;
    if !metadata.is_file() {
        return Err(RejectReason::NotAFile);
    }

    // Traces are named after the stem, and the output directory may sit on
    // a case-insensitive filesystem.
    let basename = path
        .file_stem()
        .map(|n| n.to_string_lossy().to_lowercase())
        .ok_or(RejectReason::NotAFile)?;
    let realpath = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

    if let Some(kept) = by_basename.get(&basename) {
        return Err(RejectReason::SameBasename { kept: kept.clone() });
    }
    if let Some(kept) = by_realpath.get(&realpath) {
        return Err(RejectReason::SameFile { kept: kept.clone() });
    }
    if !has_extension(path, extensions) {
        return Err(RejectReason::WrongExtension);
    }
    Ok((basename, realpath))
}

/// Keeps existing regular files with one of `extensions`, dropping later
/// duplicates by resolved path or by output name.
pub fn sanitize_inputs(paths: &[PathBuf], extensions: &[impl AsRef<str>]) -> SanitizedInputs {
    let mut result = SanitizedInputs::default();
    let mut by_basename: HashMap<String, PathBuf> = HashMap::new();
    let mut by_realpath: HashMap<PathBuf, PathBuf> = HashMap::new();

    for path in paths {
        match check(path, extensions, &by_basename, &by_realpath) {
            Ok((basename, realpath)) => {
                by_basename.insert(basename, path.clone());
                by_realpath.insert(realpath, path.clone());
                result.accepted.push(path.clone());
            }
            Err(reason) => {
                warn!(path = %path.display(), reason = %reason, "Input dropped");
                result.rejected.push((path.clone(), reason));
            }
        }
    }

    result
}
