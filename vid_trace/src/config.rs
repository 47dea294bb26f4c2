use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shared_utils::{FrameTypeMap, TimeBase, TraceError, TraceLayout, TraceOptions, VIDEO_EXTENSIONS};
use std::path::{Component, Path, PathBuf};
use tracing::info;

/// Everything a batch run needs; built from defaults, an optional JSON file
/// and the command line, in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TraceConfig {
    /// Explicit ffprobe location; `PATH` is searched when unset or missing.
    pub probe_path: Option<PathBuf>,
    /// Folder scanned for inputs in addition to the paths given on the command line.
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub recursive: bool,
    pub extensions: Vec<String>,
    /// Worker threads; 0 lets rayon decide.
    pub jobs: usize,
    /// Overwrite existing traces instead of skipping the input.
    pub force: bool,
    pub time_base: TimeBase,
    pub layout: TraceLayout,
    pub symbols: FrameTypeMap,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            probe_path: None,
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            recursive: false,
            extensions: VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            jobs: 0,
            force: false,
            time_base: TimeBase::default(),
            layout: TraceLayout::default(),
            symbols: FrameTypeMap::default(),
        }
    }
}

/// Resolved path when it exists, otherwise the path without `.` components.
fn normalized(dir: &Path) -> PathBuf {
    std::fs::canonicalize(dir).unwrap_or_else(|_| {
        dir.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    })
}

fn same_dir(a: &Path, b: &Path) -> bool {
    normalized(a) == normalized(b)
}

impl TraceConfig {
    pub fn load(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "Loading configuration");

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: TraceConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> shared_utils::Result<()> {
        if self.extensions.is_empty() {
            return Err(TraceError::InvalidConfig(
                "at least one input extension is required".to_string(),
            ));
        }
        if self.extensions.iter().any(|e| e.trim().is_empty() || e.starts_with('.')) {
            return Err(TraceError::InvalidConfig(format!(
                "extensions must be given without a leading dot: {:?}",
                self.extensions
            )));
        }
        if same_dir(&self.input_dir, &self.output_dir) {
            return Err(TraceError::InvalidConfig(format!(
                "input and output directories are the same: {}",
                self.input_dir.display()
            )));
        }
        Ok(())
    }

    pub fn trace_options(&self) -> TraceOptions {
        TraceOptions {
            time_base: self.time_base,
            layout: self.layout,
            symbols: self.symbols.clone(),
        }
    }
}
