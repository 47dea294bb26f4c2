//! Shared Utilities for the vid-trace tools
//!
//! - Frame extraction through ffprobe (`ffprobe`, `ffprobe_json`)
//! - Trace writing for ns-3's `UdpTraceClient` (`trace`, `symbol_map`)
//! - Batch bookkeeping and input validation (`batch`, `path_validator`)
//! - Logging, progress bar and summary report

pub mod batch;
pub mod errors;
pub mod ffprobe;
pub mod ffprobe_json;
pub mod logging;
pub mod path_validator;
pub mod progress;
pub mod report;
pub mod symbol_map;
pub mod trace;
pub mod types;

pub use batch::{collect_files, has_extension, BatchError, BatchResult, FailureKind, VIDEO_EXTENSIONS};
pub use errors::{Result, TraceError};
pub use ffprobe::ProbeTool;
pub use ffprobe_json::parse_frames_json;
pub use path_validator::{sanitize_inputs, RejectReason, SanitizedInputs};
pub use progress::{create_progress_bar, format_duration, ProgressBar};
pub use report::{print_summary_report, render_summary};
pub use symbol_map::FrameTypeMap;
pub use trace::{
    build_trace, format_trace, output_path_for, write_trace, TimeBase, TraceLayout, TraceOptions,
    OUTPUT_EXTENSION,
};
pub use types::{FrameRecord, FrameType, TraceLine};
