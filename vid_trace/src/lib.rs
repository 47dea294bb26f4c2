//! vid-trace - MPEG-4 video trace extraction for ns-3
//!
//! Probes video files with ffprobe and writes one trace line per frame, in
//! the text format read by ns-3's `UdpTraceClient`.
//!
//! ```rust,ignore
//! use vid_trace::{run, TraceConfig};
//!
//! let config = TraceConfig::default();
//! let flags = run(&["clip.mp4".into()], &config, false);
//! std::process::exit(flags.bits() as i32);
//! ```

pub mod config;
pub mod conversion_api;

pub use config::TraceConfig;
pub use conversion_api::{
    convert_file, gather_inputs, prepare_output_dir, run, run_batch, ExitFlags, FileOutcome,
};
pub use shared_utils::{FrameRecord, FrameType, TimeBase, TraceError, TraceLayout};
