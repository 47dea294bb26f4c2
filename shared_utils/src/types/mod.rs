//! Value types shared by the extractor and the trace writer.
//!
//! - `frame`: frame records, frame types and trace lines

pub mod frame;

pub use frame::{FrameRecord, FrameType, TraceLine};
