//! Frame and trace value types.

use std::fmt;

/// Picture type of a decoded frame, as far as the trace consumer cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    I,
    P,
    B,
    Unknown,
}

impl FrameType {
    /// Maps ffprobe's `pict_type` / `key_frame` pair onto a frame type.
    ///
    /// A key frame without a usable picture type is reported as `I`.
    pub fn from_ffprobe(pict_type: Option<&str>, key_frame: Option<u8>) -> Self {
        match pict_type.map(str::trim) {
            Some("I") => FrameType::I,
            Some("P") => FrameType::P,
            Some("B") => FrameType::B,
            None | Some("") | Some("?") if key_frame == Some(1) => FrameType::I,
            _ => FrameType::Unknown,
        }
    }

    /// Parses a lookup-table key such as `"I"` or `"unknown"`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "i" => Some(FrameType::I),
            "p" => Some(FrameType::P),
            "b" => Some(FrameType::B),
            "unknown" | "?" => Some(FrameType::Unknown),
            _ => None,
        }
    }

    pub const ALL: [FrameType; 4] = [FrameType::I, FrameType::P, FrameType::B, FrameType::Unknown];
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameType::I => write!(f, "I"),
            FrameType::P => write!(f, "P"),
            FrameType::B => write!(f, "B"),
            FrameType::Unknown => write!(f, "unknown"),
        }
    }
}

/// One decoded video frame as reported by the probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRecord {
    /// Presentation timestamp in seconds.
    pub presentation_time: f64,
    pub size_bytes: u64,
    pub frame_type: FrameType,
    /// `coded_picture_number` when the probe reports it, else the report position.
    pub coded_index: u64,
}

impl FrameRecord {
    pub fn new(presentation_time: f64, size_bytes: u64, frame_type: FrameType) -> Self {
        Self {
            presentation_time,
            size_bytes,
            frame_type,
            coded_index: 0,
        }
    }

    pub fn with_coded_index(mut self, coded_index: u64) -> Self {
        self.coded_index = coded_index;
        self
    }
}

/// One line of the output trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceLine {
    pub send_time_offset_ms: u64,
    pub size_bytes: u64,
    pub frame_type: FrameType,
    pub coded_index: u64,
}
