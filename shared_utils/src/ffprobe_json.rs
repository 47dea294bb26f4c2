//! FFprobe JSON parsing for `-show_frames` reports
//! Uses serde_json instead of hand-rolled string parsing

use crate::types::{FrameRecord, FrameType};
use serde::Deserialize;
use tracing::debug;

/// ffprobe prints most numeric fields as strings, but not all of them.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(serde_json::Number),
    Text(String),
}

impl NumberOrString {
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            NumberOrString::Number(n) => n.as_f64(),
            NumberOrString::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            NumberOrString::Number(n) => n.as_u64(),
            NumberOrString::Text(s) => s.trim().parse::<u64>().ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FfprobeStream {
    #[serde(default)]
    pub codec_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FfprobeFrame {
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub key_frame: Option<u8>,
    #[serde(default)]
    pub pts_time: Option<NumberOrString>,
    #[serde(default)]
    pub best_effort_timestamp_time: Option<NumberOrString>,
    #[serde(default)]
    pub pkt_dts_time: Option<NumberOrString>,
    #[serde(default)]
    pub pkt_size: Option<NumberOrString>,
    #[serde(default)]
    pub pict_type: Option<String>,
    #[serde(default)]
    pub coded_picture_number: Option<u64>,
}

impl FfprobeFrame {
    fn is_video(&self) -> bool {
        self.media_type.as_deref().map_or(true, |m| m == "video")
    }

    fn timestamp(&self) -> Option<f64> {
        [
            &self.pts_time,
            &self.best_effort_timestamp_time,
            &self.pkt_dts_time,
        ]
        .into_iter()
        .find_map(|field| field.as_ref().and_then(NumberOrString::as_f64))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FfprobeFramesOutput {
    #[serde(default)]
    pub streams: Vec<FfprobeStream>,
    #[serde(default)]
    pub frames: Vec<FfprobeFrame>,
}

/// Turns the raw stdout of `ffprobe -show_streams -show_frames` into frame
/// records, in report order.
///
/// The error string describes what was wrong with the report; the caller
/// attaches the input path.
pub fn parse_frames_json(stdout: &[u8]) -> Result<Vec<FrameRecord>, String> {
    let parsed: FfprobeFramesOutput = serde_json::from_slice(stdout)
        .map_err(|e| format!("malformed ffprobe output: {}", e))?;

    if !parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref().map_or(true, |t| t == "video"))
    {
        return Err("no video stream found".to_string());
    }

    let mut records = Vec::with_capacity(parsed.frames.len());
    let mut previous: Option<f64> = None;

    for (position, frame) in parsed.frames.iter().filter(|f| f.is_video()).enumerate() {
        let presentation_time = frame
            .timestamp()
            .ok_or_else(|| format!("frame {} has no usable timestamp", position))?;

        let size_bytes = frame
            .pkt_size
            .as_ref()
            .and_then(NumberOrString::as_u64)
            .ok_or_else(|| format!("frame {} has no usable pkt_size", position))?;

        if let Some(prev) = previous {
            if presentation_time < prev {
                return Err(format!(
                    "frame {} goes back in time ({:.6}s after {:.6}s)",
                    position, presentation_time, prev
                ));
            }
        }
        previous = Some(presentation_time);

        let frame_type = FrameType::from_ffprobe(frame.pict_type.as_deref(), frame.key_frame);
        let coded_index = frame.coded_picture_number.unwrap_or(position as u64);

        records.push(FrameRecord {
            presentation_time,
            size_bytes,
            frame_type,
            coded_index,
        });
    }

    debug!(frames = records.len(), "Parsed ffprobe frame report");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM: &str = r#""streams":[{"index":0,"codec_type":"video","codec_name":"h264"}]"#;

    fn report(frames: &str) -> Vec<u8> {
        format!(r#"{{{},"frames":[{}]}}"#, STREAM, frames).into_bytes()
    }

    #[test]
    fn test_parse_three_frames() {
        let json = report(
            r#"{"media_type":"video","key_frame":1,"pts_time":"0.000000","pkt_size":"1200","pict_type":"I","coded_picture_number":0},
               {"media_type":"video","key_frame":0,"pts_time":"0.033000","pkt_size":"400","pict_type":"P","coded_picture_number":1},
               {"media_type":"video","key_frame":0,"pts_time":"0.066000","pkt_size":"350","pict_type":"P","coded_picture_number":2}"#,
        );
        let frames = parse_frames_json(&json).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].frame_type, FrameType::I);
        assert_eq!(frames[0].size_bytes, 1200);
        assert!((frames[1].presentation_time - 0.033).abs() < 1e-9);
        assert_eq!(frames[2].coded_index, 2);
    }

    #[test]
    fn test_timestamp_fallbacks() {
        let json = report(
            r#"{"best_effort_timestamp_time":"0.5","pkt_size":"10","pict_type":"B"},
               {"pkt_dts_time":"0.75","pkt_size":"20","pict_type":"P"}"#,
        );
        let frames = parse_frames_json(&json).unwrap();
        assert!((frames[0].presentation_time - 0.5).abs() < 1e-9);
        assert!((frames[1].presentation_time - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_coded_index_falls_back_to_position() {
        let json = report(
            r#"{"pts_time":"0.0","pkt_size":"10","pict_type":"I"},
               {"pts_time":"0.04","pkt_size":"20","pict_type":"P"}"#,
        );
        let frames = parse_frames_json(&json).unwrap();
        assert_eq!(frames[0].coded_index, 0);
        assert_eq!(frames[1].coded_index, 1);
    }

    #[test]
    fn test_numeric_fields_accepted() {
        let json = report(r#"{"pts_time":0.1,"pkt_size":99,"pict_type":"I"}"#);
        let frames = parse_frames_json(&json).unwrap();
        assert_eq!(frames[0].size_bytes, 99);
    }

    #[test]
    fn test_non_video_frames_skipped() {
        let json = report(
            r#"{"media_type":"audio","pts_time":"0.0","pkt_size":"4"},
               {"media_type":"video","pts_time":"0.0","pkt_size":"500","pict_type":"I"}"#,
        );
        let frames = parse_frames_json(&json).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].size_bytes, 500);
    }

    #[test]
    fn test_empty_stdout_is_malformed() {
        let err = parse_frames_json(b"").unwrap_err();
        assert!(err.contains("malformed"), "{}", err);
    }

    #[test]
    fn test_no_video_stream() {
        let err = parse_frames_json(br#"{"streams":[],"frames":[]}"#).unwrap_err();
        assert!(err.contains("no video stream"), "{}", err);
    }

    #[test]
    fn test_video_stream_without_frames_parses_empty() {
        let frames = parse_frames_json(&report("")).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn test_missing_size_rejected() {
        let err = parse_frames_json(&report(r#"{"pts_time":"0.0","pict_type":"I"}"#)).unwrap_err();
        assert!(err.contains("pkt_size"), "{}", err);
    }

    #[test]
    fn test_missing_timestamp_rejected() {
        let err = parse_frames_json(&report(r#"{"pts_time":"N/A","pkt_size":"1"}"#)).unwrap_err();
        assert!(err.contains("timestamp"), "{}", err);
    }

    #[test]
    fn test_decreasing_timestamps_rejected() {
        let json = report(
            r#"{"pts_time":"0.1","pkt_size":"1"},
               {"pts_time":"0.05","pkt_size":"1"}"#,
        );
        let err = parse_frames_json(&json).unwrap_err();
        assert!(err.contains("back in time"), "{}", err);
    }

    #[test]
    fn test_equal_timestamps_allowed() {
        let json = report(
            r#"{"pts_time":"0.1","pkt_size":"1"},
               {"pts_time":"0.1","pkt_size":"2"}"#,
        );
        assert_eq!(parse_frames_json(&json).unwrap().len(), 2);
    }
}
