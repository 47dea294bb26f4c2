//! Frame type → trace symbol lookup table.
//!
//! The simulator reads a single token per frame type. The defaults match what
//! ns-3's `UdpTraceClient` understands; frames ffprobe could not classify are
//! sent as `P` since the client only treats `B` specially.

use crate::errors::{Result, TraceError};
use crate::types::FrameType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct FrameTypeMap {
    i: String,
    p: String,
    b: String,
    unknown: String,
}

impl Default for FrameTypeMap {
    fn default() -> Self {
        Self {
            i: "I".to_string(),
            p: "P".to_string(),
            b: "B".to_string(),
            unknown: "P".to_string(),
        }
    }
}

fn validate_symbol(frame_type: FrameType, symbol: &str) -> Result<()> {
    if symbol.is_empty() {
        return Err(TraceError::InvalidConfig(format!(
            "empty symbol for frame type {}",
            frame_type
        )));
    }
    if symbol.chars().any(char::is_whitespace) {
        return Err(TraceError::InvalidConfig(format!(
            "symbol {:?} for frame type {} contains whitespace",
            symbol, frame_type
        )));
    }
    Ok(())
}

impl FrameTypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the symbol for one frame type.
    pub fn with(mut self, frame_type: FrameType, symbol: impl Into<String>) -> Result<Self> {
        self.set(frame_type, symbol)?;
        Ok(self)
    }

    pub fn set(&mut self, frame_type: FrameType, symbol: impl Into<String>) -> Result<()> {
        let symbol = symbol.into();
        validate_symbol(frame_type, &symbol)?;
        *self.slot_mut(frame_type) = symbol;
        Ok(())
    }

    pub fn symbol(&self, frame_type: FrameType) -> &str {
        match frame_type {
            FrameType::I => &self.i,
            FrameType::P => &self.p,
            FrameType::B => &self.b,
            FrameType::Unknown => &self.unknown,
        }
    }

    fn slot_mut(&mut self, frame_type: FrameType) -> &mut String {
        match frame_type {
            FrameType::I => &mut self.i,
            FrameType::P => &mut self.p,
            FrameType::B => &mut self.b,
            FrameType::Unknown => &mut self.unknown,
        }
    }

    /// Loads a table from a JSON object such as `{"I": "I", "unknown": "P"}`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TraceError::InvalidConfig(e.to_string()))
    }
}

impl TryFrom<BTreeMap<String, String>> for FrameTypeMap {
    type Error = TraceError;

    fn try_from(entries: BTreeMap<String, String>) -> Result<Self> {
        let mut map = FrameTypeMap::default();
        for (key, symbol) in entries {
            let frame_type = FrameType::from_key(&key).ok_or_else(|| {
                TraceError::InvalidConfig(format!(
                    "unknown frame type {:?} (expected I, P, B or unknown)",
                    key
                ))
            })?;
            map.set(frame_type, symbol)?;
        }
        Ok(map)
    }
}

impl From<FrameTypeMap> for BTreeMap<String, String> {
    fn from(map: FrameTypeMap) -> Self {
        FrameType::ALL
            .into_iter()
            .map(|ft| (ft.to_string(), map.symbol(ft).to_string()))
            .collect()
    }
}
