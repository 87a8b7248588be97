use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Everything the summarizer needs from one episode container, before any
/// validation or defaulting.
///
/// `None` means the field is absent from the container; an empty collection
/// means it is present but holds no entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEpisode {
    /// Length of the first axis of the frame (`action`) array.
    pub frame_count: Option<u64>,
    /// Per-frame capture times in seconds.
    #[serde(default)]
    pub timestamps: Option<Vec<f64>>,
    /// Segment-boundary markers in the order they are stored.
    #[serde(default)]
    pub segment_bounds: Option<Vec<SegmentBound>>,
    /// Free-form attributes attached to the container root, keyed by their
    /// stored name.
    #[serde(default)]
    pub attributes: Option<BTreeMap<String, AttributeValue>>,
}

/// A labeled sub-range of frames. Markers stored as a flat list only carry a
/// start frame; markers stored as pairs also carry an exclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentBound {
    pub start: u64,
    #[serde(default)]
    pub end: Option<u64>,
}

impl SegmentBound {
    pub fn starting_at(start: u64) -> Self {
        Self { start, end: None }
    }

    pub fn range(start: u64, end: u64) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl AttributeValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(value) => Some(*value),
            AttributeValue::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Number(value) => write!(f, "{value}"),
            AttributeValue::Text(text) => f.write_str(text),
        }
    }
}
