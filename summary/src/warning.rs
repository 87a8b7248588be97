use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Non-fatal divergence noticed while normalizing an episode. Warnings never
/// abort processing; they travel with the summary that raised them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsistencyWarning {
    FrameRateMismatch { declared: f64, derived: f64 },
    InvalidFrameRate { value: String },
    MissingFrameRate { fallback: f64 },
    TimestampCountMismatch { timestamps: u64, frames: u64 },
    NonMonotonicTimestamps,
    SegmentOutOfRange { start: u64, frame_count: u64 },
    OverlappingSegments { index: usize },
    UnparsedRecordTime { value: String },
    DuplicateTaskName { task_name: String, renamed_to: String },
}

impl fmt::Display for ConsistencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyWarning::FrameRateMismatch { declared, derived } => write!(
                f,
                "declared frame rate {declared} differs from timestamp-derived rate {derived:.3}"
            ),
            ConsistencyWarning::InvalidFrameRate { value } => {
                write!(f, "ignoring invalid declared frame rate `{value}`")
            }
            ConsistencyWarning::MissingFrameRate { fallback } => {
                write!(f, "no frame rate available, assuming {fallback}")
            }
            ConsistencyWarning::TimestampCountMismatch { timestamps, frames } => {
                write!(f, "{timestamps} timestamps recorded for {frames} frames")
            }
            ConsistencyWarning::NonMonotonicTimestamps => {
                f.write_str("timestamps are not increasing; ignoring them for the frame rate")
            }
            ConsistencyWarning::SegmentOutOfRange { start, frame_count } => write!(
                f,
                "segment starting at frame {start} lies outside the {frame_count} recorded frames"
            ),
            ConsistencyWarning::OverlappingSegments { index } => {
                write!(f, "segment {index} overlaps the segment before it and is not counted")
            }
            ConsistencyWarning::UnparsedRecordTime { value } => {
                write!(f, "unrecognized record time `{value}`")
            }
            ConsistencyWarning::DuplicateTaskName {
                task_name,
                renamed_to,
            } => write!(f, "task name `{task_name}` already used, renamed to `{renamed_to}`"),
        }
    }
}
