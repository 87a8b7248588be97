//! Normalization of one raw episode into the fixed summary schema.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use aloha_container::AttributeValue;
use aloha_container::RawEpisode;
use aloha_container::SegmentBound;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;

use crate::ConsistencyWarning;
use crate::Error;
use crate::Result;
use crate::meta::MetaConfig;
use crate::meta::MetaKey;
use crate::meta::recognize_attributes;

/// Relative divergence tolerated between a declared and a derived frame rate.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Frame rate assumed when nothing declares or implies one.
pub const FALLBACK_FRAME_RATE: f64 = 1.0;

pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub task_name: String,
    pub total_time_seconds: f64,
    pub frame_count: u64,
    pub frame_rate: f64,
    pub robot_id: String,
    pub operator_id: String,
    pub segment_count: u64,
    pub record_time: Option<NaiveDateTime>,
    pub environment: String,
    pub software_version: String,
    pub target_item: String,
    pub target_area: String,
    pub description: String,
    #[serde(default)]
    pub warnings: Vec<ConsistencyWarning>,
}

impl EpisodeSummary {
    pub fn total_time_hours(&self) -> f64 {
        self.total_time_seconds / 3600.0
    }

    /// Returns the same summary under a new task name, recording why the
    /// name changed.
    pub(crate) fn renamed(mut self, task_name: String) -> Self {
        self.warnings.push(ConsistencyWarning::DuplicateTaskName {
            task_name: std::mem::replace(&mut self.task_name, task_name.clone()),
            renamed_to: task_name,
        });
        self
    }
}

/// Where a raw episode came from. `relative_name` is the container path
/// relative to its folder without extension, and doubles as the fallback
/// task name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeSource {
    pub path: PathBuf,
    pub relative_name: String,
}

impl EpisodeSource {
    pub fn new(folder: &Path, path: &Path) -> Self {
        let relative = path.strip_prefix(folder).unwrap_or(path);
        let relative_name = relative
            .with_extension("")
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Self {
            path: path.to_path_buf(),
            relative_name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractOptions {
    pub tolerance: f64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Turns raw container fields into [`EpisodeSummary`] values.
///
/// Extraction is a pure function of the raw episode, its source and the
/// injected metadata config.
#[derive(Debug, Clone)]
pub struct EpisodeExtractor<'a> {
    meta: &'a MetaConfig,
    options: ExtractOptions,
}

impl<'a> EpisodeExtractor<'a> {
    pub fn new(meta: &'a MetaConfig, options: ExtractOptions) -> Self {
        Self { meta, options }
    }

    pub fn extract(&self, raw: &RawEpisode, source: &EpisodeSource) -> Result<EpisodeSummary> {
        let Some(frame_count) = raw.frame_count else {
            return Err(malformed(source, "frame array `action` is missing"));
        };
        let Some(attributes) = raw.attributes.as_ref() else {
            return Err(malformed(source, "attribute block is missing"));
        };
        let attributes = recognize_attributes(attributes);
        let fields = ResolvedFields {
            attributes: &attributes,
            meta: self.meta,
        };
        let mut warnings = Vec::new();

        let derived_rate = derive_frame_rate(frame_count, raw.timestamps.as_deref(), &mut warnings);
        let declared_rate = fields.declared_frame_rate(&mut warnings);
        let frame_rate = match (derived_rate, declared_rate) {
            (Some(derived), Some(declared)) => {
                if relative_difference(declared, derived) > self.options.tolerance {
                    warnings.push(ConsistencyWarning::FrameRateMismatch { declared, derived });
                }
                derived
            }
            (Some(derived), None) => derived,
            (None, Some(declared)) => declared,
            (None, None) => {
                warnings.push(ConsistencyWarning::MissingFrameRate {
                    fallback: FALLBACK_FRAME_RATE,
                });
                FALLBACK_FRAME_RATE
            }
        };

        let segment_count =
            count_segments(frame_count, raw.segment_bounds.as_deref(), &mut warnings);
        let record_time = fields.record_time(&mut warnings);
        let task_name = fields
            .text(MetaKey::TaskName)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| source.relative_name.clone());

        Ok(EpisodeSummary {
            task_name,
            total_time_seconds: frame_count as f64 / frame_rate,
            frame_count,
            frame_rate,
            robot_id: fields.text_or_default(MetaKey::RobotId),
            operator_id: fields.text_or_default(MetaKey::OperatorId),
            segment_count,
            record_time,
            environment: fields.text_or_default(MetaKey::Environment),
            software_version: fields.text_or_default(MetaKey::SoftwareVersion),
            target_item: fields.text_or_default(MetaKey::TargetItem),
            target_area: fields.text_or_default(MetaKey::TargetArea),
            description: fields.text_or_default(MetaKey::Description),
            warnings,
        })
    }
}

fn malformed(source: &EpisodeSource, reason: &str) -> Error {
    Error::MalformedRecord {
        path: source.path.clone(),
        reason: reason.to_string(),
    }
}

/// Lookup chain for metadata: container attribute, then config, then the
/// built-in default.
struct ResolvedFields<'a> {
    attributes: &'a BTreeMap<MetaKey, &'a AttributeValue>,
    meta: &'a MetaConfig,
}

impl ResolvedFields<'_> {
    fn sources(&self, key: MetaKey) -> impl Iterator<Item = &AttributeValue> {
        self.attributes
            .get(&key)
            .copied()
            .into_iter()
            .chain(self.meta.get(key))
    }

    fn text(&self, key: MetaKey) -> Option<String> {
        self.sources(key).next().map(|value| value.to_string().trim().to_string())
    }

    fn text_or_default(&self, key: MetaKey) -> String {
        self.text(key)
            .unwrap_or_else(|| key.default_text().to_string())
    }

    fn declared_frame_rate(&self, warnings: &mut Vec<ConsistencyWarning>) -> Option<f64> {
        for value in self.sources(MetaKey::FrameRate) {
            match value.as_f64() {
                Some(rate) if rate.is_finite() && rate > 0.0 => return Some(rate),
                _ => warnings.push(ConsistencyWarning::InvalidFrameRate {
                    value: value.to_string(),
                }),
            }
        }
        None
    }

    fn record_time(&self, warnings: &mut Vec<ConsistencyWarning>) -> Option<NaiveDateTime> {
        let value = self.attributes.get(&MetaKey::RecordTime)?;
        let parsed = match value {
            AttributeValue::Number(seconds) if seconds.is_finite() => {
                DateTime::from_timestamp(seconds.trunc() as i64, 0).map(|time| time.naive_utc())
            }
            AttributeValue::Number(_) => None,
            AttributeValue::Text(text) => parse_record_time(text),
        };
        if parsed.is_none() {
            warnings.push(ConsistencyWarning::UnparsedRecordTime {
                value: value.to_string(),
            });
        }
        parsed
    }
}

fn parse_record_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time.naive_local());
    }
    for format in [RECORD_TIME_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y%m%d_%H%M%S"] {
        if let Ok(time) = NaiveDateTime::parse_from_str(text, format) {
            return Some(time);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Frame rate implied by the capture timestamps, if they span a positive,
/// non-decreasing interval.
fn derive_frame_rate(
    frame_count: u64,
    timestamps: Option<&[f64]>,
    warnings: &mut Vec<ConsistencyWarning>,
) -> Option<f64> {
    let timestamps = timestamps?;
    if timestamps.len() as u64 != frame_count {
        warnings.push(ConsistencyWarning::TimestampCountMismatch {
            timestamps: timestamps.len() as u64,
            frames: frame_count,
        });
    }
    let (first, last) = match timestamps {
        [first, .., last] => (*first, *last),
        _ => return None,
    };

    let increasing = timestamps
        .windows(2)
        .all(|pair| pair[1].is_finite() && pair[1] >= pair[0]);
    let span = last - first;
    if !increasing || !first.is_finite() || span <= 0.0 {
        warnings.push(ConsistencyWarning::NonMonotonicTimestamps);
        return None;
    }

    let samples = if frame_count >= 2 {
        frame_count
    } else {
        timestamps.len() as u64
    };
    Some((samples - 1) as f64 / span)
}

/// Counts the markers that describe a distinct segment inside
/// `[0, frame_count)`. Out-of-range markers and markers starting before the
/// end of the last counted one are flagged and left out, so the count never
/// exceeds `frame_count`.
fn count_segments(
    frame_count: u64,
    bounds: Option<&[SegmentBound]>,
    warnings: &mut Vec<ConsistencyWarning>,
) -> u64 {
    let Some(bounds) = bounds else {
        return 0;
    };

    let mut count = 0;
    let mut previous: Option<&SegmentBound> = None;
    for (index, bound) in bounds.iter().enumerate() {
        let in_range = bound.start < frame_count
            && bound
                .end
                .is_none_or(|end| end > bound.start && end <= frame_count);
        if !in_range {
            warnings.push(ConsistencyWarning::SegmentOutOfRange {
                start: bound.start,
                frame_count,
            });
            continue;
        }
        if let Some(previous) = previous {
            let previous_end = previous.end.unwrap_or(previous.start + 1);
            if bound.start < previous_end {
                warnings.push(ConsistencyWarning::OverlappingSegments { index });
                continue;
            }
        }
        previous = Some(bound);
        count += 1;
    }
    count
}

fn relative_difference(value: f64, reference: f64) -> f64 {
    ((value - reference) / reference).abs()
}
