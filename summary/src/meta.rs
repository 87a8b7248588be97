//! Recognized episode metadata keys and the static `meta.json` defaults.

use std::collections::BTreeMap;
use std::path::Path;

use aloha_container::AttributeValue;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::Error;
use crate::Result;

pub const UNKNOWN: &str = "unknown";

/// The closed set of metadata fields an episode summary carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaKey {
    TaskName,
    RobotId,
    OperatorId,
    Environment,
    SoftwareVersion,
    FrameRate,
    RecordTime,
    TargetItem,
    TargetArea,
    Description,
}

impl MetaKey {
    /// Maps a stored attribute or config key onto a recognized field.
    /// Matching ignores ASCII case, so `ROBOT_ID` and `robot_id` are the same.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name.trim().to_ascii_lowercase().as_str() {
            "task_name" | "task" => MetaKey::TaskName,
            "robot_id" | "robot" => MetaKey::RobotId,
            "operator_id" | "operator" => MetaKey::OperatorId,
            "environment" => MetaKey::Environment,
            "software_version" => MetaKey::SoftwareVersion,
            "frame_rate" | "fps" => MetaKey::FrameRate,
            "record_time" | "recorded_at" => MetaKey::RecordTime,
            "target_item" => MetaKey::TargetItem,
            "target_area" => MetaKey::TargetArea,
            "description" | "data_description" => MetaKey::Description,
            _ => return None,
        };
        Some(key)
    }

    /// Fallback for text fields when neither the container nor the config
    /// provides a value.
    pub fn default_text(self) -> &'static str {
        match self {
            MetaKey::RobotId
            | MetaKey::OperatorId
            | MetaKey::Environment
            | MetaKey::SoftwareVersion => UNKNOWN,
            MetaKey::TaskName
            | MetaKey::FrameRate
            | MetaKey::RecordTime
            | MetaKey::TargetItem
            | MetaKey::TargetArea
            | MetaKey::Description => "",
        }
    }

    /// Keys that identify a single recording and therefore make no sense as
    /// folder-wide defaults.
    fn is_per_episode(self) -> bool {
        matches!(self, MetaKey::TaskName | MetaKey::RecordTime)
    }
}

/// Normalizes a free-form attribute block into recognized keys. When several
/// stored names alias the same key, the first in name order wins.
pub fn recognize_attributes(
    attributes: &BTreeMap<String, AttributeValue>,
) -> BTreeMap<MetaKey, &AttributeValue> {
    let mut recognized = BTreeMap::new();
    for (name, value) in attributes {
        match MetaKey::from_name(name) {
            Some(key) => {
                recognized.entry(key).or_insert(value);
            }
            None => debug!("ignoring unrecognized attribute `{name}`"),
        }
    }
    recognized
}

/// Defaults injected from `meta.json`, consulted after the container's own
/// attributes and before the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaConfig {
    values: BTreeMap<MetaKey, AttributeValue>,
}

impl MetaConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        Self::from_json_str(&contents).map_err(|source| Error::MetaConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path` when it exists and falls back to an empty config
    /// otherwise.
    pub fn load_if_present(path: &Path) -> Result<Self> {
        if path.is_file() {
            Self::load(path)
        } else {
            debug!("no metadata config at {}", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_json_str(contents: &str) -> serde_json::Result<Self> {
        let object: serde_json::Map<String, Value> = serde_json::from_str(contents)?;
        let mut values = BTreeMap::new();
        for (name, value) in object {
            let Some(key) = MetaKey::from_name(&name) else {
                debug!("ignoring unrecognized metadata key `{name}`");
                continue;
            };
            if key.is_per_episode() {
                debug!("ignoring per-episode metadata key `{name}` in config");
                continue;
            }
            let value = match value {
                Value::String(text) => AttributeValue::Text(text),
                Value::Number(number) => match number.as_f64() {
                    Some(number) => AttributeValue::Number(number),
                    None => continue,
                },
                Value::Null => continue,
                other => AttributeValue::Text(other.to_string()),
            };
            values.insert(key, value);
        }
        Ok(Self { values })
    }

    pub fn with_value(mut self, key: MetaKey, value: AttributeValue) -> Self {
        self.values.insert(key, value);
        self
    }

    pub fn get(&self, key: MetaKey) -> Option<&AttributeValue> {
        self.values.get(&key)
    }
}
