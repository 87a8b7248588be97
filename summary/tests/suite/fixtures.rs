use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use aloha_container::AttributeValue;
use aloha_container::ContainerError;
use aloha_container::ContainerReader;
use aloha_container::RawEpisode;
use aloha_summary::EmptyFolderPolicy;
use aloha_summary::EpisodeExtractor;
use aloha_summary::ExtractOptions;
use aloha_summary::FolderAggregator;
use aloha_summary::FolderOptions;
use aloha_summary::MetaConfig;

/// Decodes containers that hold a JSON-encoded [`RawEpisode`].
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFixtureReader;

impl ContainerReader for JsonFixtureReader {
    fn read(&self, path: &Path) -> Result<RawEpisode, ContainerError> {
        let contents = fs::read_to_string(path).map_err(|err| ContainerError::Open {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|err| ContainerError::Read {
            path: path.to_path_buf(),
            name: "fixture".to_string(),
            message: err.to_string(),
        })
    }
}

pub fn write_episode(path: &Path, raw: &RawEpisode) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string(raw)?)?;
    Ok(())
}

pub fn write_garbage(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, b"\x89HDF\r\n\x1a\n truncated")?;
    Ok(())
}

pub fn episode(frame_count: u64, frame_rate: f64) -> RawEpisode {
    RawEpisode {
        frame_count: Some(frame_count),
        attributes: Some(BTreeMap::from([
            ("frame_rate".to_string(), AttributeValue::Number(frame_rate)),
            ("robot_id".to_string(), AttributeValue::Text("aloha-1".to_string())),
        ])),
        ..RawEpisode::default()
    }
}

pub fn folder_aggregator(
    meta: &MetaConfig,
    empty_policy: EmptyFolderPolicy,
) -> FolderAggregator<'_, JsonFixtureReader> {
    FolderAggregator::new(
        JsonFixtureReader,
        EpisodeExtractor::new(meta, ExtractOptions::default()),
        FolderOptions {
            empty_policy,
            ..FolderOptions::default()
        },
    )
}
