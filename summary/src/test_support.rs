use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use aloha_container::AttributeValue;
use aloha_container::ContainerError;
use aloha_container::ContainerReader;
use aloha_container::RawEpisode;

/// Serves raw episodes from memory; any unknown path fails to open.
#[derive(Debug, Default)]
pub(crate) struct MapReader {
    episodes: HashMap<PathBuf, RawEpisode>,
}

impl MapReader {
    pub(crate) fn with(mut self, path: PathBuf, raw: RawEpisode) -> Self {
        self.episodes.insert(path, raw);
        self
    }
}

impl ContainerReader for MapReader {
    fn read(&self, path: &Path) -> Result<RawEpisode, ContainerError> {
        self.episodes
            .get(path)
            .cloned()
            .ok_or_else(|| ContainerError::Open {
                path: path.to_path_buf(),
                message: "not an episode container".to_string(),
            })
    }
}

/// Behaves like a build without any container backend.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UnsupportedReader;

impl ContainerReader for UnsupportedReader {
    fn read(&self, path: &Path) -> Result<RawEpisode, ContainerError> {
        Err(ContainerError::Unsupported {
            path: path.to_path_buf(),
        })
    }
}

pub(crate) fn episode_with_rate(frame_count: u64, frame_rate: f64) -> RawEpisode {
    RawEpisode {
        frame_count: Some(frame_count),
        attributes: Some(BTreeMap::from([(
            "frame_rate".to_string(),
            AttributeValue::Number(frame_rate),
        )])),
        ..RawEpisode::default()
    }
}
