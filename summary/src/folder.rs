use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use aloha_container::ContainerError;
use aloha_container::ContainerReader;
use aloha_container::DEFAULT_CONTAINER_EXTENSIONS;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::EpisodeExtractor;
use crate::EpisodeSource;
use crate::EpisodeSummary;
use crate::Error;
use crate::Result;
use crate::discovery::discover_containers;

/// What to do with a folder that yields no valid episodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyFolderPolicy {
    /// Report [`Error::EmptyFolder`].
    #[default]
    Fail,
    /// Produce a zero-row summary.
    AllowEmpty,
}

#[derive(Debug, Clone)]
pub struct FolderOptions {
    pub empty_policy: EmptyFolderPolicy,
    pub extensions: Vec<String>,
}

impl Default for FolderOptions {
    fn default() -> Self {
        Self {
            empty_policy: EmptyFolderPolicy::default(),
            extensions: DEFAULT_CONTAINER_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEpisode {
    pub path: PathBuf,
    pub reason: String,
}

/// Running sums over a sequence of episodes. Built only by folding.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub episode_count: u64,
    pub total_time_seconds: f64,
    pub total_frame_count: u64,
    pub total_segment_count: u64,
}

impl Totals {
    pub fn add_episode(self, episode: &EpisodeSummary) -> Self {
        Self {
            episode_count: self.episode_count + 1,
            total_time_seconds: self.total_time_seconds + episode.total_time_seconds,
            total_frame_count: self.total_frame_count + episode.frame_count,
            total_segment_count: self.total_segment_count + episode.segment_count,
        }
    }

    pub fn merge(self, other: Totals) -> Self {
        Self {
            episode_count: self.episode_count + other.episode_count,
            total_time_seconds: self.total_time_seconds + other.total_time_seconds,
            total_frame_count: self.total_frame_count + other.total_frame_count,
            total_segment_count: self.total_segment_count + other.total_segment_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderSummary {
    /// Identifier of the folder: its final path component.
    pub folder_name: String,
    pub folder_path: PathBuf,
    pub episode_count: u64,
    pub total_time_seconds: f64,
    pub total_frame_count: u64,
    pub total_segment_count: u64,
    /// Episodes in discovery order.
    pub episodes: Vec<EpisodeSummary>,
    #[serde(default)]
    pub skipped: Vec<SkippedEpisode>,
}

impl FolderSummary {
    /// Finalizes a folder from its episodes in discovery order.
    pub fn from_episodes(
        folder_path: &Path,
        episodes: Vec<EpisodeSummary>,
        skipped: Vec<SkippedEpisode>,
    ) -> Self {
        let totals = episodes.iter().fold(Totals::default(), Totals::add_episode);
        Self {
            folder_name: folder_name(folder_path),
            folder_path: folder_path.to_path_buf(),
            episode_count: totals.episode_count,
            total_time_seconds: totals.total_time_seconds,
            total_frame_count: totals.total_frame_count,
            total_segment_count: totals.total_segment_count,
            episodes,
            skipped,
        }
    }

    pub fn totals(&self) -> Totals {
        Totals {
            episode_count: self.episode_count,
            total_time_seconds: self.total_time_seconds,
            total_frame_count: self.total_frame_count,
            total_segment_count: self.total_segment_count,
        }
    }

    pub fn total_time_hours(&self) -> f64 {
        self.total_time_seconds / 3600.0
    }

    /// Frames per second across the whole folder.
    pub fn effective_frame_rate(&self) -> f64 {
        effective_frame_rate(self.total_frame_count, self.total_time_seconds)
    }

    /// Earliest recording time among the episodes.
    pub fn first_record_time(&self) -> Option<NaiveDateTime> {
        self.episodes.iter().filter_map(|episode| episode.record_time).min()
    }

    pub fn warning_count(&self) -> usize {
        self.episodes.iter().map(|episode| episode.warnings.len()).sum()
    }
}

pub(crate) fn effective_frame_rate(frames: u64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        frames as f64 / seconds
    } else {
        0.0
    }
}

pub(crate) fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Builds a [`FolderSummary`] from every container in one folder.
pub struct FolderAggregator<'a, R> {
    reader: R,
    extractor: EpisodeExtractor<'a>,
    options: FolderOptions,
}

impl<'a, R: ContainerReader> FolderAggregator<'a, R> {
    pub fn new(reader: R, extractor: EpisodeExtractor<'a>, options: FolderOptions) -> Self {
        Self {
            reader,
            extractor,
            options,
        }
    }

    pub fn options(&self) -> &FolderOptions {
        &self.options
    }

    /// Reads every container under `folder` in relative-path order. A
    /// container that fails to read or extract is listed under `skipped` and
    /// does not stop the folder; a reader without a backend stops it.
    pub fn aggregate(&self, folder: &Path) -> Result<FolderSummary> {
        let containers = discover_containers(folder, &self.options.extensions)?;
        info!(
            "analyzing {} container(s) in {}",
            containers.len(),
            folder.display()
        );

        let mut episodes = Vec::with_capacity(containers.len());
        let mut skipped = Vec::new();
        let mut seen_names = HashSet::new();
        for path in containers {
            let source = EpisodeSource::new(folder, &path);
            let episode = match self.read_episode(&source) {
                Ok(episode) => episode,
                Err(err @ Error::ReaderUnavailable(_)) => return Err(err),
                Err(err) => {
                    warn!("skipping {}: {err}", path.display());
                    skipped.push(SkippedEpisode {
                        path,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            let episode = ensure_unique_name(episode, &source, &mut seen_names);
            for warning in &episode.warnings {
                warn!("{}: {warning}", episode.task_name);
            }
            debug!(
                "{}: {} frames, {} segments, {:.3}s",
                episode.task_name,
                episode.frame_count,
                episode.segment_count,
                episode.total_time_seconds
            );
            episodes.push(episode);
        }

        if episodes.is_empty() && self.options.empty_policy == EmptyFolderPolicy::Fail {
            return Err(Error::EmptyFolder {
                path: folder.to_path_buf(),
                skipped: skipped.len(),
            });
        }

        Ok(FolderSummary::from_episodes(folder, episodes, skipped))
    }

    fn read_episode(&self, source: &EpisodeSource) -> Result<EpisodeSummary> {
        let raw = self.reader.read(&source.path).map_err(|err| match err {
            ContainerError::Unsupported { .. } => Error::ReaderUnavailable(err),
            err => Error::MalformedRecord {
                path: source.path.clone(),
                reason: err.to_string(),
            },
        })?;
        self.extractor.extract(&raw, source)
    }
}

fn ensure_unique_name(
    episode: EpisodeSummary,
    source: &EpisodeSource,
    seen: &mut HashSet<String>,
) -> EpisodeSummary {
    if seen.insert(episode.task_name.clone()) {
        return episode;
    }
    let mut candidate = source.relative_name.clone();
    let mut suffix = 2;
    while seen.contains(&candidate) {
        candidate = format!("{}#{suffix}", source.relative_name);
        suffix += 1;
    }
    seen.insert(candidate.clone());
    episode.renamed(candidate)
}
