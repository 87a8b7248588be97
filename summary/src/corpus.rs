use std::path::Path;
use std::path::PathBuf;

use aloha_container::ContainerReader;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;
use tracing::warn;

use crate::Error;
use crate::FolderAggregator;
use crate::FolderSummary;
use crate::Result;
use crate::Totals;
use crate::discovery::DEFAULT_EXCLUDED_FRAGMENTS;
use crate::discovery::discover_folders;
use crate::folder::effective_frame_rate;

#[derive(Debug, Clone)]
pub struct CorpusOptions {
    /// Subfolders whose name contains any of these (case-insensitively) are
    /// left out of the run. Hidden folders are always left out.
    pub excluded_fragments: Vec<String>,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self {
            excluded_fragments: DEFAULT_EXCLUDED_FRAGMENTS
                .iter()
                .map(|fragment| (*fragment).to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFolder {
    pub folder: PathBuf,
    pub reason: String,
}

/// Cross-folder rollup for one codebase root. `folders` keeps discovery
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusSummary {
    pub root: PathBuf,
    pub folder_count: u64,
    pub total_episode_count: u64,
    pub total_time_seconds: f64,
    pub total_time_hours: f64,
    pub total_frame_count: u64,
    pub total_segment_count: u64,
    pub folders: IndexMap<String, FolderSummary>,
    #[serde(default)]
    pub skipped_folders: Vec<SkippedFolder>,
}

impl CorpusSummary {
    pub fn from_folders(
        root: &Path,
        folders: IndexMap<String, FolderSummary>,
        skipped_folders: Vec<SkippedFolder>,
    ) -> Self {
        let totals = folders
            .values()
            .map(FolderSummary::totals)
            .fold(Totals::default(), Totals::merge);
        Self {
            root: root.to_path_buf(),
            folder_count: folders.len() as u64,
            total_episode_count: totals.episode_count,
            total_time_seconds: totals.total_time_seconds,
            total_time_hours: totals.total_time_seconds / 3600.0,
            total_frame_count: totals.total_frame_count,
            total_segment_count: totals.total_segment_count,
            folders,
            skipped_folders,
        }
    }

    pub fn effective_frame_rate(&self) -> f64 {
        effective_frame_rate(self.total_frame_count, self.total_time_seconds)
    }

    pub fn warning_count(&self) -> usize {
        self.folders.values().map(FolderSummary::warning_count).sum()
    }

    pub fn skipped_episode_count(&self) -> usize {
        self.folders.values().map(|folder| folder.skipped.len()).sum()
    }
}

/// Runs a [`FolderAggregator`] over every candidate subfolder of a root.
pub struct CorpusAggregator<'a, R> {
    folders: FolderAggregator<'a, R>,
    options: CorpusOptions,
}

impl<'a, R: ContainerReader> CorpusAggregator<'a, R> {
    pub fn new(folders: FolderAggregator<'a, R>, options: CorpusOptions) -> Self {
        Self { folders, options }
    }

    /// A folder that fails on its own is recorded under `skipped_folders`.
    /// A root without any candidate folder, or a reader without a backend,
    /// is an error.
    pub fn aggregate(&self, root: &Path) -> Result<CorpusSummary> {
        let candidates = discover_folders(
            root,
            &self.folders.options().extensions,
            &self.options.excluded_fragments,
        )?;
        if candidates.is_empty() {
            return Err(Error::NoFoldersFound {
                root: root.to_path_buf(),
            });
        }
        info!(
            "found {} candidate folder(s) under {}",
            candidates.len(),
            root.display()
        );

        let mut folders = IndexMap::with_capacity(candidates.len());
        let mut skipped_folders = Vec::new();
        for (index, folder) in candidates.into_iter().enumerate() {
            match self.folders.aggregate(&folder) {
                Ok(summary) => {
                    info!(
                        "[{}] {}: {} episode(s), {} frames, {} segments",
                        index + 1,
                        summary.folder_name,
                        summary.episode_count,
                        summary.total_frame_count,
                        summary.total_segment_count
                    );
                    if summary.total_segment_count == 0 {
                        warn!("{}: no segment labels found", summary.folder_name);
                    }
                    folders.insert(summary.folder_name.clone(), summary);
                }
                Err(err @ Error::ReaderUnavailable(_)) => return Err(err),
                Err(err) => {
                    warn!("skipping folder {}: {err}", folder.display());
                    skipped_folders.push(SkippedFolder {
                        folder,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(CorpusSummary::from_folders(root, folders, skipped_folders))
    }
}
