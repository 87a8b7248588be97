//! Summaries of recorded robot demonstration episodes.
//!
//! Raw containers are normalized one at a time by [`EpisodeExtractor`], folded
//! per folder by [`FolderAggregator`] and across a codebase root by
//! [`CorpusAggregator`]. The [`output`] module renders the results as CSV and
//! JSON.

mod corpus;
pub mod discovery;
mod episode;
mod error;
mod folder;
pub mod meta;
pub mod output;
#[cfg(test)]
mod test_support;
mod warning;

pub use corpus::CorpusAggregator;
pub use corpus::CorpusOptions;
pub use corpus::CorpusSummary;
pub use corpus::SkippedFolder;
pub use episode::DEFAULT_TOLERANCE;
pub use episode::EpisodeExtractor;
pub use episode::EpisodeSource;
pub use episode::EpisodeSummary;
pub use episode::ExtractOptions;
pub use episode::FALLBACK_FRAME_RATE;
pub use error::Error;
pub use error::Result;
pub use folder::EmptyFolderPolicy;
pub use folder::FolderAggregator;
pub use folder::FolderOptions;
pub use folder::FolderSummary;
pub use folder::SkippedEpisode;
pub use folder::Totals;
pub use meta::MetaConfig;
pub use meta::MetaKey;
pub use warning::ConsistencyWarning;
