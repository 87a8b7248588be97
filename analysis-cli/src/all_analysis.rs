use std::path::PathBuf;

use aloha_container::Hdf5Reader;
use aloha_summary::CorpusAggregator;
use aloha_summary::CorpusOptions;
use aloha_summary::CorpusSummary;
use aloha_summary::EpisodeExtractor;
use aloha_summary::FolderAggregator;
use aloha_summary::discovery::DEFAULT_EXCLUDED_FRAGMENTS;
use aloha_summary::output::write_corpus_csv;
use aloha_summary::output::write_corpus_json;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::CommonArgs;

/// Summarize every episode folder below a codebase root.
#[derive(Debug, Parser, Clone)]
#[command(name = "all-analysis", version)]
pub struct AllAnalysisCommand {
    /// Root whose immediate subfolders are analyzed one by one.
    #[arg(value_name = "CODEBASE_ROOT")]
    pub codebase_root: PathBuf,

    /// Where to write the batch CSV and JSON.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "data")]
    pub output_dir: PathBuf,

    /// Additional folder-name fragment to skip (repeatable, case-insensitive).
    #[arg(long = "exclude", value_name = "FRAGMENT")]
    pub exclude: Vec<String>,

    /// Do not skip folders named like temp/test/backup/trash directories.
    #[arg(long = "no-default-excludes", default_value_t = false)]
    pub no_default_excludes: bool,

    #[clap(flatten)]
    pub common: CommonArgs,
}

impl AllAnalysisCommand {
    pub fn run(&self) -> Result<CorpusSummary> {
        let meta = self.common.load_meta()?;
        let folders = FolderAggregator::new(
            Hdf5Reader,
            EpisodeExtractor::new(&meta, self.common.extract_options()),
            self.common.folder_options(),
        );
        let corpus = CorpusAggregator::new(folders, self.corpus_options())
            .aggregate(&self.codebase_root)
            .with_context(|| format!("failed to analyze {}", self.codebase_root.display()))?;

        let csv_path = write_corpus_csv(&corpus, &self.output_dir)?;
        let json_path = write_corpus_json(&corpus, &self.output_dir)?;
        info!("wrote {} and {}", csv_path.display(), json_path.display());

        print_corpus_report(&corpus);
        println!("Summary written to {}", csv_path.display());
        println!("Totals written to {}", json_path.display());
        Ok(corpus)
    }

    fn corpus_options(&self) -> CorpusOptions {
        let mut excluded_fragments: Vec<String> = if self.no_default_excludes {
            Vec::new()
        } else {
            DEFAULT_EXCLUDED_FRAGMENTS
                .iter()
                .map(|fragment| (*fragment).to_string())
                .collect()
        };
        excluded_fragments.extend(self.exclude.iter().cloned());
        CorpusOptions { excluded_fragments }
    }
}

fn print_corpus_report(corpus: &CorpusSummary) {
    for (name, folder) in &corpus.folders {
        println!(
            "{name}: {} episode(s), {} frames, {} segments, {:.3} s",
            folder.episode_count,
            folder.total_frame_count,
            folder.total_segment_count,
            folder.total_time_seconds
        );
    }
    for skipped in &corpus.skipped_folders {
        println!("skipped {}: {}", skipped.folder.display(), skipped.reason);
    }
    println!(
        "Folders: {}, episodes: {}, frames: {}, segments: {}",
        corpus.folder_count,
        corpus.total_episode_count,
        corpus.total_frame_count,
        corpus.total_segment_count
    );
    println!(
        "Total time: {:.3} seconds ({:.4} hours)",
        corpus.total_time_seconds,
        corpus.total_time_hours
    );
    let skipped_episodes = corpus.skipped_episode_count();
    if skipped_episodes > 0 {
        println!("Episodes skipped: {skipped_episodes}");
    }
    let warnings = corpus.warning_count();
    if warnings > 0 {
        println!("Consistency warnings: {warnings}");
    }
}
