use std::path::PathBuf;

use aloha_container::Hdf5Reader;
use aloha_summary::EpisodeExtractor;
use aloha_summary::FolderAggregator;
use aloha_summary::FolderSummary;
use aloha_summary::output::write_folder_csv;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::CommonArgs;

/// Summarize every episode container in one data directory.
#[derive(Debug, Parser, Clone)]
#[command(name = "analysis", version)]
pub struct AnalysisCommand {
    /// Folder holding the episode containers (searched recursively).
    #[arg(value_name = "DATA_DIRECTORY")]
    pub data_directory: PathBuf,

    /// Where to write the summary CSV. Defaults to the data directory.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[clap(flatten)]
    pub common: CommonArgs,
}

impl AnalysisCommand {
    pub fn run(&self) -> Result<FolderSummary> {
        let meta = self.common.load_meta()?;
        let aggregator = FolderAggregator::new(
            Hdf5Reader,
            EpisodeExtractor::new(&meta, self.common.extract_options()),
            self.common.folder_options(),
        );
        let summary = aggregator
            .aggregate(&self.data_directory)
            .with_context(|| format!("failed to analyze {}", self.data_directory.display()))?;

        let output_dir = self.output_dir.as_ref().unwrap_or(&self.data_directory);
        let csv_path = write_folder_csv(&summary, output_dir)?;
        info!("wrote {}", csv_path.display());

        print_folder_report(&summary);
        println!("Summary written to {}", csv_path.display());
        Ok(summary)
    }
}

fn print_folder_report(summary: &FolderSummary) {
    println!("Folder: {}", summary.folder_path.display());
    println!("Episodes analyzed: {}", summary.episode_count);
    if !summary.skipped.is_empty() {
        println!("Episodes skipped: {}", summary.skipped.len());
    }
    println!("Total frames: {}", summary.total_frame_count);
    println!(
        "Total time: {:.3} seconds ({:.4} hours)",
        summary.total_time_seconds,
        summary.total_time_hours()
    );
    println!("Total segments: {}", summary.total_segment_count);
    let warnings = summary.warning_count();
    if warnings > 0 {
        println!("Consistency warnings: {warnings}");
    }
}
