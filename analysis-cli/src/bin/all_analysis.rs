//! Entry-point for the `all-analysis` binary: summarizes every folder below a
//! codebase root into `summary_hdf5.csv` and `hdf5_total_summary.json`.
use aloha_analysis_cli::AllAnalysisCommand;
use aloha_analysis_cli::init_tracing;
use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    init_tracing();
    AllAnalysisCommand::parse().run()?;
    Ok(())
}
