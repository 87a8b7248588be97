//! Entry-point for the `analysis` binary: summarizes one data directory into
//! `hdf5_analysis_summary.csv`.
use aloha_analysis_cli::AnalysisCommand;
use aloha_analysis_cli::init_tracing;
use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    init_tracing();
    AnalysisCommand::parse().run()?;
    Ok(())
}
