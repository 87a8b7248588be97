use std::path::Path;
use std::path::PathBuf;

use aloha_summary::DEFAULT_TOLERANCE;
use aloha_summary::EmptyFolderPolicy;
use aloha_summary::ExtractOptions;
use aloha_summary::FolderOptions;
use aloha_summary::MetaConfig;
use anyhow::Context;
use anyhow::Result;
use clap::Args;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Location of `meta.json` when none is given explicitly.
pub const DEFAULT_META_PATH: &str = "config/meta.json";

/// Options shared by the single-folder and batch commands.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Path to the `meta.json` metadata defaults. Defaults to
    /// `config/meta.json` when that file exists.
    #[arg(long = "meta", value_name = "PATH", env = "ALOHA_META")]
    pub meta: Option<PathBuf>,

    /// Relative divergence between declared and timestamp-derived frame
    /// rates tolerated before a consistency warning is raised.
    #[arg(
        long = "tolerance",
        value_name = "RATIO",
        default_value_t = DEFAULT_TOLERANCE,
        value_parser = parse_tolerance
    )]
    pub tolerance: f64,

    /// Treat a folder without valid episodes as an empty summary instead of
    /// an error.
    #[arg(long = "allow-empty", default_value_t = false)]
    pub allow_empty: bool,
}

impl CommonArgs {
    pub fn load_meta(&self) -> Result<MetaConfig> {
        match &self.meta {
            Some(path) => MetaConfig::load(path)
                .with_context(|| format!("failed to load metadata config {}", path.display())),
            None => MetaConfig::load_if_present(Path::new(DEFAULT_META_PATH))
                .context("failed to load default metadata config"),
        }
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            tolerance: self.tolerance,
        }
    }

    pub fn folder_options(&self) -> FolderOptions {
        FolderOptions {
            empty_policy: if self.allow_empty {
                EmptyFolderPolicy::AllowEmpty
            } else {
                EmptyFolderPolicy::Fail
            },
            ..FolderOptions::default()
        }
    }
}

fn parse_tolerance(value: &str) -> std::result::Result<f64, String> {
    let tolerance: f64 = value
        .parse()
        .map_err(|err| format!("`{value}` is not a number: {err}"))?;
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(tolerance)
    } else {
        Err(format!("`{value}` must be a finite, non-negative ratio"))
    }
}

/// Logs to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let default_level = "info";
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
