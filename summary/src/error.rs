use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// One container could not be read or lacks a mandatory field.
    #[error("malformed episode record {}: {reason}", path.display())]
    MalformedRecord { path: PathBuf, reason: String },
    /// A folder produced zero usable episodes.
    #[error(
        "no valid episode containers in {} ({skipped} skipped)",
        path.display()
    )]
    EmptyFolder { path: PathBuf, skipped: usize },
    /// The reader cannot decode containers at all in this build. Aborts the
    /// run instead of skipping every episode.
    #[error(transparent)]
    ReaderUnavailable(aloha_container::ContainerError),
    /// A codebase root has no subfolder holding any container.
    #[error("no candidate folders with episode containers under {}", root.display())]
    NoFoldersFound { root: PathBuf },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("invalid metadata config {}: {source}", path.display())]
    MetaConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to render csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to render json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
