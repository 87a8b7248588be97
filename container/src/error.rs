use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("failed to open container {}: {message}", path.display())]
    Open { path: PathBuf, message: String },
    #[error("failed to read `{name}` from {}: {message}", path.display())]
    Read {
        path: PathBuf,
        name: String,
        message: String,
    },
    #[error(
        "cannot read {}: this build has no HDF5 support (rebuild with `--features hdf5`)",
        path.display()
    )]
    Unsupported { path: PathBuf },
}

impl ContainerError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ContainerError::Open { path, .. }
            | ContainerError::Read { path, .. }
            | ContainerError::Unsupported { path } => path,
        }
    }
}
