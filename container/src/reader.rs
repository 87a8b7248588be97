use std::path::Path;

use crate::ContainerError;
use crate::RawEpisode;

/// File extensions recognized as episode containers, compared
/// case-insensitively.
pub const DEFAULT_CONTAINER_EXTENSIONS: &[&str] = &["hdf5", "h5"];

/// Source of raw episode data.
///
/// Implementations must release any handle they open before returning, on
/// success and on failure alike.
pub trait ContainerReader {
    fn read(&self, path: &Path) -> Result<RawEpisode, ContainerError>;
}

impl<R: ContainerReader + ?Sized> ContainerReader for &R {
    fn read(&self, path: &Path) -> Result<RawEpisode, ContainerError> {
        (**self).read(path)
    }
}

pub fn has_container_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|candidate| candidate.as_ref().eq_ignore_ascii_case(ext))
        })
}

/// Reads the episode layout written by the ALOHA recording tools:
///
/// | field          | location                                                   |
/// |----------------|------------------------------------------------------------|
/// | frames         | dataset `action`, first axis                               |
/// | timestamps     | `timestamp`, `timestamps` or `observations/timestamp`      |
/// | segment bounds | dataset `label/task_timestep` (`[n]` starts or `[n, 2]`)   |
/// | attributes     | scalar attributes on the root group                        |
#[derive(Debug, Clone, Copy, Default)]
pub struct Hdf5Reader;

impl ContainerReader for Hdf5Reader {
    #[cfg(feature = "hdf5")]
    fn read(&self, path: &Path) -> Result<RawEpisode, ContainerError> {
        crate::hdf5_backend::read_episode(path)
    }

    #[cfg(not(feature = "hdf5"))]
    fn read(&self, path: &Path) -> Result<RawEpisode, ContainerError> {
        Err(ContainerError::Unsupported {
            path: path.to_path_buf(),
        })
    }
}
