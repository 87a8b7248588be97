//! Deterministic discovery of episode containers and candidate folders.
//!
//! Results are always sorted explicitly; filesystem enumeration order is
//! never trusted.

use std::path::Path;
use std::path::PathBuf;

use aloha_container::has_container_extension;
use walkdir::WalkDir;

use crate::Error;
use crate::Result;

/// Folder name fragments the batch tool skips by default, compared
/// case-insensitively.
pub const DEFAULT_EXCLUDED_FRAGMENTS: &[&str] = &["temp", "test", "backup", ".trash"];

/// Every container below `folder`, recursively, ordered by relative path.
pub fn discover_containers<S: AsRef<str>>(folder: &Path, extensions: &[S]) -> Result<Vec<PathBuf>> {
    let mut containers = Vec::new();
    for entry in WalkDir::new(folder).follow_links(true) {
        let entry = entry.map_err(|source| Error::Walk {
            path: folder.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && has_container_extension(entry.path(), extensions) {
            containers.push(entry.into_path());
        }
    }
    containers.sort_by(|a, b| {
        let a = a.strip_prefix(folder).unwrap_or(a);
        let b = b.strip_prefix(folder).unwrap_or(b);
        a.cmp(b)
    });
    Ok(containers)
}

pub fn contains_container<S: AsRef<str>>(folder: &Path, extensions: &[S]) -> bool {
    WalkDir::new(folder)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .any(|entry| {
            entry.file_type().is_file() && has_container_extension(entry.path(), extensions)
        })
}

/// Whether a subfolder name should be left out of a batch run: hidden
/// folders and names containing any of `fragments`.
pub fn is_excluded_folder<S: AsRef<str>>(name: &str, fragments: &[S]) -> bool {
    let lowered = name.to_lowercase();
    name.starts_with('.')
        || fragments
            .iter()
            .any(|fragment| lowered.contains(&fragment.as_ref().to_lowercase()))
}

/// Immediate subdirectories of `root` that hold at least one container and
/// are not excluded, ordered by name.
pub fn discover_folders<S: AsRef<str>, E: AsRef<str>>(
    root: &Path,
    extensions: &[S],
    excluded_fragments: &[E],
) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(root).map_err(|err| Error::io(root, err))?;
    let mut folders = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| Error::io(root, err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_excluded_folder(&name, excluded_fragments) {
            tracing::debug!("excluding folder {}", path.display());
            continue;
        }
        if contains_container(&path, extensions) {
            folders.push(path);
        }
    }
    folders.sort();
    Ok(folders)
}
