//! Variant directory materialization.
//!
//! Copies the parts of a project that a build needs into a fresh directory
//! and removes Free-only assets afterwards. The source tree is only ever
//! read.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("entry escapes the project directory: {0}")]
    OutsideRoot(PathBuf),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> TreeError + '_ {
    move |source| TreeError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Recursively delete `path`. A missing directory is not an error.
///
/// Returns `true` if something was removed.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool, TreeError> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_error(path)(e)),
    }
}

/// Copy a file or a whole directory from `from` to `to`, creating parents.
pub fn copy_entry(from: &Path, to: &Path) -> Result<(), TreeError> {
    if from.is_file() {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::copy(from, to).map_err(io_error(from))?;
        return Ok(());
    }

    for entry in WalkDir::new(from).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|_| TreeError::OutsideRoot(entry.path().to_path_buf()))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(io_error(&target))?;
        } else {
            fs::copy(entry.path(), &target).map_err(io_error(entry.path()))?;
        }
    }

    Ok(())
}

/// Create `dest` and copy every entry of `source` named in `entries` into it.
///
/// Entries missing from `source` are skipped and returned so the caller can
/// report them.
pub fn materialize(
    source: &Path,
    dest: &Path,
    entries: &[&str],
) -> Result<Vec<String>, TreeError> {
    fs::create_dir_all(dest).map_err(io_error(dest))?;

    let mut missing = Vec::new();
    for entry in entries {
        let from = source.join(entry);
        if !from.exists() {
            missing.push((*entry).to_string());
            continue;
        }
        copy_entry(&from, &dest.join(entry))?;
    }

    Ok(missing)
}

/// Delete each relative path under `root`. Absent paths are ignored.
///
/// Returns the paths that were actually removed.
pub fn delete_paths<S: AsRef<str>>(
    root: &Path,
    paths: &[S],
) -> Result<Vec<PathBuf>, TreeError> {
    let mut removed = Vec::new();

    for relative in paths {
        let relative = Path::new(relative.as_ref());
        if relative.is_absolute() {
            return Err(TreeError::OutsideRoot(relative.to_path_buf()));
        }

        let path = root.join(relative);
        let metadata = match fs::symlink_metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(io_error(&path)(e)),
        };

        if metadata.is_dir() {
            fs::remove_dir_all(&path).map_err(io_error(&path))?;
        } else {
            fs::remove_file(&path).map_err(io_error(&path))?;
        }
        removed.push(path);
    }

    Ok(removed)
}
