//! Filesystem primitives shared by the archive handlers and the content layer.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::error::TransformError;

/// True if `path` exists as a file, a directory, or anything else.
pub fn entry_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// The outermost ancestor of `dir` (or `dir` itself) that does not exist yet.
///
/// This is the directory to remove if a write that created `dir` fails, so a
/// failed call does not leave an empty directory chain behind.
pub fn top_missing_ancestor(dir: &Path) -> Option<PathBuf> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return None;
    }
    let mut top = dir.to_path_buf();
    while let Some(parent) = top.parent() {
        if parent.as_os_str().is_empty() || parent.exists() {
            break;
        }
        top = parent.to_path_buf();
    }
    Some(top)
}

/// Create `dir` (and missing ancestors), run `op`, and remove whatever was
/// created if `op` fails.
pub fn with_created_dir<T>(
    dir: &Path,
    op: impl FnOnce() -> Result<T, TransformError>,
) -> Result<T, TransformError> {
    let created = top_missing_ancestor(dir);
    std::fs::create_dir_all(dir).map_err(|e| TransformError::io(dir, e))?;

    let result = op();
    if result.is_err()
        && let Some(top) = created
        && top.exists()
        && let Err(e) = std::fs::remove_dir_all(&top)
    {
        warn!("Could not remove {} after failed write: {e}", top.display());
    }
    result
}

/// Write `bytes` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), TransformError> {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    if parent.as_os_str().is_empty() {
        return std::fs::write(path, bytes).map_err(|e| TransformError::io(path, e));
    }
    with_created_dir(parent, || {
        std::fs::write(path, bytes).map_err(|e| TransformError::io(path, e))
    })
}

/// Deep-copy the contents of `source` into `destination`, creating it if needed.
/// Existing files in `destination` are overwritten.
pub fn copy_directory(destination: &Path, source: &Path) -> Result<(), TransformError> {
    if !source.is_dir() {
        return Err(TransformError::NotFound {
            what: "directory",
            path: source.to_path_buf(),
        });
    }
    std::fs::create_dir_all(destination).map_err(|e| TransformError::io(destination, e))?;

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(source, e))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| TransformError::InvalidArgument {
                name: "source",
                reason: format!("{} is not under {}", entry.path().display(), source.display()),
            })?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| TransformError::io(&target, e))?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|e| TransformError::io(&target, e))?;
        }
    }
    Ok(())
}

/// Remove a file or a whole directory tree. Missing paths are not an error.
pub fn remove_entry(path: &Path) -> Result<(), TransformError> {
    let result = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TransformError::io(path, e)),
    }
}

/// True if `dir` contains no files anywhere beneath it.
pub fn has_no_files(dir: &Path) -> bool {
    !WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .any(|e| !e.file_type().is_dir())
}

pub(crate) fn walk_error(root: &Path, err: walkdir::Error) -> TransformError {
    let path = err.path().unwrap_or(root).to_path_buf();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
    TransformError::io(path, source)
}
