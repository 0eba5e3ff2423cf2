//! Path identity, normalization, and the path-safety check.
//!
//! Base and overlay files are identified case-insensitively (the naming
//! convention comes from case-insensitive filesystems), so the map and resolver
//! key on [`PathKey`]. The safety check in [`validate_file_path`] is stricter:
//! it compares normalized components exactly, because on a case-sensitive
//! filesystem `/srv/App` is a different directory than `/srv/app`.

use std::hash::{Hash, Hasher};
use std::path::{Component, Path, PathBuf};

use crate::error::TransformError;
use crate::types::Action;

/// A path whose equality and hash ignore ASCII/Unicode case and trailing separators.
#[derive(Debug, Clone)]
pub struct PathKey {
    path: PathBuf,
    folded: String,
}

impl PathKey {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let folded = fold(&path);
        Self { path, folded }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PartialEq for PathKey {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for PathKey {}

impl Hash for PathKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

fn fold(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    s.trim_end_matches('/').to_lowercase()
}

/// Case-insensitive path equality, ignoring trailing separators.
pub fn paths_are_equal(first: &Path, second: &Path) -> bool {
    fold(first) == fold(second)
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Make `path` absolute against `root` if it is relative.
pub fn absolutize(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Split a file name into `(stem, extension)` at the last dot. The extension
/// keeps its leading dot; a name without a dot has an empty extension.
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) => (&file_name[..idx], &file_name[idx..]),
        None => (file_name, ""),
    }
}

/// The file name of `path` without its extension.
pub fn file_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    split_extension(&name).0.to_string()
}

/// `InvalidArgument` naming `name` if `path` is empty or whitespace.
pub(crate) fn require_non_blank(name: &'static str, path: &Path) -> Result<(), TransformError> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return Err(TransformError::InvalidArgument {
            name,
            reason: "can not be empty or whitespace".into(),
        });
    }
    Ok(())
}

/// Ensure `candidate` cannot reach outside `root`.
///
/// Relative candidates are accepted as-is: the searcher only produces them
/// for matches beneath `root`. Absolute candidates must be strict
/// descendants of `root` after lexical normalization; `root` itself is
/// rejected as a [`RootTarget`](TransformError::RootTarget).
pub fn validate_file_path(
    action: Action,
    root: &Path,
    candidate: &Path,
) -> Result<(), TransformError> {
    if candidate.as_os_str().to_string_lossy().trim().is_empty() {
        return Ok(());
    }
    if !candidate.is_absolute() {
        return Ok(());
    }

    let root = normalize(root);
    let candidate = normalize(candidate);

    if root == candidate || paths_are_equal(&root, &candidate) {
        return Err(TransformError::RootTarget {
            action,
            path: candidate,
        });
    }

    let mut current = candidate.parent();
    while let Some(ancestor) = current {
        if ancestor == root {
            return Ok(());
        }
        current = ancestor.parent();
    }

    Err(TransformError::PathEscape {
        action,
        path: candidate,
        root,
    })
}
