//! Glob-style file search rooted at a directory.
//!
//! Patterns use `/` or `\` as separators and are matched case-insensitively:
//! `*` stays within one path segment, `**` crosses segments, and braces and
//! character classes work as in `globset`.
//!
//! Relative patterns are matched against paths beneath the root and produce
//! relative results. Absolute patterns, and patterns that climb out with
//! `..`, are resolved against the root and produce absolute results. The
//! searcher does not judge whether those are acceptable; the caller runs every
//! match through [`validate_file_path`](crate::path::validate_file_path).
//!
//! Results come back in walk order: depth-first, entries sorted by name within
//! each directory. Both files and directories can match.

use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::TransformError;
use crate::fs::walk_error;
use crate::path::{normalize, validate_file_path};
use crate::types::Action;

const PATTERN_SEPARATOR: char = ';';

/// Finds paths under a root directory by include/exclude patterns.
pub trait FileSearcher: Send + Sync {
    fn find(
        &self,
        root: &Path,
        exclude_patterns: &[String],
        include_patterns: &[String],
    ) -> Result<Vec<PathBuf>, TransformError>;
}

/// [`FileSearcher`] backed by `globset` and `walkdir`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobFileSearcher;

impl FileSearcher for GlobFileSearcher {
    fn find(
        &self,
        root: &Path,
        exclude_patterns: &[String],
        include_patterns: &[String],
    ) -> Result<Vec<PathBuf>, TransformError> {
        let exclude = build_set(exclude_patterns)?;
        let mut matches = Vec::new();

        for raw in include_patterns {
            let pattern = raw.trim().replace('\\', "/");
            if pattern.is_empty() {
                continue;
            }
            let found = match classify(root, &pattern) {
                PatternKind::Root => vec![root.to_path_buf()],
                PatternKind::Relative(pattern) => find_relative(root, &pattern, &exclude)?,
                PatternKind::Absolute(full) => find_absolute(&full)?,
            };
            for path in found {
                if !matches.contains(&path) {
                    matches.push(path);
                }
            }
        }

        Ok(matches)
    }
}

/// Search every `;`-separated part of every pattern, in order, and run each
/// match through the path-safety check for `action`.
///
/// Matches are returned as the searcher produced them (relative or absolute),
/// part order first and match order within each part second.
pub fn find_matches(
    searcher: &dyn FileSearcher,
    action: Action,
    root: &Path,
    patterns: &[String],
) -> Result<Vec<PathBuf>, TransformError> {
    let mut matches = Vec::new();
    for pattern in patterns {
        for part in pattern.split(PATTERN_SEPARATOR) {
            if part.trim().is_empty() {
                continue;
            }
            let found = searcher.find(root, &[], &[part.to_string()])?;
            for path in &found {
                validate_file_path(action, root, path)?;
            }
            matches.extend(found);
        }
    }
    Ok(matches)
}

enum PatternKind {
    /// The pattern names the root directory itself (`.`, `./`).
    Root,
    Relative(String),
    Absolute(String),
}

fn classify(root: &Path, pattern: &str) -> PatternKind {
    let as_path = Path::new(pattern);
    let climbs = as_path
        .components()
        .any(|c| matches!(c, Component::ParentDir));

    if as_path.is_absolute() || is_drive_rooted(pattern) || climbs {
        let full = normalize(&root.join(as_path));
        return PatternKind::Absolute(to_slash(&full));
    }

    let trimmed = normalize(as_path);
    if trimmed.as_os_str().is_empty() {
        return PatternKind::Root;
    }
    PatternKind::Relative(to_slash(&trimmed))
}

fn is_drive_rooted(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

fn has_glob_meta(segment: &str) -> bool {
    segment.contains(['*', '?', '[', ']', '{', '}'])
}

fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn compile(pattern: &str) -> Result<GlobMatcher, TransformError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .case_insensitive(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| TransformError::GlobError {
            pattern: pattern.to_string(),
            source: e,
        })
}

fn build_set(patterns: &[String]) -> Result<GlobSet, TransformError> {
    let mut builder = GlobSetBuilder::new();
    for raw in patterns {
        let pattern = raw.trim().replace('\\', "/");
        if pattern.is_empty() {
            continue;
        }
        let glob = GlobBuilder::new(&pattern)
            .literal_separator(true)
            .case_insensitive(true)
            .build()
            .map_err(|e| TransformError::GlobError {
                pattern: pattern.clone(),
                source: e,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| TransformError::GlobError {
        pattern: patterns.join(";"),
        source: e,
    })
}

fn find_relative(
    root: &Path,
    pattern: &str,
    exclude: &GlobSet,
) -> Result<Vec<PathBuf>, TransformError> {
    let matcher = compile(pattern)?;
    let mut found = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative_str = to_slash(relative);
        if matcher.is_match(&relative_str) && !exclude.is_match(&relative_str) {
            found.push(relative.to_path_buf());
        }
    }
    Ok(found)
}

fn find_absolute(full: &str) -> Result<Vec<PathBuf>, TransformError> {
    let segments: Vec<&str> = full.split('/').collect();
    let literal_len = segments
        .iter()
        .position(|s| has_glob_meta(s))
        .unwrap_or(segments.len());

    if literal_len == segments.len() {
        let path = PathBuf::from(full);
        return Ok(if path.symlink_metadata().is_ok() {
            vec![path]
        } else {
            vec![]
        });
    }

    let mut base = segments[..literal_len].join("/");
    if base.is_empty() {
        base.push('/');
    }
    let base = PathBuf::from(base);
    if !base.is_dir() {
        return Ok(vec![]);
    }

    let matcher = compile(full)?;
    let mut found = Vec::new();
    for entry in WalkDir::new(&base).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(&base, e))?;
        if matcher.is_match(to_slash(entry.path())) {
            found.push(entry.path().to_path_buf());
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Views")).unwrap();
        fs::create_dir_all(root.join("bin")).unwrap();
        fs::write(root.join("Web.config"), "<configuration/>").unwrap();
        fs::write(root.join("Web.Release.config"), "<configuration/>").unwrap();
        fs::write(root.join("Views").join("Web.config"), "<configuration/>").unwrap();
        fs::write(root.join("appsettings.json"), "{}").unwrap();
        fs::write(root.join("bin").join("app.dll"), [0u8, 1, 2]).unwrap();
        dir
    }

    fn find(root: &Path, include: &[&str]) -> Vec<PathBuf> {
        let include: Vec<String> = include.iter().map(|s| s.to_string()).collect();
        GlobFileSearcher.find(root, &[], &include).unwrap()
    }

    #[test]
    fn recursive_pattern_matches_all_depths_in_byte_order() {
        let dir = tree();
        let found = find(dir.path(), &["**/*.config"]);
        assert_eq!(
            found,
            vec![
                PathBuf::from("Views/Web.config"),
                PathBuf::from("Web.Release.config"),
                PathBuf::from("Web.config"),
            ]
        );
    }

    #[test]
    fn single_star_stays_in_one_directory() {
        let dir = tree();
        let found = find(dir.path(), &["*.config"]);
        assert_eq!(
            found,
            vec![
                PathBuf::from("Web.Release.config"),
                PathBuf::from("Web.config")
            ]
        );
    }

    #[test]
    fn backslash_separators_are_accepted() {
        let dir = tree();
        let found = find(dir.path(), &["Views\\*.config"]);
        assert_eq!(found, vec![PathBuf::from("Views/Web.config")]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let dir = tree();
        let found = find(dir.path(), &["APPSETTINGS.JSON"]);
        assert_eq!(found, vec![PathBuf::from("appsettings.json")]);
    }

    #[test]
    fn directories_can_match() {
        let dir = tree();
        let found = find(dir.path(), &["bin"]);
        assert_eq!(found, vec![PathBuf::from("bin")]);
    }

    #[test]
    fn exclude_patterns_filter_results() {
        let dir = tree();
        let found = GlobFileSearcher
            .find(
                dir.path(),
                &["Views/**".to_string()],
                &["**/*.config".to_string()],
            )
            .unwrap();
        assert!(!found.contains(&PathBuf::from("Views/Web.config")));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn absolute_pattern_outside_root_returns_absolute_path() {
        let outside = TempDir::new().unwrap();
        let target = outside.path().join("secret.txt");
        fs::write(&target, "x").unwrap();
        let dir = tree();

        let found = find(dir.path(), &[target.to_str().unwrap()]);
        assert_eq!(found, vec![target]);
    }

    #[test]
    fn parent_climbing_pattern_is_made_absolute() {
        let dir = tree();
        let found = find(&dir.path().join("Views"), &["../*.json"]);
        assert_eq!(found, vec![dir.path().join("appsettings.json")]);
    }

    #[test]
    fn dot_pattern_names_the_root() {
        let dir = tree();
        let found = find(dir.path(), &["."]);
        assert_eq!(found, vec![dir.path().to_path_buf()]);
    }

    #[test]
    fn no_matches_is_empty() {
        let dir = tree();
        assert!(find(dir.path(), &["**/*.xml"]).is_empty());
    }

    #[test]
    fn packed_patterns_keep_part_order() {
        let dir = tree();
        let found = find_matches(
            &GlobFileSearcher,
            Action::Transform,
            dir.path(),
            &["*.json;Views/*.config".to_string(), "Web.config".to_string()],
        )
        .unwrap();
        assert_eq!(
            found,
            vec![
                PathBuf::from("appsettings.json"),
                PathBuf::from("Views/Web.config"),
                PathBuf::from("Web.config"),
            ]
        );
    }

    #[test]
    fn find_matches_rejects_escaping_match() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("x.config"), "").unwrap();
        let dir = tree();
        let pattern = format!("{}/*.config", outside.path().display());
        let result = find_matches(&GlobFileSearcher, Action::Delete, dir.path(), &[pattern]);
        assert!(matches!(
            result,
            Err(TransformError::PathEscape {
                action: Action::Delete,
                ..
            })
        ));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let dir = tree();
        let result = GlobFileSearcher.find(dir.path(), &[], &["[".to_string()]);
        assert!(matches!(result, Err(TransformError::GlobError { .. })));
    }
}
