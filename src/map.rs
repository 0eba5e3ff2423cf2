//! Discovery of base files and their overlay candidates.
//!
//! An overlay is a sibling named `<stem>.<segment><ext>` of a base named
//! `<stem><ext>`. For every file the patterns match, [`derive_base_chain`]
//! strips one dot-segment at a time from the stem and records every shorter
//! name that exists on disk. The walk does not stop at the first hit:
//! `Web.1.2.3.config` is an overlay candidate for both `Web.1.2.config` and
//! `Web.config` when both exist. A file can therefore be a base in one entry
//! and an overlay in another.
//!
//! The resulting [`TransformMap`] keeps first-discovery order for its keys
//! and for each overlay set. That order is part of the contract; nothing here
//! sorts.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};

use crate::error::TransformError;
use crate::path::{PathKey, absolutize, paths_are_equal, require_non_blank, split_extension};
use crate::search::{FileSearcher, find_matches};
use crate::types::Action;

/// Base file → ordered overlay candidates. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct TransformMap {
    pub(crate) entries: IndexMap<PathKey, IndexSet<PathKey>>,
}

impl TransformMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Base files in discovery order.
    pub fn bases(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys().map(PathKey::path)
    }

    /// Overlay candidates of `base` in discovery order.
    pub fn overlays(&self, base: &Path) -> Option<Vec<&Path>> {
        self.entries
            .get(&PathKey::new(base))
            .map(|set| set.iter().map(PathKey::path).collect())
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, PathKey, IndexSet<PathKey>> {
        self.entries.iter()
    }
}

/// Every existing file that `path` could be an overlay of, nearest first.
///
/// Returns nothing when `path` is not an existing file or its stem has no dot.
pub fn derive_base_chain(path: &Path) -> Vec<PathBuf> {
    if !path.is_file() {
        return Vec::new();
    }
    let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return Vec::new();
    };
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let (mut stem, extension) = split_extension(&name);

    let mut bases: Vec<PathBuf> = Vec::new();
    while let Some(idx) = stem.rfind('.') {
        stem = &stem[..idx];
        let candidate = parent.join(format!("{stem}{extension}"));
        if candidate.is_file() && !bases.iter().any(|b| paths_are_equal(b, &candidate)) {
            bases.push(candidate);
        }
    }
    bases
}

/// Builds a [`TransformMap`] for a directory from glob patterns.
pub struct TransformMapBuilder<'a> {
    searcher: &'a dyn FileSearcher,
}

impl<'a> TransformMapBuilder<'a> {
    pub fn new(searcher: &'a dyn FileSearcher) -> Self {
        Self { searcher }
    }

    /// Search `directory` with `patterns` and group the matches by base file.
    ///
    /// Matched files that take part in no chain still get an entry with an
    /// empty overlay set, so they are visited by the normalization pass.
    pub fn build(
        &self,
        directory: &Path,
        patterns: &[String],
    ) -> Result<TransformMap, TransformError> {
        require_non_blank("directory", directory)?;

        let matched: IndexSet<PathKey> =
            find_matches(self.searcher, Action::Transform, directory, patterns)?
                .into_iter()
                .map(|p| PathKey::new(absolutize(directory, &p)))
                .filter(|k| k.path().is_file())
                .collect();

        let chains: Vec<(PathKey, Vec<PathKey>)> = matched
            .into_iter()
            .map(|key| {
                let chain = derive_base_chain(key.path())
                    .into_iter()
                    .map(PathKey::new)
                    .collect();
                (key, chain)
            })
            .collect();

        let bases: HashSet<&PathKey> = chains.iter().flat_map(|(_, chain)| chain).collect();

        let mut entries: IndexMap<PathKey, IndexSet<PathKey>> = IndexMap::new();
        for (path, chain) in &chains {
            if chain.is_empty() || bases.contains(path) {
                entries.entry(path.clone()).or_default();
            }
            for base in chain {
                entries
                    .entry(base.clone())
                    .or_default()
                    .insert(path.clone());
            }
        }

        Ok(TransformMap { entries })
    }
}
