//! The package pipeline: extract, copy, transform, prune, repackage.
//!
//! Every call stages its work under `<temp>/<uuid>/`:
//!
//! ```text
//! <temp>/<uuid>/Original    the extracted source package, untouched
//! <temp>/<uuid>/Transform   the working tree that is transformed and written
//! ```
//!
//! The staging directory is removed on every exit path when
//! [`TransformOptions::cleanup`] is set, including after validation-free
//! failures in the middle of the pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::archive::{HandlerRegistry, PackageHandler};
use crate::content::{ContentTransformer, FileTransformer};
use crate::error::TransformError;
use crate::fs::{copy_directory, entry_exists, has_no_files, remove_entry};
use crate::map::TransformMapBuilder;
use crate::options::{ResolvedOptions, TransformOptions};
use crate::path::{absolutize, normalize, paths_are_equal, require_non_blank};
use crate::platform::{HostPlatform, Platform};
use crate::resolver::{applied, resolve};
use crate::search::{FileSearcher, GlobFileSearcher, find_matches};
use crate::types::{Action, TransformRequest};

const ORIGINAL_DIRECTORY: &str = "Original";
const TRANSFORM_DIRECTORY: &str = "Transform";

/// Transforms whole packages. Build one with [`PackageTransformer::builder`]
/// or take the defaults with [`PackageTransformer::new`].
pub struct PackageTransformer {
    searcher: Box<dyn FileSearcher>,
    platform: Arc<dyn Platform>,
    content: Box<dyn ContentTransformer>,
    registry: HandlerRegistry,
    temp_dir: PathBuf,
}

impl Default for PackageTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageTransformer {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> PackageTransformerBuilder {
        PackageTransformerBuilder::default()
    }

    /// Run the pipeline with default options (cleanup on, platform defaults).
    pub fn transform_default(&self, request: &TransformRequest) -> Result<(), TransformError> {
        self.transform(request, &TransformOptions::default())
    }

    /// Transform `request.source` into `request.destination`.
    ///
    /// Arguments are checked in this order before anything is written:
    /// destination not blank, destination does not exist, a writer exists for
    /// it, source not blank, source exists, an extractor exists for it.
    pub fn transform(
        &self,
        request: &TransformRequest,
        options: &TransformOptions,
    ) -> Result<(), TransformError> {
        let destination = &request.destination;
        require_non_blank("destination", destination)?;
        if entry_exists(destination) {
            return Err(TransformError::AlreadyExists {
                path: destination.clone(),
            });
        }
        let writer = self.registry.writer(destination)?;

        let source = &request.source;
        require_non_blank("source", source)?;
        if !entry_exists(source) {
            return Err(TransformError::NotFound {
                what: "source",
                path: source.clone(),
            });
        }
        let extractor = self.registry.extractor(source)?;

        let staging = self.temp_dir.join(Uuid::new_v4().to_string());
        let resolved = options.resolve(self.platform.as_ref());
        let result = self.run(&staging, extractor, writer, request, &resolved);

        if options.cleanup {
            if staging.exists()
                && let Err(e) = std::fs::remove_dir_all(&staging)
            {
                warn!("Could not remove staging directory {}: {e}", staging.display());
            }
        } else {
            info!("Keeping staging directory {}", staging.display());
        }
        result
    }

    fn run(
        &self,
        staging: &Path,
        extractor: &dyn PackageHandler,
        writer: &dyn PackageHandler,
        request: &TransformRequest,
        options: &ResolvedOptions,
    ) -> Result<(), TransformError> {
        let original = staging.join(ORIGINAL_DIRECTORY);
        info!("Extracting {}", request.source.display());
        extractor.extract(&original, &request.source)?;

        let working = staging.join(TRANSFORM_DIRECTORY);
        info!("Copying package to {}", working.display());
        copy_directory(&working, &original)?;

        self.transform_files(&working, request, options)?;
        self.delete_paths(&working, &request.path_to_delete_patterns)?;

        info!("Writing {}", request.destination.display());
        writer.write(&request.destination, &working)
    }

    fn transform_files(
        &self,
        working: &Path,
        request: &TransformRequest,
        options: &ResolvedOptions,
    ) -> Result<(), TransformError> {
        let map = TransformMapBuilder::new(self.searcher.as_ref())
            .build(working, &request.file_to_transform_patterns)?;
        let resolved = resolve(&map, &request.transformation_names);
        info!("Transforming {} base file(s)", resolved.len());

        for (base, overlays) in &resolved {
            let base = base.path();
            if !base.is_file() {
                debug!("Skipping {}: removed as an overlay of another file", base.display());
            } else if overlays.is_empty() {
                self.content.normalize(base, options)?;
            } else if let Some(overlay) = applied(overlays) {
                if overlay.path().is_file() {
                    self.content.apply(base, base, overlay.path(), options)?;
                } else {
                    debug!("Skipping removed overlay {}", overlay.path().display());
                }
            }

            for overlay in overlays.keys() {
                remove_entry(overlay.path())?;
                debug!("Removed overlay {}", overlay.path().display());
            }
        }
        Ok(())
    }

    fn delete_paths(&self, working: &Path, patterns: &[String]) -> Result<(), TransformError> {
        let targets: Vec<PathBuf> =
            find_matches(self.searcher.as_ref(), Action::Delete, working, patterns)?
                .into_iter()
                .map(|p| normalize(&absolutize(working, &p)))
                .collect();

        let root = normalize(working);
        if let Some(target) = targets.iter().find(|t| paths_are_equal(t, &root)) {
            return Err(TransformError::RootTarget {
                action: Action::Delete,
                path: target.clone(),
            });
        }
        if targets.is_empty() {
            return Ok(());
        }
        info!("Deleting {} path(s)", targets.len());

        let mut parents: Vec<PathBuf> = Vec::new();
        for target in &targets {
            if target.is_dir() {
                std::fs::remove_dir_all(target).map_err(|e| TransformError::io(target, e))?;
                debug!("Deleted directory {}", target.display());
                continue;
            }
            if !target.is_file() {
                continue;
            }
            if let Some(parent) = target.parent()
                && !paths_are_equal(parent, &root)
                && !parents.iter().any(|p| paths_are_equal(p, parent))
            {
                parents.push(parent.to_path_buf());
            }
            std::fs::remove_file(target).map_err(|e| TransformError::io(target, e))?;
            debug!("Deleted {}", target.display());
        }

        for parent in parents {
            prune_empty_ancestors(&parent, &root)?;
        }
        Ok(())
    }
}

/// Remove `dir` and its ancestors below `root` while they contain no files.
fn prune_empty_ancestors(dir: &Path, root: &Path) -> Result<(), TransformError> {
    let mut current = Some(dir);
    while let Some(dir) = current {
        if paths_are_equal(dir, root)
            || !dir.starts_with(root)
            || !dir.is_dir()
            || !has_no_files(dir)
        {
            break;
        }
        std::fs::remove_dir_all(dir).map_err(|e| TransformError::io(dir, e))?;
        debug!("Deleted empty directory {}", dir.display());
        current = dir.parent();
    }
    Ok(())
}

/// Builder for [`PackageTransformer`]. Every collaborator has a default.
#[derive(Default)]
pub struct PackageTransformerBuilder {
    searcher: Option<Box<dyn FileSearcher>>,
    platform: Option<Arc<dyn Platform>>,
    content: Option<Box<dyn ContentTransformer>>,
    temp_dir: Option<PathBuf>,
}

impl PackageTransformerBuilder {
    /// Replace the glob searcher (default: [`GlobFileSearcher`]).
    pub fn searcher(mut self, searcher: impl FileSearcher + 'static) -> Self {
        self.searcher = Some(Box::new(searcher));
        self
    }

    /// Replace the platform traits used for option defaults (default: the host).
    pub fn platform(mut self, platform: impl Platform + 'static) -> Self {
        self.platform = Some(Arc::new(platform));
        self
    }

    /// Replace the content transformer (default: [`FileTransformer`] on the
    /// same platform).
    pub fn content_transformer(mut self, content: impl ContentTransformer + 'static) -> Self {
        self.content = Some(Box::new(content));
        self
    }

    /// Directory under which staging directories are created
    /// (default: [`std::env::temp_dir`]).
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> PackageTransformer {
        let platform: Arc<dyn Platform> = self.platform.unwrap_or_else(|| Arc::new(HostPlatform));
        let content = self
            .content
            .unwrap_or_else(|| Box::new(FileTransformer::with_platform(Arc::clone(&platform))));
        PackageTransformer {
            searcher: self.searcher.unwrap_or_else(|| Box::new(GlobFileSearcher)),
            platform,
            content,
            registry: HandlerRegistry::new(),
            temp_dir: self.temp_dir.unwrap_or_else(std::env::temp_dir),
        }
    }
}
