//! Package storage: a package is either a plain directory or a zip archive.
//!
//! Handlers are looked up by the package path's extension, case-insensitively:
//! `zip` selects [`ZipHandler`] and no extension selects [`DirectoryHandler`].
//! A path with any other extension is still treated as a directory as long as
//! it is not an existing file.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::TransformError;
use crate::fs::{copy_directory, remove_entry, walk_error, with_created_dir};

const DIRECTORY_KEY: &str = "";
const ZIP_KEY: &str = "zip";

/// Reads a package into a directory and writes a directory back as a package.
pub trait PackageHandler: Send + Sync {
    /// Populate `destination` (a directory) from the package at `source`.
    fn extract(&self, destination: &Path, source: &Path) -> Result<(), TransformError>;

    /// Materialize the directory `source` as a package at `destination`.
    ///
    /// On failure, directories created for `destination` are removed again.
    fn write(&self, destination: &Path, source: &Path) -> Result<(), TransformError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryHandler;

impl PackageHandler for DirectoryHandler {
    fn extract(&self, destination: &Path, source: &Path) -> Result<(), TransformError> {
        copy_directory(destination, source)
    }

    fn write(&self, destination: &Path, source: &Path) -> Result<(), TransformError> {
        with_created_dir(destination, || copy_directory(destination, source))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ZipHandler;

impl PackageHandler for ZipHandler {
    fn extract(&self, destination: &Path, source: &Path) -> Result<(), TransformError> {
        std::fs::create_dir_all(destination).map_err(|e| TransformError::io(destination, e))?;

        let file = File::open(source).map_err(|e| TransformError::io(source, e))?;
        let mut archive = ZipArchive::new(file).map_err(|e| zip_error(source, e))?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| zip_error(source, e))?;
            let Some(relative) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
                return Err(TransformError::UnsafeArchiveEntry {
                    archive: source.to_path_buf(),
                    entry: entry.name().to_string(),
                });
            };
            let target = destination.join(&relative);

            if entry.is_dir() {
                std::fs::create_dir_all(&target).map_err(|e| TransformError::io(&target, e))?;
                continue;
            }
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| TransformError::io(parent, e))?;
            }
            let mut out = File::create(&target).map_err(|e| TransformError::io(&target, e))?;
            io::copy(&mut entry, &mut out).map_err(|e| TransformError::io(&target, e))?;
        }

        debug!("Extracted {} entries from {}", archive.len(), source.display());
        Ok(())
    }

    fn write(&self, destination: &Path, source: &Path) -> Result<(), TransformError> {
        let parent = destination.parent().unwrap_or_else(|| Path::new(""));
        let result = if parent.as_os_str().is_empty() {
            write_zip(destination, source)
        } else {
            with_created_dir(parent, || write_zip(destination, source))
        };

        if result.is_err()
            && let Err(e) = remove_entry(destination)
        {
            warn!("Could not remove partial archive {}: {e}", destination.display());
        }
        result
    }
}

fn zip_error(path: &Path, source: zip::result::ZipError) -> TransformError {
    TransformError::ZipError {
        path: path.to_path_buf(),
        source,
    }
}

fn write_zip(destination: &Path, source: &Path) -> Result<(), TransformError> {
    if !source.is_dir() {
        return Err(TransformError::NotFound {
            what: "directory",
            path: source.to_path_buf(),
        });
    }
    let file = File::create(destination).map_err(|e| TransformError::io(destination, e))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(source, e))?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let name = relative.to_string_lossy().replace('\\', "/");

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)
                .map_err(|e| zip_error(destination, e))?;
        } else {
            zip.start_file(name, options)
                .map_err(|e| zip_error(destination, e))?;
            let mut input = File::open(entry.path()).map_err(|e| TransformError::io(entry.path(), e))?;
            io::copy(&mut input, &mut zip).map_err(|e| TransformError::io(destination, e))?;
        }
    }

    zip.finish().map_err(|e| zip_error(destination, e))?;
    Ok(())
}

/// Extension → handler table, built once per pipeline instance.
pub struct HandlerRegistry {
    handlers: HashMap<&'static str, Box<dyn PackageHandler>>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn PackageHandler>> = HashMap::new();
        handlers.insert(DIRECTORY_KEY, Box::new(DirectoryHandler));
        handlers.insert(ZIP_KEY, Box::new(ZipHandler));
        Self { handlers }
    }

    /// Handler that can read the package at `path`.
    pub fn extractor(&self, path: &Path) -> Result<&dyn PackageHandler, TransformError> {
        self.lookup(path).ok_or_else(|| TransformError::NoPackageHandler {
            role: "extractor",
            path: path.to_path_buf(),
        })
    }

    /// Handler that can write a package to `path`.
    pub fn writer(&self, path: &Path) -> Result<&dyn PackageHandler, TransformError> {
        self.lookup(path).ok_or_else(|| TransformError::NoPackageHandler {
            role: "writer",
            path: path.to_path_buf(),
        })
    }

    fn lookup(&self, path: &Path) -> Option<&dyn PackageHandler> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if let Some(handler) = self.handlers.get(extension.as_str()) {
            return Some(handler.as_ref());
        }
        if path.is_file() {
            return None;
        }
        self.handlers.get(DIRECTORY_KEY).map(|h| h.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{read, web_package, write, zip_dir, zip_entries};
    use tempfile::TempDir;

    #[test]
    fn zip_round_trip_keeps_tree() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        web_package(&src);
        std::fs::create_dir_all(src.join("empty")).unwrap();

        let archive = dir.path().join("out").join("pkg.zip");
        ZipHandler.write(&archive, &src).unwrap();

        let extracted = dir.path().join("extracted");
        ZipHandler.extract(&extracted, &archive).unwrap();
        assert_eq!(read(&extracted, "logs/old.log"), "stale");
        assert_eq!(read(&extracted, "Web.config"), read(&src, "Web.config"));
        assert!(extracted.join("empty").is_dir());
    }

    #[test]
    fn empty_zip_still_creates_destination() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("empty.zip");
        zip_entries(&archive, &[]);

        let destination = dir.path().join("Original");
        ZipHandler.extract(&destination, &archive).unwrap();
        assert!(destination.is_dir());
        assert_eq!(std::fs::read_dir(&destination).unwrap().count(), 0);
    }

    #[test]
    fn escaping_zip_entry_is_rejected() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("evil.zip");
        zip_entries(&archive, &[("../evil.txt", "x")]);

        let result = ZipHandler.extract(&dir.path().join("out"), &archive);
        assert!(matches!(result, Err(TransformError::UnsafeArchiveEntry { .. })));
        assert!(!dir.path().join("evil.txt").exists());
    }

    #[test]
    fn corrupt_zip_is_an_error() {
        let dir = TempDir::new().unwrap();
        let archive = write(dir.path(), "bad.zip", "not a zip");
        let result = ZipHandler.extract(&dir.path().join("out"), &archive);
        assert!(matches!(result, Err(TransformError::ZipError { .. })));
    }

    #[test]
    fn failed_zip_write_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("new").join("pkg.zip");
        let result = ZipHandler.write(&archive, &dir.path().join("missing"));
        assert!(result.is_err());
        assert!(!dir.path().join("new").exists());
    }

    #[test]
    fn directory_write_copies_and_cleans_up_on_failure() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        web_package(&src);

        let out = dir.path().join("a").join("b");
        DirectoryHandler.write(&out, &src).unwrap();
        assert_eq!(read(&out, "logs/old.log"), "stale");

        let failed = dir.path().join("x").join("y");
        assert!(DirectoryHandler.write(&failed, &dir.path().join("missing")).is_err());
        assert!(!dir.path().join("x").exists());
    }

    #[test]
    fn registry_picks_handler_by_extension() {
        let dir = TempDir::new().unwrap();
        let registry = HandlerRegistry::new();
        let existing_file = write(dir.path(), "notes.txt", "x");

        assert!(registry.writer(&dir.path().join("out.ZIP")).is_ok());
        assert!(registry.writer(&dir.path().join("out")).is_ok());
        assert!(registry.writer(&dir.path().join("out.d")).is_ok());
        assert!(registry.extractor(dir.path()).is_ok());
        assert!(matches!(
            registry.extractor(&existing_file),
            Err(TransformError::NoPackageHandler {
                role: "extractor",
                ..
            })
        ));
    }
}
