//! Applying one transformation file to one configuration file.
//!
//! The content type is decided by what the source parses as: JSON first,
//! then XML. The transformation is parsed as the same type. Output keeps the
//! source's text encoding; its byte-order mark is written back only when the
//! source had one and the options do not ask to avoid it.

pub mod json;
pub mod xml;

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::TransformError;
use crate::fs::{entry_exists, write_file};
use crate::options::{ResolvedOptions, TransformOptions};
use crate::path::require_non_blank;
use crate::platform::{HostPlatform, Platform};
use crate::text::{self, TextDocument};

use self::xml::XmlDocument;

/// A parsed configuration document.
#[derive(Debug, Clone)]
pub enum Document {
    Json(serde_json::Value),
    Xml(XmlDocument),
}

impl Document {
    /// Parse `content` as JSON, falling back to XML.
    pub fn try_parse(path: &Path, content: &str) -> Result<Self, TransformError> {
        if let Ok(value) = serde_json::from_str(content) {
            return Ok(Document::Json(value));
        }
        if let Ok(doc) = XmlDocument::parse(content) {
            return Ok(Document::Xml(doc));
        }
        Err(TransformError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }

    /// Apply the transformation text `overlay`, read from `path`.
    pub fn apply(&mut self, overlay: &str, path: &Path) -> Result<(), TransformError> {
        match self {
            Document::Json(value) => {
                let overlay: serde_json::Value =
                    serde_json::from_str(overlay).map_err(|e| TransformError::JsonError {
                        path: path.to_path_buf(),
                        source: e,
                    })?;
                json::apply_transform(value, &overlay, path)
            }
            Document::Xml(doc) => {
                let overlay = XmlDocument::parse(overlay).map_err(|reason| {
                    TransformError::XmlError {
                        path: path.to_path_buf(),
                        reason,
                    }
                })?;
                xml::apply_transform(doc, &overlay, path)
            }
        }
    }

    pub fn serialize(&self, path: &Path) -> Result<String, TransformError> {
        match self {
            Document::Json(value) => {
                serde_json::to_string_pretty(value).map_err(|e| TransformError::JsonError {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
            Document::Xml(doc) => Ok(doc.to_xml()),
        }
    }
}

/// Content-level transform operations the package pipeline relies on.
pub trait ContentTransformer: Send + Sync {
    /// Apply `transformation` to `source` and write the result to `destination`.
    fn apply(
        &self,
        destination: &Path,
        source: &Path,
        transformation: &Path,
        options: &ResolvedOptions,
    ) -> Result<(), TransformError>;

    /// Rewrite `path` in place with only the BOM and replacement rules applied.
    fn normalize(&self, path: &Path, options: &ResolvedOptions) -> Result<(), TransformError>;
}

/// The JSON/XML [`ContentTransformer`], also usable directly on single files.
#[derive(Clone)]
pub struct FileTransformer {
    platform: Arc<dyn Platform>,
}

impl Default for FileTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTransformer {
    pub fn new() -> Self {
        Self::with_platform(Arc::new(HostPlatform))
    }

    pub fn with_platform(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    /// Transform a single file.
    ///
    /// `destination` may equal `source`. Missing parent directories of
    /// `destination` are created and removed again if the write fails.
    pub fn transform(
        &self,
        destination: &Path,
        source: &Path,
        transformation: &Path,
        options: &TransformOptions,
    ) -> Result<(), TransformError> {
        require_non_blank("destination", destination)?;
        require_non_blank("source", source)?;
        require_non_blank("transformation", transformation)?;
        if !source.is_file() {
            return Err(TransformError::NotFound {
                what: "source file",
                path: source.to_path_buf(),
            });
        }
        if !entry_exists(transformation) {
            return Err(TransformError::NotFound {
                what: "transformation file",
                path: transformation.to_path_buf(),
            });
        }
        self.apply(
            destination,
            source,
            transformation,
            &options.resolve(self.platform.as_ref()),
        )
    }

    fn transform_content(
        &self,
        source: &Path,
        transformation: &Path,
    ) -> Result<(TextDocument, String), TransformError> {
        let document = text::read_required(source)?;
        let overlay = text::read_required(transformation)?;

        if overlay.content.trim().is_empty() {
            debug!("Transformation {} is empty", transformation.display());
            let content = document.content.clone();
            return Ok((document, content));
        }

        let mut parsed = Document::try_parse(source, &document.content)?;
        parsed.apply(&overlay.content, transformation)?;
        let mut content = parsed.serialize(source)?;
        if matches!(parsed, Document::Json(_)) && document.content.ends_with('\n') {
            content.push('\n');
        }
        Ok((document, content))
    }
}

impl ContentTransformer for FileTransformer {
    fn apply(
        &self,
        destination: &Path,
        source: &Path,
        transformation: &Path,
        options: &ResolvedOptions,
    ) -> Result<(), TransformError> {
        let wrap = |cause: TransformError| TransformError::FileTransform {
            source_path: source.to_path_buf(),
            transformation: transformation.to_path_buf(),
            destination: destination.to_path_buf(),
            cause: Box::new(cause),
        };

        let (document, content) = self.transform_content(source, transformation).map_err(wrap)?;
        let content = options.apply_replace(content);
        let with_bom = document.had_bom && !options.avoid_byte_order_mark;
        write_file(destination, &document.encode(&content, with_bom)).map_err(wrap)?;

        debug!(
            "Transformed {} with {}",
            source.display(),
            transformation.display()
        );
        Ok(())
    }

    fn normalize(&self, path: &Path, options: &ResolvedOptions) -> Result<(), TransformError> {
        let bytes = std::fs::read(path).map_err(|e| TransformError::io(path, e))?;
        let Some(document) = text::decode(&bytes) else {
            debug!("Skipping normalization of non-text file {}", path.display());
            return Ok(());
        };
        let content = options.apply_replace(document.content.clone());
        let with_bom = document.had_bom && !options.avoid_byte_order_mark;
        let normalized = document.encode(&content, with_bom);
        if normalized != bytes {
            debug!("Normalized {}", path.display());
            write_file(path, &normalized)?;
        }
        Ok(())
    }
}
