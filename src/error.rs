use std::path::PathBuf;

use thiserror::Error;

use crate::types::Action;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Invalid {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("The {what} \"{path}\" does not exist")]
    NotFound { what: &'static str, path: PathBuf },

    #[error("The destination \"{path}\" already exists")]
    AlreadyExists { path: PathBuf },

    #[error("Could not get {role} for \"{path}\"")]
    NoPackageHandler { role: &'static str, path: PathBuf },

    #[error("A transformer for file \"{path}\" could not be created: content is neither JSON nor XML")]
    UnsupportedFormat { path: PathBuf },

    #[error(
        "It is not allowed to {action} \"{path}\": it is outside the directory \"{root}\""
    )]
    PathEscape {
        action: Action,
        path: PathBuf,
        root: PathBuf,
    },

    #[error("It is not allowed to {action} the directory \"{path}\" itself")]
    RootTarget { action: Action, path: PathBuf },

    #[error(
        "Could not transform source \"{source_path}\" with transformation \"{transformation}\" to destination \"{destination}\": {cause}"
    )]
    FileTransform {
        source_path: PathBuf,
        transformation: PathBuf,
        destination: PathBuf,
        #[source]
        cause: Box<TransformError>,
    },

    #[error("Invalid transformation {path}: {reason}")]
    InvalidTransformation { path: PathBuf, reason: String },

    #[error("Failed to access {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Archive {archive} contains entry \"{entry}\" that would extract outside the destination")]
    UnsafeArchiveEntry { archive: PathBuf, entry: String },

    #[error("Zip archive {path}: {source}")]
    ZipError {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("Failed to parse JSON {path}: {source}")]
    JsonError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to parse XML {path}: {reason}")]
    XmlError { path: PathBuf, reason: String },

    #[error("Invalid glob pattern '{pattern}': {source}")]
    GlobError {
        pattern: String,
        source: globset::Error,
    },

    #[error("Failed to parse settings {path}: {source}")]
    SettingsParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Unknown key '{key}' in {path} (line {line})")]
    UnknownSettingsKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Settings error: {0}")]
    SettingsError(#[from] confique::Error),
}

impl TransformError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TransformError::IoError {
            path: path.into(),
            source,
        }
    }
}
