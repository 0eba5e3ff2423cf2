use std::fmt;
use std::path::PathBuf;

/// The operation a path-safety check is guarding. Shows up in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Transform,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Transform => f.write_str("transform"),
            Action::Delete => f.write_str("delete"),
        }
    }
}

/// Where to search for settings files.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// Platform config directory (XDG on Linux, ~/Library/Application Support on macOS).
    Platform,
    /// Current working directory.
    Cwd,
    /// An explicit directory.
    Path(PathBuf),
}

/// A package transformation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
///
/// Pattern lists accept `/` and `\` as separators, and a single entry may
/// pack several patterns separated by `;`. The order of
/// `transformation_names` is significant: the first name with a matching
/// overlay wins for each base file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformRequest {
    pub destination: PathBuf,
    pub source: PathBuf,
    pub file_to_transform_patterns: Vec<String>,
    pub path_to_delete_patterns: Vec<String>,
    pub transformation_names: Vec<String>,
}

impl TransformRequest {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            ..Self::default()
        }
    }

    pub fn transform<S: Into<String>>(mut self, patterns: impl IntoIterator<Item = S>) -> Self {
        self.file_to_transform_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn delete<S: Into<String>>(mut self, patterns: impl IntoIterator<Item = S>) -> Self {
        self.path_to_delete_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.transformation_names
            .extend(names.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_displays_lowercase() {
        assert_eq!(Action::Transform.to_string(), "transform");
        assert_eq!(Action::Delete.to_string(), "delete");
    }

    #[test]
    fn request_builder_keeps_name_order() {
        let request = TransformRequest::new("pkg", "out")
            .transform(["**/*.config"])
            .names(["Test", "Release"]);
        assert_eq!(request.transformation_names, vec!["Test", "Release"]);
        assert_eq!(request.file_to_transform_patterns, vec!["**/*.config"]);
        assert!(request.path_to_delete_patterns.is_empty());
    }
}
