//! Clap adapter for the package transformer.
//!
//! Compiled only with the `clap` Cargo feature (on by default). The only
//! bridges to the core are [`TransformArgs::into_request()`], which builds a
//! framework-agnostic [`TransformRequest`], and [`TransformArgs::options()`],
//! which lays the flags over loaded [`TransformSettings`]. Callers that use a
//! different argument parser can build those two values directly.

use std::path::PathBuf;

use clap::Args;

use crate::options::TransformOptions;
use crate::settings::{SettingsLoader, TransformSettings};
use crate::types::{SearchPath, TransformRequest};

/// Clap-derived arguments for one package transformation.
///
/// Flatten into an application's parser:
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     transform: TransformArgs,
/// }
/// ```
#[derive(Debug, Args)]
pub struct TransformArgs {
    /// Package to read: a directory or a .zip archive.
    #[arg(short, long)]
    pub source: PathBuf,

    /// Package to create. Must not exist yet.
    #[arg(short, long)]
    pub destination: PathBuf,

    /// Glob selecting files to transform (repeatable, or `;`-separated).
    #[arg(short, long = "transform", value_name = "GLOB")]
    pub transform: Vec<String>,

    /// Glob selecting paths to delete from the output (repeatable).
    #[arg(long, value_name = "GLOB")]
    pub delete: Vec<String>,

    /// Transformation name, highest priority first (repeatable).
    #[arg(short, long = "name", value_name = "NAME")]
    pub names: Vec<String>,

    /// Keep the temporary staging directory for inspection.
    #[arg(long)]
    pub no_cleanup: bool,

    /// Keep byte-order marks in rewritten files.
    #[arg(long)]
    pub keep_byte_order_mark: bool,

    /// Extra directory to search for config-transform.toml (highest priority).
    #[arg(long, value_name = "DIR")]
    pub settings: Option<PathBuf>,
}

impl TransformArgs {
    pub fn into_request(&self) -> TransformRequest {
        TransformRequest::new(&self.source, &self.destination)
            .transform(self.transform.iter().cloned())
            .delete(self.delete.iter().cloned())
            .names(self.names.iter().cloned())
    }

    /// The default settings loader, plus `--settings` if given.
    pub fn settings_loader(&self) -> SettingsLoader {
        let loader = SettingsLoader::new();
        match &self.settings {
            Some(dir) => loader.add_search_path(SearchPath::Path(dir.clone())),
            None => loader,
        }
    }

    /// Flags override settings; an absent flag leaves the setting alone.
    pub fn options(&self, settings: &TransformSettings) -> TransformOptions {
        let mut options = settings.to_options();
        if self.no_cleanup {
            options = options.cleanup(false);
        }
        if self.keep_byte_order_mark {
            options = options.avoid_byte_order_mark(false);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        transform: TransformArgs,
    }

    fn parse(args: &[&str]) -> TransformArgs {
        TestCli::try_parse_from(args).unwrap().transform
    }

    #[test]
    fn minimal_arguments() {
        let args = parse(&["test", "--source", "pkg.zip", "--destination", "out.zip"]);
        let request = args.into_request();
        assert_eq!(request, TransformRequest::new("pkg.zip", "out.zip"));
    }

    #[test]
    fn repeated_flags_keep_order() {
        let args = parse(&[
            "test", "-s", "in", "-d", "out", "-t", "**/*.config", "-t", "**/*.json", "--delete",
            "logs", "-n", "Release", "-n", "Test",
        ]);
        let request = args.into_request();
        assert_eq!(request.file_to_transform_patterns, vec!["**/*.config", "**/*.json"]);
        assert_eq!(request.path_to_delete_patterns, vec!["logs"]);
        assert_eq!(request.transformation_names, vec!["Release", "Test"]);
    }

    #[test]
    fn source_is_required() {
        assert!(TestCli::try_parse_from(["test", "--destination", "out"]).is_err());
    }

    #[test]
    fn flags_override_settings() {
        let args = parse(&[
            "test",
            "-s",
            "in",
            "-d",
            "out",
            "--no-cleanup",
            "--keep-byte-order-mark",
        ]);
        let settings = TransformSettings {
            avoid_byte_order_mark: Some(true),
            ..TransformSettings::default()
        };
        let options = args.options(&settings);
        assert!(!options.cleanup);
        assert_eq!(options.avoid_byte_order_mark, Some(false));
    }

    #[test]
    fn absent_flags_keep_settings() {
        let args = parse(&["test", "-s", "in", "-d", "out"]);
        let settings = TransformSettings {
            cleanup: false,
            avoid_byte_order_mark: Some(true),
            normalize_line_endings: None,
        };
        let options = args.options(&settings);
        assert!(!options.cleanup);
        assert_eq!(options.avoid_byte_order_mark, Some(true));
    }
}
