//! Persistent defaults for transformation options.
//!
//! Settings come from `config-transform.toml` files and `CONFIG_TRANSFORM__*`
//! environment variables, layered lowest to highest priority:
//!
//! 1. Built-in defaults declared on [`TransformSettings`]
//! 2. Settings files found in the search paths (later paths override earlier)
//! 3. Environment variables
//!
//! Loading is split in two: [`SettingsLoader::load`] does the I/O (reading
//! files and the process environment) and hands pre-loaded data to
//! [`resolve`], which merges and validates without touching the outside world.
//!
//! In strict mode (the default) a settings file containing a key that
//! [`TransformSettings`] does not know is an error that names the file and
//! line.

use std::path::{Path, PathBuf};

use confique::Config;
use toml::{Table, Value};
use tracing::debug;

use crate::error::TransformError;
use crate::options::{Replace, TransformOptions};
use crate::types::SearchPath;

pub const APP_NAME: &str = "config-transform";
pub const SETTINGS_FILE_NAME: &str = "config-transform.toml";
pub const ENV_PREFIX: &str = "CONFIG_TRANSFORM";

#[derive(Config, Debug, Clone, PartialEq)]
pub struct TransformSettings {
    /// Remove the temporary staging directory after each run.
    #[config(default = true)]
    pub cleanup: bool,

    /// Strip byte-order marks from rewritten files. Unset means "strip
    /// everywhere except Windows".
    pub avoid_byte_order_mark: Option<bool>,

    /// Normalize line endings of rewritten files to the native newline.
    /// Unset means "normalize everywhere except Windows".
    pub normalize_line_endings: Option<bool>,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            cleanup: true,
            avoid_byte_order_mark: None,
            normalize_line_endings: None,
        }
    }
}

impl TransformSettings {
    pub fn to_options(&self) -> TransformOptions {
        let mut options = TransformOptions::default().cleanup(self.cleanup);
        if let Some(avoid) = self.avoid_byte_order_mark {
            options = options.avoid_byte_order_mark(avoid);
        }
        options.replace_mode(match self.normalize_line_endings {
            Some(true) => Replace::NativeNewlines,
            Some(false) => Replace::Disabled,
            None => Replace::PlatformDefault,
        })
    }
}

/// Discovers and loads [`TransformSettings`].
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    search_paths: Vec<SearchPath>,
    file_name: String,
    env_prefix: Option<String>,
    strict: bool,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self {
            search_paths: vec![SearchPath::Platform, SearchPath::Cwd],
            file_name: SETTINGS_FILE_NAME.to_string(),
            env_prefix: Some(ENV_PREFIX.to_string()),
            strict: true,
        }
    }
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the search paths. Later entries take precedence.
    pub fn search_paths(mut self, paths: Vec<SearchPath>) -> Self {
        self.search_paths = paths;
        self
    }

    pub fn add_search_path(mut self, path: SearchPath) -> Self {
        self.search_paths.push(path);
        self
    }

    pub fn file_name(mut self, name: &str) -> Self {
        self.file_name = name.to_string();
        self
    }

    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    pub fn no_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn load(self) -> Result<TransformSettings, TransformError> {
        let dirs: Vec<PathBuf> = self
            .search_paths
            .iter()
            .filter_map(resolve_search_path)
            .collect();
        let files = load_all(&dirs, &self.file_name)?;
        let env_vars = match self.env_prefix {
            Some(_) => std::env::vars().collect(),
            None => Vec::new(),
        };

        resolve(SettingsInput {
            files,
            env_vars,
            env_prefix: self.env_prefix,
            strict: self.strict,
        })
    }
}

fn resolve_search_path(path: &SearchPath) -> Option<PathBuf> {
    match path {
        SearchPath::Platform => {
            let dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
            Some(dirs.config_dir().to_path_buf())
        }
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(p) => Some(p.clone()),
    }
}

/// Read `{dir}/{file_name}` from each directory, in order. Missing files are skipped.
fn load_all(dirs: &[PathBuf], file_name: &str) -> Result<Vec<(PathBuf, String)>, TransformError> {
    let mut results = Vec::new();
    for dir in dirs {
        let file_path = dir.join(file_name);
        match std::fs::read_to_string(&file_path) {
            Ok(content) => {
                debug!("Loaded settings from {}", file_path.display());
                results.push((file_path, content));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(TransformError::io(file_path, e)),
        }
    }
    Ok(results)
}

/// Pre-loaded settings sources. No I/O happens past this point.
#[derive(Debug, Default)]
pub struct SettingsInput {
    /// File contents, lowest priority first.
    pub files: Vec<(PathBuf, String)>,
    pub env_vars: Vec<(String, String)>,
    /// `None` disables the environment layer.
    pub env_prefix: Option<String>,
    pub strict: bool,
}

pub fn resolve(input: SettingsInput) -> Result<TransformSettings, TransformError> {
    let mut merged = Table::new();
    for (path, content) in &input.files {
        if input.strict {
            reject_unknown_keys(content, path)?;
        }
        let table: Table =
            toml::from_str(content).map_err(|e| TransformError::SettingsParseError {
                path: path.clone(),
                source: e,
            })?;
        merged = deep_merge(merged, table);
    }

    if let Some(prefix) = &input.env_prefix {
        merged = deep_merge(merged, env_to_table(prefix, input.env_vars));
    }

    let layer: <TransformSettings as Config>::Layer = Value::Table(merged)
        .try_into()
        .map_err(|e: toml::de::Error| TransformError::SettingsParseError {
            path: PathBuf::from("<merged settings>"),
            source: e,
        })?;

    Ok(TransformSettings::builder().preloaded(layer).load()?)
}

/// Later tables win; nested tables merge key by key.
fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, overlay_val) in overlay {
        match (base.remove(&key), overlay_val) {
            (Some(Value::Table(base_tbl)), Value::Table(overlay_tbl)) => {
                base.insert(key, Value::Table(deep_merge(base_tbl, overlay_tbl)));
            }
            (_, overlay_val) => {
                base.insert(key, overlay_val);
            }
        }
    }
    base
}

/// `{PREFIX}__NAME=value` becomes `name = value`. Further `__` separators nest.
fn env_to_table(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Table {
    let needle = format!("{prefix}__");
    let mut table = Table::new();

    for (key, value) in vars {
        let Some(rest) = key.strip_prefix(&needle) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        let segments: Vec<String> = rest.split("__").map(str::to_lowercase).collect();
        insert_nested(&mut table, &segments, parse_env_value(&value));
    }

    table
}

fn insert_nested(table: &mut Table, segments: &[String], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        table.insert(first.clone(), value);
        return;
    }
    let sub = table
        .entry(first.as_str())
        .or_insert_with(|| Value::Table(Table::new()));
    if let Value::Table(sub_table) = sub {
        insert_nested(sub_table, rest, value);
    }
}

fn parse_env_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    Value::String(s.to_string())
}

/// Fails on the first key the settings layer does not consume.
fn reject_unknown_keys(content: &str, path: &Path) -> Result<(), TransformError> {
    let mut unknown: Vec<String> = Vec::new();

    let deserializer = toml::Deserializer::new(content);
    let _layer: <TransformSettings as Config>::Layer =
        serde_ignored::deserialize(deserializer, |ignored| unknown.push(ignored.to_string()))
            .map_err(|e| TransformError::SettingsParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

    match unknown.into_iter().next() {
        None => Ok(()),
        Some(key) => {
            let line = find_key_line(content, &key);
            Err(TransformError::UnknownSettingsKey {
                key,
                path: path.to_path_buf(),
                line,
            })
        }
    }
}

/// 1-indexed line of a dotted key, tracking `[section]` headers. 0 if not found.
fn find_key_line(content: &str, dotted_key: &str) -> usize {
    let segments: Vec<&str> = dotted_key.split('.').collect();
    let Some((leaf, expected_section)) = segments.split_last() else {
        return 0;
    };

    let mut current_section: Vec<String> = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.starts_with('[') && !trimmed.starts_with("[[") {
            let header = trimmed.trim_start_matches('[').trim_end_matches(']').trim();
            current_section = header.split('.').map(|s| s.trim().to_string()).collect();
            continue;
        }

        let in_section = expected_section.len() == current_section.len()
            && expected_section
                .iter()
                .zip(&current_section)
                .all(|(a, b)| *a == b);

        if in_section
            && let Some(after_key) = trimmed.strip_prefix(leaf)
            && after_key.trim_start().starts_with('=')
        {
            return i + 1;
        }
    }
    0
}
