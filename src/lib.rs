//! Environment-specific configuration transforms for deployment packages.
//!
//! A package (a directory tree or a `.zip` archive) ships its configuration
//! files next to named overlays: `Web.config` next to `Web.Release.config`
//! and `Web.Test.config`, `appsettings.json` next to
//! `appsettings.Release.json`. Transforming the package for an environment
//! applies the matching overlay to each configuration file, discards every
//! overlay, deletes paths that should not ship, and writes a new package.
//!
//! ```ignore
//! let request = TransformRequest::new("site.zip", "site.release.zip")
//!     .transform(["**/*.config", "**/*.json"])
//!     .delete(["logs"])
//!     .names(["Release"]);
//! PackageTransformer::new().transform_default(&request)?;
//! ```
//!
//! # Pipeline
//!
//! [`PackageTransformer::transform`] runs these steps against a private
//! staging directory:
//!
//! ```text
//! validate arguments
//!     → extract source into <staging>/Original
//!     → copy to <staging>/Transform
//!     → build the transform map and apply one overlay per base file
//!     → delete paths matching the delete patterns
//!     → write <staging>/Transform to the destination
//!     → remove the staging directory
//! ```
//!
//! The destination is never written unless every earlier step succeeds, and
//! the staging directory is removed on failure as well as on success (unless
//! cleanup is switched off for debugging).
//!
//! # Naming convention
//!
//! An overlay's name is its base file's name with one or more dot segments
//! inserted before the extension. [`TransformMapBuilder`] walks every dot of
//! a matched file's stem, so `Web.1.2.config` is an overlay of both
//! `Web.1.config` and `Web.config` when those exist. Given an ordered list of
//! transformation names, [`resolver::resolve`] picks at most one overlay per
//! base: the one matching the earliest name in the list. Identity is
//! case-insensitive throughout.
//!
//! # Content formats
//!
//! Each base file is read as JSON first and XML second:
//!
//! - JSON overlays deep-merge into the document and understand the
//!   `@jdt.remove`, `@jdt.replace`, `@jdt.rename` and `@jdt.merge` verbs.
//! - XML overlays use `xdt:Transform` and `xdt:Locator` attributes in the
//!   `http://schemas.microsoft.com/XML-Document-Transform` namespace.
//!
//! Rewritten files keep their encoding. Byte-order marks and line endings
//! follow [`TransformOptions`], whose unset values depend on the
//! [`Platform`](platform::Platform).
//!
//! # Safety
//!
//! Every glob match and every delete target must stay inside the working
//! tree, and deleting the working tree itself is refused. Zip entries that
//! would extract outside the staging directory are rejected.
//!
//! # Settings
//!
//! Defaults for [`TransformOptions`] can be kept in `config-transform.toml`
//! (platform config directory, then the working directory) and in
//! `CONFIG_TRANSFORM__*` environment variables; see [`settings`].
//!
//! # Cargo features
//!
//! - **`clap`** (default): the [`TransformArgs`] adapter and the
//!   `config-transform` binary.

pub mod archive;
pub mod content;
pub mod error;
pub mod map;
pub mod options;
pub mod package;
pub mod path;
pub mod platform;
pub mod resolver;
pub mod search;
pub mod settings;
pub mod types;

#[cfg(feature = "clap")]
mod cli;
mod fs;
mod text;

#[cfg(test)]
mod fixtures;

#[cfg(feature = "clap")]
pub use cli::TransformArgs;
pub use content::{ContentTransformer, FileTransformer};
pub use error::TransformError;
pub use map::{TransformMap, TransformMapBuilder};
pub use options::{Replace, TransformOptions};
pub use package::{PackageTransformer, PackageTransformerBuilder};
pub use settings::{SettingsLoader, TransformSettings};
pub use types::{Action, SearchPath, TransformRequest};
