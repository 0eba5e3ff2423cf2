//! Per-call transformation options.
//!
//! Every knob is optional and falls back to a [`Platform`]-dependent default:
//!
//! | Option | Unset on Windows | Unset elsewhere |
//! |--------|------------------|-----------------|
//! | `avoid_byte_order_mark` | `false` (keep BOM) | `true` (strip BOM) |
//! | `replace` | no rewrite | line endings normalized to `\n` |
//!
//! An explicit caller value always wins over the platform default.

use std::fmt;
use std::sync::Arc;

use crate::platform::Platform;
use crate::text;

/// A content post-processor applied to every rewritten file before encoding.
pub type ReplaceFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// How rewritten content is post-processed.
#[derive(Clone, Default)]
pub enum Replace {
    /// Normalize line endings unless the platform is Windows-like.
    #[default]
    PlatformDefault,
    /// Never rewrite content.
    Disabled,
    /// Always normalize line endings to the platform's native newline.
    NativeNewlines,
    /// A caller-supplied rewrite.
    Custom(ReplaceFn),
}

impl fmt::Debug for Replace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replace::PlatformDefault => f.write_str("PlatformDefault"),
            Replace::Disabled => f.write_str("Disabled"),
            Replace::NativeNewlines => f.write_str("NativeNewlines"),
            Replace::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Options for a single `transform` call.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Strip the byte-order mark from rewritten files. `None` = platform default.
    pub avoid_byte_order_mark: Option<bool>,
    /// Content post-processing before encoding.
    pub replace: Replace,
    /// Remove the temporary staging directory when the call finishes.
    pub cleanup: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            avoid_byte_order_mark: None,
            replace: Replace::default(),
            cleanup: true,
        }
    }
}

impl TransformOptions {
    pub fn avoid_byte_order_mark(mut self, avoid: bool) -> Self {
        self.avoid_byte_order_mark = Some(avoid);
        self
    }

    pub fn cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn replace(mut self, replace: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.replace = Replace::Custom(Arc::new(replace));
        self
    }

    pub fn replace_mode(mut self, replace: Replace) -> Self {
        self.replace = replace;
        self
    }

    /// Settle every platform-dependent default.
    pub fn resolve(&self, platform: &dyn Platform) -> ResolvedOptions {
        let windows = platform.is_windows();
        let newline = platform.newline();

        let replace: Option<ReplaceFn> = match &self.replace {
            Replace::Disabled => None,
            Replace::PlatformDefault if windows => None,
            Replace::PlatformDefault | Replace::NativeNewlines => Some(Arc::new(
                move |content: &str| text::normalize_newlines(content, newline),
            )),
            Replace::Custom(f) => Some(Arc::clone(f)),
        };

        ResolvedOptions {
            avoid_byte_order_mark: self.avoid_byte_order_mark.unwrap_or(!windows),
            replace,
        }
    }
}

/// Options with platform defaults applied. This is what the content layer sees.
#[derive(Clone)]
pub struct ResolvedOptions {
    pub avoid_byte_order_mark: bool,
    pub replace: Option<ReplaceFn>,
}

impl ResolvedOptions {
    pub(crate) fn apply_replace(&self, content: String) -> String {
        match &self.replace {
            Some(f) => f(&content),
            None => content,
        }
    }
}

impl fmt::Debug for ResolvedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedOptions")
            .field("avoid_byte_order_mark", &self.avoid_byte_order_mark)
            .field("replace", &self.replace.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::SimulatedPlatform;

    #[test]
    fn unix_defaults_avoid_bom_and_normalize() {
        let resolved = TransformOptions::default().resolve(&SimulatedPlatform::unix());
        assert!(resolved.avoid_byte_order_mark);
        assert_eq!(resolved.apply_replace("a\r\nb".into()), "a\nb");
    }

    #[test]
    fn windows_defaults_keep_bom_and_content() {
        let resolved = TransformOptions::default().resolve(&SimulatedPlatform::windows());
        assert!(!resolved.avoid_byte_order_mark);
        assert!(resolved.replace.is_none());
        assert_eq!(resolved.apply_replace("a\r\nb".into()), "a\r\nb");
    }

    #[test]
    fn explicit_bom_choice_wins() {
        let resolved = TransformOptions::default()
            .avoid_byte_order_mark(false)
            .resolve(&SimulatedPlatform::unix());
        assert!(!resolved.avoid_byte_order_mark);
    }

    #[test]
    fn native_newlines_on_windows_use_crlf() {
        let resolved = TransformOptions::default()
            .replace_mode(Replace::NativeNewlines)
            .resolve(&SimulatedPlatform::windows());
        assert_eq!(resolved.apply_replace("a\nb\r\nc".into()), "a\r\nb\r\nc");
    }

    #[test]
    fn custom_replace_is_used_verbatim() {
        let resolved = TransformOptions::default()
            .replace(|s| s.to_uppercase())
            .resolve(&SimulatedPlatform::windows());
        assert_eq!(resolved.apply_replace("abc".into()), "ABC");
    }

    #[test]
    fn disabled_replace_leaves_content() {
        let resolved = TransformOptions::default()
            .replace_mode(Replace::Disabled)
            .resolve(&SimulatedPlatform::unix());
        assert_eq!(resolved.apply_replace("a\r\nb".into()), "a\r\nb");
    }

    #[test]
    fn cleanup_defaults_on() {
        assert!(TransformOptions::default().cleanup);
    }
}
