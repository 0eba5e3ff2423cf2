//! JSON document transforms.
//!
//! A transformation is a JSON object laid over the source. Without verbs it
//! merges: objects recurse, arrays append, anything else is replaced by the
//! transformation's value. Keys starting with `@jdt.` are verbs acting on the
//! node they appear in, applied in a fixed order before the merge:
//!
//! 1. `@jdt.remove`: a key, a list of keys, or `true` to empty the node.
//! 2. `@jdt.replace`: replace the node with the value (a list applies each in turn).
//! 3. `@jdt.rename`: `{ "old": "new" }` map, renaming in place.
//! 4. `@jdt.merge`: merge an object (or each object of a list) into the node.
//!
//! `@jdt.path` selectors are not supported and are rejected.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::TransformError;

const VERB_PREFIX: &str = "@jdt.";
const REMOVE: &str = "@jdt.remove";
const REPLACE: &str = "@jdt.replace";
const RENAME: &str = "@jdt.rename";
const MERGE: &str = "@jdt.merge";

/// Apply the transformation `overlay`, read from `path`, to `source` in place.
pub fn apply_transform(
    source: &mut Value,
    overlay: &Value,
    path: &Path,
) -> Result<(), TransformError> {
    let Value::Object(overlay) = overlay else {
        return Err(invalid(path, "the transformation must be a JSON object"));
    };
    apply_node(source, overlay, path)
}

fn invalid(path: &Path, reason: impl Into<String>) -> TransformError {
    TransformError::InvalidTransformation {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn apply_node(
    node: &mut Value,
    transform: &Map<String, Value>,
    path: &Path,
) -> Result<(), TransformError> {
    if let Some(unknown) = transform
        .keys()
        .filter(|k| k.starts_with(VERB_PREFIX))
        .find(|k| ![REMOVE, REPLACE, RENAME, MERGE].contains(&k.as_str()))
    {
        return Err(invalid(path, format!("unsupported verb \"{unknown}\"")));
    }

    if let Some(value) = transform.get(REMOVE) {
        remove(as_object(node, REMOVE, path)?, value, path)?;
    }
    if let Some(value) = transform.get(REPLACE) {
        replace(node, value, path)?;
    }
    if let Some(value) = transform.get(RENAME) {
        rename(as_object(node, RENAME, path)?, value, path)?;
    }
    if let Some(value) = transform.get(MERGE) {
        merge(node, value, path)?;
    }

    let defaults: Vec<(&String, &Value)> = transform
        .iter()
        .filter(|(k, _)| !k.starts_with(VERB_PREFIX))
        .collect();
    if defaults.is_empty() {
        return Ok(());
    }
    let object = as_object(node, "a merge", path)?;
    for (key, value) in defaults {
        if !object.contains_key(key) {
            let added = match value {
                Value::Object(inner) => {
                    let mut fresh = Value::Object(Map::new());
                    apply_node(&mut fresh, inner, path)?;
                    fresh
                }
                other => other.clone(),
            };
            object.insert(key.clone(), added);
            continue;
        }
        let Some(existing) = object.get_mut(key) else {
            continue;
        };
        match value {
            Value::Object(inner) if existing.is_object() => apply_node(existing, inner, path)?,
            Value::Array(items) => match existing {
                Value::Array(current) => current.extend(items.iter().cloned()),
                _ => *existing = value.clone(),
            },
            _ => *existing = value.clone(),
        }
    }
    Ok(())
}

fn as_object<'v>(
    node: &'v mut Value,
    what: &str,
    path: &Path,
) -> Result<&'v mut Map<String, Value>, TransformError> {
    match node {
        Value::Object(object) => Ok(object),
        _ => Err(invalid(path, format!("{what} needs an object to act on"))),
    }
}

/// Verb values may not use the `@jdt.path` / `@jdt.value` selector form.
fn reject_selector(value: &Value, path: &Path) -> Result<(), TransformError> {
    if let Value::Object(map) = value
        && map.keys().any(|k| k == "@jdt.path" || k == "@jdt.value")
    {
        return Err(invalid(path, "@jdt.path selectors are not supported"));
    }
    Ok(())
}

fn remove(object: &mut Map<String, Value>, value: &Value, path: &Path) -> Result<(), TransformError> {
    match value {
        Value::String(key) => {
            if object.shift_remove(key).is_none() {
                debug!("{}: nothing to remove at \"{key}\"", path.display());
            }
        }
        Value::Bool(true) => object.clear(),
        Value::Bool(false) => {}
        Value::Array(items) => {
            for item in items {
                remove(object, item, path)?;
            }
        }
        other => {
            reject_selector(other, path)?;
            return Err(invalid(path, format!("{REMOVE} does not accept {other}")));
        }
    }
    Ok(())
}

fn replace(node: &mut Value, value: &Value, path: &Path) -> Result<(), TransformError> {
    match value {
        Value::Array(items) => {
            for item in items {
                reject_selector(item, path)?;
                *node = item.clone();
            }
        }
        other => {
            reject_selector(other, path)?;
            *node = other.clone();
        }
    }
    Ok(())
}

fn rename(object: &mut Map<String, Value>, value: &Value, path: &Path) -> Result<(), TransformError> {
    match value {
        Value::Object(pairs) => {
            reject_selector(value, path)?;
            for (old, new) in pairs {
                let Value::String(new) = new else {
                    return Err(invalid(path, format!("{RENAME} target for \"{old}\" must be a string")));
                };
                if !object.contains_key(old) {
                    debug!("{}: nothing to rename at \"{old}\"", path.display());
                    continue;
                }
                let entries = std::mem::take(object);
                for (key, value) in entries {
                    if &key == old {
                        object.insert(new.clone(), value);
                    } else {
                        object.insert(key, value);
                    }
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                rename(object, item, path)?;
            }
        }
        other => return Err(invalid(path, format!("{RENAME} does not accept {other}"))),
    }
    Ok(())
}

fn merge(node: &mut Value, value: &Value, path: &Path) -> Result<(), TransformError> {
    match value {
        Value::Object(inner) => {
            reject_selector(value, path)?;
            apply_node(node, inner, path)
        }
        Value::Array(items) => {
            for item in items {
                merge(node, item, path)?;
            }
            Ok(())
        }
        other => Err(invalid(path, format!("{MERGE} does not accept {other}"))),
    }
}
