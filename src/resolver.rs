//! Choose which overlay applies to each base file.
//!
//! Names are tried in the caller's order. For each name the first overlay (in
//! the map's discovery order) whose stem ends in `.<name>` is claimed and
//! stops the search for that base, so at most one overlay per base applies.
//! Every other overlay is reported as not applying. Both kinds are deleted
//! from the working tree by the package pipeline.

use indexmap::IndexMap;

use crate::map::TransformMap;
use crate::path::{PathKey, file_stem};

/// Per-base decision: overlay → applies. The applied overlay, if any, comes first.
pub type ResolvedEntry = IndexMap<PathKey, bool>;

/// Resolve every base in `map` against `names`, in map order.
pub fn resolve(map: &TransformMap, names: &[String]) -> IndexMap<PathKey, ResolvedEntry> {
    map.iter()
        .map(|(base, overlays)| {
            let mut remaining: Vec<&PathKey> = overlays.iter().collect();
            let mut entry = ResolvedEntry::new();

            let claimed = names
                .iter()
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .find_map(|name| {
                    remaining
                        .iter()
                        .position(|overlay| matches_name(overlay, name))
                });
            if let Some(idx) = claimed {
                entry.insert(remaining.remove(idx).clone(), true);
            }

            for overlay in remaining {
                entry.insert(overlay.clone(), false);
            }
            (base.clone(), entry)
        })
        .collect()
}

/// The overlay applied to a base, if any.
pub fn applied(entry: &ResolvedEntry) -> Option<&PathKey> {
    entry
        .iter()
        .find_map(|(overlay, applies)| applies.then_some(overlay))
}

fn matches_name(overlay: &PathKey, name: &str) -> bool {
    let stem = file_stem(overlay.path()).to_lowercase();
    let suffix = format!(".{}", name.to_lowercase());
    stem.ends_with(&suffix)
}
