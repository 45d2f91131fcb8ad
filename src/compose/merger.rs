//! Merge primitives shared by the composition operations.
//!
//! # Merge Rules
//!
//! [`deep_merge`] (used for layers):
//! - Objects are merged recursively
//! - Arrays are replaced entirely (not concatenated)
//! - Scalars and nulls in overlay replace the base value
//!
//! The keyed-list and text helpers implement the per-field policies of the
//! inheritance strategies.

use serde_json::Value;
use std::collections::HashSet;
use std::hash::Hash;

/// Deep merge two JSON values.
///
/// Later values override earlier values at the point of conflict.
/// Objects are merged recursively. Arrays are replaced entirely.
///
/// # Arguments
///
/// * `base` - The accumulated value
/// * `overlay` - The value that takes precedence
///
/// # Returns
///
/// A new Value with merged contents
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        // Both are objects: merge recursively
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                let merged = match base_map.get(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value.clone(),
                };
                result.insert(key.clone(), merged);
            }

            Value::Object(result)
        }

        // Arrays, scalars, null, or a type change: overlay wins
        (_, overlay) => overlay.clone(),
    }
}

/// Merge multiple values in order (later overrides earlier).
pub fn merge_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> Value {
    values
        .into_iter()
        .fold(Value::Object(Default::default()), |acc, value| {
            deep_merge(&acc, value)
        })
}

/// Keep every base entry and append overlay entries whose key is new.
///
/// Base entries always win on key collision. Overlay entries that collide
/// with each other are also deduplicated, first one kept.
pub fn append_unique_by<T, K, F>(base: &[T], overlay: &[T], key: F) -> Vec<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen: HashSet<K> = base.iter().map(&key).collect();
    let mut result = base.to_vec();

    for item in overlay {
        if seen.insert(key(item)) {
            result.push(item.clone());
        }
    }

    result
}

/// Concatenate two lists, base first, without dedup.
pub fn concat<T: Clone>(base: &[T], overlay: &[T]) -> Vec<T> {
    let mut result = Vec::with_capacity(base.len() + overlay.len());
    result.extend_from_slice(base);
    result.extend_from_slice(overlay);
    result
}

/// Join two optional text blocks, base first, with a newline.
///
/// Empty blocks contribute nothing; two absent blocks stay absent.
pub fn concat_text(base: Option<&str>, overlay: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [base, overlay]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

/// Join two markup strings, base first, with a newline.
pub fn concat_markup(base: &str, overlay: &str) -> String {
    concat_text(Some(base), Some(overlay)).unwrap_or_default()
}
