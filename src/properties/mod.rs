//! Provider property resolution.
//!
//! A provider exposes a nested property bag assembled from three layers,
//! lowest precedence first:
//!
//! 1. the release spec's declared defaults for the link,
//! 2. the owning job's manifest `properties`, filtered through the
//!    provider's dotted-path whitelist,
//! 3. explicit property overrides attached to the provider in the
//!    manifest `provides` block.
//!
//! The merge recurses only where both sides are mappings, so a
//! whitelisted-but-unsupplied nested key retains its spec default at any
//! depth. Any supplied property outside the declared whitelist is a fatal
//! finding - whitelists are contracts, not suggestions.
//!
//! Property bags are [`serde_json::Value`] trees; `serde_json`'s map is
//! ordered, which keeps every serialization of a resolved bag
//! byte-identical across runs.

use serde_json::{Map, Value};

use crate::core::ResolveError;
use crate::diagnostics::Diagnostics;

/// Merge `overrides` into `base`, recursing where both sides are mappings.
///
/// At each level, override keys win; keys present only in `base` are
/// retained. A non-mapping override value replaces the base value
/// wholesale.
pub fn deep_merge(base: &mut Value, overrides: &Value) {
    match (base, overrides) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            for (key, value) in override_map {
                match base_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overrides) => *base = overrides.clone(),
    }
}

/// Dotted leaf paths of a nested mapping, in map order.
///
/// A scalar (or empty-object) node is a leaf. `Null` yields no paths.
pub fn leaf_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    if let Value::Object(map) = value {
        collect_leaves(map, String::new(), &mut paths);
    }
    paths
}

fn collect_leaves(map: &Map<String, Value>, prefix: String, out: &mut Vec<String>) {
    for (key, value) in map {
        let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
        match value {
            Value::Object(child) if !child.is_empty() => collect_leaves(child, path, out),
            _ => out.push(path),
        }
    }
}

/// Whether a supplied dotted path is admitted by a whitelist.
///
/// A path is admitted when the whitelist contains the path itself, an
/// ancestor of it (entry `nested` admits `nested.three`), or a descendant
/// of it (supplying the `nested` subtree is admitted when `nested.three`
/// is whitelisted - the subtree's leaves are checked individually anyway).
pub fn path_admitted(whitelist: &[String], path: &str) -> bool {
    whitelist.iter().any(|entry| {
        entry == path
            || path.starts_with(&format!("{entry}."))
            || entry.starts_with(&format!("{path}."))
    })
}

/// Read the value at a dotted path, descending through mappings.
pub fn value_at(value: &Value, path: &str) -> Option<Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current.clone())
}

/// Write `new_value` at a dotted path, creating intermediate mappings.
pub fn set_at(target: &mut Value, path: &str, new_value: Value) {
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    let mut current = target;
    let segments: Vec<&str> = path.split('.').collect();
    for segment in &segments[..segments.len() - 1] {
        let map = current.as_object_mut().expect("intermediate node is a mapping");
        current = map.entry(segment.to_string()).or_insert_with(|| Value::Object(Map::new()));
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
    }
    let map = current.as_object_mut().expect("intermediate node is a mapping");
    map.insert(segments[segments.len() - 1].to_string(), new_value);
}

/// Validate every supplied property of a job against the union of its
/// providers' whitelists.
///
/// Run once per job so each offending property produces exactly one
/// [`ResolveError::UndeclaredProperty`], no matter how many providers the
/// job declares. Jobs with no providers are skipped - their properties are
/// plain job configuration, not link properties.
pub fn check_supplied(
    properties: &Value,
    whitelists: &[&[String]],
    job: &str,
    diagnostics: &Diagnostics,
) {
    if whitelists.is_empty() {
        return;
    }
    for path in leaf_paths(properties) {
        let admitted = whitelists.iter().any(|whitelist| path_admitted(whitelist, &path));
        if !admitted {
            diagnostics.error(ResolveError::UndeclaredProperty {
                property: path,
                job: job.to_string(),
            });
        }
    }
}

/// Resolve one provider's property bag from spec defaults and the owning
/// job's manifest properties.
///
/// Whitelist violations are reported by [`check_supplied`] upfront; here
/// the whitelist only *selects* which manifest paths are relevant to this
/// provider.
pub fn resolve(whitelist: &[String], defaults: &Value, job_properties: &Value) -> Value {
    let mut bag = if defaults.is_object() {
        defaults.clone()
    } else {
        Value::Object(Map::new())
    };
    for path in leaf_paths(job_properties) {
        if path_admitted(whitelist, &path)
            && let Some(value) = value_at(job_properties, &path)
        {
            set_at(&mut bag, &path, value);
        }
    }
    bag
}

/// Apply manifest `provides`-block overrides on top of a resolved bag.
///
/// Override paths are checked against this provider's own whitelist;
/// violations are fatal findings.
pub fn apply_overrides(
    bag: &mut Value,
    overrides: &Value,
    whitelist: &[String],
    job: &str,
    diagnostics: &Diagnostics,
) {
    for path in leaf_paths(overrides) {
        if !path_admitted(whitelist, &path) {
            diagnostics.error(ResolveError::UndeclaredProperty {
                property: path,
                job: job.to_string(),
            });
        }
    }
    deep_merge(bag, overrides);
}
