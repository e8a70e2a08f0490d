//! Helpers for the flat key-map representation.
//!
//! Nested payloads are flattened to `/`-joined key paths. Insertion order
//! is preserved end to end (serde_json is built with `preserve_order`).

use indexmap::IndexMap;
use serde_json::{Map, Value};

pub const KEY_DELIMITER: char = '/';

/// Flatten a nested value into a single-level ordered map.
/// Scalars and empty containers become leaves.
pub fn flatten(value: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    walk(value, String::new(), &mut out);
    out
}

fn walk(value: &Value, prefix: String, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                walk(child, join(&prefix, key), out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                walk(child, join(&prefix, &index.to_string()), out);
            }
        }
        other => {
            out.insert(prefix, other.clone());
        }
    }
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}{KEY_DELIMITER}{segment}")
    }
}

/// Rebuild a nested value from a flat map. All-digit path segments create
/// array positions; anything else creates object keys.
pub fn unflatten(flat: &Map<String, Value>) -> Value {
    let mut root = Value::Null;
    for (key, leaf) in flat {
        let segments: Vec<&str> = key.split(KEY_DELIMITER).collect();
        insert(&mut root, &segments, leaf.clone());
    }
    match root {
        Value::Null => Value::Object(Map::new()),
        other => other,
    }
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn insert(node: &mut Value, segments: &[&str], leaf: Value) {
    let segment = segments[0];

    // Materialize the container this segment needs. A non-index segment
    // aimed at an array rewrites it into an object keyed by index.
    match node {
        Value::Object(_) => {}
        Value::Array(_) if is_index(segment) => {}
        Value::Array(items) => {
            let map: Map<String, Value> = items
                .drain(..)
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect();
            *node = Value::Object(map);
        }
        _ => {
            *node = if is_index(segment) {
                Value::Array(Vec::new())
            } else {
                Value::Object(Map::new())
            };
        }
    }

    let slot: &mut Value = match node {
        Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
        Value::Array(items) => {
            let index: usize = segment.parse().expect("checked by is_index");
            while items.len() <= index {
                items.push(Value::Null);
            }
            &mut items[index]
        }
        _ => unreachable!("node was just materialized as a container"),
    };

    if segments.len() == 1 {
        *slot = leaf;
    } else {
        insert(slot, &segments[1..], leaf);
    }
}

/// Collect the string leaves of a flat object, in order. Non-string
/// leaves (numbers, booleans, nulls) are not translatable content.
pub fn string_entries(flat: &Value) -> IndexMap<String, String> {
    let mut out = IndexMap::new();
    if let Value::Object(map) = flat {
        for (key, value) in map {
            if let Value::String(s) = value {
                out.insert(key.clone(), s.clone());
            }
        }
    }
    out
}

/// Overlay string values onto a flat object, keeping every non-string
/// leaf and the original key order. Keys absent from the object are
/// appended in overlay order.
pub fn overlay_strings(flat: &Value, overlay: &IndexMap<String, String>) -> Value {
    let mut map = match flat {
        Value::Object(m) => m.clone(),
        _ => Map::new(),
    };
    for (key, value) in overlay {
        map.insert(key.clone(), Value::String(value.clone()));
    }
    Value::Object(map)
}
