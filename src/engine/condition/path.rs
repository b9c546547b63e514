// SPDX-License-Identifier: MIT

//! Dot-notation property lookup

use serde_json::Value;

/// Resolve a dot path (e.g. `metadata.customerTier`) against a record
///
/// Objects are entered by key and arrays by decimal index. Returns `None` as
/// soon as a segment is missing or the current value is not a container.
pub fn get_nested_property<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(record, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}
