//! Structural validation of a record's declared geometry.

use serde_json::Value;

use crate::geometry::coordinates::geometry_coordinates;
use crate::model::{DataEntry, FIELD_GEOMETRY_TYPE, GeometryKind};

/// Returns `true` if the record's `g__type` is a supported kind and its
/// `g__coordinates` nest exactly as that kind requires, with every leaf a
/// `[finite, finite]` pair.
///
/// Coordinates may be JSON text or an already decoded array. Every level
/// must be non-empty. Malformed input is logged and yields `false`.
pub fn is_valid_geolocation(entry: &DataEntry) -> bool {
    let Some(kind) = entry
        .get(FIELD_GEOMETRY_TYPE)
        .and_then(Value::as_str)
        .and_then(GeometryKind::parse)
    else {
        return false;
    };

    match geometry_coordinates(entry) {
        Ok(coordinates) => nests_pairs(&coordinates, kind.pair_depth()),
        Err(_) => false,
    }
}

fn nests_pairs(value: &Value, depth: usize) -> bool {
    let Some(items) = value.as_array() else {
        return false;
    };
    if depth == 0 {
        return is_finite_pair(items);
    }
    !items.is_empty() && items.iter().all(|item| nests_pairs(item, depth - 1))
}

fn is_finite_pair(items: &[Value]) -> bool {
    match items {
        [x, y] => [x, y]
            .iter()
            .all(|v| v.as_f64().is_some_and(f64::is_finite)),
        _ => false,
    }
}
