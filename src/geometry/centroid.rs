//! Geographic centroid of a geometry's vertices.

use serde_json::Value;

use crate::geometry::coordinates::decode_coordinates;
use crate::logging::{self, Component};

/// Computes the vertex-mean centroid of a coordinates string.
///
/// The nesting depth of the decoded array implies the geometry kind:
///
/// | depth | kind                         | result              |
/// |-------|------------------------------|---------------------|
/// | 0     | Point `[lng, lat]`           | input, unchanged    |
/// | 1     | LineString                   | `"lat, lng"`        |
/// | 2     | Polygon / MultiLineString    | `"lat, lng"`        |
/// | 3     | MultiPolygon                 | `"lat, lng"`        |
///
/// Averages are formatted to 6 decimals. Unparseable text or an unrecognized
/// nesting is logged and yields `""`, which callers must treat as
/// "unavailable".
pub fn calculate_centroid(coords: &str) -> String {
    let decoded = match decode_coordinates(&Value::String(coords.to_string())) {
        Ok(value) => value,
        Err(err) => {
            logging::log_geometry_failure(None, "centroid", &err);
            return String::new();
        }
    };

    match pair_depth(&decoded) {
        Some(0) => coords.to_string(),
        Some(1..=3) => {
            let (mut lng, mut lat, mut count) = (0.0, 0.0, 0usize);
            sum_vertices(&decoded, &mut lng, &mut lat, &mut count);
            if count == 0 {
                logging::error(Component::Geometry, None, "centroid: geometry has no vertices");
                return String::new();
            }
            let n = count as f64;
            format!("{:.6}, {:.6}", lat / n, lng / n)
        }
        _ => {
            logging::error(
                Component::Geometry,
                None,
                &format!("centroid: unrecognized coordinate nesting in {}", coords),
            );
            String::new()
        }
    }
}

/// Levels of arrays wrapping the first numeric pair, or `None` if the value
/// does not bottom out in a pair of numbers.
fn pair_depth(value: &Value) -> Option<usize> {
    let items = value.as_array()?;
    match items.first()? {
        Value::Number(_) => (items.len() == 2 && items[1].is_number()).then_some(0),
        inner @ Value::Array(_) => pair_depth(inner).map(|d| d + 1),
        _ => None,
    }
}

fn sum_vertices(value: &Value, lng: &mut f64, lat: &mut f64, count: &mut usize) {
    let Some(items) = value.as_array() else {
        return;
    };
    if let [Value::Number(x), Value::Number(y)] = items.as_slice() {
        if let (Some(x), Some(y)) = (x.as_f64(), y.as_f64()) {
            *lng += x;
            *lat += y;
            *count += 1;
        }
        return;
    }
    for item in items {
        sum_vertices(item, lng, lat, count);
    }
}
