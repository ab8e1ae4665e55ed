//! Coordinate parsing and validation.
//!
//! Every geometry-touching function in the crate decodes coordinates through
//! [`decode_coordinates`] (directly, or via [`parse_coordinates`] and
//! [`geometry_coordinates`]), so malformed input is reported the same way
//! everywhere: as a [`CoordinateError`] that is logged and turned into
//! `false` or an empty result.

use serde_json::Value;

use crate::logging;
use crate::model::{CoordinateError, DataEntry, FIELD_GEOMETRY_COORDINATES};

/// Longitude bound, applied to both axes.
pub const COORDINATE_LIMIT: f64 = 180.0;

/// Decodes raw coordinate text into a JSON value.
///
/// Text starting with `[` is parsed as JSON; anything else is treated as a
/// comma-separated list of numbers and returned as a flat array.
pub fn decode_coordinates(raw: &Value) -> Result<Value, CoordinateError> {
    match raw {
        Value::Null => Err(CoordinateError::Missing),
        Value::Array(items) if items.is_empty() => Err(CoordinateError::Empty),
        Value::Array(_) => Ok(raw.clone()),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(CoordinateError::Empty);
            }
            if text.starts_with('[') {
                return serde_json::from_str(text)
                    .map_err(|e| CoordinateError::InvalidJson(e.to_string()));
            }
            text.split(',')
                .map(|part| {
                    let part = part.trim();
                    part.parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map(Value::Number)
                        .ok_or_else(|| CoordinateError::NonNumeric(part.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        other => Err(CoordinateError::Unsupported(other.to_string())),
    }
}

/// Parses a coordinates value into a flat list of numbers.
///
/// Nested arrays (rings, polygons) are flattened depth-first, so the result of
/// a well-formed geometry is an alternating `lng, lat, lng, lat, ...` list.
pub fn parse_coordinates(raw: &Value) -> Result<Vec<f64>, CoordinateError> {
    let decoded = decode_coordinates(raw)?;
    let mut flat = Vec::new();
    flatten_into(&decoded, &mut flat)?;
    if flat.is_empty() {
        return Err(CoordinateError::Empty);
    }
    Ok(flat)
}

fn flatten_into(value: &Value, out: &mut Vec<f64>) -> Result<(), CoordinateError> {
    match value {
        Value::Array(items) => items.iter().try_for_each(|item| flatten_into(item, out)),
        Value::Number(n) => {
            let n = n
                .as_f64()
                .ok_or_else(|| CoordinateError::NonNumeric(n.to_string()))?;
            out.push(n);
            Ok(())
        }
        other => Err(CoordinateError::NonNumeric(other.to_string())),
    }
}

/// True iff `n` is finite and within `[-180, 180]`.
pub fn is_valid_coordinate(n: f64) -> bool {
    n.is_finite() && (-COORDINATE_LIMIT..=COORDINATE_LIMIT).contains(&n)
}

/// Checks the first column whose name contains "coordinates".
///
/// Returns `true` iff that column parses to an even-length list of valid
/// coordinates. Records without such a column, or whose value cannot be
/// parsed, yield `false`.
pub fn has_valid_coordinates(entry: &DataEntry) -> bool {
    let Some((key, raw)) = entry
        .iter()
        .find(|(key, _)| key.to_lowercase().contains("coordinates"))
    else {
        return false;
    };

    match parse_coordinates(raw) {
        Ok(coords) => coords.len() % 2 == 0 && coords.iter().all(|&n| is_valid_coordinate(n)),
        Err(err) => {
            logging::log_geometry_failure(record_id(entry).as_deref(), key, &err);
            false
        }
    }
}

/// Decodes the record's `g__coordinates` column, keeping its nesting.
///
/// Failures are logged as geometry failures before being returned.
pub fn geometry_coordinates(entry: &DataEntry) -> Result<Value, CoordinateError> {
    let raw = entry.get(FIELD_GEOMETRY_COORDINATES).unwrap_or(&Value::Null);
    decode_coordinates(raw).inspect_err(|err| {
        logging::log_geometry_failure(record_id(entry).as_deref(), FIELD_GEOMETRY_COORDINATES, err)
    })
}

/// Best-effort identifier for diagnostics.
pub(crate) fn record_id(entry: &DataEntry) -> Option<String> {
    ["alert_id", "alertID", "id", "_id"]
        .iter()
        .find_map(|key| entry.get(*key))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> DataEntry {
        json!({ "g__coordinates": value }).as_object().unwrap().clone()
    }

    #[test]
    fn test_parse_json_pair() {
        let coords = parse_coordinates(&json!("[12.5,-8.3]")).unwrap();
        assert_eq!(coords, vec![12.5, -8.3]);
    }

    #[test]
    fn test_parse_comma_separated_text() {
        let coords = parse_coordinates(&json!(" 12.5, -8.3 ")).unwrap();
        assert_eq!(coords, vec![12.5, -8.3]);
    }

    #[test]
    fn test_parse_flattens_polygon_rings() {
        let coords = parse_coordinates(&json!([[[0, 0], [1, 0], [1, 1], [0, 0]]])).unwrap();
        assert_eq!(coords.len(), 8);
    }

    #[test]
    fn test_parse_rejects_missing_and_empty() {
        assert_eq!(parse_coordinates(&Value::Null), Err(CoordinateError::Missing));
        assert_eq!(parse_coordinates(&json!("  ")), Err(CoordinateError::Empty));
        assert_eq!(parse_coordinates(&json!([])), Err(CoordinateError::Empty));
        assert_eq!(parse_coordinates(&json!("[[]]")), Err(CoordinateError::Empty));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_coordinates(&json!("[12.5,")),
            Err(CoordinateError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_coordinates(&json!("12.5,north")),
            Err(CoordinateError::NonNumeric(_))
        ));
        assert!(matches!(
            parse_coordinates(&json!(["a", 1])),
            Err(CoordinateError::NonNumeric(_))
        ));
        assert!(matches!(
            parse_coordinates(&json!(true)),
            Err(CoordinateError::Unsupported(_))
        ));
    }

    #[test]
    fn test_is_valid_coordinate_bounds() {
        assert!(is_valid_coordinate(180.0));
        assert!(is_valid_coordinate(-180.0));
        assert!(!is_valid_coordinate(180.0001));
        assert!(!is_valid_coordinate(f64::NAN));
        assert!(!is_valid_coordinate(f64::INFINITY));
    }

    #[test]
    fn test_has_valid_coordinates_scenarios() {
        assert!(has_valid_coordinates(&entry(json!("[12.5,-8.3]"))));
        assert!(!has_valid_coordinates(&entry(json!("[200,-8.3]"))));
    }

    #[test]
    fn test_has_valid_coordinates_requires_even_length() {
        assert!(!has_valid_coordinates(&entry(json!("[12.5,-8.3,4.0]"))));
    }

    #[test]
    fn test_has_valid_coordinates_key_match_is_case_insensitive() {
        let record = json!({ "Geo_Coordinates": "1,2" }).as_object().unwrap().clone();
        assert!(has_valid_coordinates(&record));
    }

    #[test]
    fn test_has_valid_coordinates_without_column_is_false() {
        let record = json!({ "name": "no geometry" }).as_object().unwrap().clone();
        assert!(!has_valid_coordinates(&record));
    }

    #[test]
    fn test_has_valid_coordinates_uses_first_column_in_record_order() {
        // Alphabetically "Coordinates_source" sorts first; in the record it
        // comes second and must not be the one checked.
        let record: DataEntry =
            serde_json::from_str(r#"{"g__coordinates":"[12.5,-8.3]","Coordinates_source":"gps"}"#)
                .unwrap();
        let names: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["g__coordinates", "Coordinates_source"]);
        assert!(has_valid_coordinates(&record));

        let reversed: DataEntry =
            serde_json::from_str(r#"{"Coordinates_source":"gps","g__coordinates":"[12.5,-8.3]"}"#)
                .unwrap();
        assert!(!has_valid_coordinates(&reversed));
    }

    #[test]
    fn test_geometry_coordinates_keeps_nesting() {
        let record = entry(json!("[[0,0],[1,1]]"));
        assert_eq!(geometry_coordinates(&record), Ok(json!([[0, 0], [1, 1]])));
    }

    #[test]
    fn test_geometry_coordinates_reports_malformed_text() {
        let err = geometry_coordinates(&entry(json!("[12.5,"))).unwrap_err();
        assert!(matches!(err, CoordinateError::InvalidJson(_)));
        assert_eq!(
            logging::classify_geometry_failure(&err),
            logging::FailureType::Unexpected
        );
        let missing = json!({ "g__type": "Point" }).as_object().unwrap().clone();
        assert_eq!(geometry_coordinates(&missing), Err(CoordinateError::Missing));
    }

    #[test]
    fn test_has_valid_coordinates_null_is_false() {
        assert!(!has_valid_coordinates(&entry(Value::Null)));
    }
}
