//! Row and column filters applied before any view-specific transform.
//!
//! All filters are pure: they return new entries and leave the input alone.

use std::collections::HashSet;

use serde_json::Value;

use crate::geometry::has_valid_coordinates;
use crate::logging::{self, Component};
use crate::model::{AllowedFileExtensions, ColumnEntry, DataEntry};

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

fn split_csv(csv: Option<&str>) -> Vec<String> {
    csv.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Strips unwanted columns from every entry.
///
/// A column is unwanted if its name is listed in `unwanted_columns` or
/// contains any of `unwanted_substrings` (both comma-separated).
///
/// With a column catalog, the decision is made on each column's original
/// name and applied to its storage name, and the catalog's storage names
/// are the key universe. Without one, the keys of the first row are the
/// universe. Output rows only carry surviving universe keys.
pub fn filter_unwanted_keys(
    data: &[DataEntry],
    columns: Option<&[ColumnEntry]>,
    unwanted_columns: Option<&str>,
    unwanted_substrings: Option<&str>,
) -> Vec<DataEntry> {
    let unwanted: HashSet<String> = split_csv(unwanted_columns).into_iter().collect();
    let substrings = split_csv(unwanted_substrings);
    let is_unwanted = |name: &str| {
        unwanted.contains(name) || substrings.iter().any(|s| name.contains(s.as_str()))
    };

    let allowed: HashSet<&str> = match columns {
        Some(catalog) if !catalog.is_empty() => catalog
            .iter()
            .filter(|c| !is_unwanted(c.original_column.as_str()))
            .map(|c| c.sql_column.as_str())
            .collect(),
        _ => match data.first() {
            Some(first) => first
                .keys()
                .map(String::as_str)
                .filter(|key| !is_unwanted(*key))
                .collect(),
            None => {
                logging::debug(
                    Component::Filter,
                    None,
                    "no rows and no column catalog; nothing to filter",
                );
                return Vec::new();
            }
        },
    };

    data.iter()
        .map(|entry| {
            entry
                .iter()
                .filter(|(key, _)| allowed.contains(key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// Renders a scalar the way it would appear in a filter list.
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Drops entries whose `column` value exactly matches one of `values`
/// (comma-separated, not trimmed).
///
/// Does nothing if either argument is missing.
pub fn filter_out_unwanted_values(
    data: &[DataEntry],
    column: Option<&str>,
    values: Option<&str>,
) -> Vec<DataEntry> {
    let (Some(column), Some(values)) = (column, values) else {
        return data.to_vec();
    };
    let blocked: HashSet<&str> = values.split(',').collect();

    let kept: Vec<DataEntry> = data
        .iter()
        .filter(|entry| {
            !entry
                .get(column)
                .and_then(value_text)
                .is_some_and(|text| blocked.contains(text.as_str()))
        })
        .cloned()
        .collect();

    logging::log_batch_summary(Component::Filter, "value filter", data.len(), kept.len());
    kept
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Keeps entries whose coordinates are present and valid.
pub fn filter_geo_data(data: &[DataEntry]) -> Vec<DataEntry> {
    let kept: Vec<DataEntry> = data
        .iter()
        .filter(|entry| has_valid_coordinates(entry))
        .cloned()
        .collect();

    logging::log_batch_summary(Component::Filter, "geo filter", data.len(), kept.len());
    kept
}

/// [`filter_geo_data`] over an undecoded query result.
///
/// Anything other than an array of objects is logged and yields no rows.
pub fn filter_geo_json(data: &Value) -> Vec<DataEntry> {
    let Some(rows) = data.as_array() else {
        logging::error(
            Component::Filter,
            None,
            &format!("geo filter expected an array of records, got {}", type_name(data)),
        );
        return Vec::new();
    };

    let entries: Vec<DataEntry> = rows
        .iter()
        .filter_map(|row| row.as_object().cloned())
        .collect();
    if entries.len() != rows.len() {
        logging::warn(
            Component::Filter,
            None,
            &format!("skipped {} non-object rows", rows.len() - entries.len()),
        );
    }
    filter_geo_data(&entries)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// Keeps entries with at least one string field mentioning an allowed file
/// extension.
///
/// Matching is a case-insensitive substring test, so `"photo.JPG?dl=1"`
/// matches `"jpg"`.
pub fn filter_data_by_extension(
    data: &[DataEntry],
    extensions: &AllowedFileExtensions,
) -> Vec<DataEntry> {
    let wanted: Vec<String> = extensions.all().map(str::to_lowercase).collect();

    let kept: Vec<DataEntry> = data
        .iter()
        .filter(|entry| {
            entry.values().filter_map(Value::as_str).any(|field| {
                let field = field.to_lowercase();
                wanted.iter().any(|ext| field.contains(ext.as_str()))
            })
        })
        .cloned()
        .collect();

    logging::log_batch_summary(Component::Filter, "extension filter", data.len(), kept.len());
    kept
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
