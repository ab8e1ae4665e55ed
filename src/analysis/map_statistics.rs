//! Feature count and date range for a generic map layer.
//!
//! The date range is best-effort: candidate values are sorted as strings, so
//! the range is only meaningful when a layer stores dates in a single
//! lexically sortable format such as ISO 8601.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::model::{DataEntry, MapStatistics};

/// Column name fragments that suggest a date or timestamp.
pub const DATE_COLUMN_HINTS: &[&str] = &["date", "time", "created", "modified", "updated"];

fn is_date_column(name: &str) -> bool {
    let name = name.to_lowercase();
    DATE_COLUMN_HINTS.iter().any(|hint| name.contains(hint))
}

/// A digit followed by a date separator, or a bare four-digit year.
pub const DATE_VALUE_PATTERN: &str = r"\d[-/.]|^\d{4}$";

static DATE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DATE_VALUE_PATTERN).expect("date value pattern compiles"));

/// Loose date test over the trimmed value.
pub fn looks_like_date(value: &str) -> bool {
    DATE_VALUE.is_match(value.trim())
}

pub fn prepare_map_statistics(data: &[DataEntry]) -> MapStatistics {
    let mut dates: Vec<&str> = data
        .iter()
        .flat_map(|entry| entry.iter())
        .filter(|(key, _)| is_date_column(key))
        .filter_map(|(_, value)| match value {
            Value::String(s) if looks_like_date(s) => Some(s.as_str()),
            _ => None,
        })
        .collect();
    dates.sort_unstable();

    let date_range = match (dates.first(), dates.last()) {
        (Some(first), Some(last)) if first == last => Some(first.to_string()),
        (Some(first), Some(last)) => Some(format!("{} to {}", first, last)),
        _ => None,
    };

    MapStatistics {
        total_features: data.len(),
        date_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<DataEntry> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_looks_like_date() {
        assert!(looks_like_date("2023-04-01"));
        assert!(looks_like_date("4/1/2023"));
        assert!(looks_like_date("01.04.2023"));
        assert!(looks_like_date("2023"));
        assert!(!looks_like_date("yesterday"));
        assert!(!looks_like_date("12345"));
    }

    #[test]
    fn test_looks_like_date_trims_before_matching() {
        assert!(looks_like_date("  2023 "));
        assert!(!looks_like_date(" 20234 "));
    }

    #[test]
    fn test_range_from_date_like_columns() {
        let data = rows(json!([
            { "created_at": "2023-04-01T10:00:00Z", "name": "2099-01-01" },
            { "Survey_Date": "2022-11-30", "name": "camp" },
            { "updated": "pending", "count": 3 }
        ]));
        let stats = prepare_map_statistics(&data);
        assert_eq!(stats.total_features, 3);
        assert_eq!(
            stats.date_range.as_deref(),
            Some("2022-11-30 to 2023-04-01T10:00:00Z")
        );
    }

    #[test]
    fn test_single_date_is_not_repeated() {
        let data = rows(json!([{ "date": "2023-04-01" }]));
        assert_eq!(
            prepare_map_statistics(&data).date_range.as_deref(),
            Some("2023-04-01")
        );
    }

    #[test]
    fn test_no_dates_gives_no_range() {
        let data = rows(json!([{ "name": "a" }]));
        let stats = prepare_map_statistics(&data);
        assert_eq!(stats.total_features, 1);
        assert_eq!(stats.date_range, None);
    }

    #[test]
    fn test_sort_is_lexical() {
        // Mixed formats sort as text, not as dates.
        let data = rows(json!([
            { "date": "12/31/2020" },
            { "date": "2021-01-01" }
        ]));
        assert_eq!(
            prepare_map_statistics(&data).date_range.as_deref(),
            Some("12/31/2020 to 2021-01-01")
        );
    }
}
