//! Core data types for the map and alerts dashboard core.
//!
//! This module defines the shared domain model imported by all other modules.
//! It contains no transformation logic and no I/O: only record shapes, the
//! GeoJSON output types, the derived statistics read-models, and the error
//! types raised while parsing geometry.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

/// Prefix marking a column as part of the record's geometry.
pub const GEOMETRY_PREFIX: &str = "g__";

/// Geometry type column, e.g. `"Polygon"`.
pub const FIELD_GEOMETRY_TYPE: &str = "g__type";

/// Geometry coordinates column, JSON text or an already decoded array.
pub const FIELD_GEOMETRY_COORDINATES: &str = "g__coordinates";

/// Key carrying the alert identifier on display-shaped alert records.
pub const FIELD_ALERT_ID: &str = "alertID";

/// `data_source` marker for Global Forest Watch alert rows.
pub const GFW_SOURCE: &str = "Global Forest Watch";

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// A single raw record as handed over by the query layer.
///
/// Values are heterogeneous: strings, numbers, nulls and (for coordinates)
/// nested arrays all occur in the wild.
pub type DataEntry = Map<String, Value>;

/// Mapping between the human-facing column name and its storage name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnEntry {
    pub original_column: String,
    pub sql_column: String,
}

/// Extension substrings that mark a record as carrying media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedFileExtensions {
    #[serde(default)]
    pub audio: Vec<String>,
    #[serde(default)]
    pub image: Vec<String>,
    #[serde(default)]
    pub video: Vec<String>,
}

impl AllowedFileExtensions {
    /// All configured extensions, regardless of category.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.audio
            .iter()
            .chain(self.image.iter())
            .chain(self.video.iter())
            .map(String::as_str)
    }
}

impl Default for AllowedFileExtensions {
    fn default() -> Self {
        let list = |exts: &[&str]| -> Vec<String> { exts.iter().map(|e| e.to_string()).collect() };
        Self {
            audio: list(&["mp3", "ogg", "wav"]),
            image: list(&["jpg", "jpeg", "png", "webp"]),
            video: list(&["mov", "mp4", "avi", "mkv"]),
        }
    }
}

/// One known alert period from the external alerts catalog.
///
/// The catalog covers every period ever published, which is usually broader
/// than the page of alerts currently loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertsMetadata {
    pub year: i32,
    pub month: u32,
    pub data_source: String,
}

// ---------------------------------------------------------------------------
// Year/month
// ---------------------------------------------------------------------------

/// A calendar month, ordered chronologically.
///
/// Rendered as `MM-YYYY`, the label format used throughout the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Returns `None` for months outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The given day of this month. Callers stay within days 1..=28.
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{}", self.month, self.year)
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Geometry kinds accepted by the geolocation validator.
///
/// MultiPoint and GeometryCollection are deliberately absent: the map layers
/// never render them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
}

impl GeometryKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Point" => Some(Self::Point),
            "LineString" => Some(Self::LineString),
            "MultiLineString" => Some(Self::MultiLineString),
            "Polygon" => Some(Self::Polygon),
            "MultiPolygon" => Some(Self::MultiPolygon),
            _ => None,
        }
    }

    /// Number of array levels wrapping the `[lng, lat]` pairs.
    pub fn pair_depth(&self) -> usize {
        match self {
            Self::Point => 0,
            Self::LineString => 1,
            Self::MultiLineString | Self::Polygon => 2,
            Self::MultiPolygon => 3,
        }
    }
}

// ---------------------------------------------------------------------------
// GeoJSON output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureGeometry {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// MurmurHash3 of the record's `alertID`; absent for records without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub geometry: FeatureGeometry,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn empty() -> Self {
        Self {
            kind: "Feature",
            id: None,
            geometry: FeatureGeometry::default(),
            properties: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection",
            features,
        }
    }
}

// ---------------------------------------------------------------------------
// Read-models
// ---------------------------------------------------------------------------

/// Month-keyed values where each entry is the running total from the start of
/// the window through that month, not the month's own delta.
///
/// Serialized as a JSON object whose keys keep chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CumulativeSeries<T> {
    entries: Vec<(YearMonth, T)>,
}

impl<T> CumulativeSeries<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(YearMonth, T)> {
        self.entries.iter()
    }

    pub fn get(&self, month: YearMonth) -> Option<&T> {
        self.entries
            .iter()
            .find(|(m, _)| *m == month)
            .map(|(_, v)| v)
    }

    pub fn months(&self) -> Vec<YearMonth> {
        self.entries.iter().map(|(m, _)| *m).collect()
    }

    pub fn map<U>(self, f: impl Fn(T) -> U) -> CumulativeSeries<U> {
        CumulativeSeries {
            entries: self.entries.into_iter().map(|(m, v)| (m, f(v))).collect(),
        }
    }
}

impl<T: Copy + std::ops::Add<Output = T> + Default> CumulativeSeries<T> {
    /// Folds per-month deltas (in axis order) into running totals.
    pub fn accumulate(deltas: impl IntoIterator<Item = (YearMonth, T)>) -> Self {
        let entries = deltas
            .into_iter()
            .scan(T::default(), |running, (month, delta)| {
                *running = *running + delta;
                Some((month, *running))
            })
            .collect();
        Self { entries }
    }
}

impl<T: Serialize> Serialize for CumulativeSeries<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (month, value) in &self.entries {
            map.serialize_entry(&month.to_string(), value)?;
        }
        map.end()
    }
}

/// Summary of an alerts layer, shaped for the dashboard's intro panel and
/// charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsStatistics {
    pub territory: String,
    pub type_of_alerts: Vec<String>,
    pub data_providers: Vec<String>,
    pub alert_detection_range: String,
    pub all_dates: Vec<String>,
    pub earliest_alerts_date: String,
    pub recent_alerts_date: String,
    pub recent_alerts_number: usize,
    pub alerts_total: usize,
    pub alerts_per_month: CumulativeSeries<u64>,
    pub hectares_total: Option<f64>,
    pub hectares_per_month: Option<CumulativeSeries<f64>>,
    pub twelve_months_before: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStatistics {
    pub total_features: usize,
    pub date_range: Option<String>,
}

/// The two display cohorts produced from a page of alerts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertCohorts {
    pub most_recent_alerts: Vec<DataEntry>,
    pub previous_alerts: Vec<DataEntry>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when reading a coordinates value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// The field is null or absent.
    #[error("coordinates are missing")]
    Missing,
    /// The field is an empty string or an empty array.
    #[error("coordinates are empty")]
    Empty,
    /// Text that looked like JSON could not be decoded.
    #[error("invalid coordinates JSON: {0}")]
    InvalidJson(String),
    /// A scalar in the list is not a number.
    #[error("non-numeric coordinate value: {0}")]
    NonNumeric(String),
    /// The field holds a value of a type that cannot carry coordinates.
    #[error("unsupported coordinates value: {0}")]
    Unsupported(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
