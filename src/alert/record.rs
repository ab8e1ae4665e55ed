//! Typed view over a raw alert row.
//!
//! Alert feeds come from two provider families with different schemas:
//! Global Forest Watch rows carry a detection window (`date_start_t1`,
//! `date_end_t1`) and no per-record area, while proprietary rows carry
//! detection year/month, hectares and satellite imagery references. The
//! family is decided once, here, from `data_source`; everything downstream
//! matches on [`AlertRecord`] instead of re-inspecting strings.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::filter::value_text;
use crate::format::{capitalize_first_letter, format_date};
use crate::geometry::calculate_centroid;
use crate::model::{
    DataEntry, FIELD_ALERT_ID, FIELD_GEOMETRY_COORDINATES, GEOMETRY_PREFIX, GFW_SOURCE, YearMonth,
};

// ---------------------------------------------------------------------------
// Satellites
// ---------------------------------------------------------------------------

/// Full names for the satellite prefixes used in proprietary alert rows.
pub static SATELLITE_NAMES: &[(&str, &str)] = &[
    ("S1", "Sentinel-1"),
    ("S2", "Sentinel-2"),
    ("L5", "Landsat 5"),
    ("L7", "Landsat 7"),
    ("L8", "Landsat 8"),
    ("L9", "Landsat 9"),
    ("PS", "PlanetScope"),
    ("SP", "SPOT"),
    ("WV", "WorldView"),
];

/// Looks up a satellite prefix; unknown prefixes are returned as given.
pub fn satellite_name(prefix: &str) -> String {
    SATELLITE_NAMES
        .iter()
        .find(|(p, _)| p.eq_ignore_ascii_case(prefix))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| prefix.to_string())
}

// ---------------------------------------------------------------------------
// Field access
// ---------------------------------------------------------------------------

pub(crate) fn text(entry: &DataEntry, key: &str) -> Option<String> {
    entry.get(key).and_then(value_text).filter(|s| !s.is_empty())
}

fn number(entry: &DataEntry, key: &str) -> Option<f64> {
    match entry.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parses the date part of `YYYY-MM-DD[...]` text.
pub(crate) fn parse_day(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn detected_year_month(entry: &DataEntry) -> Option<YearMonth> {
    let year = number(entry, "year_detec")?;
    let month = number(entry, "month_detec")?;
    YearMonth::new(year as i32, month as u32)
}

/// Underscores become spaces and every word is capitalized.
pub fn normalize_alert_type(raw: &str) -> String {
    capitalize_first_letter(&raw.replace('_', " "))
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    GlobalForestWatch,
    Proprietary,
}

impl Provider {
    pub fn of(entry: &DataEntry) -> Self {
        match text(entry, "data_source") {
            Some(source) if source.contains(GFW_SOURCE) => Provider::GlobalForestWatch,
            _ => Provider::Proprietary,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GfwAlert<'a> {
    pub entry: &'a DataEntry,
    pub date_end: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct ProprietaryAlert<'a> {
    pub entry: &'a DataEntry,
    pub detected: Option<YearMonth>,
}

#[derive(Debug, Clone)]
pub enum AlertRecord<'a> {
    Gfw(GfwAlert<'a>),
    Proprietary(ProprietaryAlert<'a>),
}

impl<'a> AlertRecord<'a> {
    pub fn from_entry(entry: &'a DataEntry) -> Self {
        match Provider::of(entry) {
            Provider::GlobalForestWatch => AlertRecord::Gfw(GfwAlert {
                entry,
                date_end: text(entry, "date_end_t1").as_deref().and_then(parse_day),
            }),
            Provider::Proprietary => AlertRecord::Proprietary(ProprietaryAlert {
                entry,
                detected: detected_year_month(entry),
            }),
        }
    }

    pub fn entry(&self) -> &'a DataEntry {
        match self {
            AlertRecord::Gfw(a) => a.entry,
            AlertRecord::Proprietary(a) => a.entry,
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            AlertRecord::Gfw(_) => Provider::GlobalForestWatch,
            AlertRecord::Proprietary(_) => Provider::Proprietary,
        }
    }

    /// Month the alert was detected in.
    ///
    /// GFW alerts are dated by the end of their detection window, falling
    /// back to the detection year/month columns when the window is absent.
    pub fn detection_month(&self) -> Option<YearMonth> {
        match self {
            AlertRecord::Gfw(a) => a
                .date_end
                .map(YearMonth::from_date)
                .or_else(|| detected_year_month(a.entry)),
            AlertRecord::Proprietary(a) => a.detected,
        }
    }

    /// Area in hectares; missing or unparseable values count as zero.
    pub fn hectares(&self) -> f64 {
        number(self.entry(), "area_alert_ha")
            .filter(|n| n.is_finite())
            .unwrap_or(0.0)
    }

    pub fn alert_type(&self) -> Option<String> {
        text(self.entry(), "alert_type").map(|t| normalize_alert_type(&t))
    }

    pub fn data_provider(&self) -> Option<String> {
        text(self.entry(), "data_source").map(|s| capitalize_first_letter(&s))
    }

    /// Display-shaped copy of the record for the alerts table and map popups.
    pub fn to_display(&self, image_base_url: Option<&str>) -> DataEntry {
        let entry = self.entry();
        let mut out = Map::new();

        put(&mut out, FIELD_ALERT_ID, entry.get("alert_id").cloned());
        let territory = text(entry, "territory_name").map(|t| capitalize_first_letter(&t));
        put_text(&mut out, "territory", territory);
        put_text(&mut out, "alertType", self.alert_type());
        put_text(&mut out, "dataProvider", self.data_provider());
        put(&mut out, "confidenceLevel", entry.get("confidence").cloned());
        let earliest = text(entry, "date_start_t1").map(|d| format_date(&d));
        let latest = text(entry, "date_end_t1").map(|d| format_date(&d));
        put_text(&mut out, "alertDetectedEarliest", earliest);
        put_text(&mut out, "alertDetectedLatest", latest);

        if let Some(month) = self.detection_month() {
            put_text(&mut out, "monthDetected", Some(month.to_string()));
            put_text(&mut out, "yearDetected", Some(month.year.to_string()));
        }

        if let Some(raw) = entry.get(FIELD_GEOMETRY_COORDINATES) {
            let coords = match raw {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            put_text(&mut out, "geographicCentroid", Some(calculate_centroid(&coords)));
        }

        if let AlertRecord::Proprietary(alert) = self {
            alert.add_details(&mut out, image_base_url);
        }

        for (key, value) in entry.iter().filter(|(k, _)| k.starts_with(GEOMETRY_PREFIX)) {
            out.insert(key.clone(), value.clone());
        }

        out
    }
}

impl ProprietaryAlert<'_> {
    fn add_details(&self, out: &mut DataEntry, image_base_url: Option<&str>) {
        let entry = self.entry;

        put_text(
            out,
            "alertAreaHectares",
            number(entry, "area_alert_ha").map(|ha| format!("{:.2}", ha)),
        );
        put_text(
            out,
            "satelliteUsedForDetection",
            text(entry, "sat_detect_prefix").map(|p| satellite_name(&p)),
        );

        let (Some(base), Some(month)) = (image_base_url, self.detected) else {
            return;
        };
        let (Some(territory), Some(alert_id), Some(viz)) = (
            text(entry, "territory_name"),
            text(entry, "alert_id"),
            text(entry, "sat_viz_prefix"),
        ) else {
            return;
        };

        let folder = format!(
            "{}/{}/{}/{:02}/{}/images",
            base.trim_end_matches('/'),
            territory,
            month.year,
            month.month,
            alert_id
        );
        put_text(out, "t0_url", Some(format!("{}/{}_T0_{}.jpg", folder, viz, alert_id)));
        put_text(out, "t1_url", Some(format!("{}/{}_T1_{}.jpg", folder, viz, alert_id)));
    }
}

fn put(out: &mut DataEntry, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        out.insert(key.to_string(), value);
    }
}

fn put_text(out: &mut DataEntry, key: &str, value: Option<String>) {
    put(out, key, value.map(Value::String));
}
