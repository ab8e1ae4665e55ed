//! Splitting a page of alerts into the "most recent" and "previous" cohorts.
//!
//! Each provider family has its own latest checkpoint. A GFW alert and a
//! proprietary alert can therefore both be "most recent" while belonging to
//! different calendar months; the dashboard shows the families separately.

use crate::alert::record::{AlertRecord, Provider};
use crate::geometry::is_valid_geolocation;
use crate::logging::{self, Component};
use crate::model::{AlertCohorts, DataEntry, YearMonth};

/// Latest detection month seen for each provider family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checkpoints {
    pub gfw: Option<YearMonth>,
    pub proprietary: Option<YearMonth>,
}

impl Checkpoints {
    pub fn from_records(records: &[AlertRecord<'_>]) -> Self {
        let latest = |provider: Provider| {
            records
                .iter()
                .filter(|r| r.provider() == provider)
                .filter_map(AlertRecord::detection_month)
                .max()
        };
        Self {
            gfw: latest(Provider::GlobalForestWatch),
            proprietary: latest(Provider::Proprietary),
        }
    }

    pub fn for_provider(&self, provider: Provider) -> Option<YearMonth> {
        match provider {
            Provider::GlobalForestWatch => self.gfw,
            Provider::Proprietary => self.proprietary,
        }
    }

    pub fn is_most_recent(&self, record: &AlertRecord<'_>) -> bool {
        match (record.detection_month(), self.for_provider(record.provider())) {
            (Some(month), Some(latest)) => month == latest,
            _ => false,
        }
    }
}

/// Shapes alert rows for display and splits them into cohorts.
///
/// Rows without a valid geolocation are dropped. Every remaining row lands in
/// exactly one cohort. `image_base_url` enables the imagery links on
/// proprietary alerts.
pub fn prepare_alerts_data(data: &[DataEntry], image_base_url: Option<&str>) -> AlertCohorts {
    let records: Vec<AlertRecord<'_>> = data
        .iter()
        .filter(|entry| is_valid_geolocation(entry))
        .map(AlertRecord::from_entry)
        .collect();

    logging::log_batch_summary(Component::Alerts, "geolocation check", data.len(), records.len());

    let checkpoints = Checkpoints::from_records(&records);
    let (recent, previous): (Vec<_>, Vec<_>) = records
        .iter()
        .partition(|record| checkpoints.is_most_recent(record));

    let shape = |records: Vec<&AlertRecord<'_>>| -> Vec<DataEntry> {
        records
            .into_iter()
            .map(|record| record.to_display(image_base_url))
            .collect()
    };

    AlertCohorts {
        most_recent_alerts: shape(recent),
        previous_alerts: shape(previous),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn rows(value: Value) -> Vec<DataEntry> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    fn ids(entries: &[DataEntry]) -> Vec<String> {
        entries.iter().map(|e| e["alertID"].to_string()).collect()
    }

    #[test]
    fn test_same_month_gfw_alerts_are_both_recent() {
        let data = rows(json!([
            { "alert_id": "g1", "data_source": "Global Forest Watch", "date_end_t1": "2024-03-02",
              "g__type": "Point", "g__coordinates": "[1,1]" },
            { "alert_id": "g2", "data_source": "Global Forest Watch", "date_end_t1": "2024-03-28",
              "g__type": "Point", "g__coordinates": "[2,2]" },
            { "alert_id": "g3", "data_source": "Global Forest Watch", "date_end_t1": "2024-01-15",
              "g__type": "Point", "g__coordinates": "[3,3]" }
        ]));
        let cohorts = prepare_alerts_data(&data, None);
        assert_eq!(ids(&cohorts.most_recent_alerts), vec!["\"g1\"", "\"g2\""]);
        assert_eq!(ids(&cohorts.previous_alerts), vec!["\"g3\""]);
    }

    #[test]
    fn test_each_family_has_its_own_checkpoint() {
        let data = rows(json!([
            { "alert_id": "p1", "data_source": "terras", "year_detec": 2023, "month_detec": 6,
              "g__type": "Point", "g__coordinates": "[1,1]" },
            { "alert_id": "p2", "data_source": "terras", "year_detec": 2023, "month_detec": 5,
              "g__type": "Point", "g__coordinates": "[1,1]" },
            { "alert_id": "g1", "data_source": "Global Forest Watch", "date_end_t1": "2024-02-10",
              "g__type": "Point", "g__coordinates": "[1,1]" }
        ]));
        let cohorts = prepare_alerts_data(&data, None);
        let mut recent = ids(&cohorts.most_recent_alerts);
        recent.sort();
        assert_eq!(recent, vec!["\"g1\"", "\"p1\""]);
        assert_eq!(ids(&cohorts.previous_alerts), vec!["\"p2\""]);
    }

    #[test]
    fn test_year_boundary_uses_chronological_order() {
        let data = rows(json!([
            { "alert_id": "dec", "data_source": "terras", "year_detec": "2022", "month_detec": "12",
              "g__type": "Point", "g__coordinates": "[1,1]" },
            { "alert_id": "jan", "data_source": "terras", "year_detec": "2023", "month_detec": "1",
              "g__type": "Point", "g__coordinates": "[1,1]" }
        ]));
        let cohorts = prepare_alerts_data(&data, None);
        assert_eq!(ids(&cohorts.most_recent_alerts), vec!["\"jan\""]);
    }

    #[test]
    fn test_invalid_geolocations_are_dropped() {
        let data = rows(json!([
            { "alert_id": "ok", "data_source": "terras", "year_detec": 2023, "month_detec": 6,
              "g__type": "Point", "g__coordinates": "[1,1]" },
            { "alert_id": "bad", "data_source": "terras", "year_detec": 2023, "month_detec": 6,
              "g__type": "MultiPoint", "g__coordinates": "[[1,1]]" }
        ]));
        let cohorts = prepare_alerts_data(&data, None);
        assert_eq!(cohorts.most_recent_alerts.len() + cohorts.previous_alerts.len(), 1);
    }

    #[test]
    fn test_rows_without_month_go_to_previous() {
        let data = rows(json!([
            { "alert_id": "dated", "data_source": "terras", "year_detec": 2023, "month_detec": 6,
              "g__type": "Point", "g__coordinates": "[1,1]" },
            { "alert_id": "undated", "data_source": "terras",
              "g__type": "Point", "g__coordinates": "[1,1]" }
        ]));
        let cohorts = prepare_alerts_data(&data, None);
        assert_eq!(ids(&cohorts.previous_alerts), vec!["\"undated\""]);
    }
}
