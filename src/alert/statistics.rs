//! Alert layer statistics: detection range, providers, and a rolling
//! twelve-month series of alert counts and hectares.
//!
//! # Clock injection
//! [`prepare_alerts_statistics_at`] takes `now` explicitly; it only matters
//! when there is nothing to anchor the window to. Tests use it to stay
//! deterministic.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Months, NaiveDate, Utc};

use crate::alert::record::{AlertRecord, Provider, text};
use crate::format::capitalize_first_letter;
use crate::logging::{self, Component};
use crate::model::{AlertsMetadata, AlertsStatistics, CumulativeSeries, DataEntry, YearMonth};

/// Number of months on the chart axis.
pub const WINDOW_MONTHS: u32 = 12;

const NOT_AVAILABLE: &str = "N/A";

/// Statistics for the alerts intro panel, using the current time when the
/// window has nothing else to anchor to.
pub fn prepare_alerts_statistics(
    data: &[DataEntry],
    metadata: Option<&[AlertsMetadata]>,
) -> AlertsStatistics {
    prepare_alerts_statistics_at(data, metadata, Utc::now())
}

/// Walks back from `latest` one month at a time, keeping at most
/// [`WINDOW_MONTHS`] months that are not earlier than `earliest`, and returns
/// them in ascending order.
pub fn month_axis(earliest: NaiveDate, latest: NaiveDate) -> Vec<YearMonth> {
    let first = YearMonth::from_date(earliest);
    let last = YearMonth::from_date(latest);
    let mut axis: Vec<YearMonth> = (0..WINDOW_MONTHS)
        .filter_map(|i| latest.checked_sub_months(Months::new(i)))
        .map(YearMonth::from_date)
        .filter(|m| *m >= first && *m <= last)
        .collect();
    axis.reverse();
    axis
}

fn distinct<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut seen = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

/// See the module docs. Values in `alertsPerMonth` and `hectaresPerMonth`
/// are running totals from the first axis month, not per-month counts.
pub fn prepare_alerts_statistics_at(
    data: &[DataEntry],
    metadata: Option<&[AlertsMetadata]>,
    now: DateTime<Utc>,
) -> AlertsStatistics {
    let records: Vec<AlertRecord<'_>> = data.iter().map(AlertRecord::from_entry).collect();

    let catalog: BTreeSet<YearMonth> = metadata
        .unwrap_or_default()
        .iter()
        .filter_map(|m| YearMonth::new(m.year, m.month))
        .collect();
    let observed: BTreeSet<YearMonth> = records
        .iter()
        .filter_map(AlertRecord::detection_month)
        .collect();

    // The catalog knows about periods beyond the loaded page, so it wins.
    let known = if catalog.is_empty() { &observed } else { &catalog };
    let span = known.first().copied().zip(known.last().copied());

    let window = span.and_then(|(first, last)| first.day(1).zip(last.day(28)));
    let (earliest_date, latest_date) = match window {
        Some(dates) => dates,
        None => {
            if !records.is_empty() {
                logging::warn(
                    Component::Statistics,
                    None,
                    "no alert carries a usable detection month; anchoring to the current month",
                );
            }
            let today = now.date_naive();
            let anchor = YearMonth::from_date(today);
            let start = anchor.day(1).unwrap_or(today);
            (start, anchor.day(28).unwrap_or(today))
        }
    };

    let twelve_months_before = latest_date
        .checked_sub_months(Months::new(WINDOW_MONTHS))
        .map(YearMonth::from_date)
        .map(|m| m.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let axis = month_axis(earliest_date, latest_date);

    let mut per_month: HashMap<YearMonth, (u64, f64)> = HashMap::new();
    for record in &records {
        if let Some(month) = record.detection_month() {
            let slot = per_month.entry(month).or_default();
            slot.0 += 1;
            slot.1 += record.hectares();
        }
    }

    let alerts_per_month = CumulativeSeries::accumulate(
        axis.iter()
            .map(|m| (*m, per_month.get(m).map_or(0, |(count, _)| *count))),
    );

    let gfw_only = !records.is_empty()
        && records.iter().all(|r| r.provider() == Provider::GlobalForestWatch);
    let report_hectares = !records.is_empty() && !gfw_only;

    let hectares_per_month = report_hectares.then(|| {
        CumulativeSeries::accumulate(
            axis.iter()
                .map(|m| (*m, per_month.get(m).map_or(0.0, |(_, ha)| *ha))),
        )
        .map(round2)
    });
    let hectares_total =
        report_hectares.then(|| round2(records.iter().map(AlertRecord::hectares).sum()));

    let recent_month = axis
        .iter()
        .rev()
        .find(|m| per_month.contains_key(*m))
        .copied();
    let recent_alerts_number = recent_month
        .and_then(|m| per_month.get(&m))
        .map_or(0, |(count, _)| *count as usize);

    let mut data_providers = distinct(records.iter().filter_map(AlertRecord::data_provider));
    if data_providers.is_empty() {
        data_providers = distinct(
            metadata
                .unwrap_or_default()
                .iter()
                .map(|m| capitalize_first_letter(&m.data_source)),
        );
    }

    let (alert_detection_range, earliest_alerts_date) = match span {
        Some((first, last)) => (format!("{} to {}", first, last), first.to_string()),
        None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
    };

    AlertsStatistics {
        territory: records
            .first()
            .and_then(|r| text(r.entry(), "territory_name"))
            .map(|t| capitalize_first_letter(&t))
            .unwrap_or_default(),
        type_of_alerts: distinct(records.iter().filter_map(AlertRecord::alert_type)),
        data_providers,
        alert_detection_range,
        all_dates: known.iter().map(ToString::to_string).collect(),
        earliest_alerts_date,
        recent_alerts_date: recent_month
            .map(|m| m.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        recent_alerts_number,
        alerts_total: records.len(),
        alerts_per_month,
        hectares_total,
        hectares_per_month,
        twelve_months_before,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
