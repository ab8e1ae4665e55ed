//! Per-view pipelines: the order in which the dashboard applies filters and
//! transforms for the map, alerts and gallery views.

use serde::Serialize;

use crate::alert::{prepare_alerts_data, prepare_alerts_statistics};
use crate::analysis::prepare_map_statistics;
use crate::config::ViewConfig;
use crate::filter::{
    filter_data_by_extension, filter_geo_data, filter_out_unwanted_values, filter_unwanted_keys,
};
use crate::geojson::transform_to_geojson;
use crate::logging::{self, Component};
use crate::model::{
    AlertsMetadata, AlertsStatistics, ColumnEntry, DataEntry, FeatureCollection, MapStatistics,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    pub geojson: FeatureCollection,
    pub statistics: MapStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsView {
    pub statistics: AlertsStatistics,
    pub most_recent_alerts: FeatureCollection,
    pub previous_alerts: FeatureCollection,
}

/// Column and value filters shared by every view.
fn narrow(
    data: &[DataEntry],
    columns: Option<&[ColumnEntry]>,
    config: &ViewConfig,
) -> Vec<DataEntry> {
    let filters = &config.filters;
    let keyed = filter_unwanted_keys(
        data,
        columns,
        filters.unwanted_columns.as_deref(),
        filters.unwanted_substrings.as_deref(),
    );
    filter_out_unwanted_values(
        &keyed,
        filters.filter_column.as_deref(),
        filters.filter_out_values.as_deref(),
    )
}

/// Narrows a generic layer to displayable rows with valid geometry and
/// converts it to GeoJSON.
pub fn prepare_map_view(
    data: &[DataEntry],
    columns: Option<&[ColumnEntry]>,
    config: &ViewConfig,
) -> MapView {
    let located = filter_geo_data(&narrow(data, columns, config));
    let view = MapView {
        statistics: prepare_map_statistics(&located),
        geojson: transform_to_geojson(&located),
    };
    logging::info(
        Component::View,
        None,
        &format!("map view: {} features", view.statistics.total_features),
    );
    view
}

/// Statistics over the whole page of alerts plus both display cohorts as
/// GeoJSON.
///
/// `metadata` overrides the catalog from the config when given.
pub fn prepare_alerts_view(
    data: &[DataEntry],
    metadata: Option<&[AlertsMetadata]>,
    config: &ViewConfig,
) -> AlertsView {
    let statistics = prepare_alerts_statistics(data, metadata.or_else(|| config.metadata()));
    let cohorts = prepare_alerts_data(data, config.alerts.image_base_url.as_deref());
    logging::info(
        Component::View,
        None,
        &format!(
            "alerts view: {} most recent, {} previous",
            cohorts.most_recent_alerts.len(),
            cohorts.previous_alerts.len()
        ),
    );

    AlertsView {
        statistics,
        most_recent_alerts: transform_to_geojson(&cohorts.most_recent_alerts),
        previous_alerts: transform_to_geojson(&cohorts.previous_alerts),
    }
}

/// Rows that carry at least one media attachment.
pub fn prepare_gallery_view(
    data: &[DataEntry],
    columns: Option<&[ColumnEntry]>,
    config: &ViewConfig,
) -> Vec<DataEntry> {
    filter_data_by_extension(&narrow(data, columns, config), &config.media)
}
