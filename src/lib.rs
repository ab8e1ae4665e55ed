//! Data-processing core of the territory map and alerts dashboard.
//!
//! Records arrive already fetched, as loosely typed JSON objects. The
//! filtering functions narrow their columns and rows; the transforms shape
//! them into GeoJSON, alert cohorts, and summary statistics for the response
//! layer. Everything here is synchronous and pure apart from diagnostics.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod filter;
pub mod format;
pub mod geojson;
pub mod geometry;
pub mod logging;
pub mod model;
pub mod views;

pub use alert::{prepare_alerts_data, prepare_alerts_statistics};
pub use analysis::prepare_map_statistics;
pub use config::{ConfigError, ViewConfig};
pub use filter::{
    filter_data_by_extension, filter_geo_data, filter_geo_json, filter_out_unwanted_values,
    filter_unwanted_keys,
};
pub use format::{capitalize_first_letter, format_date, get_random_color};
pub use geojson::transform_to_geojson;
pub use geometry::{
    calculate_centroid, has_valid_coordinates, is_valid_coordinate, is_valid_geolocation,
    parse_coordinates,
};
pub use model::{
    AlertCohorts, AlertsMetadata, AlertsStatistics, AllowedFileExtensions, ColumnEntry,
    CoordinateError, DataEntry, Feature, FeatureCollection, MapStatistics,
};
pub use views::{prepare_alerts_view, prepare_gallery_view, prepare_map_view};
