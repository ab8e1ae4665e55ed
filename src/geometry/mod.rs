//! Coordinate and geometry helpers.
//!
//! Submodules:
//! - `coordinates` — the shared coordinate parser and range checks.
//! - `centroid`    — vertex-mean centroids for popups and alert tables.
//! - `geolocation` — structural validation of declared geometry types.

pub mod centroid;
pub mod coordinates;
pub mod geolocation;

pub use centroid::calculate_centroid;
pub use coordinates::{
    geometry_coordinates, has_valid_coordinates, is_valid_coordinate, parse_coordinates,
};
pub use geolocation::is_valid_geolocation;
