//! Summaries for generic map layers.
//!
//! Alert layers have their own, richer statistics in `alert::statistics`;
//! everything else gets the lightweight figures computed here.
//!
//! Submodules:
//! - `map_statistics` — feature count and best-effort date range.

pub mod map_statistics;

pub use map_statistics::prepare_map_statistics;
