//! Change-detection alert feeds.
//!
//! - `record`     — provider-tagged view over raw alert rows.
//! - `cohorts`    — most-recent vs previous split for the alerts map.
//! - `statistics` — intro panel figures and the twelve-month chart series.

pub mod cohorts;
pub mod record;
pub mod statistics;

pub use cohorts::prepare_alerts_data;
pub use record::{AlertRecord, Provider};
pub use statistics::{prepare_alerts_statistics, prepare_alerts_statistics_at};
