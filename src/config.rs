//! View configuration loaded from TOML.
//!
//! One file describes how a dashboard view narrows and decorates its data:
//! which columns and values to hide, which file extensions count as media,
//! where alert imagery lives, and how chatty diagnostics should be. Every
//! section is optional; a missing section means "skip that enrichment".
//!
//! ```toml
//! [filters]
//! unwanted_columns = "uuid,_version"
//! unwanted_substrings = "meta_,__"
//! filter_column = "status"
//! filter_out_values = "draft,deleted"
//!
//! [media]
//! image = ["jpg", "png"]
//!
//! [alerts]
//! image_base_url = "https://files.example.org/alerts"
//!
//! [[alerts.metadata]]
//! year = 2023
//! month = 9
//! data_source = "terras"
//!
//! [logging]
//! level = "warn"
//! file = "/var/log/mapview.log"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::logging::{self, Component, LogLevel};
use crate::model::{AlertsMetadata, AllowedFileExtensions};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub filters: FilterSettings,
    pub media: AllowedFileExtensions,
    pub alerts: AlertSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Comma-separated column names to hide.
    pub unwanted_columns: Option<String>,
    /// Comma-separated substrings; any column containing one is hidden.
    pub unwanted_substrings: Option<String>,
    /// Column inspected by the value filter.
    pub filter_column: Option<String>,
    /// Comma-separated values of `filter_column` whose rows are dropped.
    pub filter_out_values: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    /// Root of the alert imagery bucket; enables `t0_url`/`t1_url`.
    pub image_base_url: Option<String>,
    /// Catalog of published alert periods.
    pub metadata: Vec<AlertsMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Warning,
            file: None,
            timestamps: false,
        }
    }
}

impl ViewConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
            path: path_ref.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        logging::debug(
            Component::Config,
            None,
            &format!("loaded view config from {}", path_ref.display()),
        );
        Ok(config)
    }

    /// Installs the global logger described by the `[logging]` section.
    pub fn init_logging(&self) {
        logging::init_logger(
            self.logging.level,
            self.logging.file.as_deref(),
            self.logging.timestamps,
        );
    }

    pub fn metadata(&self) -> Option<&[AlertsMetadata]> {
        (!self.alerts.metadata.is_empty()).then_some(self.alerts.metadata.as_slice())
    }
}
