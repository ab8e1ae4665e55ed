//! Structured diagnostics for the dashboard data core.
//!
//! Provides context-rich logging tagged with the component that produced the
//! message and, where one is known, the identifier of the record involved.
//! Supports console output and an append-only log file. Logging is a side
//! channel: nothing in the transforms depends on whether a logger has been
//! initialized.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

use serde::Deserialize;

use crate::model::CoordinateError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Geometry,
    Filter,
    Alerts,
    Statistics,
    GeoJson,
    Config,
    View,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Geometry => write!(f, "GEOM"),
            Component::Filter => write!(f, "FILTER"),
            Component::Alerts => write!(f, "ALERTS"),
            Component::Statistics => write!(f, "STATS"),
            Component::GeoJson => write!(f, "GEOJSON"),
            Component::Config => write!(f, "CONFIG"),
            Component::View => write!(f, "VIEW"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - the record simply has no geometry
    Expected,
    /// Unexpected failure - the geometry is present but corrupt
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        *logger_slot() = Some(logger);
    }

    fn log(&self, level: LogLevel, component: Component, record_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

        let record_part = record_id.map(|s| format!(" [{}]", s)).unwrap_or_default();
        let log_entry = format!(
            "{} {} {}{}: {}",
            timestamp, level, component, record_part, message
        );

        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
                LogLevel::Info | LogLevel::Debug => println!("{}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, record_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, record_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// A poisoned lock only means another thread panicked mid-write; the slot
/// itself is still usable.
fn logger_slot() -> MutexGuard<'static, Option<Logger>> {
    LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn dispatch(level: LogLevel, component: Component, record_id: Option<&str>, message: &str) {
    if let Some(logger) = logger_slot().as_ref() {
        logger.log(level, component, record_id, message);
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

pub fn info(component: Component, record_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, component, record_id, message);
}

pub fn warn(component: Component, record_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, component, record_id, message);
}

pub fn error(component: Component, record_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, component, record_id, message);
}

pub fn debug(component: Component, record_id: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, component, record_id, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a coordinate parse failure.
///
/// Records without geometry are common in mixed layers and are not worth
/// more than a debug line; corrupt geometry usually points at an upstream
/// export problem.
pub fn classify_geometry_failure(err: &CoordinateError) -> FailureType {
    match err {
        CoordinateError::Missing | CoordinateError::Empty => FailureType::Expected,
        CoordinateError::InvalidJson(_) | CoordinateError::NonNumeric(_) => {
            FailureType::Unexpected
        }
        CoordinateError::Unsupported(_) => FailureType::Unknown,
    }
}

/// Log a geometry failure with automatic classification
pub fn log_geometry_failure(record_id: Option<&str>, operation: &str, err: &CoordinateError) {
    let failure_type = classify_geometry_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(Component::Geometry, record_id, &message),
        FailureType::Unexpected => error(Component::Geometry, record_id, &message),
        FailureType::Unknown => warn(Component::Geometry, record_id, &message),
    }
}

// ---------------------------------------------------------------------------
// Batch Summary Logging
// ---------------------------------------------------------------------------

/// Log how many records a filtering pass kept out of its input
pub fn log_batch_summary(component: Component, operation: &str, total: usize, kept: usize) {
    let dropped = total.saturating_sub(kept);
    let message = format!(
        "{}: kept {}/{} records, dropped {}",
        operation, kept, total, dropped
    );

    if dropped == 0 {
        debug(component, None, &message);
    } else if kept == 0 {
        warn(component, None, &message);
    } else {
        info(component, None, &message);
    }
}
