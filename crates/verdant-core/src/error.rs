//! Error types for verdant-core.
//!
//! Only the fetch boundary can fail. Classification, label downsampling,
//! statistics and daily bucketing are total functions over a well-formed
//! series, so none of them return a [`Result`].
//!
//! # Error Handling Overview
//!
//! | Situation | Representation | UI behaviour |
//! |-----------|----------------|--------------|
//! | Reading source failed | [`Error::Fetch`] / [`Error::Timeout`] → `SeriesState::Error` | Retry affordance, last good data kept |
//! | Fetch superseded by a newer range | [`Error::Cancelled`] (internal) | Nothing, the newer request wins |
//! | Empty series | `None` statistics / current value | Explicit "no data" state |
//! | Sensor type without a range | `Status::Normal` | No alarm |
//! | Bad threshold configuration | [`Error::InvalidConfig`] | Fix configuration and restart |
//!
//! The controller converts every fetch error into a cloneable
//! [`FetchFailure`] snapshot stored on the view model.

use std::time::Duration;

use thiserror::Error;

use verdant_types::TimeRange;

/// Errors that can occur while fetching or configuring sensor telemetry.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The reading source could not return data.
    #[error("Failed to fetch readings for sensor '{sensor_id}': {reason}")]
    Fetch {
        /// The sensor whose readings were requested.
        sensor_id: String,
        /// Description of the failure.
        reason: String,
    },

    /// Operation timed out.
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout duration.
        duration: Duration,
    },

    /// Operation was cancelled.
    #[error("Operation cancelled")]
    Cancelled,

    /// Data returned by a reading source was malformed.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a fetch error for a sensor.
    pub fn fetch(sensor_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            sensor_id: sensor_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error with operation context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

impl From<verdant_types::ParseError> for Error {
    fn from(err: verdant_types::ParseError) -> Self {
        Error::InvalidData(err.to_string())
    }
}

/// Result type alias using verdant-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Snapshot of a failed fetch, kept on the view model.
///
/// Unlike [`Error`] this is `Clone`, so it can live inside the published
/// view model next to the last good data.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FetchFailure {
    /// The sensor whose readings were requested.
    pub sensor_id: String,
    /// The time range that was being loaded.
    pub range: TimeRange,
    /// Human-readable description of the error.
    pub message: String,
}

impl FetchFailure {
    /// Capture an error for the given sensor and range.
    pub fn new(sensor_id: impl Into<String>, range: TimeRange, error: &Error) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            range,
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.sensor_id, self.range, self.message)
    }
}
