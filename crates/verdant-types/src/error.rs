//! Error types for parsing values in verdant-types.

use thiserror::Error;

/// Errors that can occur when parsing sensor telemetry values.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The string does not name a known sensor type.
    #[error("Unknown sensor type: '{0}'")]
    UnknownSensorType(String),

    /// The string does not name a known time range.
    #[error("Unknown time range: '{0}' (expected 24h, 7d or 30d)")]
    UnknownTimeRange(String),
}

/// Result type alias using verdant-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
