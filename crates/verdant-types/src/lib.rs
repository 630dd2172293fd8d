//! Platform-agnostic types for garden sensor telemetry.
//!
//! This crate provides the shared data model used by the classification and
//! aggregation engine (verdant-core) and its front-ends.
//!
//! # Features
//!
//! - Sensor categories with display units
//! - Timestamped readings and chronologically ordered series
//! - Time range selectors with their query windows and sample caps
//! - Classification status tiers
//! - Error types for parsing
//!
//! # Example
//!
//! ```
//! use verdant_types::{SensorType, Status, TimeRange};
//!
//! let sensor: SensorType = "soil-moisture".parse().unwrap();
//! assert_eq!(sensor.unit(), "%");
//! assert_eq!(TimeRange::Week.sample_cap(), 168);
//! assert!(Status::Critical > Status::Normal);
//! ```

pub mod error;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{Reading, ReadingSeries, SensorType, Status, TimeRange};
