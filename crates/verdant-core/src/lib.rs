//! Classification and time-series aggregation for garden sensor telemetry.
//!
//! This crate turns a window of raw, timestamped sensor readings into
//! everything a chart view needs: a tier for each value, a handful of axis
//! labels, window statistics and per-day summaries.
//!
//! # Modules
//!
//! - [`range`]: resolve a [`TimeRange`] into a query window and sample cap
//! - [`thresholds`]: classify values against per-sensor optimal ranges
//! - [`labels`]: pick and format chart axis labels
//! - [`stats`]: min, max, mean and population standard deviation
//! - [`daily`]: bucket readings by local calendar day
//! - [`zone`]: resolve local time, daylight saving included
//! - [`controller`]: fetch, derive and publish a [`SensorViewModel`]
//! - [`traits`]: the [`ReadingSource`] and [`Clock`] seams
//! - [`mock`]: an in-memory [`ReadingSource`] for tests
//!
//! # Example
//!
//! ```
//! use verdant_core::{SensorType, Status, classify};
//!
//! assert_eq!(classify(25.0, SensorType::Temperature), Status::Normal);
//! assert_eq!(classify(25.0, SensorType::Humidity), Status::Warning);
//! assert_eq!(classify(19.0, SensorType::Humidity), Status::Critical);
//! ```

pub mod controller;
pub mod daily;
pub mod error;
pub mod labels;
pub mod mock;
pub mod range;
pub mod stats;
pub mod thresholds;
pub mod traits;
pub mod zone;

// Re-export types
pub use verdant_types::{
    ParseError, ParseResult, Reading, ReadingSeries, SensorType, Status, TimeRange,
};

// Re-export core types
pub use controller::{
    ControllerOptions, LoadOutcome, SensorSeriesController, SensorViewModel, SeriesState,
    build_view,
};
pub use daily::{DailyAggregate, bucket_by_day};
pub use error::{Error, FetchFailure, Result};
pub use labels::downsample;
pub use mock::{MockSource, MockSourceBuilder};
pub use range::{QueryWindow, resolve};
pub use stats::{Statistics, aggregate};
pub use thresholds::{
    OptimalRange, RangeTable, TierMultipliers, classify, default_table, shared_default_table,
};
pub use traits::{Clock, FixedClock, ReadingSource, SystemClock};
pub use zone::Zone;
