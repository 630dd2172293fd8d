//! Core types for garden sensor telemetry.

use core::fmt;
use core::ops::Deref;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::error::ParseError;

/// Category of a garden sensor.
///
/// The sensor type decides which optimal range and display unit apply to
/// its readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SensorType {
    /// Air temperature in degrees Celsius.
    Temperature,
    /// Relative air humidity percentage.
    Humidity,
    /// Volumetric soil moisture percentage.
    SoilMoisture,
    /// Illuminance in lux.
    Light,
    /// Reservoir water level percentage.
    WaterLevel,
    /// Accumulated rainfall in millimetres.
    Rainfall,
    /// Soil acidity on the pH scale.
    SoilPh,
}

impl SensorType {
    /// Every sensor type, in display order.
    pub const ALL: [SensorType; 7] = [
        SensorType::Temperature,
        SensorType::Humidity,
        SensorType::SoilMoisture,
        SensorType::Light,
        SensorType::WaterLevel,
        SensorType::Rainfall,
        SensorType::SoilPh,
    ];

    /// Display unit for values of this sensor type.
    ///
    /// ```
    /// use verdant_types::SensorType;
    ///
    /// assert_eq!(SensorType::Temperature.unit(), "°C");
    /// assert_eq!(SensorType::SoilPh.unit(), "pH");
    /// ```
    #[must_use]
    pub fn unit(&self) -> &'static str {
        match self {
            SensorType::Temperature => "°C",
            SensorType::Humidity | SensorType::SoilMoisture | SensorType::WaterLevel => "%",
            SensorType::Light => "lux",
            SensorType::Rainfall => "mm",
            SensorType::SoilPh => "pH",
        }
    }

    /// Stable machine-readable key, matching the serde representation.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            SensorType::Temperature => "temperature",
            SensorType::Humidity => "humidity",
            SensorType::SoilMoisture => "soil_moisture",
            SensorType::Light => "light",
            SensorType::WaterLevel => "water_level",
            SensorType::Rainfall => "rainfall",
            SensorType::SoilPh => "soil_ph",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorType::Temperature => write!(f, "Temperature"),
            SensorType::Humidity => write!(f, "Humidity"),
            SensorType::SoilMoisture => write!(f, "Soil Moisture"),
            SensorType::Light => write!(f, "Light"),
            SensorType::WaterLevel => write!(f, "Water Level"),
            SensorType::Rainfall => write!(f, "Rainfall"),
            SensorType::SoilPh => write!(f, "Soil pH"),
        }
    }
}

impl FromStr for SensorType {
    type Err = ParseError;

    /// Parse a sensor type, ignoring case and `-`/`_`/space separators.
    ///
    /// ```
    /// use verdant_types::SensorType;
    ///
    /// assert_eq!("soil-moisture".parse(), Ok(SensorType::SoilMoisture));
    /// assert_eq!("Soil_pH".parse(), Ok(SensorType::SoilPh));
    /// assert!("co2".parse::<SensorType>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "temperature" | "temp" => Ok(SensorType::Temperature),
            "humidity" => Ok(SensorType::Humidity),
            "soilmoisture" => Ok(SensorType::SoilMoisture),
            "light" => Ok(SensorType::Light),
            "waterlevel" => Ok(SensorType::WaterLevel),
            "rainfall" | "rain" => Ok(SensorType::Rainfall),
            "soilph" | "ph" => Ok(SensorType::SoilPh),
            _ => Err(ParseError::UnknownSensorType(s.to_string())),
        }
    }
}

/// Logical time range selected for a sensor chart.
///
/// Each range maps to a fixed query window and a cap on the number of
/// samples requested from the reading source. The cap bounds the request
/// only; readings are never fabricated or interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TimeRange {
    /// Last 24 hours, one sample per 15 minutes nominal.
    #[default]
    Day,
    /// Last 7 days, one sample per hour nominal.
    Week,
    /// Last 30 days, one sample per 2 hours nominal.
    Month,
}

impl TimeRange {
    /// Every time range, shortest first.
    pub const ALL: [TimeRange; 3] = [TimeRange::Day, TimeRange::Week, TimeRange::Month];

    /// Length of the query window.
    #[must_use]
    pub fn window(&self) -> Duration {
        match self {
            TimeRange::Day => Duration::hours(24),
            TimeRange::Week => Duration::days(7),
            TimeRange::Month => Duration::days(30),
        }
    }

    /// Maximum number of samples to request for this window.
    ///
    /// ```
    /// use verdant_types::TimeRange;
    ///
    /// assert_eq!(TimeRange::Day.sample_cap(), 96);
    /// assert_eq!(TimeRange::Week.sample_cap(), 168);
    /// assert_eq!(TimeRange::Month.sample_cap(), 360);
    /// ```
    #[must_use]
    pub fn sample_cap(&self) -> u32 {
        match self {
            TimeRange::Day => 96,
            TimeRange::Week => 168,
            TimeRange::Month => 360,
        }
    }

    /// Short display label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Day => "24h",
            TimeRange::Week => "7d",
            TimeRange::Month => "30d",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "24h" | "1d" | "day" => Ok(TimeRange::Day),
            "7d" | "1w" | "week" => Ok(TimeRange::Week),
            "30d" | "1m" | "month" => Ok(TimeRange::Month),
            _ => Err(ParseError::UnknownTimeRange(s.to_string())),
        }
    }
}

/// Classification tier of a reading against its optimal range.
///
/// # Ordering
///
/// Status values are ordered by severity: `Normal < Warning < Critical`,
/// so the worst status of a series is simply its maximum.
///
/// ```
/// use verdant_types::Status;
///
/// assert!(Status::Critical > Status::Warning);
/// assert_eq!(format!("{}", Status::Warning), "Warning");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Status {
    /// Inside the optimal range, or no range is configured.
    #[default]
    Normal,
    /// Outside the optimal range but within the critical margin.
    Warning,
    /// Far outside the optimal range.
    Critical,
}

impl Status {
    /// Get a human-readable description of the status.
    pub fn description(&self) -> &'static str {
        match self {
            Status::Normal => "Within the optimal range",
            Status::Warning => "Outside the optimal range",
            Status::Critical => "Far outside the optimal range",
        }
    }

    /// Get the suggested action for this status.
    pub fn action(&self) -> &'static str {
        match self {
            Status::Normal => "No action needed",
            Status::Warning => "Keep an eye on this sensor",
            Status::Critical => "Check your plants now",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Normal => write!(f, "Normal"),
            Status::Warning => write!(f, "Warning"),
            Status::Critical => write!(f, "Critical"),
        }
    }
}

/// A single timestamped sensor measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// When the measurement was taken.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    /// Measured value, in the sensor type's unit.
    pub value: f64,
}

impl Reading {
    /// Create a new reading.
    pub fn new(timestamp: OffsetDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Readings for one sensor ordered by timestamp.
///
/// The only way to build a series is [`ReadingSeries::from_unsorted`], which
/// sorts its input, so timestamps are always non-decreasing. Readings that
/// share a timestamp keep their relative input order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReadingSeries {
    readings: Vec<Reading>,
}

impl ReadingSeries {
    /// Create an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from readings in any order.
    ///
    /// ```
    /// use time::{Duration, OffsetDateTime};
    /// use verdant_types::{Reading, ReadingSeries};
    ///
    /// let t0 = OffsetDateTime::UNIX_EPOCH;
    /// let series = ReadingSeries::from_unsorted(vec![
    ///     Reading::new(t0 + Duration::hours(2), 3.0),
    ///     Reading::new(t0, 1.0),
    /// ]);
    /// assert_eq!(series.latest().map(|r| r.value), Some(3.0));
    /// ```
    pub fn from_unsorted(mut readings: Vec<Reading>) -> Self {
        readings.sort_by_key(|r| r.timestamp);
        Self { readings }
    }

    /// Most recent reading, if any.
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.last()
    }

    /// Oldest reading, if any.
    pub fn oldest(&self) -> Option<&Reading> {
        self.readings.first()
    }

    /// Values in chronological order.
    pub fn values(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.value).collect()
    }

    /// Consume the series, returning the sorted readings.
    pub fn into_inner(self) -> Vec<Reading> {
        self.readings
    }
}

impl Deref for ReadingSeries {
    type Target = [Reading];

    fn deref(&self) -> &Self::Target {
        &self.readings
    }
}

impl From<Vec<Reading>> for ReadingSeries {
    fn from(readings: Vec<Reading>) -> Self {
        Self::from_unsorted(readings)
    }
}

impl FromIterator<Reading> for ReadingSeries {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        Self::from_unsorted(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ReadingSeries {
    type Item = &'a Reading;
    type IntoIter = core::slice::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.iter()
    }
}
