//! Optimal ranges and reading classification.
//!
//! Every sensor type has an optimal `[min, max]` range. A value is classified
//! into a [`Status`] tier by comparing it against that range and against a
//! wider critical margin derived from the tier multipliers:
//!
//! | Condition | Status |
//! |-----------|--------|
//! | `value < min * 0.7` or `value > max * 1.3` | [`Status::Critical`] |
//! | `value < min` or `value > max` | [`Status::Warning`] |
//! | otherwise | [`Status::Normal`] |
//!
//! Critical is checked first. When `min == 0` both low bounds collapse to `0`:
//! there is no low Warning band and any negative value is Critical.
//!
//! # Example
//!
//! ```
//! use verdant_core::thresholds::{classify, RangeTable};
//! use verdant_core::{SensorType, Status};
//!
//! // Process-wide default table
//! assert_eq!(classify(19.0, SensorType::Humidity), Status::Critical);
//! assert_eq!(classify(25.0, SensorType::Humidity), Status::Warning);
//!
//! // Unknown sensor types fail open
//! let table = RangeTable::empty();
//! assert_eq!(table.classify(-100.0, SensorType::Light), Status::Normal);
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use verdant_types::{Reading, SensorType, Status};

use crate::error::{Error, Result};

/// The healthy `[min, max]` range for a sensor type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimalRange {
    /// Lower bound of the optimal range.
    pub min: f64,
    /// Upper bound of the optimal range.
    pub max: f64,
}

impl OptimalRange {
    /// Create a validated range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if either bound is not finite or if
    /// `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Check that both bounds are finite and ordered.
    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(Error::invalid_config(format!(
                "range bounds must be finite (min={}, max={})",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(Error::invalid_config(format!(
                "range min {} is greater than max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Check whether a value lies inside the range (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Multipliers deriving the critical margin from an optimal range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierMultipliers {
    /// Values below `min * critical_low` are critical.
    pub critical_low: f64,
    /// Values above `max * critical_high` are critical.
    pub critical_high: f64,
}

impl Default for TierMultipliers {
    fn default() -> Self {
        Self {
            critical_low: 0.7,
            critical_high: 1.3,
        }
    }
}

impl TierMultipliers {
    /// Validate the multipliers.
    ///
    /// `critical_low` must lie in `(0, 1]` and `critical_high` must be at
    /// least `1`, otherwise the critical margin would cut into the optimal
    /// range.
    pub fn validate(&self) -> Result<()> {
        if !(self.critical_low > 0.0 && self.critical_low <= 1.0) {
            return Err(Error::invalid_config(format!(
                "critical_low must be in (0, 1], got {}",
                self.critical_low
            )));
        }
        if !(self.critical_high.is_finite() && self.critical_high >= 1.0) {
            return Err(Error::invalid_config(format!(
                "critical_high must be >= 1, got {}",
                self.critical_high
            )));
        }
        Ok(())
    }

    /// Classify a value against a range.
    pub fn tier(&self, value: f64, range: &OptimalRange) -> Status {
        if value < range.min * self.critical_low || value > range.max * self.critical_high {
            Status::Critical
        } else if value < range.min || value > range.max {
            Status::Warning
        } else {
            Status::Normal
        }
    }
}

/// Per-sensor-type optimal ranges plus tier multipliers.
///
/// A table is immutable once built: the builder methods consume `self`. The
/// process-wide default is available through [`default_table`] and can be
/// shared between views without locking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeTable {
    multipliers: TierMultipliers,
    ranges: BTreeMap<SensorType, OptimalRange>,
}

impl Default for RangeTable {
    fn default() -> Self {
        Self::empty()
            .with_range(SensorType::Temperature, OptimalRange { min: 15.0, max: 32.0 })
            .with_range(SensorType::Humidity, OptimalRange { min: 30.0, max: 80.0 })
            .with_range(SensorType::SoilMoisture, OptimalRange { min: 20.0, max: 60.0 })
            .with_range(SensorType::Light, OptimalRange { min: 2_000.0, max: 50_000.0 })
            .with_range(SensorType::WaterLevel, OptimalRange { min: 20.0, max: 90.0 })
            .with_range(SensorType::Rainfall, OptimalRange { min: 0.0, max: 50.0 })
            .with_range(SensorType::SoilPh, OptimalRange { min: 6.0, max: 7.5 })
    }
}

impl RangeTable {
    /// Create a table with no ranges and default multipliers.
    pub fn empty() -> Self {
        Self {
            multipliers: TierMultipliers::default(),
            ranges: BTreeMap::new(),
        }
    }

    /// Return a table with the range for `sensor` set (replacing any existing one).
    #[must_use]
    pub fn with_range(mut self, sensor: SensorType, range: OptimalRange) -> Self {
        self.ranges.insert(sensor, range);
        self
    }

    /// Return a table with different tier multipliers.
    #[must_use]
    pub fn with_multipliers(mut self, multipliers: TierMultipliers) -> Self {
        self.multipliers = multipliers;
        self
    }

    /// Return a table where every range in `overrides` replaces the current one.
    #[must_use]
    pub fn with_overrides<I>(self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (SensorType, OptimalRange)>,
    {
        overrides
            .into_iter()
            .fold(self, |table, (sensor, range)| table.with_range(sensor, range))
    }

    /// Get the range configured for a sensor type.
    pub fn get(&self, sensor: SensorType) -> Option<&OptimalRange> {
        self.ranges.get(&sensor)
    }

    /// Get the tier multipliers.
    pub fn multipliers(&self) -> &TierMultipliers {
        &self.multipliers
    }

    /// Iterate over the configured ranges in sensor type order.
    pub fn iter(&self) -> impl Iterator<Item = (SensorType, &OptimalRange)> {
        self.ranges.iter().map(|(sensor, range)| (*sensor, range))
    }

    /// Validate every range and the multipliers.
    pub fn validate(&self) -> Result<()> {
        self.multipliers.validate()?;
        for (sensor, range) in &self.ranges {
            range
                .validate()
                .map_err(|e| Error::invalid_config(format!("{}: {}", sensor.key(), e)))?;
        }
        Ok(())
    }

    /// Classify a single value.
    ///
    /// Returns [`Status::Normal`] when no range is configured for the sensor
    /// type, and for NaN values, which compare false against every bound.
    pub fn classify(&self, value: f64, sensor: SensorType) -> Status {
        match self.get(sensor) {
            Some(range) => self.multipliers.tier(value, range),
            None => Status::Normal,
        }
    }

    /// Classify every reading, preserving order.
    pub fn classify_series(&self, readings: &[Reading], sensor: SensorType) -> Vec<Status> {
        readings
            .iter()
            .map(|r| self.classify(r.value, sensor))
            .collect()
    }
}

static DEFAULT_TABLE: LazyLock<Arc<RangeTable>> =
    LazyLock::new(|| Arc::new(RangeTable::default()));

/// The process-wide default range table.
pub fn default_table() -> &'static RangeTable {
    &DEFAULT_TABLE
}

/// A shared handle to the process-wide default range table.
pub fn shared_default_table() -> Arc<RangeTable> {
    Arc::clone(&DEFAULT_TABLE)
}

/// Classify a value against the process-wide default table.
pub fn classify(value: f64, sensor: SensorType) -> Status {
    default_table().classify(value, sensor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_scenario_all_normal() {
        for value in [20.0, 25.0, 30.0] {
            assert_eq!(classify(value, SensorType::Temperature), Status::Normal);
        }
    }

    #[test]
    fn test_humidity_critical_below_margin() {
        // 19 < 30 * 0.7 = 21
        assert_eq!(classify(19.0, SensorType::Humidity), Status::Critical);
    }

    #[test]
    fn test_humidity_warning_inside_margin() {
        // 25 < 30 but 25 >= 21
        assert_eq!(classify(25.0, SensorType::Humidity), Status::Warning);
    }

    #[test]
    fn test_boundary_values() {
        let t = default_table();
        // Exact range bounds are Normal
        assert_eq!(t.classify(30.0, SensorType::Humidity), Status::Normal);
        assert_eq!(t.classify(80.0, SensorType::Humidity), Status::Normal);
        // Exact critical bounds are Warning
        assert_eq!(t.classify(21.0, SensorType::Humidity), Status::Warning);
        assert_eq!(t.classify(104.0, SensorType::Humidity), Status::Warning);
        // Just past the critical bounds
        assert_eq!(t.classify(20.99, SensorType::Humidity), Status::Critical);
        assert_eq!(t.classify(104.01, SensorType::Humidity), Status::Critical);
    }

    #[test]
    fn test_high_side_tiers() {
        // Temperature max 32, critical above 41.6
        assert_eq!(classify(35.0, SensorType::Temperature), Status::Warning);
        assert_eq!(classify(42.0, SensorType::Temperature), Status::Critical);
    }

    #[test]
    fn test_zero_min_collapses_low_margin() {
        // Rainfall range is 0-50 so the low critical bound is 0 as well:
        // there is no Warning band below the range.
        let t = default_table();
        assert_eq!(t.get(SensorType::Rainfall).map(|r| r.min), Some(0.0));
        assert_eq!(t.classify(0.0, SensorType::Rainfall), Status::Normal);
        assert_eq!(t.classify(-0.5, SensorType::Rainfall), Status::Critical);
        // The high side keeps its Warning band
        assert_eq!(t.classify(60.0, SensorType::Rainfall), Status::Warning);
        assert_eq!(t.classify(66.0, SensorType::Rainfall), Status::Critical);

        let custom = RangeTable::empty().with_range(
            SensorType::SoilMoisture,
            OptimalRange { min: 0.0, max: 10.0 },
        );
        assert_eq!(custom.classify(0.0, SensorType::SoilMoisture), Status::Normal);
        assert_eq!(custom.classify(12.0, SensorType::SoilMoisture), Status::Warning);
        assert_eq!(custom.classify(65.0, SensorType::SoilMoisture), Status::Critical);
    }

    #[test]
    fn test_unknown_sensor_type_fails_open() {
        let table = RangeTable::empty();
        assert_eq!(table.classify(1e9, SensorType::Temperature), Status::Normal);
        assert_eq!(table.classify(-1e9, SensorType::SoilPh), Status::Normal);
    }

    #[test]
    fn test_nan_is_normal() {
        assert_eq!(classify(f64::NAN, SensorType::Temperature), Status::Normal);
    }

    #[test]
    fn test_custom_multipliers() {
        let table = RangeTable::empty()
            .with_range(SensorType::Humidity, OptimalRange { min: 30.0, max: 80.0 })
            .with_multipliers(TierMultipliers {
                critical_low: 0.9,
                critical_high: 1.1,
            });
        // 26 < 30 * 0.9 = 27
        assert_eq!(table.classify(26.0, SensorType::Humidity), Status::Critical);
        assert_eq!(table.classify(28.0, SensorType::Humidity), Status::Warning);
        assert_eq!(table.classify(89.0, SensorType::Humidity), Status::Critical);
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let table = RangeTable::default().with_overrides([(
            SensorType::Temperature,
            OptimalRange { min: 10.0, max: 20.0 },
        )]);
        assert_eq!(table.classify(25.0, SensorType::Temperature), Status::Warning);
        // Untouched entries remain
        assert_eq!(table.get(SensorType::Humidity), default_table().get(SensorType::Humidity));
    }

    #[test]
    fn test_classify_series_preserves_order() {
        let t0 = time::OffsetDateTime::UNIX_EPOCH;
        let readings = vec![
            Reading::new(t0, 19.0),
            Reading::new(t0, 50.0),
            Reading::new(t0, 25.0),
        ];
        assert_eq!(
            default_table().classify_series(&readings, SensorType::Humidity),
            vec![Status::Critical, Status::Normal, Status::Warning]
        );
    }

    #[test]
    fn test_optimal_range_validation() {
        assert!(OptimalRange::new(1.0, 2.0).is_ok());
        assert!(OptimalRange::new(2.0, 2.0).is_ok());
        assert!(matches!(
            OptimalRange::new(3.0, 2.0),
            Err(Error::InvalidConfig(_))
        ));
        assert!(OptimalRange::new(f64::NAN, 2.0).is_err());
        assert!(OptimalRange::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_table_validation() {
        assert!(RangeTable::default().validate().is_ok());

        let bad = RangeTable::empty()
            .with_range(SensorType::Light, OptimalRange { min: 9.0, max: 1.0 });
        let err = bad.validate().unwrap_err();
        assert!(err.to_string().contains("light"));

        let bad_multipliers = RangeTable::empty().with_multipliers(TierMultipliers {
            critical_low: 1.5,
            critical_high: 1.3,
        });
        assert!(bad_multipliers.validate().is_err());

        let bad_high = RangeTable::empty().with_multipliers(TierMultipliers {
            critical_low: 0.7,
            critical_high: 0.5,
        });
        assert!(bad_high.validate().is_err());
    }

    #[test]
    fn test_default_table_covers_every_sensor() {
        for sensor in SensorType::ALL {
            assert!(default_table().get(sensor).is_some(), "{sensor} missing");
        }
    }

    #[test]
    fn test_table_from_toml() {
        let toml_src = r#"
            [multipliers]
            critical_low = 0.8

            [ranges.soil_ph]
            min = 5.5
            max = 6.5
        "#;
        let table: RangeTable = toml::from_str(toml_src).unwrap();
        assert_eq!(table.multipliers().critical_low, 0.8);
        assert_eq!(table.multipliers().critical_high, 1.3);
        assert_eq!(
            table.get(SensorType::SoilPh),
            Some(&OptimalRange { min: 5.5, max: 6.5 })
        );
        assert!(table.get(SensorType::Temperature).is_none());
    }
}
