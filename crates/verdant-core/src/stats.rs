//! Aggregate statistics over a reading window.
//!
//! "No data" is `None`, never a zero-valued [`Statistics`]; callers render an
//! explicit empty state instead of misleading zeros. All arithmetic is `f64`
//! with no rounding, which is left to the display layer.

use serde::Serialize;

use verdant_types::Reading;

/// Summary statistics of a reading window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation (divides by `count`).
    pub std_dev: f64,
    /// Number of readings.
    pub count: usize,
}

/// Running min/max/sum/count, shared with daily bucketing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Accumulator {
    pub(crate) min: f64,
    pub(crate) max: f64,
    pub(crate) sum: f64,
    pub(crate) count: usize,
}

impl Accumulator {
    pub(crate) fn new(value: f64) -> Self {
        Self {
            min: value,
            max: value,
            sum: value,
            count: 1,
        }
    }

    pub(crate) fn push(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.count += 1;
    }

    /// Arithmetic mean, kept inside `[min, max]`.
    ///
    /// A constant series returns `min` exactly. Otherwise the bound only
    /// absorbs rounding in the running sum; it is not display clamping.
    pub(crate) fn mean(&self) -> f64 {
        if self.min == self.max {
            return self.min;
        }
        let mean = self.sum / self.count as f64;
        if mean < self.min {
            self.min
        } else if mean > self.max {
            self.max
        } else {
            mean
        }
    }
}

/// Compute statistics over `readings`.
///
/// Returns `None` for an empty window.
///
/// ```
/// use time::OffsetDateTime;
/// use verdant_core::stats::aggregate;
/// use verdant_types::Reading;
///
/// let t = OffsetDateTime::UNIX_EPOCH;
/// let stats = aggregate(&[Reading::new(t, 2.0), Reading::new(t, 4.0)]).unwrap();
/// assert_eq!(stats.mean, 3.0);
/// assert_eq!(stats.std_dev, 1.0);
/// assert!(aggregate(&[]).is_none());
/// ```
pub fn aggregate(readings: &[Reading]) -> Option<Statistics> {
    let (first, rest) = readings.split_first()?;

    let acc = rest.iter().fold(Accumulator::new(first.value), |mut acc, r| {
        acc.push(r.value);
        acc
    });
    let mean = acc.mean();
    let variance = readings
        .iter()
        .map(|r| (r.value - mean).powi(2))
        .sum::<f64>()
        / acc.count as f64;

    Some(Statistics {
        min: acc.min,
        max: acc.max,
        mean,
        std_dev: variance.sqrt(),
        count: acc.count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Duration, OffsetDateTime};

    fn series(values: &[f64]) -> Vec<Reading> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Reading::new(OffsetDateTime::UNIX_EPOCH + Duration::hours(i as i64), *v))
            .collect()
    }

    #[test]
    fn test_empty_is_no_data() {
        assert_eq!(aggregate(&[]), None);
    }

    #[test]
    fn test_temperature_scenario() {
        let stats = aggregate(&series(&[20.0, 25.0, 30.0])).unwrap();
        assert_eq!(stats.min, 20.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.mean, 25.0);
        assert_eq!(stats.count, 3);
        // sqrt(50 / 3)
        assert!((stats.std_dev - 4.0825).abs() < 1e-4);
    }

    #[test]
    fn test_single_reading() {
        let stats = aggregate(&series(&[7.5])).unwrap();
        assert_eq!(stats.min, 7.5);
        assert_eq!(stats.max, 7.5);
        assert_eq!(stats.mean, 7.5);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.count, 1);
    }

    #[test]
    fn test_population_not_sample_std_dev() {
        // Sample std dev would be sqrt(32/7) ≈ 2.138; population is exactly 2.
        let stats = aggregate(&series(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0])).unwrap();
        assert_eq!(stats.mean, 5.0);
        assert!((stats.std_dev - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_order_independent() {
        let a = aggregate(&series(&[3.0, 1.0, 2.0])).unwrap();
        let b = aggregate(&series(&[1.0, 2.0, 3.0])).unwrap();
        assert_eq!(a.min, b.min);
        assert_eq!(a.max, b.max);
        assert_eq!(a.count, b.count);
        assert!((a.mean - b.mean).abs() < 1e-12);
    }

    #[test]
    fn test_constant_series_mean_is_exact() {
        // 0.1 + 0.1 + 0.1 divided by 3 rounds to 0.10000000000000002
        let stats = aggregate(&series(&[0.1, 0.1, 0.1])).unwrap();
        assert_eq!(stats.mean, 0.1);
        assert_eq!(stats.min, 0.1);
        assert_eq!(stats.max, 0.1);
    }

    #[test]
    fn test_mean_within_bounds_after_rounding() {
        let stats = aggregate(&series(&[0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.2])).unwrap();
        assert!(stats.min <= stats.mean && stats.mean <= stats.max);
        assert!((stats.mean - 0.1125).abs() < 1e-12);
    }

    #[test]
    fn test_negative_values() {
        let stats = aggregate(&series(&[-4.0, -2.0])).unwrap();
        assert_eq!(stats.min, -4.0);
        assert_eq!(stats.max, -2.0);
        assert_eq!(stats.mean, -3.0);
        assert_eq!(stats.std_dev, 1.0);
    }
}
