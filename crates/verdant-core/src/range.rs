//! Query window resolution for time range selectors.

use serde::Serialize;
use time::OffsetDateTime;

use verdant_types::{Reading, TimeRange};

/// Concrete query window for a [`TimeRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryWindow {
    /// Inclusive start of the window.
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    /// End of the window (the reference "now").
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
    /// Maximum number of samples to request.
    pub sample_cap: u32,
}

impl QueryWindow {
    /// Check whether a timestamp falls inside `[start, end]`.
    pub fn contains(&self, timestamp: OffsetDateTime) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Apply the window the way a backend would.
    ///
    /// Keeps readings inside the window and, when there are more than
    /// `sample_cap`, only the most recent ones. The result is oldest first.
    pub fn clip<I>(&self, readings: I) -> Vec<Reading>
    where
        I: IntoIterator<Item = Reading>,
    {
        let mut kept: Vec<Reading> = readings
            .into_iter()
            .filter(|r| self.contains(r.timestamp))
            .collect();
        kept.sort_by_key(|r| r.timestamp);
        let excess = kept.len().saturating_sub(self.sample_cap as usize);
        kept.drain(..excess);
        kept
    }
}

/// Resolve a time range against a reference instant.
///
/// `now` is injected rather than read from the system clock so the result
/// depends only on its inputs.
///
/// ```
/// use time::{Duration, OffsetDateTime};
/// use verdant_core::range::resolve;
/// use verdant_types::TimeRange;
///
/// let now = OffsetDateTime::UNIX_EPOCH + Duration::days(100);
/// let window = resolve(TimeRange::Week, now);
/// assert_eq!(window.start, now - Duration::days(7));
/// assert_eq!(window.sample_cap, 168);
/// ```
pub fn resolve(range: TimeRange, now: OffsetDateTime) -> QueryWindow {
    QueryWindow {
        start: now - range.window(),
        end: now,
        sample_cap: range.sample_cap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_750_000_000).unwrap()
    }

    #[test]
    fn test_resolve_day() {
        let window = resolve(TimeRange::Day, now());
        assert_eq!(window.start, now() - Duration::hours(24));
        assert_eq!(window.end, now());
        assert_eq!(window.sample_cap, 96);
    }

    #[test]
    fn test_resolve_week() {
        let window = resolve(TimeRange::Week, now());
        assert_eq!(window.start, now() - Duration::days(7));
        assert_eq!(window.sample_cap, 168);
    }

    #[test]
    fn test_resolve_month() {
        let window = resolve(TimeRange::Month, now());
        assert_eq!(window.start, now() - Duration::days(30));
        assert_eq!(window.sample_cap, 360);
    }

    #[test]
    fn test_resolve_all_ranges_match_table() {
        for range in TimeRange::ALL {
            let window = resolve(range, now());
            assert_eq!(window.end - window.start, range.window());
            assert_eq!(window.sample_cap, range.sample_cap());
        }
    }

    #[test]
    fn test_window_contains_is_inclusive() {
        let window = resolve(TimeRange::Day, now());
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(window.start - Duration::seconds(1)));
        assert!(!window.contains(window.end + Duration::seconds(1)));
    }

    #[test]
    fn test_clip_filters_and_caps() {
        let window = QueryWindow {
            start: now() - Duration::hours(10),
            end: now(),
            sample_cap: 3,
        };
        let readings = vec![
            Reading::new(now() - Duration::hours(1), 1.0),
            Reading::new(now() - Duration::hours(11), 11.0),
            Reading::new(now() - Duration::hours(4), 4.0),
            Reading::new(now() + Duration::hours(1), -1.0),
            Reading::new(now() - Duration::hours(2), 2.0),
            Reading::new(now() - Duration::hours(3), 3.0),
        ];

        let values: Vec<f64> = window.clip(readings).iter().map(|r| r.value).collect();
        assert_eq!(values, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_clip_empty() {
        assert!(resolve(TimeRange::Day, now()).clip(Vec::new()).is_empty());
    }
}
