//! Chart axis label downsampling.
//!
//! A chart only has room for a handful of axis labels. [`downsample`] picks an
//! evenly strided subset of reading timestamps and formats them for the
//! selected [`TimeRange`]. The underlying readings are never touched:
//! classification and statistics always use the full series.

use time::OffsetDateTime;

use verdant_types::{Reading, TimeRange};

use crate::zone::Zone;

/// Stride between labelled readings.
///
/// `ceil(len / min(max_labels, len))`, never less than 1. Returns `None`
/// when there is nothing to label.
pub fn label_step(len: usize, max_labels: usize) -> Option<usize> {
    let budget = max_labels.min(len);
    if budget == 0 {
        return None;
    }
    Some(len.div_ceil(budget).max(1))
}

/// Indices of the readings whose timestamps become labels.
pub fn label_indices(len: usize, max_labels: usize) -> impl Iterator<Item = usize> {
    let step = label_step(len, max_labels);
    let end = if step.is_some() { len } else { 0 };
    (0..end).step_by(step.unwrap_or(1))
}

/// Format one timestamp for the given range in local time.
///
/// [`TimeRange::Day`] uses a 24-hour `HH:MM` clock, longer ranges use `MM/DD`.
/// The zone's offset is resolved at `timestamp` itself.
///
/// ```
/// use time::OffsetDateTime;
/// use verdant_core::{Zone, labels::format_label};
/// use verdant_types::TimeRange;
///
/// let ts = OffsetDateTime::from_unix_timestamp(1_750_000_000).unwrap(); // 2025-06-15 15:06:40 UTC
/// assert_eq!(format_label(ts, TimeRange::Day, Zone::Utc), "15:06");
/// assert_eq!(format_label(ts, TimeRange::Week, Zone::Utc), "06/15");
/// ```
pub fn format_label(timestamp: OffsetDateTime, range: TimeRange, zone: Zone) -> String {
    let local = zone.to_local(timestamp);
    match range {
        TimeRange::Day => format!("{:02}:{:02}", local.hour(), local.minute()),
        TimeRange::Week | TimeRange::Month => {
            format!("{:02}/{:02}", u8::from(local.month()), local.day())
        }
    }
}

/// Select and format at most `max_labels` evenly spaced labels.
///
/// Labels keep the order of `readings`. An empty series, or a zero label
/// budget, yields no labels.
pub fn downsample(
    readings: &[Reading],
    max_labels: usize,
    range: TimeRange,
    zone: Zone,
) -> Vec<String> {
    label_indices(readings.len(), max_labels)
        .map(|i| format_label(readings[i].timestamp, range, zone))
        .collect()
}
