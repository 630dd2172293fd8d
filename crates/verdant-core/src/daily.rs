//! Per-calendar-day aggregation for multi-day analytics views.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use time::Date;

use verdant_types::Reading;

use crate::stats::Accumulator;
use crate::zone::Zone;

/// Summary of all readings that fall on one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyAggregate {
    /// Local calendar date.
    #[serde(serialize_with = "serialize_date")]
    pub date: Date,
    /// Smallest value of the day.
    pub min: f64,
    /// Largest value of the day.
    pub max: f64,
    /// Arithmetic mean of the day.
    pub mean: f64,
    /// Number of readings on the day.
    pub count: usize,
}

fn serialize_date<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(date)
}

/// Group readings by local calendar date, most recent day first.
///
/// Only days with at least one reading produce a bucket. A reading exactly
/// at local midnight belongs to the day that starts at that instant. The
/// zone's offset is resolved per reading, so windows spanning a daylight
/// saving change still split on local midnight.
pub fn bucket_by_day(readings: &[Reading], zone: Zone) -> Vec<DailyAggregate> {
    let mut days: BTreeMap<Date, Accumulator> = BTreeMap::new();

    for reading in readings {
        let date = zone.to_local(reading.timestamp).date();
        days.entry(date)
            .and_modify(|acc| acc.push(reading.value))
            .or_insert_with(|| Accumulator::new(reading.value));
    }

    days.into_iter()
        .rev()
        .map(|(date, acc)| DailyAggregate {
            date,
            min: acc.min,
            max: acc.max,
            mean: acc.mean(),
            count: acc.count,
        })
        .collect()
}
