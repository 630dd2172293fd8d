//! Local time zones for labels and day boundaries.
//!
//! A [`Zone`] resolves the UTC offset for each instant separately, so a
//! window that crosses a daylight saving change still puts every reading on
//! its own local wall-clock time and calendar date.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use time::{OffsetDateTime, UtcOffset};

use crate::error::{Error, Result};

/// Time zone used to render readings in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// Coordinated Universal Time.
    #[default]
    Utc,
    /// A fixed offset with no daylight saving rules.
    Fixed(UtcOffset),
    /// An IANA zone such as `Europe/Berlin`.
    Named(Tz),
    /// The zone configured on this machine.
    Local,
}

impl Zone {
    /// UTC offset in effect at `instant`.
    pub fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        let seconds = match self {
            Zone::Utc => return UtcOffset::UTC,
            Zone::Fixed(offset) => return *offset,
            Zone::Named(tz) => offset_seconds(tz, instant),
            Zone::Local => offset_seconds(&Local, instant),
        };
        seconds
            .and_then(|s| UtcOffset::from_whole_seconds(s).ok())
            .unwrap_or(UtcOffset::UTC)
    }

    /// `instant` expressed in local time.
    ///
    /// ```
    /// use time::{Date, Month, Time};
    /// use verdant_core::Zone;
    ///
    /// let berlin: Zone = "Europe/Berlin".parse().unwrap();
    /// let winter = Date::from_calendar_date(2025, Month::January, 10)
    ///     .unwrap()
    ///     .with_time(Time::from_hms(12, 0, 0).unwrap())
    ///     .assume_utc();
    /// assert_eq!(berlin.to_local(winter).hour(), 13);
    /// ```
    pub fn to_local(&self, instant: OffsetDateTime) -> OffsetDateTime {
        instant.to_offset(self.offset_at(instant))
    }
}

fn offset_seconds<Z: TimeZone>(zone: &Z, instant: OffsetDateTime) -> Option<i32> {
    let utc = DateTime::<Utc>::from_timestamp(instant.unix_timestamp(), instant.nanosecond())?;
    Some(
        zone.offset_from_utc_datetime(&utc.naive_utc())
            .fix()
            .local_minus_utc(),
    )
}

impl FromStr for Zone {
    type Err = Error;

    /// Parse `UTC`/`Z`, `local`, an offset like `+02:00`, or an IANA name.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("utc") || s.eq_ignore_ascii_case("z") {
            return Ok(Zone::Utc);
        }
        if s.eq_ignore_ascii_case("local") {
            return Ok(Zone::Local);
        }
        if s.starts_with(['+', '-']) {
            let format = time::format_description::parse(
                "[offset_hour sign:mandatory]:[offset_minute]",
            )
            .map_err(|e| Error::invalid_config(e.to_string()))?;
            return UtcOffset::parse(s, &format)
                .map(Zone::Fixed)
                .map_err(|_| Error::invalid_config(format!("'{s}' is not an offset like +02:00")));
        }
        s.parse::<Tz>()
            .map(Zone::Named)
            .map_err(|_| Error::invalid_config(format!("unknown time zone '{s}'")))
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Utc => write!(f, "UTC"),
            Zone::Fixed(offset) => {
                let sign = if offset.is_negative() { '-' } else { '+' };
                write!(
                    f,
                    "{}{:02}:{:02}",
                    sign,
                    offset.whole_hours().unsigned_abs(),
                    offset.minutes_past_hour().unsigned_abs()
                )
            }
            Zone::Named(tz) => write!(f, "{}", tz.name()),
            Zone::Local => write!(f, "local"),
        }
    }
}
