//! Trait abstractions at the engine's boundaries.
//!
//! [`ReadingSource`] abstracts over the networking layer that actually fetches
//! readings, so the controller works the same against a REST client, a file
//! or a [`MockSource`](crate::mock::MockSource). [`Clock`] keeps "now"
//! injectable.

use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;

use verdant_types::Reading;

use crate::error::Result;

/// Source of raw sensor readings.
///
/// Implementations may return readings in any order, and may return an empty
/// vector when the window has no data. `sample_cap` is advisory: a source may
/// return fewer readings but should not return materially more. Timeouts are
/// the implementation's responsibility and should surface as an error.
///
/// # Example
///
/// ```ignore
/// use verdant_core::{ReadingSource, Result};
///
/// async fn count_readings<S: ReadingSource>(source: &S, window: QueryWindow) -> Result<usize> {
///     let readings = source
///         .fetch_readings("bed-3", window.start, window.end, window.sample_cap)
///         .await?;
///     Ok(readings.len())
/// }
/// ```
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Fetch readings for `sensor_id` between `start` and `end`.
    async fn fetch_readings(
        &self,
        sensor_id: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
        sample_cap: u32,
    ) -> Result<Vec<Reading>>;
}

#[async_trait]
impl<S: ReadingSource + ?Sized> ReadingSource for Arc<S> {
    async fn fetch_readings(
        &self,
        sensor_id: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
        sample_cap: u32,
    ) -> Result<Vec<Reading>> {
        (**self)
            .fetch_readings(sensor_id, start, end, sample_cap)
            .await
    }
}

/// Source of the reference "now" for query windows.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> OffsetDateTime;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
