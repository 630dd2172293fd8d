//! Mock reading source for testing.
//!
//! This module provides an in-memory [`ReadingSource`] that can be used for
//! unit testing and demos without a backend.
//!
//! # Features
//!
//! - **Window filtering**: only readings inside `[start, end]` are returned,
//!   capped to the most recent `sample_cap`
//! - **Failure injection**: fail every fetch, or only the next `n` fetches
//! - **Latency simulation**: a default delay plus a per-call script, so tests
//!   can make an early request resolve after a later one
//! - **Ordering**: optionally return newest-first, as many REST APIs do

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};

use verdant_types::Reading;

use crate::error::{Error, Result};
use crate::range::QueryWindow;
use crate::traits::ReadingSource;

/// An in-memory reading source for testing.
///
/// # Example
///
/// ```
/// use time::{Duration, OffsetDateTime};
/// use verdant_core::{MockSource, ReadingSource, Reading};
///
/// #[tokio::main]
/// async fn main() {
///     let now = OffsetDateTime::from_unix_timestamp(1_750_000_000).unwrap();
///     let source = MockSource::builder()
///         .readings("bed-3", vec![Reading::new(now - Duration::hours(1), 21.0)])
///         .build();
///
///     let readings = source
///         .fetch_readings("bed-3", now - Duration::days(1), now, 96)
///         .await
///         .unwrap();
///     assert_eq!(readings.len(), 1);
/// }
/// ```
pub struct MockSource {
    readings: RwLock<HashMap<String, Vec<Reading>>>,
    latency: RwLock<Duration>,
    scripted_latencies: Mutex<VecDeque<Duration>>,
    should_fail: AtomicBool,
    remaining_failures: AtomicU32,
    fail_message: RwLock<String>,
    newest_first: AtomicBool,
    fetch_count: AtomicU32,
}

impl std::fmt::Debug for MockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSource")
            .field("should_fail", &self.should_fail.load(Ordering::Relaxed))
            .field("fetch_count", &self.fetch_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    /// Create an empty mock source.
    pub fn new() -> Self {
        Self {
            readings: RwLock::new(HashMap::new()),
            latency: RwLock::new(Duration::ZERO),
            scripted_latencies: Mutex::new(VecDeque::new()),
            should_fail: AtomicBool::new(false),
            remaining_failures: AtomicU32::new(0),
            fail_message: RwLock::new("Mock failure".to_string()),
            newest_first: AtomicBool::new(false),
            fetch_count: AtomicU32::new(0),
        }
    }

    /// Create a builder.
    pub fn builder() -> MockSourceBuilder {
        MockSourceBuilder::default()
    }

    /// Replace the readings stored for a sensor.
    pub async fn set_readings(&self, sensor_id: &str, readings: Vec<Reading>) {
        self.readings
            .write()
            .await
            .insert(sensor_id.to_string(), readings);
    }

    /// Append one reading for a sensor.
    pub async fn push_reading(&self, sensor_id: &str, reading: Reading) {
        self.readings
            .write()
            .await
            .entry(sensor_id.to_string())
            .or_default()
            .push(reading);
    }

    /// Make every fetch fail (or succeed again).
    pub async fn set_should_fail(&self, fail: bool, message: Option<&str>) {
        self.should_fail.store(fail, Ordering::Relaxed);
        if let Some(msg) = message {
            *self.fail_message.write().await = msg.to_string();
        }
    }

    /// Fail the next `count` fetches, then succeed.
    pub fn set_transient_failures(&self, count: u32) {
        self.remaining_failures.store(count, Ordering::Relaxed);
    }

    /// Set the latency applied to fetches without a scripted latency.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = latency;
    }

    /// Queue a latency for the next unscripted fetch.
    ///
    /// Scripted latencies are consumed in call order, one per fetch.
    pub async fn script_latency(&self, latency: Duration) {
        self.scripted_latencies.lock().await.push_back(latency);
    }

    /// Number of fetches started so far.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    /// Reset the fetch counter.
    pub fn reset_fetch_count(&self) {
        self.fetch_count.store(0, Ordering::Relaxed);
    }

    async fn check_should_fail(&self, sensor_id: &str) -> Result<()> {
        if self.remaining_failures.load(Ordering::Relaxed) > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(Error::fetch(sensor_id, self.fail_message.read().await.clone()));
        }

        if self.should_fail.load(Ordering::Relaxed) {
            Err(Error::fetch(sensor_id, self.fail_message.read().await.clone()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ReadingSource for MockSource {
    async fn fetch_readings(
        &self,
        sensor_id: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
        sample_cap: u32,
    ) -> Result<Vec<Reading>> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);

        // Pick the latency when the call starts so scripts follow call order.
        let scripted = self.scripted_latencies.lock().await.pop_front();
        let latency = match scripted {
            Some(latency) => latency,
            None => *self.latency.read().await,
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        self.check_should_fail(sensor_id).await?;

        let window = QueryWindow {
            start,
            end,
            sample_cap,
        };
        let mut readings = self
            .readings
            .read()
            .await
            .get(sensor_id)
            .map(|all| window.clip(all.iter().copied()))
            .unwrap_or_default();

        if self.newest_first.load(Ordering::Relaxed) {
            readings.reverse();
        }
        Ok(readings)
    }
}

/// Builder for creating mock sources with custom settings.
#[derive(Debug, Default)]
pub struct MockSourceBuilder {
    readings: HashMap<String, Vec<Reading>>,
    latency: Duration,
    scripted_latencies: VecDeque<Duration>,
    should_fail: bool,
    transient_failures: u32,
    fail_message: Option<String>,
    newest_first: bool,
}

impl MockSourceBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the readings for a sensor.
    #[must_use]
    pub fn readings(mut self, sensor_id: &str, readings: Vec<Reading>) -> Self {
        self.readings.insert(sensor_id.to_string(), readings);
        self
    }

    /// Set the default fetch latency.
    #[must_use]
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue a latency for one fetch, in call order.
    #[must_use]
    pub fn script_latency(mut self, latency: Duration) -> Self {
        self.scripted_latencies.push_back(latency);
        self
    }

    /// Make every fetch fail with `message`.
    #[must_use]
    pub fn failing(mut self, message: &str) -> Self {
        self.should_fail = true;
        self.fail_message = Some(message.to_string());
        self
    }

    /// Fail the first `count` fetches.
    #[must_use]
    pub fn transient_failures(mut self, count: u32) -> Self {
        self.transient_failures = count;
        self
    }

    /// Return readings newest-first.
    #[must_use]
    pub fn newest_first(mut self, newest_first: bool) -> Self {
        self.newest_first = newest_first;
        self
    }

    /// Build the mock source.
    #[must_use]
    pub fn build(self) -> MockSource {
        MockSource {
            readings: RwLock::new(self.readings),
            latency: RwLock::new(self.latency),
            scripted_latencies: Mutex::new(self.scripted_latencies),
            should_fail: AtomicBool::new(self.should_fail),
            remaining_failures: AtomicU32::new(self.transient_failures),
            fail_message: RwLock::new(
                self.fail_message
                    .unwrap_or_else(|| "Mock failure".to_string()),
            ),
            newest_first: AtomicBool::new(self.newest_first),
            fetch_count: AtomicU32::new(0),
        }
    }
}
