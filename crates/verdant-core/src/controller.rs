//! Sensor series controller.
//!
//! [`SensorSeriesController`] owns the view model of one sensor chart. Every
//! [`mount`](SensorSeriesController::mount),
//! [`refresh`](SensorSeriesController::refresh) and
//! [`set_range`](SensorSeriesController::set_range) enters
//! [`SeriesState::Loading`] and starts a fetch. Starting a fetch supersedes the
//! previous one: its cancellation token fires and the generation counter moves
//! on, so a response is only applied while its generation is still current.
//!
//! [`SensorViewModel::range`] always names the range of the data on screen.
//! The range asked for most recently is kept apart in
//! [`SensorViewModel::requested_range`], which is what
//! [`refresh`](SensorSeriesController::refresh) reloads.
//!
//! The latest view model is published on a [`tokio::sync::watch`] channel.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use time::{Duration, OffsetDateTime};
//! use verdant_core::{FixedClock, MockSource, Reading, SensorSeriesController, SensorType, SeriesState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let now = OffsetDateTime::from_unix_timestamp(1_750_000_000).unwrap();
//!     let source = MockSource::builder()
//!         .readings("bed-3", vec![Reading::new(now - Duration::hours(1), 21.5)])
//!         .build();
//!
//!     let controller = SensorSeriesController::new("bed-3", SensorType::Temperature, source)
//!         .with_clock(Arc::new(FixedClock(now)));
//!     controller.mount().await;
//!
//!     let view = controller.view();
//!     assert_eq!(view.state, SeriesState::Ready);
//!     assert_eq!(view.current_value, Some(21.5));
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use verdant_types::{Reading, ReadingSeries, SensorType, Status, TimeRange};

use crate::daily::{DailyAggregate, bucket_by_day};
use crate::error::{Error, FetchFailure, Result};
use crate::labels::downsample;
use crate::range::{QueryWindow, resolve};
use crate::stats::{Statistics, aggregate};
use crate::thresholds::{RangeTable, shared_default_table};
use crate::traits::{Clock, ReadingSource, SystemClock};
use crate::zone::Zone;

/// Lifecycle of the series behind a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The latest fetch succeeded and its data is shown.
    Ready,
    /// The latest fetch failed; previous data, if any, is still shown.
    Error,
}

/// Everything a sensor chart needs to render.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SensorViewModel {
    /// Value of the most recent reading.
    pub current_value: Option<f64>,
    /// Tier of the most recent reading; `Normal` when there is no data.
    pub current_status: Status,
    /// Downsampled axis labels.
    pub chart_labels: Vec<String>,
    /// Every value of the window, oldest first.
    pub chart_series: Vec<f64>,
    /// Tier of each value in `chart_series`.
    pub chart_statuses: Vec<Status>,
    /// Window statistics, `None` when the window is empty.
    pub statistics: Option<Statistics>,
    /// Per-day summaries, most recent day first.
    pub daily_aggregates: Vec<DailyAggregate>,
    /// Current lifecycle state.
    pub state: SeriesState,
    /// Range of the data currently shown.
    pub range: TimeRange,
    /// Range most recently requested. Differs from `range` while a load for
    /// another range is in flight or after it failed.
    pub requested_range: TimeRange,
    /// Most recent fetch failure, cleared by the next successful load.
    pub last_error: Option<FetchFailure>,
}

impl SensorViewModel {
    /// Whether the view has no readings to show.
    pub fn is_empty(&self) -> bool {
        self.chart_series.is_empty()
    }
}

/// What happened to a load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fetched data is now the view model.
    Applied,
    /// The fetch failed and the view model moved to [`SeriesState::Error`].
    Failed,
    /// A newer request started before this one finished; its result was dropped.
    Superseded,
}

/// Options for [`SensorSeriesController`].
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Maximum number of chart axis labels.
    pub max_labels: usize,
    /// Zone used for labels and day boundaries.
    pub zone: Zone,
    /// Range loaded by [`SensorSeriesController::mount`].
    pub initial_range: TimeRange,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            max_labels: 6,
            zone: Zone::Utc,
            initial_range: TimeRange::Day,
        }
    }
}

impl ControllerOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of axis labels.
    #[must_use]
    pub fn max_labels(mut self, max_labels: usize) -> Self {
        self.max_labels = max_labels;
        self
    }

    /// Set the local time zone.
    #[must_use]
    pub fn zone(mut self, zone: Zone) -> Self {
        self.zone = zone;
        self
    }

    /// Set the range loaded on mount.
    #[must_use]
    pub fn initial_range(mut self, range: TimeRange) -> Self {
        self.initial_range = range;
        self
    }

    /// Validate the options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `max_labels` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_labels == 0 {
            return Err(Error::invalid_config("max_labels must be greater than 0"));
        }
        Ok(())
    }
}

/// Build a ready view model from a fetched window.
///
/// Readings are sorted first; classification, labels, statistics and daily
/// buckets all see the same full series.
pub fn build_view(
    readings: Vec<Reading>,
    sensor: SensorType,
    range: TimeRange,
    table: &RangeTable,
    options: &ControllerOptions,
) -> SensorViewModel {
    let series = ReadingSeries::from_unsorted(readings);
    let current_value = series.latest().map(|r| r.value);
    let current_status = current_value
        .map(|v| table.classify(v, sensor))
        .unwrap_or_default();

    SensorViewModel {
        current_value,
        current_status,
        chart_labels: downsample(&series, options.max_labels, range, options.zone),
        chart_series: series.values(),
        chart_statuses: table.classify_series(&series, sensor),
        statistics: aggregate(&series),
        daily_aggregates: bucket_by_day(&series, options.zone),
        state: SeriesState::Ready,
        range,
        requested_range: range,
        last_error: None,
    }
}

/// Drives fetching and derivation for one sensor view.
pub struct SensorSeriesController<S> {
    sensor_id: String,
    sensor_type: SensorType,
    source: S,
    table: Arc<RangeTable>,
    clock: Arc<dyn Clock>,
    options: ControllerOptions,
    view_tx: watch::Sender<SensorViewModel>,
    generation: AtomicU64,
    cancel_token: Mutex<CancellationToken>,
}

impl<S> std::fmt::Debug for SensorSeriesController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorSeriesController")
            .field("sensor_id", &self.sensor_id)
            .field("sensor_type", &self.sensor_type)
            .field("options", &self.options)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<S: ReadingSource> SensorSeriesController<S> {
    /// Create a controller with default options, the default range table and
    /// the system clock.
    pub fn new(sensor_id: impl Into<String>, sensor_type: SensorType, source: S) -> Self {
        let options = ControllerOptions::default();
        let (view_tx, _) = watch::channel(SensorViewModel {
            range: options.initial_range,
            requested_range: options.initial_range,
            ..Default::default()
        });
        Self {
            sensor_id: sensor_id.into(),
            sensor_type,
            source,
            table: shared_default_table(),
            clock: Arc::new(SystemClock),
            options,
            view_tx,
            generation: AtomicU64::new(0),
            cancel_token: Mutex::new(CancellationToken::new()),
        }
    }

    /// Use validated options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the options are invalid.
    pub fn with_options(mut self, options: ControllerOptions) -> Result<Self> {
        options.validate()?;
        let range = options.initial_range;
        self.view_tx.send_modify(|view| {
            view.range = range;
            view.requested_range = range;
        });
        self.options = options;
        Ok(self)
    }

    /// Use a custom range table.
    #[must_use]
    pub fn with_table(mut self, table: Arc<RangeTable>) -> Self {
        self.table = table;
        self
    }

    /// Use a custom clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sensor identifier passed to the reading source.
    pub fn sensor_id(&self) -> &str {
        &self.sensor_id
    }

    /// Sensor type used for classification.
    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    /// Snapshot of the current view model.
    pub fn view(&self) -> SensorViewModel {
        self.view_tx.borrow().clone()
    }

    /// Subscribe to view model updates.
    pub fn subscribe(&self) -> watch::Receiver<SensorViewModel> {
        self.view_tx.subscribe()
    }

    /// Load the initial range.
    pub async fn mount(&self) -> LoadOutcome {
        self.load(self.options.initial_range).await
    }

    /// Reload the most recently requested range.
    pub async fn refresh(&self) -> LoadOutcome {
        let range = self.view_tx.borrow().requested_range;
        self.load(range).await
    }

    /// Select a new range and load it.
    pub async fn set_range(&self, range: TimeRange) -> LoadOutcome {
        self.load(range).await
    }

    async fn load(&self, range: TimeRange) -> LoadOutcome {
        let (generation, token) = self.begin(range).await;
        let window = resolve(range, self.clock.now());
        debug!(
            sensor_id = %self.sensor_id,
            %range,
            generation,
            sample_cap = window.sample_cap,
            "Fetching readings"
        );

        let fetch = self.source.fetch_readings(
            &self.sensor_id,
            window.start,
            window.end,
            window.sample_cap,
        );
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(Error::Cancelled),
            result = fetch => result,
        };

        match result {
            Ok(readings) => self.apply(generation, range, &window, readings),
            Err(Error::Cancelled) => {
                debug!(sensor_id = %self.sensor_id, %range, generation, "Fetch superseded");
                LoadOutcome::Superseded
            }
            Err(e) => self.fail(generation, range, &e),
        }
    }

    /// Supersede the previous fetch and enter `Loading`.
    ///
    /// Only `requested_range` moves here; `range` follows once data for it
    /// is applied.
    async fn begin(&self, range: TimeRange) -> (u64, CancellationToken) {
        let mut token = self.cancel_token.lock().await;
        token.cancel();
        *token = CancellationToken::new();

        let mut generation = 0;
        self.view_tx.send_modify(|view| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            view.state = SeriesState::Loading;
            view.requested_range = range;
        });
        (generation, token.clone())
    }

    fn apply(
        &self,
        generation: u64,
        range: TimeRange,
        window: &QueryWindow,
        readings: Vec<Reading>,
    ) -> LoadOutcome {
        if readings.len() > window.sample_cap as usize {
            warn!(
                sensor_id = %self.sensor_id,
                %range,
                count = readings.len(),
                sample_cap = window.sample_cap,
                "Source returned more readings than requested"
            );
        }

        let next = build_view(readings, self.sensor_type, range, &self.table, &self.options);
        let count = next.chart_series.len();
        let status = next.current_status;

        let applied = self.view_tx.send_if_modified(|view| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *view = next;
            true
        });

        if applied {
            info!(sensor_id = %self.sensor_id, %range, count, %status, "Readings applied");
            LoadOutcome::Applied
        } else {
            debug!(sensor_id = %self.sensor_id, %range, generation, "Discarding stale readings");
            LoadOutcome::Superseded
        }
    }

    fn fail(&self, generation: u64, range: TimeRange, error: &Error) -> LoadOutcome {
        let failure = FetchFailure::new(&self.sensor_id, range, error);
        let applied = self.view_tx.send_if_modified(|view| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            view.state = SeriesState::Error;
            view.last_error = Some(failure);
            true
        });

        if applied {
            warn!(sensor_id = %self.sensor_id, %range, error = %error, "Failed to load readings");
            LoadOutcome::Failed
        } else {
            debug!(sensor_id = %self.sensor_id, %range, generation, "Discarding stale failure");
            LoadOutcome::Superseded
        }
    }
}
