//! Live ingest pipeline and its shared state

use crate::catalog::TrackCatalog;
use crate::config::ServiceConfig;
use crate::error::{ConfigurationError, IngestError};
use crate::model::{stamp_batch, RawSample, Selection, SelectionState};
use crate::motion::{detect_jumps, estimate_rate, RateMeasurement, SampleWindow, SpanSource};
use crate::tempo::{TempoBuckets, TrackSelector};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

/// Result of processing one batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub rate: RateMeasurement,

    /// Matched bucket (None for an empty batch, which skips matching)
    pub bucket: Option<u32>,

    pub selection: Selection,
}

/// State mutated by the writer path, guarded as one unit
struct LiveState {
    window: SampleWindow,
    selector: TrackSelector,
}

/// Owns the sample window and the selection state of a running service
///
/// One batch at a time runs append, evict, detect, estimate, match and
/// select under a single mutex, then publishes the result. Queries read a
/// snapshot of the published state and never wait on the mutex.
pub struct LiveService<C: TrackCatalog> {
    config: ServiceConfig,
    buckets: TempoBuckets,
    catalog: C,
    live: Mutex<LiveState>,
    selection: RwLock<SelectionState>,
}

impl<C: TrackCatalog> LiveService<C> {
    /// Validate configuration and create the service
    pub fn new(config: ServiceConfig, catalog: C) -> Result<Self, ConfigurationError> {
        let buckets = config.validate()?;

        log::info!(
            "Live service: buckets {:?}, {:?} window of {}s, jump threshold {} / min interval {}",
            buckets.as_slice(),
            config.window_mode,
            config.window_duration_seconds,
            config.jump_threshold,
            config.jump_min_interval
        );

        let live = LiveState {
            window: SampleWindow::new(config.window_mode),
            selector: TrackSelector::from_seed_option(config.rng_seed),
        };

        Ok(Self {
            config,
            buckets,
            catalog,
            live: Mutex::new(live),
            selection: RwLock::new(SelectionState::default()),
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Process a batch stamped with the current time
    pub fn ingest(&self, raw: &[RawSample]) -> Result<BatchOutcome, IngestError> {
        self.ingest_at(raw, Utc::now())
    }

    /// Process a batch stamped with `now`
    ///
    /// A malformed batch is rejected before any state is touched. If the
    /// catalog fails mid-batch the window is rolled back and the published
    /// selection is left as it was.
    pub fn ingest_at(&self, raw: &[RawSample], now: DateTime<Utc>) -> Result<BatchOutcome, IngestError> {
        let timestamp = now.timestamp_micros() as f64 / 1e6;
        let batch = stamp_batch(raw, timestamp)?;

        let mut live = self.live.lock();

        if batch.is_empty() {
            log::debug!("Empty batch, reporting zero rate");
            let outcome = BatchOutcome {
                rate: estimate_rate(0, 0.0),
                bucket: None,
                selection: Selection::NoMatch,
            };
            self.publish(&outcome, now);
            return Ok(outcome);
        }

        let checkpoint = live.window.clone();

        live.window.begin_batch();
        live.window.append(&batch);
        let evicted = live.window.evict(timestamp, self.config.window_duration_seconds);
        if evicted > 0 {
            log::debug!("Evicted {} sample(s) from window", evicted);
        }

        let detection = detect_jumps(
            &live.window.z_values(),
            self.config.jump_threshold,
            self.config.jump_min_interval,
        );

        let span = match self.config.span_source {
            SpanSource::Fixed => self.config.packet_span_seconds,
            SpanSource::Window => live.window.time_extent(),
        };
        let rate = estimate_rate(detection.count(), span);
        log::info!(
            "Jumps per minute: {} ({} jumps over {:.2}s, {} samples)",
            rate.rate_per_minute,
            rate.count,
            rate.span_seconds,
            live.window.len()
        );

        let bucket = self.buckets.nearest(rate.rate_per_minute);
        log::debug!("Rate {:.1} matched {} bpm", rate.rate_per_minute, bucket);

        let selection = match live.selector.select(bucket, &self.catalog) {
            Ok(selection) => selection,
            Err(e) => {
                live.window = checkpoint;
                return Err(e.into());
            }
        };

        let outcome = BatchOutcome {
            rate,
            bucket: Some(bucket),
            selection,
        };
        self.publish(&outcome, now);

        Ok(outcome)
    }

    /// Snapshot of the last published selection
    pub fn query(&self) -> SelectionState {
        self.selection.read().clone()
    }

    /// Samples currently retained in the window
    pub fn window_len(&self) -> usize {
        self.live.lock().window.len()
    }

    // Called with the live mutex held, so there is a single writer
    fn publish(&self, outcome: &BatchOutcome, now: DateTime<Utc>) {
        *self.selection.write() = SelectionState {
            last_rate: outcome.rate.rate_per_minute,
            last_bucket: outcome.bucket,
            last_track: outcome.selection.track().cloned(),
            selected_at: Some(now),
        };
    }
}
