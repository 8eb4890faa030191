//! Time-bounded sample buffer

use crate::model::Sample;
use serde::{Deserialize, Serialize};

/// Whether samples survive between batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// Sliding window retained across batches
    Stateful,

    /// Window reset at the start of every batch
    Stateless,
}

/// Ordered buffer of samples, append-only then pruned by age
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: Vec<Sample>,
    mode: WindowMode,
}

impl SampleWindow {
    pub fn new(mode: WindowMode) -> Self {
        Self {
            samples: Vec::new(),
            mode,
        }
    }

    pub fn mode(&self) -> WindowMode {
        self.mode
    }

    /// Prepare for a new batch: a stateless window drops its history
    pub fn begin_batch(&mut self) {
        if self.mode == WindowMode::Stateless {
            self.samples.clear();
        }
    }

    /// Append samples in the order given. No ordering repair.
    pub fn append(&mut self, batch: &[Sample]) {
        self.samples.extend_from_slice(batch);
    }

    /// Drop every sample with `now - timestamp >= window_duration`
    ///
    /// Returns the number of evicted samples.
    pub fn evict(&mut self, now: f64, window_duration: f64) -> usize {
        let before = self.samples.len();
        self.samples.retain(|s| now - s.timestamp < window_duration);
        before - self.samples.len()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn z_values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.z).collect()
    }

    /// Time between the earliest and latest retained sample
    ///
    /// Zero for an empty window or a window stamped at a single instant.
    pub fn time_extent(&self) -> f64 {
        let mut timestamps = self.samples.iter().map(|s| s.timestamp);
        let Some(first) = timestamps.next() else {
            return 0.0;
        };
        let (earliest, latest) = timestamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        latest - earliest
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
