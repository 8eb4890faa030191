//! Service configuration

use crate::error::ConfigurationError;
use crate::motion::{SpanSource, WindowMode};
use crate::tempo::TempoBuckets;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the live service and offline analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Samples older than this are evicted from the window (default: 5.0)
    pub window_duration_seconds: f64,

    /// Assumed duration of one batch when `span_source` is `fixed` (default: 5.0)
    pub packet_span_seconds: f64,

    /// Time span used for rate normalization (default: fixed)
    pub span_source: SpanSource,

    /// Whether the window keeps samples across batches (default: stateless)
    pub window_mode: WindowMode,

    /// z value a jump must rise to (default: 0.0)
    pub jump_threshold: f64,

    /// Minimum spacing between jumps, in sample indices (default: 1)
    pub jump_min_interval: usize,

    /// Supported tempos in tie-break order (default: 104, 120, 130, 140)
    pub tempo_buckets: Vec<u32>,

    /// Catalog root, one subfolder per bucket (default: ./songs)
    pub catalog_root: PathBuf,

    /// Where extracted cover art goes (default: `<catalog_root>/covers`)
    pub cover_dir: Option<PathBuf>,

    /// Seed for track selection; entropy when unset
    pub rng_seed: Option<u64>,

    /// Threads for offline tempo analysis; rayon default when unset
    pub analysis_threads: Option<usize>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            window_duration_seconds: 5.0,
            packet_span_seconds: 5.0,
            span_source: SpanSource::Fixed,
            window_mode: WindowMode::Stateless,
            jump_threshold: 0.0,
            jump_min_interval: 1,
            tempo_buckets: vec![104, 120, 130, 140],
            catalog_root: PathBuf::from("songs"),
            cover_dir: None,
            rng_seed: None,
            analysis_threads: None,
        }
    }
}

impl ServiceConfig {
    /// Create a configuration rooted at `catalog_root`
    pub fn new(catalog_root: PathBuf) -> Self {
        Self {
            catalog_root,
            ..Self::default()
        }
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let unreadable = |reason: String| ConfigurationError::Unreadable {
            path: path.to_path_buf(),
            reason,
        };

        let text = std::fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| unreadable(e.to_string()))
    }

    /// Set tempo buckets
    pub fn with_buckets(mut self, buckets: Vec<u32>) -> Self {
        self.tempo_buckets = buckets;
        self
    }

    /// Set jump detection operating point
    pub fn with_jump_detection(mut self, threshold: f64, min_interval: usize) -> Self {
        self.jump_threshold = threshold;
        self.jump_min_interval = min_interval;
        self
    }

    /// Set window retention mode
    pub fn with_window_mode(mut self, mode: WindowMode) -> Self {
        self.window_mode = mode;
        self
    }

    /// Set rate span source
    pub fn with_span_source(mut self, source: SpanSource) -> Self {
        self.span_source = source;
        self
    }

    /// Set fixed per-batch span
    pub fn with_packet_span(mut self, seconds: f64) -> Self {
        self.packet_span_seconds = seconds;
        self
    }

    /// Set window duration
    pub fn with_window_duration(mut self, seconds: f64) -> Self {
        self.window_duration_seconds = seconds;
        self
    }

    /// Seed track selection
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Expand `~` in configured paths
    pub fn expand_paths(mut self) -> Self {
        self.catalog_root = expand(&self.catalog_root);
        self.cover_dir = self.cover_dir.as_deref().map(expand);
        self
    }

    pub fn cover_dir(&self) -> PathBuf {
        self.cover_dir
            .clone()
            .unwrap_or_else(|| self.catalog_root.join("covers"))
    }

    /// Check startup invariants and build the bucket set
    pub fn validate(&self) -> Result<TempoBuckets, ConfigurationError> {
        if !(self.window_duration_seconds > 0.0) {
            return Err(ConfigurationError::NonPositiveWindow(self.window_duration_seconds));
        }
        TempoBuckets::new(self.tempo_buckets.clone())
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}
