//! Events-per-minute normalization

use serde::{Deserialize, Serialize};

/// Where the time span for rate normalization comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SpanSource {
    /// Fixed assumed duration per batch (`packet_span_seconds`)
    Fixed,

    /// Actual `latest - earliest` timestamp of the live window
    Window,
}

/// Event count normalized over a time span
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateMeasurement {
    pub count: usize,
    pub span_seconds: f64,
    pub rate_per_minute: f64,
}

/// `count / span * 60`, defined as 0 when there is no usable span
pub fn estimate_rate(count: usize, span_seconds: f64) -> RateMeasurement {
    let rate_per_minute = if count == 0 || !(span_seconds > 0.0) {
        0.0
    } else {
        count as f64 / span_seconds * 60.0
    };

    RateMeasurement {
        count,
        span_seconds,
        rate_per_minute,
    }
}
