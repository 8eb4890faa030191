//! Motion side of the live pipeline
//!
//! Samples are buffered in a [`SampleWindow`], scanned for jumps and the
//! jump count is normalized into a per-minute rate.

mod jumps;
mod rate;
mod window;

pub use jumps::{detect_jumps, JumpDetection};
pub use rate::{estimate_rate, RateMeasurement, SpanSource};
pub use window::{SampleWindow, WindowMode};
