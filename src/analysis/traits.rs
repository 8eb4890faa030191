//! Tempo estimator trait

use crate::error::AudioError;

/// Offline tempo estimator - allows swapping between analysis engines
pub trait TempoEstimator: Send + Sync {
    /// Short engine name for logs and CLI output
    fn name(&self) -> &'static str;

    /// Estimate the tempo (bpm) of a mono waveform
    ///
    /// Returns `Ok(0.0)` when the waveform holds no detectable beats.
    fn estimate(&self, samples: &[f32], sample_rate: u32) -> Result<f32, AudioError>;
}
