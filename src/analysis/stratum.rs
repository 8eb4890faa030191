//! Cross-check tempo engine backed by stratum-dsp

use super::traits::TempoEstimator;
use crate::error::AudioError;
use stratum_dsp::{analyze_audio, AnalysisConfig};

/// Shortest waveform (in seconds) handed to stratum-dsp
const MIN_SECONDS: f32 = 1.0;

/// Tempo estimator using stratum-dsp's comb-filter/tempogram analysis
pub struct StratumEstimator {
    /// Minimum BPM for range folding
    min_bpm: f32,
    /// Maximum BPM for range folding
    max_bpm: f32,
}

impl StratumEstimator {
    pub fn new() -> Self {
        Self {
            min_bpm: 70.0,
            max_bpm: 170.0,
        }
    }

    /// Fold results into `[min, max]` by doubling or halving
    pub fn with_bpm_range(mut self, min: f32, max: f32) -> Self {
        self.min_bpm = min;
        self.max_bpm = max;
        self
    }

    /// Octave-shift `bpm` toward the configured range
    ///
    /// Stops short when the next shift would overshoot the other bound.
    fn fold_into_range(&self, bpm: f32) -> f32 {
        if bpm <= 0.0 || self.min_bpm <= 0.0 || self.max_bpm <= 0.0 {
            return bpm;
        }

        let mut folded = bpm;
        while folded < self.min_bpm && folded * 2.0 <= self.max_bpm {
            folded *= 2.0;
        }
        while folded > self.max_bpm && folded / 2.0 >= self.min_bpm {
            folded /= 2.0;
        }

        if folded != bpm {
            log::debug!("Folded {:.1} bpm into {:.1}", bpm, folded);
        }
        folded
    }
}

impl Default for StratumEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TempoEstimator for StratumEstimator {
    fn name(&self) -> &'static str {
        "stratum"
    }

    fn estimate(&self, samples: &[f32], sample_rate: u32) -> Result<f32, AudioError> {
        if (samples.len() as f32) < sample_rate as f32 * MIN_SECONDS {
            log::warn!("Audio too short for stratum analysis ({} samples)", samples.len());
            return Ok(0.0);
        }

        let result = analyze_audio(samples, sample_rate, AnalysisConfig::default())
            .map_err(|e| AudioError::Engine(e.to_string()))?;

        Ok(self.fold_into_range(result.bpm))
    }
}
