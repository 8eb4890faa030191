//! Spectral-energy peak picking tempo estimator
//!
//! 1. Short-time spectrum of Hann-windowed frames
//! 2. Per-frame energy = sum of bin magnitudes
//! 3. Onsets = local energy maxima above `mean * threshold_ratio`, spaced
//!    at least `min_spacing_seconds` apart
//! 4. bpm = 60 / mean onset interval, or 0 with fewer than two onsets
//!
//! All constants are heuristics and live in [`SpectralPeakConfig`].

use super::traits::TempoEstimator;
use crate::error::AudioError;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// How frame indices are converted to seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TimeBase {
    /// One frame index per audio sample (`gap / sample_rate`)
    Samples,

    /// One frame index per hop (`gap * hop / sample_rate`)
    Hops,
}

/// Tunable constants of the spectral estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectralPeakConfig {
    /// FFT frame length in samples (default: 2048)
    pub frame_size: usize,

    /// Hop between frames in samples (default: 512)
    pub hop_size: usize,

    /// Peak must exceed `mean(energy) * threshold_ratio` (default: 1.5)
    pub threshold_ratio: f32,

    /// Minimum time between accepted peaks (default: 0.5 s)
    pub min_spacing_seconds: f32,

    /// Frame index time base (default: Samples)
    pub time_base: TimeBase,
}

impl Default for SpectralPeakConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            threshold_ratio: 1.5,
            min_spacing_seconds: 0.5,
            time_base: TimeBase::Samples,
        }
    }
}

impl SpectralPeakConfig {
    /// Frame indices per second under the configured time base
    pub fn index_rate(&self, sample_rate: u32) -> f32 {
        match self.time_base {
            TimeBase::Samples => sample_rate as f32,
            TimeBase::Hops => sample_rate as f32 / self.hop_size.max(1) as f32,
        }
    }
}

/// Energy peak-picking estimator
#[derive(Debug, Clone, Default)]
pub struct SpectralPeakEstimator {
    config: SpectralPeakConfig,
}

impl SpectralPeakEstimator {
    pub fn new(config: SpectralPeakConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SpectralPeakConfig {
        &self.config
    }
}

impl TempoEstimator for SpectralPeakEstimator {
    fn name(&self) -> &'static str {
        "spectral"
    }

    fn estimate(&self, samples: &[f32], sample_rate: u32) -> Result<f32, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::Engine("sample rate must be positive".to_string()));
        }
        Ok(estimate_bpm_with(samples, sample_rate, &self.config))
    }
}

/// Estimate bpm with the default heuristics
pub fn estimate_bpm(waveform: &[f32], sample_rate: u32) -> f32 {
    estimate_bpm_with(waveform, sample_rate, &SpectralPeakConfig::default())
}

pub fn estimate_bpm_with(waveform: &[f32], sample_rate: u32, config: &SpectralPeakConfig) -> f32 {
    if sample_rate == 0 {
        return 0.0;
    }

    let energy = frame_energy(waveform, config.frame_size, config.hop_size);
    let index_rate = config.index_rate(sample_rate);
    let min_spacing = config.min_spacing_seconds * index_rate;

    let onsets = pick_onsets(&energy, config.threshold_ratio, min_spacing);
    let bpm = bpm_from_onsets(&onsets, index_rate);

    if bpm == 0.0 {
        log::warn!(
            "Degenerate tempo estimate: {} onset(s) in {} frames",
            onsets.len(),
            energy.len()
        );
    } else {
        log::debug!("Estimated {:.1} bpm from {} onsets", bpm, onsets.len());
    }

    bpm
}

/// Summed spectral magnitude of each frame
///
/// A waveform shorter than one frame is zero-padded into a single frame.
pub fn frame_energy(waveform: &[f32], frame_size: usize, hop_size: usize) -> Vec<f32> {
    if waveform.is_empty() || frame_size == 0 || hop_size == 0 {
        return Vec::new();
    }

    let num_frames = if waveform.len() <= frame_size {
        1
    } else {
        1 + (waveform.len() - frame_size) / hop_size
    };

    let window: Vec<f32> = (0..frame_size)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f32 / frame_size as f32).cos())
        .collect();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(frame_size);
    let mut buffer = vec![Complex::new(0.0, 0.0); frame_size];
    let num_bins = frame_size / 2 + 1;

    let mut energy: Vec<f32> = Vec::with_capacity(num_frames);
    for frame in 0..num_frames {
        let start = frame * hop_size;
        for (n, slot) in buffer.iter_mut().enumerate() {
            let sample = waveform.get(start + n).copied().unwrap_or(0.0);
            *slot = Complex::new(sample * window[n], 0.0);
        }

        fft.process(&mut buffer);

        energy.push(buffer[..num_bins].iter().map(|c| c.norm()).sum::<f32>());
    }

    energy
}

/// Accept local maxima above `mean * threshold_ratio`, left to right
///
/// A peak closer than `min_spacing` indices to the previously accepted one
/// is skipped.
pub fn pick_onsets(energy: &[f32], threshold_ratio: f32, min_spacing: f32) -> Vec<usize> {
    if energy.is_empty() {
        return Vec::new();
    }

    let mean = energy.iter().sum::<f32>() / energy.len() as f32;
    let threshold = mean * threshold_ratio;
    let last = energy.len() - 1;

    let mut onsets: Vec<usize> = Vec::new();
    for (i, &value) in energy.iter().enumerate() {
        if value <= threshold {
            continue;
        }

        let rises = i == 0 || value > energy[i - 1];
        let holds = i == last || value >= energy[i + 1];
        if !(rises && holds) {
            continue;
        }

        let spaced = onsets
            .last()
            .map_or(true, |&prev| (i - prev) as f32 >= min_spacing);
        if spaced {
            onsets.push(i);
        }
    }

    onsets
}

/// `60 / mean interval`, 0 when there is no interval
pub fn bpm_from_onsets(onsets: &[usize], index_rate: f32) -> f32 {
    if onsets.len() < 2 || !(index_rate > 0.0) {
        return 0.0;
    }

    let intervals: Vec<f32> = onsets
        .windows(2)
        .map(|w| (w[1] - w[0]) as f32 / index_rate)
        .collect();
    let mean = intervals.iter().sum::<f32>() / intervals.len() as f32;

    if mean > 0.0 {
        60.0 / mean
    } else {
        0.0
    }
}
