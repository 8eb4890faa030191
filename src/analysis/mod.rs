//! Offline audio tempo estimation
//!
//! Independent of the live motion path. Estimators sit behind the
//! [`TempoEstimator`] trait so the spectral heuristic and the stratum-dsp
//! engine can be swapped, and [`TempoWorker`] keeps all of it on its own
//! thread pool.

mod decode;
mod spectral;
mod stratum;
mod traits;
mod worker;

pub use decode::{decode_to_mono, MonoStream};
pub use spectral::{
    bpm_from_onsets, estimate_bpm, estimate_bpm_with, frame_energy, pick_onsets, SpectralPeakConfig,
    SpectralPeakEstimator, TimeBase,
};
pub use stratum::StratumEstimator;
pub use traits::TempoEstimator;
pub use worker::{JobEvent, JobId, JobStatus, TempoWorker};
