//! Offline tempo jobs on a dedicated thread pool
//!
//! Estimation is CPU-bound, so it never runs on the caller's thread. Jobs
//! are queued on a private rayon pool; results are read back by job id
//! (`status`) or consumed from the completion channel. A panicking engine
//! fails its own job only.

use super::decode::decode_to_mono;
use super::traits::TempoEstimator;
use crate::error::AudioError;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::collections::HashMap;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type JobId = u64;

/// State of one tempo job
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Pending,
    Done { bpm: f32 },
    Failed { reason: String },
}

/// Sent on the completion channel when a job finishes
#[derive(Debug, Clone)]
pub struct JobEvent {
    pub id: JobId,

    /// Source file, if the job was submitted from a path
    pub path: Option<PathBuf>,

    pub status: JobStatus,
}

/// Runs tempo estimation jobs off the live path
pub struct TempoWorker {
    pool: ThreadPool,
    estimator: Arc<dyn TempoEstimator>,
    jobs: Arc<RwLock<HashMap<JobId, JobStatus>>>,
    next_id: AtomicU64,
    events: Sender<JobEvent>,
}

impl TempoWorker {
    /// Create a worker with `threads` pool threads (rayon default if None)
    pub fn new(
        estimator: Arc<dyn TempoEstimator>,
        threads: Option<usize>,
    ) -> Result<(Self, Receiver<JobEvent>), AudioError> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("tempo-{}", i));
        if let Some(n) = threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| AudioError::Engine(format!("failed to start tempo pool: {}", e)))?;

        let (events, receiver) = unbounded();

        log::info!(
            "Tempo worker started: {} engine, {} thread(s)",
            estimator.name(),
            pool.current_num_threads()
        );

        Ok((
            Self {
                pool,
                estimator,
                jobs: Arc::new(RwLock::new(HashMap::new())),
                next_id: AtomicU64::new(1),
                events,
            },
            receiver,
        ))
    }

    /// Queue decoding and estimation of an audio file
    pub fn submit_file(&self, path: PathBuf) -> JobId {
        let estimator = Arc::clone(&self.estimator);
        let source = path.clone();
        self.spawn(Some(path), move || {
            let (samples, sample_rate) = decode_to_mono(&source).map_err(|e| AudioError::Decode {
                path: source.clone(),
                reason: format!("{:#}", e),
            })?;
            estimator.estimate(&samples, sample_rate)
        })
    }

    /// Queue estimation of an in-memory waveform
    pub fn submit_waveform(&self, samples: Vec<f32>, sample_rate: u32) -> JobId {
        let estimator = Arc::clone(&self.estimator);
        self.spawn(None, move || estimator.estimate(&samples, sample_rate))
    }

    /// Current state of a job, None for unknown ids
    pub fn status(&self, id: JobId) -> Option<JobStatus> {
        self.jobs.read().get(&id).cloned()
    }

    /// Drop a finished job's status and return it
    ///
    /// Pending and unknown jobs yield None and stay as they are.
    pub fn forget(&self, id: JobId) -> Option<JobStatus> {
        let mut jobs = self.jobs.write();
        let finished = matches!(jobs.get(&id), Some(status) if *status != JobStatus::Pending);
        if finished {
            jobs.remove(&id)
        } else {
            None
        }
    }

    fn spawn<F>(&self, path: Option<PathBuf>, job: F) -> JobId
    where
        F: FnOnce() -> Result<f32, AudioError> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.jobs.write().insert(id, JobStatus::Pending);

        let jobs = Arc::clone(&self.jobs);
        let events = self.events.clone();

        self.pool.spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
                Err(AudioError::Engine(format!(
                    "estimator panicked: {}",
                    panic_message(payload.as_ref())
                )))
            });

            let status = match result {
                Ok(bpm) => {
                    log::info!("Tempo job {} finished: {:.1} bpm", id, bpm);
                    JobStatus::Done { bpm }
                }
                Err(e) => {
                    log::warn!("Tempo job {} failed: {}", id, e);
                    JobStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            jobs.write().insert(id, status.clone());
            // Nobody listening is fine; status stays queryable
            let _ = events.send(JobEvent { id, path, status });
        });

        id
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
