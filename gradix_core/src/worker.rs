//! Runs analyses off the calling thread. One job goes in and exactly one
//! outcome comes out, there is no streaming and no cancellation. A caller
//! that no longer wants the answer just stops waiting for it.

use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    time::Duration,
};

use log::{debug, warn};
use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    analysis::analyse_gpx_str,
    config::{AnalysisConfig, SmoothingLevel},
    error::{ErrorPayload, WorkerError},
    model::AnalysisResult,
};

/// A request to analyse one GPX document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisJob {
    pub gpx_text: String,
    pub file_name: Option<String>,
    #[serde(default)]
    pub smoothing: SmoothingLevel,
}

/// The response to an AnalysisJob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobOutcome {
    Success { data: Box<AnalysisResult> },
    Error { error: ErrorPayload },
}

impl AnalysisJob {
    pub fn new<S: Into<String>>(gpx_text: S, file_name: Option<String>, smoothing: SmoothingLevel) -> Self {
        Self {
            gpx_text: gpx_text.into(),
            file_name,
            smoothing,
        }
    }

    /// Runs the job on the current thread. Everything in `base` except the
    /// smoothing level, which comes from the job, is used as is.
    pub fn run(&self, base: &AnalysisConfig) -> JobOutcome {
        let config = AnalysisConfig {
            smoothing: self.smoothing,
            ..*base
        };

        match analyse_gpx_str(&self.gpx_text, self.file_name.as_deref(), &config) {
            Ok(result) => JobOutcome::Success {
                data: Box::new(result),
            },
            Err(err) => {
                warn!(
                    "Analysis of {} failed: {}",
                    self.file_name.as_deref().unwrap_or("<unnamed>"),
                    err
                );
                JobOutcome::Error { error: err.into() }
            }
        }
    }
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success { .. })
    }

    /// Converts to a plain Result.
    pub fn into_result(self) -> Result<AnalysisResult, ErrorPayload> {
        match self {
            JobOutcome::Success { data } => Ok(*data),
            JobOutcome::Error { error } => Err(error),
        }
    }
}

/// A pool of background threads that analyses jobs.
pub struct AnalysisWorker {
    pool: ThreadPool,
    config: AnalysisConfig,
}

/// The pending outcome of a submitted job.
#[derive(Debug)]
pub struct JobHandle {
    receiver: Receiver<JobOutcome>,
}

impl AnalysisWorker {
    /// Creates a worker with `num_threads` threads. 0 lets rayon choose,
    /// which is normally one per CPU.
    pub fn new(num_threads: usize, config: AnalysisConfig) -> Result<Self, WorkerError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|idx| format!("gradix-worker-{idx}"))
            .build()?;

        debug!("Started analysis worker with {} threads", pool.current_num_threads());
        Ok(Self { pool, config })
    }

    /// Queues the job and returns immediately.
    pub fn submit(&self, job: AnalysisJob) -> JobHandle {
        let (sender, receiver) = mpsc::sync_channel(1);
        let config = self.config;

        self.pool.spawn(move || {
            let outcome = job.run(&config);
            // The receiver has gone if the caller gave up waiting.
            if sender.send(outcome).is_err() {
                debug!("Discarding outcome of abandoned job");
            }
        });

        JobHandle { receiver }
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl JobHandle {
    /// Blocks until the job is finished.
    pub fn wait(self) -> Result<JobOutcome, WorkerError> {
        self.receiver.recv().map_err(|_| WorkerError::Disconnected)
    }

    /// Blocks until the job is finished or `timeout` expires. On timeout the
    /// handle is given back so the caller can decide whether to keep waiting.
    pub fn wait_timeout(self, timeout: Duration) -> Result<JobOutcome, WaitError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(outcome) => Ok(outcome),
            Err(RecvTimeoutError::Timeout) => Err(WaitError::TimedOut(self)),
            Err(RecvTimeoutError::Disconnected) => Err(WorkerError::Disconnected.into()),
        }
    }
}

/// Why [`JobHandle::wait_timeout`] did not return an outcome.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("Timed out waiting for the analysis to finish")]
    TimedOut(JobHandle),
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

/// Analyses several independent documents in parallel on the global rayon
/// pool. The outcomes are in the same order as the jobs.
pub fn analyse_batch(jobs: &[AnalysisJob], config: &AnalysisConfig) -> Vec<JobOutcome> {
    debug!("Analysing a batch of {} jobs", jobs.len());
    jobs.par_iter().map(|job| job.run(config)).collect()
}
