use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::features::{
    compute_rms, compute_spectral_features, downsample, SpectralFeatures, WAVEFORM_POINTS,
};
use crate::tempo::estimate_tempo;

/// Analysis exceeding this wall-clock budget logs a warning. Never enforced.
const SOFT_DEADLINE: Duration = Duration::from_millis(2500);

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis worker failed: {0}")]
    WorkerFailed(String),
}

/// Capabilities of the execution environment, resolved once at startup and
/// threaded through explicitly rather than re-probed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalysisCaps {
    pub worker_support: bool,
    pub shared_memory_support: bool,
}

impl AnalysisCaps {
    pub fn full() -> Self {
        Self {
            worker_support: true,
            shared_memory_support: true,
        }
    }

    pub fn none() -> Self {
        Self {
            worker_support: false,
            shared_memory_support: false,
        }
    }

    /// Full-fidelity analysis needs both the worker and the shared sample
    /// buffer; anything less falls back to the reduced synchronous path.
    pub fn supported(self) -> bool {
        self.worker_support && self.shared_memory_support
    }
}

/// One analysis request. The sample buffer is shared with the worker thread
/// rather than copied.
#[derive(Clone, Debug)]
pub struct AnalyzeRequest {
    pub samples: Arc<[f32]>,
    pub sample_rate: u32,
}

/// The single response produced for each [`AnalyzeRequest`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub rms: f32,
    pub waveform: Vec<f32>,
    pub tempo: f64,
    pub spectral: SpectralFeatures,
}

/// Full synchronous feature pass; this is what the worker thread runs.
pub fn analyze_samples(samples: &[f32], sample_rate: u32) -> AnalysisResult {
    AnalysisResult {
        rms: compute_rms(samples),
        waveform: downsample(samples, WAVEFORM_POINTS),
        tempo: estimate_tempo(samples, sample_rate),
        spectral: compute_spectral_features(samples, sample_rate),
    }
}

/// Reduced-fidelity path for environments without worker support: RMS and
/// display waveform only, tempo and spectral features zeroed.
pub fn analyze_samples_reduced(samples: &[f32]) -> AnalysisResult {
    AnalysisResult {
        rms: compute_rms(samples),
        waveform: downsample(samples, WAVEFORM_POINTS),
        tempo: 0.0,
        spectral: SpectralFeatures::default(),
    }
}

struct Job {
    request: AnalyzeRequest,
    reply: oneshot::Sender<AnalysisResult>,
}

/// Owned handle to the dedicated analysis thread.
///
/// Jobs are queued over a channel and each is answered exactly once. There
/// is no cancellation: a dispatched job runs to completion even if the
/// caller stops waiting. Dropping the handle closes the queue and joins the
/// thread.
pub struct AnalysisWorker {
    sender: Option<mpsc::Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl AnalysisWorker {
    pub fn spawn() -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();
        let handle = std::thread::Builder::new()
            .name("beatline-analysis".into())
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    let result =
                        analyze_samples(&job.request.samples, job.request.sample_rate);
                    // The caller may have stopped waiting; that is fine.
                    let _ = job.reply.send(result);
                }
            })
            .expect("spawn analysis worker thread");
        Self {
            sender: Some(sender),
            handle: Some(handle),
        }
    }

    /// Dispatch a request and await its single response.
    pub async fn analyze(&self, request: AnalyzeRequest) -> Result<AnalysisResult, AnalysisError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job = Job {
            request,
            reply: reply_tx,
        };
        self.sender
            .as_ref()
            .ok_or_else(|| AnalysisError::WorkerFailed("worker shut down".into()))?
            .send(job)
            .map_err(|_| AnalysisError::WorkerFailed("worker queue closed".into()))?;

        let started = Instant::now();
        let result = reply_rx
            .await
            .map_err(|_| AnalysisError::WorkerFailed("worker dropped the request".into()))?;
        let elapsed = started.elapsed();
        if elapsed > SOFT_DEADLINE {
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = SOFT_DEADLINE.as_millis() as u64,
                "analysis exceeded soft deadline"
            );
        }
        Ok(result)
    }
}

impl Drop for AnalysisWorker {
    fn drop(&mut self) {
        drop(self.sender.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Front door for track analysis. Owns the worker when the environment
/// supports one; otherwise serves the reduced synchronous path.
pub struct Analyzer {
    caps: AnalysisCaps,
    worker: Option<AnalysisWorker>,
}

impl Analyzer {
    pub fn new(caps: AnalysisCaps) -> Self {
        let worker = if caps.supported() {
            Some(AnalysisWorker::spawn())
        } else {
            debug!(
                worker = caps.worker_support,
                shared_memory = caps.shared_memory_support,
                "analysis running in reduced-fidelity mode"
            );
            None
        };
        Self { caps, worker }
    }

    pub fn caps(&self) -> AnalysisCaps {
        self.caps
    }

    pub async fn analyze(
        &self,
        samples: Arc<[f32]>,
        sample_rate: u32,
    ) -> Result<AnalysisResult, AnalysisError> {
        match &self.worker {
            Some(worker) => {
                worker
                    .analyze(AnalyzeRequest {
                        samples,
                        sample_rate,
                    })
                    .await
            }
            None => Ok(analyze_samples_reduced(&samples)),
        }
    }
}
