//! Bounded worker pool for background training jobs.
//!
//! Starting a job must not block the request that submits it, and the
//! number of concurrently running model searches must stay bounded.
//! Submissions go through a bounded queue; a full queue is backpressure
//! the caller has to surface, not something to absorb.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use tabforge_core::training::TrainingArgs;

use crate::orchestrator::Orchestrator;

/// Default number of concurrent pipeline workers.
pub const DEFAULT_WORKERS: usize = 2;

/// Default queue capacity for jobs waiting on a worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 8;

/// The queue is at capacity; the job was not accepted.
#[derive(Debug, thiserror::Error)]
#[error("Job queue is full")]
pub struct QueueFull;

/// Cheaply cloneable handle for submitting jobs to the pool.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<TrainingArgs>,
}

impl JobQueue {
    /// Enqueue a job without waiting. Fails fast when the pool is
    /// saturated so the caller can reject the request.
    pub fn submit(&self, args: TrainingArgs) -> Result<(), QueueFull> {
        self.tx.try_send(args).map_err(|_| QueueFull)
    }
}

/// Handles to the running workers, for graceful shutdown.
pub struct WorkerPool {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Stop accepting queued work and wait for in-flight jobs to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for handle in self.handles {
            let _ = handle.await;
        }
        tracing::info!("Worker pool shut down");
    }
}

/// Start `workers` pipeline workers draining a queue of `capacity` jobs.
pub fn start(
    orchestrator: Arc<Orchestrator>,
    workers: usize,
    capacity: usize,
) -> (JobQueue, WorkerPool) {
    let (tx, rx) = mpsc::channel::<TrainingArgs>(capacity.max(1));
    let rx = Arc::new(Mutex::new(rx));
    let cancel = CancellationToken::new();

    let handles = (0..workers)
        .map(|worker_id| {
            let orchestrator = Arc::clone(&orchestrator);
            let rx = Arc::clone(&rx);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tracing::info!(worker_id, "Pipeline worker started");
                loop {
                    let job = tokio::select! {
                        _ = cancel.cancelled() => break,
                        job = async { rx.lock().await.recv().await } => job,
                    };
                    match job {
                        Some(args) => {
                            let token = args.token.clone();
                            if let Err(e) = orchestrator.run(args).await {
                                // Already journaled by the orchestrator;
                                // log and move on to the next job.
                                tracing::error!(worker_id, token, error = %e, "Job failed");
                            }
                        }
                        None => break,
                    }
                }
                tracing::info!(worker_id, "Pipeline worker stopped");
            })
        })
        .collect();

    (JobQueue { tx }, WorkerPool { cancel, handles })
}
