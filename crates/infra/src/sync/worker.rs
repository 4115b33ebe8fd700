//! Sync worker draining the job queue.
//!
//! One task, one job at a time: syncs for the same user never overlap. Each
//! job runs under `job_timeout`; failures and timeouts are logged and the job
//! is dropped. Nothing is retried.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use goalpro_infra::sync::{sync_queue, SyncWorker, SyncWorkerConfig};
//!
//! # async fn example() -> goalpro_infra::scheduling::SchedulerResult<()> {
//! # let runner = todo!();
//! let (queue, receiver) = sync_queue(256);
//! let mut worker = SyncWorker::new(receiver, runner, SyncWorkerConfig::default());
//!
//! worker.start()?;
//! // ... hand `queue` to the webhook service ...
//! worker.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use goalpro_core::SyncRunner;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::queue::{SyncJob, SyncJobReceiver};
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the sync worker.
#[derive(Debug, Clone)]
pub struct SyncWorkerConfig {
    /// Timeout for a single sync pass
    pub job_timeout: Duration,
    /// Join timeout when stopping
    pub join_timeout: Duration,
}

impl Default for SyncWorkerConfig {
    fn default() -> Self {
        Self { job_timeout: Duration::from_secs(120), join_timeout: Duration::from_secs(5) }
    }
}

/// Sync worker with explicit lifecycle management.
pub struct SyncWorker {
    receiver: Arc<Mutex<SyncJobReceiver>>,
    runner: Arc<dyn SyncRunner>,
    config: SyncWorkerConfig,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl SyncWorker {
    pub fn new(
        receiver: SyncJobReceiver,
        runner: Arc<dyn SyncRunner>,
        config: SyncWorkerConfig,
    ) -> Self {
        Self {
            receiver: Arc::new(Mutex::new(receiver)),
            runner,
            config,
            cancellation: CancellationToken::new(),
            task_handle: None,
        }
    }

    /// Spawn the processing task.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let receiver = Arc::clone(&self.receiver);
        let runner = Arc::clone(&self.runner);
        let job_timeout = self.config.job_timeout;
        let cancel = self.cancellation.clone();

        self.task_handle = Some(tokio::spawn(async move {
            Self::process_loop(receiver, runner, job_timeout, cancel).await;
        }));

        info!("Sync worker started");
        Ok(())
    }

    /// Cancel the processing task and wait for it to finish.
    ///
    /// A pass already in flight is abandoned at its next await point.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let Some(handle) = self.task_handle.take() else {
            return Err(SchedulerError::NotRunning);
        };

        self.cancellation.cancel();

        let join_timeout = self.config.join_timeout;
        tokio::time::timeout(join_timeout, handle)
            .await
            .map_err(|_| SchedulerError::Timeout { duration: join_timeout })?
            .map_err(|e| SchedulerError::TaskJoinFailed(e.to_string()))?;

        info!("Sync worker stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    async fn process_loop(
        receiver: Arc<Mutex<SyncJobReceiver>>,
        runner: Arc<dyn SyncRunner>,
        job_timeout: Duration,
        cancel: CancellationToken,
    ) {
        let mut receiver = receiver.lock().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Sync worker loop cancelled");
                    break;
                }
                job = receiver.recv() => {
                    let Some(job) = job else {
                        debug!("Sync queue closed");
                        break;
                    };
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            warn!(user_id = %job.user_id, "Sync pass abandoned on shutdown");
                            break;
                        }
                        _ = Self::run_job(runner.as_ref(), &job, job_timeout) => {}
                    }
                }
            }
        }
    }

    async fn run_job(runner: &dyn SyncRunner, job: &SyncJob, job_timeout: Duration) {
        let started = Instant::now();
        let waited_ms = (chrono::Utc::now() - job.enqueued_at).num_milliseconds();

        match tokio::time::timeout(job_timeout, runner.run_sync(&job.user_id)).await {
            Ok(Ok(report)) => info!(
                user_id = %job.user_id,
                trigger = %job.trigger,
                waited_ms,
                elapsed_ms = started.elapsed().as_millis() as u64,
                synced = report.synced,
                deleted = report.deleted,
                conflicts = report.conflicts,
                errors = report.errors,
                "Queued sync finished"
            ),
            Ok(Err(err)) => error!(
                user_id = %job.user_id,
                trigger = %job.trigger,
                error = %err,
                "Queued sync failed"
            ),
            Err(_) => warn!(
                user_id = %job.user_id,
                timeout_secs = job_timeout.as_secs(),
                "Queued sync timed out"
            ),
        }
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}
