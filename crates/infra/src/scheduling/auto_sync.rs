//! Cron-driven auto-sync scheduler.
//!
//! Each tick loads the users with `auto_sync_enabled`, keeps those whose
//! `last_synced_at` is older than their `sync_interval_minutes`, and enqueues
//! a sync job for each. The worker coalesces duplicates, so a tick that fires
//! while a user's previous job is still queued is harmless.
//!
//! A pass that fails before reconciling never moves `last_synced_at`, so the
//! scheduler also remembers when it last queued each user and waits a full
//! interval before queueing that user again.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use goalpro_infra::scheduling::{AutoSyncScheduler, AutoSyncSchedulerConfig, SchedulerResult};
//!
//! # async fn example() -> SchedulerResult<()> {
//! # let settings = todo!();
//! # let queue = todo!();
//! let mut scheduler = AutoSyncScheduler::new(
//!     AutoSyncSchedulerConfig { cron_expression: "0 * * * * *".into(), ..Default::default() },
//!     settings,
//!     queue,
//! );
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use goalpro_core::{EnqueueOutcome, SyncJobQueue, SyncSettingsRepository, SyncTrigger};
use goalpro_domain::{Result, SyncSettings};
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the auto-sync scheduler.
#[derive(Debug, Clone)]
pub struct AutoSyncSchedulerConfig {
    /// Cron expression (with seconds) describing the tick schedule.
    pub cron_expression: String,
    /// Timeout applied to one tick.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
}

impl Default for AutoSyncSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: "0 * * * * *".into(), // every minute
            job_timeout: Duration::from_secs(30),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
        }
    }
}

/// Auto-sync scheduler with explicit lifecycle management.
pub struct AutoSyncScheduler {
    scheduler: Option<JobScheduler>,
    config: AutoSyncSchedulerConfig,
    cancellation: CancellationToken,
    settings: Arc<dyn SyncSettingsRepository>,
    queue: Arc<dyn SyncJobQueue>,
    attempts: Arc<ScheduledAttempts>,
}

impl AutoSyncScheduler {
    pub fn new(
        config: AutoSyncSchedulerConfig,
        settings: Arc<dyn SyncSettingsRepository>,
        queue: Arc<dyn SyncJobQueue>,
    ) -> Self {
        Self {
            scheduler: None,
            config,
            cancellation: CancellationToken::new(),
            settings,
            queue,
            attempts: Arc::default(),
        }
    }

    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        tokio::time::timeout(start_timeout, scheduler.start())
            .await
            .map_err(|_| SchedulerError::Timeout { duration: start_timeout })?
            .map_err(|e| SchedulerError::StartFailed(e.to_string()))?;

        self.scheduler = Some(scheduler);
        info!(cron = %self.config.cron_expression, "Auto-sync scheduler started");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let Some(mut scheduler) = self.scheduler.take() else {
            return Err(SchedulerError::NotRunning);
        };

        self.cancellation.cancel();

        let stop_timeout = self.config.stop_timeout;
        tokio::time::timeout(stop_timeout, async move { scheduler.shutdown().await })
            .await
            .map_err(|_| SchedulerError::Timeout { duration: stop_timeout })?
            .map_err(|e| SchedulerError::StopFailed(e.to_string()))?;

        info!("Auto-sync scheduler stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler =
            JobScheduler::new().await.map_err(|e| SchedulerError::CreationFailed(e.to_string()))?;

        let settings = Arc::clone(&self.settings);
        let queue = Arc::clone(&self.queue);
        let attempts = Arc::clone(&self.attempts);
        let cancel = self.cancellation.clone();
        let job_timeout = self.config.job_timeout;

        let job = Job::new_async(self.config.cron_expression.as_str(), move |_id, _lock| {
            let settings = Arc::clone(&settings);
            let queue = Arc::clone(&queue);
            let attempts = Arc::clone(&attempts);
            let cancel = cancel.clone();

            Box::pin(async move {
                if cancel.is_cancelled() {
                    return;
                }

                match tokio::time::timeout(
                    job_timeout,
                    enqueue_due_syncs(
                        settings.as_ref(),
                        queue.as_ref(),
                        attempts.as_ref(),
                        Utc::now(),
                    ),
                )
                .await
                {
                    Ok(Ok(queued)) => debug!(queued, "Auto-sync tick finished"),
                    Ok(Err(err)) => error!(error = %err, "Auto-sync tick failed"),
                    Err(_) => {
                        warn!(timeout_secs = job_timeout.as_secs(), "Auto-sync tick timed out");
                    }
                }
            })
        })
        .map_err(|e| SchedulerError::JobRegistrationFailed(e.to_string()))?;

        scheduler
            .add(job)
            .await
            .map_err(|e| SchedulerError::JobRegistrationFailed(e.to_string()))?;

        Ok(scheduler)
    }
}

impl Drop for AutoSyncScheduler {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

/// When the scheduler last queued each user, kept for the process lifetime.
#[derive(Debug, Default)]
pub struct ScheduledAttempts {
    last_queued: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl ScheduledAttempts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `settings` is due and the user was not queued within its interval.
    pub fn is_due(&self, settings: &SyncSettings, now: DateTime<Utc>) -> bool {
        if !settings.auto_sync_due(now) {
            return false;
        }
        let interval = chrono::Duration::minutes(i64::from(settings.sync_interval_minutes));
        self.lock().get(&settings.user_id).is_none_or(|last| now - *last >= interval)
    }

    pub fn record(&self, user_id: &str, at: DateTime<Utc>) {
        self.lock().insert(user_id.to_string(), at);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.last_queued.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Enqueue a scheduled sync for every user due at `now`.
///
/// Returns the number of newly queued jobs. Enqueue failures are logged and
/// skipped so one full queue does not starve the remaining users.
pub async fn enqueue_due_syncs(
    settings: &dyn SyncSettingsRepository,
    queue: &dyn SyncJobQueue,
    attempts: &ScheduledAttempts,
    now: DateTime<Utc>,
) -> Result<usize> {
    let candidates = settings.list_auto_sync_enabled().await?;
    let mut queued = 0;

    for row in candidates.iter().filter(|row| attempts.is_due(row, now)) {
        match queue.enqueue(&row.user_id, SyncTrigger::Schedule).await {
            Ok(EnqueueOutcome::Queued) => {
                attempts.record(&row.user_id, now);
                queued += 1;
            }
            Ok(EnqueueOutcome::Coalesced) => {
                debug!(user_id = %row.user_id, "Auto-sync already pending");
            }
            Err(err) => warn!(user_id = %row.user_id, error = %err, "Failed to enqueue auto-sync"),
        }
    }

    Ok(queued)
}
