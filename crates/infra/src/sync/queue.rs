//! Bounded tokio-mpsc sync job queue with per-user coalescing.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goalpro_core::{EnqueueOutcome, SyncJobQueue, SyncTrigger};
use goalpro_domain::{GoalProError, Result};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

/// One queued sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJob {
    pub user_id: String,
    pub trigger: SyncTrigger,
    pub enqueued_at: DateTime<Utc>,
}

type PendingUsers = Arc<Mutex<HashSet<String>>>;

fn lock(pending: &PendingUsers) -> std::sync::MutexGuard<'_, HashSet<String>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Create a connected queue/receiver pair with the given capacity.
pub fn sync_queue(capacity: usize) -> (TokioSyncQueue, SyncJobReceiver) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    let pending: PendingUsers = Arc::default();

    (
        TokioSyncQueue { sender, pending: Arc::clone(&pending) },
        SyncJobReceiver { receiver, pending },
    )
}

/// Producer side. A user with a job already waiting is not queued twice.
#[derive(Clone)]
pub struct TokioSyncQueue {
    sender: mpsc::Sender<SyncJob>,
    pending: PendingUsers,
}

impl TokioSyncQueue {
    /// Number of users with a job waiting.
    pub fn pending_len(&self) -> usize {
        lock(&self.pending).len()
    }
}

#[async_trait]
impl SyncJobQueue for TokioSyncQueue {
    async fn enqueue(&self, user_id: &str, trigger: SyncTrigger) -> Result<EnqueueOutcome> {
        let mut pending = lock(&self.pending);
        if pending.contains(user_id) {
            debug!(user_id, %trigger, "sync already pending, coalesced");
            return Ok(EnqueueOutcome::Coalesced);
        }

        let job = SyncJob { user_id: user_id.to_string(), trigger, enqueued_at: Utc::now() };
        match self.sender.try_send(job) {
            Ok(()) => {
                pending.insert(user_id.to_string());
                debug!(user_id, %trigger, "sync job queued");
                Ok(EnqueueOutcome::Queued)
            }
            Err(TrySendError::Full(_)) => {
                Err(GoalProError::Internal("sync queue is full".to_string()))
            }
            Err(TrySendError::Closed(_)) => {
                Err(GoalProError::Internal("sync worker is not accepting jobs".to_string()))
            }
        }
    }
}

/// Consumer side, owned by the worker.
pub struct SyncJobReceiver {
    receiver: mpsc::Receiver<SyncJob>,
    pending: PendingUsers,
}

impl SyncJobReceiver {
    /// Next job, or `None` once every producer is dropped.
    ///
    /// The user leaves the pending set as soon as the job is taken, so a
    /// notification arriving mid-pass schedules a fresh pass.
    pub async fn recv(&mut self) -> Option<SyncJob> {
        let job = self.receiver.recv().await?;
        lock(&self.pending).remove(&job.user_id);
        Some(job)
    }
}
