//! Port interfaces for queued sync jobs

use std::fmt;

use async_trait::async_trait;
use goalpro_domain::{Result, SyncReport};

/// Why a sync job was queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Webhook,
    Schedule,
    Admin,
}

impl SyncTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Webhook => "webhook",
            Self::Schedule => "schedule",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for SyncTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of offering a job to the sync queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued,
    /// A job for the same user was already waiting; nothing new was queued.
    Coalesced,
}

/// Queue of per-user sync jobs consumed by a background worker.
#[async_trait]
pub trait SyncJobQueue: Send + Sync {
    async fn enqueue(&self, user_id: &str, trigger: SyncTrigger) -> Result<EnqueueOutcome>;
}

/// Runs one full sync pass for a user.
#[async_trait]
pub trait SyncRunner: Send + Sync {
    async fn run_sync(&self, user_id: &str) -> Result<SyncReport>;
}
