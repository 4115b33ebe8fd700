//! Background sync execution.
//!
//! Webhook and scheduler triggers enqueue jobs on a bounded in-process queue;
//! a single worker task drains it and runs each sync under a timeout.

pub mod queue;
pub mod worker;

pub use queue::{sync_queue, SyncJob, SyncJobReceiver, TokioSyncQueue};
pub use worker::{SyncWorker, SyncWorkerConfig};
