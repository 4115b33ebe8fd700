//! Scheduling infrastructure for automated task execution
//!
//! The auto-sync scheduler enqueues a sync for every user whose settings say
//! one is due. It follows the same lifecycle rules as the sync worker:
//! explicit start/stop, tracked cancellation, and timeouts on every await.

pub mod auto_sync;
pub mod error;

pub use auto_sync::{
    enqueue_due_syncs, AutoSyncScheduler, AutoSyncSchedulerConfig, ScheduledAttempts,
};
pub use error::{SchedulerError, SchedulerResult};
