//! # Goal Achiever Pro Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite repositories behind an r2d2 pool
//! - Google Calendar and Google OAuth HTTP clients
//! - Configuration loading
//! - The sync job queue, its worker, and the auto-sync scheduler
//!
//! ## Architecture
//! - Implements traits defined in `goalpro-core`
//! - Depends on `goalpro-domain` and `goalpro-core`
//! - Contains all "impure" code (I/O, network, background tasks)

pub mod config;
pub mod database;
pub mod errors;
pub mod integrations;
pub mod scheduling;
pub mod sync;

// Re-export commonly used items
pub use database::*;
pub use errors::InfraError;
pub use integrations::google::{GoogleCalendarClient, GoogleOAuthClient};
pub use scheduling::{AutoSyncScheduler, AutoSyncSchedulerConfig, SchedulerError};
pub use sync::{sync_queue, SyncWorker, SyncWorkerConfig, TokioSyncQueue};
