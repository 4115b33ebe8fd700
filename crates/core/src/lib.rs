//! # Goal Achiever Pro Core
//!
//! Business logic for the calendar sync boundary. No database, HTTP, or
//! provider code lives here; every external collaborator is a trait.
//!
//! This crate contains:
//! - Port interfaces for repositories, the Google provider and the sync queue
//! - The sync executor, webhook handling, OAuth connection flow and settings
//! - Request identity resolution
//!
//! ## Architecture Principles
//! - Only depends on `goalpro-domain`
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod calendar;
pub mod identity;
pub mod schedule;
pub mod sync;

pub use calendar::channels::ChannelService;
pub use calendar::connection::{
    CallbackOutcome, CallbackParams, ConnectionService, ConnectionStatus,
};
pub use calendar::ports::{
    CalendarProvider, CredentialRepository, OAuthProvider, SyncRecordRepository,
    SyncSettingsRepository, TokenGrant, WatchRequest, WatchResponse, WebhookChannelRepository,
};
pub use calendar::settings::SyncSettingsService;
pub use calendar::state::OAuthStateSigner;
pub use calendar::sync_service::CalendarSyncService;
pub use calendar::tokens::AccessTokenSource;
pub use calendar::webhook::{WebhookNotification, WebhookOutcome, WebhookService};
pub use identity::ports::{SessionIdentity, SessionResolver};
pub use identity::{AnonymousIdentityPolicy, PrincipalResolver};
pub use schedule::ports::TimeBlockRepository;
pub use schedule::TimeBlockService;
pub use sync::ports::{EnqueueOutcome, SyncJobQueue, SyncRunner, SyncTrigger};
