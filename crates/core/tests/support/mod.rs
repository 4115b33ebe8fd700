//! Shared test helpers for `goalpro-core` integration tests.
//!
//! In-memory port implementations so service tests can focus on behaviour
//! instead of storage or HTTP plumbing.

#![allow(dead_code)]

pub mod calendar;
pub mod repositories;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use goalpro_core::{AccessTokenSource, CalendarSyncService, WebhookService};
use goalpro_domain::{IntegrationCredential, SyncRecord, SyncStatus, TimeBlock};

pub use calendar::{MockCalendarProvider, MockOAuthProvider, RecordingSyncQueue};
pub use repositories::{
    MockCredentialRepository, MockSyncRecordRepository, MockSyncSettingsRepository,
    MockTimeBlockRepository, MockWebhookChannelRepository,
};

/// Every port mock wired together.
#[derive(Clone, Default)]
pub struct Harness {
    pub credentials: MockCredentialRepository,
    pub records: MockSyncRecordRepository,
    pub channels: MockWebhookChannelRepository,
    pub settings: MockSyncSettingsRepository,
    pub time_blocks: MockTimeBlockRepository,
    pub calendar: MockCalendarProvider,
    pub oauth: MockOAuthProvider,
    pub queue: RecordingSyncQueue,
}

impl Harness {
    pub fn new() -> Self {
        Self { oauth: MockOAuthProvider::configured(), ..Self::default() }
    }

    pub fn tokens(&self) -> Arc<AccessTokenSource> {
        Arc::new(AccessTokenSource::new(
            Arc::new(self.credentials.clone()),
            Arc::new(self.oauth.clone()),
        ))
    }

    pub fn sync_service(&self) -> CalendarSyncService {
        CalendarSyncService::new(
            self.tokens(),
            Arc::new(self.calendar.clone()),
            Arc::new(self.records.clone()),
            Arc::new(self.time_blocks.clone()),
            Arc::new(self.settings.clone()),
        )
    }

    pub fn webhook_service(&self) -> WebhookService {
        WebhookService::new(
            Arc::new(self.channels.clone()),
            Arc::new(self.settings.clone()),
            Arc::new(self.records.clone()),
            Arc::new(self.queue.clone()),
        )
    }

    /// Store an active, long-lived Google credential for `user_id`.
    pub fn connect(&self, user_id: &str) {
        self.credentials.put(credential(user_id, Some(Utc::now() + Duration::hours(1))));
    }
}

pub fn credential(user_id: &str, token_expiry: Option<DateTime<Utc>>) -> IntegrationCredential {
    IntegrationCredential {
        user_id: user_id.to_string(),
        provider: "google".to_string(),
        access_token: "access-token".to_string(),
        refresh_token: Some("refresh-token".to_string()),
        token_expiry,
        scopes: vec!["https://www.googleapis.com/auth/calendar.events".to_string()],
        provider_email: Some(format!("{user_id}@example.com")),
        is_active: true,
    }
}

pub fn time_block(user_id: &str, id: &str, updated_at: DateTime<Utc>) -> TimeBlock {
    let start = Utc::now() + Duration::days(1);
    TimeBlock {
        id: id.to_string(),
        user_id: user_id.to_string(),
        title: format!("Block {id}"),
        description: None,
        start_time: start,
        end_time: start + Duration::hours(1),
        google_event_id: None,
        updated_at,
    }
}

pub fn sync_record(
    user_id: &str,
    event_id: &str,
    block_id: &str,
    status: SyncStatus,
    last_synced_at: DateTime<Utc>,
) -> SyncRecord {
    SyncRecord {
        id: format!("rec-{event_id}"),
        user_id: user_id.to_string(),
        event_id: event_id.to_string(),
        local_entity_id: block_id.to_string(),
        local_entity_type: "time_block".to_string(),
        sync_status: status,
        last_synced_at,
    }
}
