//! Mock repository implementations for testing
//!
//! In-memory versions of every core repository port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goalpro_core::{
    CredentialRepository, SyncRecordRepository, SyncSettingsRepository, TimeBlockRepository,
    WebhookChannelRepository,
};
use goalpro_domain::{
    IntegrationCredential, Result as DomainResult, SyncLedgerSummary, SyncRecord, SyncSettings,
    SyncStatus, TimeBlock, WebhookChannel,
};

/// Credentials keyed by `(user_id, provider)`.
#[derive(Default, Clone)]
pub struct MockCredentialRepository {
    rows: Arc<Mutex<HashMap<(String, String), IntegrationCredential>>>,
}

impl MockCredentialRepository {
    pub fn put(&self, credential: IntegrationCredential) {
        self.rows
            .lock()
            .unwrap()
            .insert((credential.user_id.clone(), credential.provider.clone()), credential);
    }

    pub fn get(&self, user_id: &str) -> Option<IntegrationCredential> {
        self.rows.lock().unwrap().get(&(user_id.to_string(), "google".to_string())).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl CredentialRepository for MockCredentialRepository {
    async fn find(
        &self,
        user_id: &str,
        provider: &str,
    ) -> DomainResult<Option<IntegrationCredential>> {
        Ok(self.rows.lock().unwrap().get(&(user_id.to_string(), provider.to_string())).cloned())
    }

    async fn upsert(&self, credential: &IntegrationCredential) -> DomainResult<()> {
        self.put(credential.clone());
        Ok(())
    }

    async fn update_access_token(
        &self,
        user_id: &str,
        provider: &str,
        access_token: &str,
        token_expiry: Option<DateTime<Utc>>,
    ) -> DomainResult<()> {
        if let Some(row) =
            self.rows.lock().unwrap().get_mut(&(user_id.to_string(), provider.to_string()))
        {
            row.access_token = access_token.to_string();
            row.token_expiry = token_expiry;
        }
        Ok(())
    }

    async fn delete(&self, user_id: &str, provider: &str) -> DomainResult<bool> {
        Ok(self.rows.lock().unwrap().remove(&(user_id.to_string(), provider.to_string())).is_some())
    }
}

#[derive(Default, Clone)]
pub struct MockSyncRecordRepository {
    rows: Arc<Mutex<Vec<SyncRecord>>>,
}

impl MockSyncRecordRepository {
    pub fn with_record(self, record: SyncRecord) -> Self {
        self.rows.lock().unwrap().push(record);
        self
    }

    pub fn all(&self) -> Vec<SyncRecord> {
        self.rows.lock().unwrap().clone()
    }

    pub fn by_event(&self, event_id: &str) -> Option<SyncRecord> {
        self.rows.lock().unwrap().iter().find(|r| r.event_id == event_id).cloned()
    }
}

#[async_trait]
impl SyncRecordRepository for MockSyncRecordRepository {
    async fn list_for_user(
        &self,
        user_id: &str,
        entity_type: &str,
    ) -> DomainResult<Vec<SyncRecord>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && r.local_entity_type == entity_type)
            .cloned()
            .collect())
    }

    async fn find_by_local_entity(
        &self,
        user_id: &str,
        entity_type: &str,
        local_entity_id: &str,
    ) -> DomainResult<Option<SyncRecord>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| {
                r.user_id == user_id
                    && r.local_entity_type == entity_type
                    && r.local_entity_id == local_entity_id
            })
            .cloned())
    }

    async fn upsert(&self, record: &SyncRecord) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.user_id == record.user_id && r.event_id == record.event_id)
        {
            Some(existing) => *existing = record.clone(),
            None => rows.push(record.clone()),
        }
        Ok(())
    }

    async fn set_status(
        &self,
        record_id: &str,
        status: SyncStatus,
        synced_at: Option<DateTime<Utc>>,
    ) -> DomainResult<()> {
        if let Some(row) = self.rows.lock().unwrap().iter_mut().find(|r| r.id == record_id) {
            row.sync_status = status;
            if let Some(at) = synced_at {
                row.last_synced_at = at;
            }
        }
        Ok(())
    }

    async fn mark_needs_check(&self, user_id: &str) -> DomainResult<u64> {
        let mut marked = 0;
        for row in self.rows.lock().unwrap().iter_mut() {
            if row.user_id == user_id && row.sync_status == SyncStatus::Synced {
                row.sync_status = SyncStatus::NeedsCheck;
                marked += 1;
            }
        }
        Ok(marked)
    }

    async fn summary(&self, user_id: &str) -> DomainResult<SyncLedgerSummary> {
        let rows = self.rows.lock().unwrap();
        let mine = rows
            .iter()
            .filter(|r| r.user_id == user_id && r.local_entity_type == "time_block");
        let (linked, needing_check) = mine.fold((0, 0), |(linked, check), r| {
            (linked + 1, check + u64::from(r.sync_status == SyncStatus::NeedsCheck))
        });
        Ok(SyncLedgerSummary { linked_time_blocks: linked, records_needing_check: needing_check })
    }
}

#[derive(Default, Clone)]
pub struct MockWebhookChannelRepository {
    rows: Arc<Mutex<Vec<WebhookChannel>>>,
}

impl MockWebhookChannelRepository {
    pub fn with_channel(self, channel: WebhookChannel) -> Self {
        self.rows.lock().unwrap().push(channel);
        self
    }

    pub fn all(&self) -> Vec<WebhookChannel> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebhookChannelRepository for MockWebhookChannelRepository {
    async fn find(&self, channel_id: &str) -> DomainResult<Option<WebhookChannel>> {
        Ok(self.rows.lock().unwrap().iter().find(|c| c.channel_id == channel_id).cloned())
    }

    async fn insert(&self, channel: &WebhookChannel) -> DomainResult<()> {
        self.rows.lock().unwrap().push(channel.clone());
        Ok(())
    }

    async fn list_active_for_user(&self, user_id: &str) -> DomainResult<Vec<WebhookChannel>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id && c.is_active)
            .cloned()
            .collect())
    }

    async fn deactivate_for_user(&self, user_id: &str) -> DomainResult<u64> {
        let mut count = 0;
        for channel in self.rows.lock().unwrap().iter_mut() {
            if channel.user_id == user_id && channel.is_active {
                channel.is_active = false;
                count += 1;
            }
        }
        Ok(count)
    }
}

/// Settings rows plus a counter of writes, so tests can assert that reads
/// never persist anything.
#[derive(Default, Clone)]
pub struct MockSyncSettingsRepository {
    rows: Arc<Mutex<HashMap<String, SyncSettings>>>,
    writes: Arc<Mutex<usize>>,
}

impl MockSyncSettingsRepository {
    pub fn with_settings(self, settings: SyncSettings) -> Self {
        self.rows.lock().unwrap().insert(settings.user_id.clone(), settings);
        self
    }

    pub fn get(&self, user_id: &str) -> Option<SyncSettings> {
        self.rows.lock().unwrap().get(user_id).cloned()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

#[async_trait]
impl SyncSettingsRepository for MockSyncSettingsRepository {
    async fn find(&self, user_id: &str) -> DomainResult<Option<SyncSettings>> {
        Ok(self.get(user_id))
    }

    async fn upsert(&self, settings: &SyncSettings) -> DomainResult<()> {
        *self.writes.lock().unwrap() += 1;
        self.rows.lock().unwrap().insert(settings.user_id.clone(), settings.clone());
        Ok(())
    }

    async fn record_last_synced(&self, user_id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        *self.writes.lock().unwrap() += 1;
        self.rows
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_insert_with(|| SyncSettings::defaults_for(user_id))
            .last_synced_at = Some(at);
        Ok(())
    }

    async fn list_auto_sync_enabled(&self) -> DomainResult<Vec<SyncSettings>> {
        Ok(self.rows.lock().unwrap().values().filter(|s| s.auto_sync_enabled).cloned().collect())
    }
}

#[derive(Default, Clone)]
pub struct MockTimeBlockRepository {
    rows: Arc<Mutex<HashMap<String, TimeBlock>>>,
}

impl MockTimeBlockRepository {
    pub fn with_block(self, block: TimeBlock) -> Self {
        self.rows.lock().unwrap().insert(block.id.clone(), block);
        self
    }

    pub fn get(&self, id: &str) -> Option<TimeBlock> {
        self.rows.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl TimeBlockRepository for MockTimeBlockRepository {
    async fn find(&self, user_id: &str, id: &str) -> DomainResult<Option<TimeBlock>> {
        Ok(self.get(id).filter(|b| b.user_id == user_id))
    }

    async fn list_for_user(&self, user_id: &str) -> DomainResult<Vec<TimeBlock>> {
        let mut blocks: Vec<_> =
            self.rows.lock().unwrap().values().filter(|b| b.user_id == user_id).cloned().collect();
        blocks.sort_by_key(|b| b.start_time);
        Ok(blocks)
    }

    async fn insert(&self, block: &TimeBlock) -> DomainResult<()> {
        self.rows.lock().unwrap().insert(block.id.clone(), block.clone());
        Ok(())
    }

    async fn update(&self, block: &TimeBlock) -> DomainResult<()> {
        self.rows.lock().unwrap().insert(block.id.clone(), block.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &str, id: &str) -> DomainResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        if rows.get(id).is_some_and(|b| b.user_id == user_id) {
            rows.remove(id);
            return Ok(true);
        }
        Ok(false)
    }
}
