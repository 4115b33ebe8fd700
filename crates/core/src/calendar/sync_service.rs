//! Sync executor: reconciles linked time blocks with their Google events.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goalpro_domain::constants::{PRIMARY_CALENDAR_ID, TIME_BLOCK_ENTITY};
use goalpro_domain::{
    EventDraft, GoalProError, Result, SyncAction, SyncDetail, SyncLedgerSummary, SyncRecord,
    SyncReport, SyncSettings, SyncStatus, TimeBlock,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::ports::{CalendarProvider, SyncRecordRepository, SyncSettingsRepository};
use super::tokens::AccessTokenSource;
use crate::schedule::ports::TimeBlockRepository;
use crate::sync::ports::SyncRunner;

/// Runs sync passes and pushes time blocks to the user's primary calendar.
pub struct CalendarSyncService {
    tokens: Arc<AccessTokenSource>,
    calendar: Arc<dyn CalendarProvider>,
    records: Arc<dyn SyncRecordRepository>,
    time_blocks: Arc<dyn TimeBlockRepository>,
    settings: Arc<dyn SyncSettingsRepository>,
}

impl CalendarSyncService {
    pub fn new(
        tokens: Arc<AccessTokenSource>,
        calendar: Arc<dyn CalendarProvider>,
        records: Arc<dyn SyncRecordRepository>,
        time_blocks: Arc<dyn TimeBlockRepository>,
        settings: Arc<dyn SyncSettingsRepository>,
    ) -> Self {
        Self { tokens, calendar, records, time_blocks, settings }
    }

    /// Run one full pass over the user's linked time blocks.
    ///
    /// Fails up front when the user has no Google credential. Per-event
    /// failures are recorded on the ledger and counted in `errors` instead of
    /// aborting the pass.
    #[instrument(skip(self))]
    pub async fn sync_user(&self, user_id: &str) -> Result<SyncReport> {
        let access_token = self.tokens.access_token(user_id).await?;
        let settings = self.load_settings(user_id).await?;
        let records = self.records.list_for_user(user_id, TIME_BLOCK_ENTITY).await?;

        let mut report = SyncReport::default();
        for record in records {
            let detail = self.reconcile(&access_token, &settings, &record).await;
            report.push(detail);
        }

        self.settings.record_last_synced(user_id, Utc::now()).await?;

        info!(
            user_id,
            synced = report.synced,
            deleted = report.deleted,
            conflicts = report.conflicts,
            errors = report.errors,
            "calendar sync finished"
        );
        Ok(report)
    }

    /// Create or update the Google event for a time block the caller owns.
    #[instrument(skip(self))]
    pub async fn push_time_block(&self, user_id: &str, block_id: &str) -> Result<SyncRecord> {
        let mut block = self
            .time_blocks
            .find(user_id, block_id)
            .await?
            .ok_or_else(|| GoalProError::NotFound(format!("time block {block_id} not found")))?;

        let access_token = self.tokens.access_token(user_id).await?;
        let settings = self.load_settings(user_id).await?;
        let draft = event_draft(&block, &settings);

        let existing =
            self.records.find_by_local_entity(user_id, TIME_BLOCK_ENTITY, &block.id).await?;
        let linked_event_id = existing
            .as_ref()
            .map(|record| record.event_id.clone())
            .or_else(|| block.google_event_id.clone());

        let remote = match linked_event_id {
            Some(event_id) => {
                self.calendar
                    .update_event(&access_token, PRIMARY_CALENDAR_ID, &event_id, &draft)
                    .await?
            }
            None => self.calendar.insert_event(&access_token, PRIMARY_CALENDAR_ID, &draft).await?,
        };

        let synced_at = sync_watermark(Utc::now(), remote.updated);

        if block.google_event_id.as_deref() != Some(remote.id.as_str()) {
            block.google_event_id = Some(remote.id.clone());
            self.time_blocks.update(&block).await?;
        }

        let record = SyncRecord {
            id: existing.map_or_else(|| Uuid::now_v7().to_string(), |record| record.id),
            user_id: user_id.to_string(),
            event_id: remote.id,
            local_entity_id: block.id,
            local_entity_type: TIME_BLOCK_ENTITY.to_string(),
            sync_status: SyncStatus::Synced,
            last_synced_at: synced_at,
        };
        self.records.upsert(&record).await?;

        info!(user_id, event_id = %record.event_id, "time block pushed to google calendar");
        Ok(record)
    }

    pub async fn ledger_summary(&self, user_id: &str) -> Result<SyncLedgerSummary> {
        self.records.summary(user_id).await
    }

    async fn load_settings(&self, user_id: &str) -> Result<SyncSettings> {
        let stored = self.settings.find(user_id).await?;
        Ok(stored.unwrap_or_else(|| SyncSettings::defaults_for(user_id)))
    }

    async fn reconcile(
        &self,
        access_token: &str,
        settings: &SyncSettings,
        record: &SyncRecord,
    ) -> SyncDetail {
        match self.reconcile_record(access_token, settings, record).await {
            Ok(detail) => detail,
            Err(e) => {
                warn!(event_id = %record.event_id, error = %e, "failed to reconcile event");
                if let Err(mark_err) =
                    self.records.set_status(&record.id, SyncStatus::Error, None).await
                {
                    warn!(record_id = %record.id, error = %mark_err, "failed to flag sync record");
                }
                detail(record, SyncAction::Error, Some(e.to_string()))
            }
        }
    }

    async fn reconcile_record(
        &self,
        access_token: &str,
        settings: &SyncSettings,
        record: &SyncRecord,
    ) -> Result<SyncDetail> {
        let Some(mut block) =
            self.time_blocks.find(&record.user_id, &record.local_entity_id).await?
        else {
            debug!(event_id = %record.event_id, "linked time block is gone; skipping");
            return Ok(detail(
                record,
                SyncAction::LocalMissing,
                Some("local time block no longer exists".into()),
            ));
        };

        let remote = self
            .calendar
            .get_event(access_token, PRIMARY_CALENDAR_ID, &record.event_id)
            .await?
            .filter(|event| !event.cancelled);

        let now = Utc::now();
        let Some(remote) = remote else {
            self.time_blocks.delete(&record.user_id, &block.id).await?;
            self.records.set_status(&record.id, SyncStatus::Synced, Some(now)).await?;
            return Ok(detail(record, SyncAction::Deleted, None));
        };

        let remote_changed = remote.updated > record.last_synced_at;
        let local_changed = block.updated_at > record.last_synced_at;

        if remote_changed && local_changed {
            self.records.set_status(&record.id, SyncStatus::NeedsCheck, None).await?;
            return Ok(detail(
                record,
                SyncAction::Conflict,
                Some(format!(
                    "changed on both sides; conflict_resolution={} is not applied",
                    settings.conflict_resolution
                )),
            ));
        }

        if local_changed {
            return Ok(detail(
                record,
                SyncAction::LocalAhead,
                Some("local changes not yet pushed".into()),
            ));
        }

        if remote_changed || record.sync_status == SyncStatus::NeedsCheck {
            let synced_at = sync_watermark(now, remote.updated);
            if let Some(summary) = remote.summary.filter(|s| !s.trim().is_empty()) {
                block.title = summary;
            }
            block.description = remote.description;
            block.start_time = remote.start;
            block.end_time = remote.end;
            block.updated_at = synced_at;
            self.time_blocks.update(&block).await?;
            self.records.set_status(&record.id, SyncStatus::Synced, Some(synced_at)).await?;
            return Ok(detail(record, SyncAction::Updated, None));
        }

        self.records.set_status(&record.id, SyncStatus::Synced, Some(now)).await?;
        Ok(detail(record, SyncAction::Unchanged, None))
    }
}

#[async_trait]
impl SyncRunner for CalendarSyncService {
    async fn run_sync(&self, user_id: &str) -> Result<SyncReport> {
        self.sync_user(user_id).await
    }
}

/// Timestamp stored as `last_synced_at`. Never earlier than the remote
/// `updated` stamp, so provider clock skew does not read as a new change.
fn sync_watermark(now: DateTime<Utc>, remote_updated: DateTime<Utc>) -> DateTime<Utc> {
    now.max(remote_updated)
}

fn event_draft(block: &TimeBlock, settings: &SyncSettings) -> EventDraft {
    EventDraft {
        summary: block.title.clone(),
        description: block.description.clone(),
        start: block.start_time,
        end: block.end_time,
        color_id: settings.color_assignments.get(TIME_BLOCK_ENTITY).cloned(),
    }
}

fn detail(record: &SyncRecord, action: SyncAction, message: Option<String>) -> SyncDetail {
    SyncDetail {
        event_id: record.event_id.clone(),
        local_entity_id: record.local_entity_id.clone(),
        action,
        message,
    }
}
