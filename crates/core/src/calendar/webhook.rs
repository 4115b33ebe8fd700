//! Google push notification handling.
//!
//! Notifications only mark the ledger and queue a sync; the executor runs on
//! the background worker so the provider gets its acknowledgement at once.

use std::sync::Arc;

use goalpro_domain::{GoalProError, Result};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::ports::{SyncRecordRepository, SyncSettingsRepository, WebhookChannelRepository};
use crate::sync::ports::{SyncJobQueue, SyncTrigger};

/// `X-Goog-*` headers of a push notification. The body is ignored.
#[derive(Debug, Clone, Default)]
pub struct WebhookNotification {
    pub channel_id: Option<String>,
    pub resource_id: Option<String>,
    pub resource_state: Option<String>,
    pub channel_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    /// Handshake sent right after a channel is created.
    Acknowledged,
    Ignored,
    TwoWaySyncDisabled,
    Processed,
}

impl WebhookOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Acknowledged => "acknowledged",
            Self::Ignored => "ignored",
            Self::TwoWaySyncDisabled => "two_way_sync_disabled",
            Self::Processed => "processed",
        }
    }
}

/// Validates Google push notifications and queues the follow-up sync.
pub struct WebhookService {
    channels: Arc<dyn WebhookChannelRepository>,
    settings: Arc<dyn SyncSettingsRepository>,
    records: Arc<dyn SyncRecordRepository>,
    queue: Arc<dyn SyncJobQueue>,
}

impl WebhookService {
    pub fn new(
        channels: Arc<dyn WebhookChannelRepository>,
        settings: Arc<dyn SyncSettingsRepository>,
        records: Arc<dyn SyncRecordRepository>,
        queue: Arc<dyn SyncJobQueue>,
    ) -> Self {
        Self { channels, settings, records, queue }
    }

    /// Validate a notification against its registered channel and act on it.
    ///
    /// Missing headers are `InvalidInput`; a token or resource mismatch is
    /// `Security`. Neither is retried by the caller.
    #[instrument(
        skip_all,
        fields(channel_id = ?notification.channel_id, state = ?notification.resource_state)
    )]
    pub async fn handle(&self, notification: WebhookNotification) -> Result<WebhookOutcome> {
        let channel_id = non_empty(notification.channel_id.as_deref())
            .ok_or_else(|| GoalProError::InvalidInput("missing X-Goog-Channel-ID header".into()))?;
        let resource_state = non_empty(notification.resource_state.as_deref()).ok_or_else(|| {
            GoalProError::InvalidInput("missing X-Goog-Resource-State header".into())
        })?;

        let channel = match self.channels.find(channel_id).await? {
            Some(channel) if channel.is_active => channel,
            _ => {
                debug!("notification for unknown or inactive channel");
                return Ok(WebhookOutcome::Ignored);
            }
        };

        if let Some(expected) = channel.registered_token() {
            if notification.channel_token.as_deref() != Some(expected) {
                warn!(user_id = %channel.user_id, "webhook channel token mismatch");
                return Err(GoalProError::Security("invalid channel token".into()));
            }
        }

        if let Some(expected) = non_empty(channel.resource_id.as_deref()) {
            if notification.resource_id.as_deref() != Some(expected) {
                warn!(user_id = %channel.user_id, "webhook resource id mismatch");
                return Err(GoalProError::Security("resource id does not match channel".into()));
            }
        }

        match resource_state {
            "sync" => Ok(WebhookOutcome::Acknowledged),
            "exists" | "updated" => self.on_change(&channel.user_id).await,
            other => {
                debug!(state = other, "ignoring resource state");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    async fn on_change(&self, user_id: &str) -> Result<WebhookOutcome> {
        let two_way = self.settings.find(user_id).await?.is_some_and(|s| s.two_way_sync_enabled);
        if !two_way {
            return Ok(WebhookOutcome::TwoWaySyncDisabled);
        }

        let marked = self.records.mark_needs_check(user_id).await?;
        match self.queue.enqueue(user_id, SyncTrigger::Webhook).await {
            Ok(outcome) => info!(user_id, marked, ?outcome, "webhook sync queued"),
            Err(e) => warn!(user_id, error = %e, "failed to queue webhook sync"),
        }
        Ok(WebhookOutcome::Processed)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
