//! Push channel registration (`events.watch` / `channels.stop`).

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use goalpro_domain::constants::PRIMARY_CALENDAR_ID;
use goalpro_domain::{GoalProError, Result, WebhookChannel};
use rand::RngCore;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::ports::{CalendarProvider, WatchRequest, WebhookChannelRepository};
use super::tokens::AccessTokenSource;

/// Registers and stops Google push-notification channels for a user.
pub struct ChannelService {
    tokens: Arc<AccessTokenSource>,
    calendar: Arc<dyn CalendarProvider>,
    channels: Arc<dyn WebhookChannelRepository>,
    webhook_url: Option<String>,
}

impl ChannelService {
    pub fn new(
        tokens: Arc<AccessTokenSource>,
        calendar: Arc<dyn CalendarProvider>,
        channels: Arc<dyn WebhookChannelRepository>,
        webhook_url: Option<String>,
    ) -> Self {
        Self { tokens, calendar, channels, webhook_url }
    }

    /// Register a new push channel on the user's primary calendar.
    #[instrument(skip(self))]
    pub async fn watch(&self, user_id: &str) -> Result<WebhookChannel> {
        let address = self
            .webhook_url
            .clone()
            .ok_or_else(|| GoalProError::Config("webhook URL is not configured".into()))?;
        let access_token = self.tokens.access_token(user_id).await?;

        let request = WatchRequest {
            channel_id: Uuid::new_v4().to_string(),
            token: channel_token(),
            address,
        };
        let response =
            self.calendar.watch_events(&access_token, PRIMARY_CALENDAR_ID, &request).await?;

        let channel = WebhookChannel {
            channel_id: request.channel_id,
            resource_id: Some(response.resource_id),
            token: Some(request.token),
            user_id: user_id.to_string(),
            is_active: true,
            expiration: response.expiration,
        };
        self.channels.insert(&channel).await?;

        info!(user_id, channel_id = %channel.channel_id, "push channel registered");
        Ok(channel)
    }

    /// Stop every active channel of the user. Provider failures are logged;
    /// the channels are deactivated locally regardless.
    #[instrument(skip(self))]
    pub async fn unwatch(&self, user_id: &str) -> Result<u64> {
        let active = self.channels.list_active_for_user(user_id).await?;
        if active.is_empty() {
            return Ok(0);
        }

        match self.tokens.access_token(user_id).await {
            Ok(access_token) => {
                for channel in &active {
                    let Some(resource_id) = channel.resource_id.as_deref() else {
                        continue;
                    };
                    if let Err(e) = self
                        .calendar
                        .stop_channel(&access_token, &channel.channel_id, resource_id)
                        .await
                    {
                        warn!(
                            channel_id = %channel.channel_id,
                            error = %e,
                            "failed to stop channel"
                        );
                    }
                }
            }
            Err(e) => warn!(user_id, error = %e, "no access token; deactivating channels locally"),
        }

        self.channels.deactivate_for_user(user_id).await
    }
}

fn channel_token() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
