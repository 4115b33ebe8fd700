//! Google Calendar REST client implementing the CalendarProvider port.

use async_trait::async_trait;
use goalpro_core::{CalendarProvider, WatchRequest, WatchResponse};
use goalpro_domain::{EventDraft, GoogleConfig, RemoteEvent, Result};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use super::wire::{EventBody, GoogleEvent, StopBody, WatchAck, WatchBody};
use super::{build_http_client, join_segments, provider_error};
use crate::errors::InfraError;

/// Google Calendar v3 client
pub struct GoogleCalendarClient {
    http: Client,
    api_base: String,
}

impl GoogleCalendarClient {
    pub fn new(config: &GoogleConfig) -> Result<Self> {
        Ok(Self {
            http: build_http_client(config.request_timeout_secs)?,
            api_base: config.calendar_api_base.clone(),
        })
    }

    async fn read_event(response: reqwest::Response, context: &str) -> Result<RemoteEvent> {
        if !response.status().is_success() {
            return Err(provider_error(response, context).await);
        }
        let event: GoogleEvent = response.json().await.map_err(InfraError::from)?;
        event.into_remote()
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    #[instrument(skip(self, access_token))]
    async fn get_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<Option<RemoteEvent>> {
        let url = join_segments(&self.api_base, &["calendars", calendar_id, "events", event_id])?;
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(InfraError::from)?;

        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::GONE) {
            debug!("event no longer exists");
            return Ok(None);
        }

        Self::read_event(response, "Google events.get failed").await.map(Some)
    }

    #[instrument(skip(self, access_token, draft), fields(summary = %draft.summary))]
    async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        draft: &EventDraft,
    ) -> Result<RemoteEvent> {
        let url = join_segments(&self.api_base, &["calendars", calendar_id, "events"])?;
        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(&EventBody::from(draft))
            .send()
            .await
            .map_err(InfraError::from)?;

        Self::read_event(response, "Google events.insert failed").await
    }

    #[instrument(skip(self, access_token, draft))]
    async fn update_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
        draft: &EventDraft,
    ) -> Result<RemoteEvent> {
        let url = join_segments(&self.api_base, &["calendars", calendar_id, "events", event_id])?;
        let response = self
            .http
            .patch(url)
            .bearer_auth(access_token)
            .json(&EventBody::from(draft))
            .send()
            .await
            .map_err(InfraError::from)?;

        Self::read_event(response, "Google events.patch failed").await
    }

    #[instrument(skip(self, access_token, request), fields(channel_id = %request.channel_id))]
    async fn watch_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        request: &WatchRequest,
    ) -> Result<WatchResponse> {
        let url = join_segments(&self.api_base, &["calendars", calendar_id, "events", "watch"])?;
        let body = WatchBody {
            id: &request.channel_id,
            kind: "web_hook",
            address: &request.address,
            token: &request.token,
        };
        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            return Err(provider_error(response, "Google events.watch failed").await);
        }

        let ack: WatchAck = response.json().await.map_err(InfraError::from)?;
        let expiration = ack.expiration();
        Ok(WatchResponse { resource_id: ack.resource_id, expiration })
    }

    #[instrument(skip(self, access_token))]
    async fn stop_channel(
        &self,
        access_token: &str,
        channel_id: &str,
        resource_id: &str,
    ) -> Result<()> {
        let url = join_segments(&self.api_base, &["channels", "stop"])?;
        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(&StopBody { id: channel_id, resource_id })
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            return Err(provider_error(response, "Google channels.stop failed").await);
        }
        Ok(())
    }
}
