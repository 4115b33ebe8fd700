//! Calendar integration port interfaces

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use goalpro_domain::{
    EventDraft, IntegrationCredential, RemoteEvent, Result, SyncLedgerSummary, SyncRecord,
    SyncSettings, SyncStatus, WebhookChannel,
};

/// Tokens returned by the provider's token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Only present on the first consent or when the provider rotates it.
    pub refresh_token: Option<String>,
    /// Lifetime of `access_token` in seconds.
    pub expires_in: Option<i64>,
    /// Space-separated scope list.
    pub scope: Option<String>,
}

impl TokenGrant {
    pub fn scopes(&self) -> Vec<String> {
        self.scope
            .as_deref()
            .map(|scope| scope.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn expiry_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in.map(|secs| now + chrono::Duration::seconds(secs))
    }
}

/// Push channel registration request (`events.watch`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRequest {
    pub channel_id: String,
    pub token: String,
    pub address: String,
}

/// Provider acknowledgement of a push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchResponse {
    pub resource_id: String,
    pub expiration: Option<DateTime<Utc>>,
}

/// Persistence for provider credentials, unique on `(user_id, provider)`.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn find(&self, user_id: &str, provider: &str) -> Result<Option<IntegrationCredential>>;

    /// Insert or replace the credential for `(user_id, provider)`.
    async fn upsert(&self, credential: &IntegrationCredential) -> Result<()>;

    async fn update_access_token(
        &self,
        user_id: &str,
        provider: &str,
        access_token: &str,
        token_expiry: Option<DateTime<Utc>>,
    ) -> Result<()>;

    /// Returns `true` when a row was removed.
    async fn delete(&self, user_id: &str, provider: &str) -> Result<bool>;
}

/// Sync-state ledger. Records are only ever status-transitioned.
#[async_trait]
pub trait SyncRecordRepository: Send + Sync {
    async fn list_for_user(&self, user_id: &str, entity_type: &str) -> Result<Vec<SyncRecord>>;

    async fn find_by_local_entity(
        &self,
        user_id: &str,
        entity_type: &str,
        local_entity_id: &str,
    ) -> Result<Option<SyncRecord>>;

    /// Insert or replace the record keyed by `(user_id, event_id)`.
    async fn upsert(&self, record: &SyncRecord) -> Result<()>;

    /// Transition a record. `synced_at` is only written when provided.
    async fn set_status(
        &self,
        record_id: &str,
        status: SyncStatus,
        synced_at: Option<DateTime<Utc>>,
    ) -> Result<()>;

    /// Move every `synced` record of the user to `needs_check`.
    async fn mark_needs_check(&self, user_id: &str) -> Result<u64>;

    async fn summary(&self, user_id: &str) -> Result<SyncLedgerSummary>;
}

#[async_trait]
pub trait WebhookChannelRepository: Send + Sync {
    async fn find(&self, channel_id: &str) -> Result<Option<WebhookChannel>>;

    async fn insert(&self, channel: &WebhookChannel) -> Result<()>;

    async fn list_active_for_user(&self, user_id: &str) -> Result<Vec<WebhookChannel>>;

    /// Returns the number of channels that were switched off.
    async fn deactivate_for_user(&self, user_id: &str) -> Result<u64>;
}

/// One settings row per user, written by full-row upsert.
#[async_trait]
pub trait SyncSettingsRepository: Send + Sync {
    async fn find(&self, user_id: &str) -> Result<Option<SyncSettings>>;

    async fn upsert(&self, settings: &SyncSettings) -> Result<()>;

    /// Stamp `last_synced_at`, creating a default row if none exists.
    async fn record_last_synced(&self, user_id: &str, at: DateTime<Utc>) -> Result<()>;

    async fn list_auto_sync_enabled(&self) -> Result<Vec<SyncSettings>>;
}

/// Google Calendar REST operations used by sync and watch registration.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Fetch a single event. `None` when the provider reports 404/410.
    async fn get_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<Option<RemoteEvent>>;

    async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        draft: &EventDraft,
    ) -> Result<RemoteEvent>;

    async fn update_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
        draft: &EventDraft,
    ) -> Result<RemoteEvent>;

    async fn watch_events(
        &self,
        access_token: &str,
        calendar_id: &str,
        request: &WatchRequest,
    ) -> Result<WatchResponse>;

    async fn stop_channel(
        &self,
        access_token: &str,
        channel_id: &str,
        resource_id: &str,
    ) -> Result<()>;
}

/// Google OAuth 2.0 endpoints.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Client id and secret are both present.
    fn is_configured(&self) -> bool;

    fn authorization_url(&self, state: &str) -> Result<String>;

    async fn exchange_code(&self, code: &str) -> Result<TokenGrant>;

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant>;

    async fn fetch_account_email(&self, access_token: &str) -> Result<String>;

    async fn revoke_token(&self, token: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn grant_scopes_split_on_whitespace() {
        let grant = TokenGrant {
            access_token: "a".into(),
            refresh_token: None,
            expires_in: Some(3600),
            scope: Some("openid  https://www.googleapis.com/auth/calendar.events".into()),
        };
        assert_eq!(
            grant.scopes(),
            vec!["openid".to_string(), "https://www.googleapis.com/auth/calendar.events".into()]
        );

        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(grant.expiry_from(now), Some(now + chrono::Duration::hours(1)));
    }

    #[test]
    fn grant_without_scope_has_no_scopes() {
        let grant = TokenGrant {
            access_token: "a".into(),
            refresh_token: None,
            expires_in: None,
            scope: None,
        };
        assert!(grant.scopes().is_empty());
        assert_eq!(grant.expiry_from(Utc::now()), None);
    }
}
