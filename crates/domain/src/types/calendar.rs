//! Calendar integration records: sync ledger rows, push channels, provider
//! credentials and the remote event shape the executor reconciles against.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::GoalProError;

/// Reconciliation status of one linked local entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Synced,
    NeedsCheck,
    Error,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Synced => "synced",
            Self::NeedsCheck => "needs_check",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = GoalProError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "synced" => Ok(Self::Synced),
            "needs_check" => Ok(Self::NeedsCheck),
            "error" => Ok(Self::Error),
            other => Err(GoalProError::InvalidInput(format!("unknown sync status: {other}"))),
        }
    }
}

/// Row of the sync ledger linking a remote event to a local entity.
///
/// Records are never deleted automatically; they only move between
/// statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRecord {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub local_entity_id: String,
    pub local_entity_type: String,
    pub sync_status: SyncStatus,
    pub last_synced_at: DateTime<Utc>,
}

/// Provider push-notification subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookChannel {
    pub channel_id: String,
    pub resource_id: Option<String>,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub user_id: String,
    pub is_active: bool,
    pub expiration: Option<DateTime<Utc>>,
}

impl WebhookChannel {
    /// Token registered with the provider, ignoring empty strings.
    pub fn registered_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }
}

/// OAuth credential for one `(user, provider)` pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationCredential {
    pub user_id: String,
    pub provider: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub token_expiry: Option<DateTime<Utc>>,
    pub scopes: Vec<String>,
    pub provider_email: Option<String>,
    pub is_active: bool,
}

impl IntegrationCredential {
    /// Whether the access token expires within `threshold_secs` of `now`.
    pub fn expires_within(&self, now: DateTime<Utc>, threshold_secs: i64) -> bool {
        self.token_expiry
            .is_some_and(|expiry| expiry - chrono::Duration::seconds(threshold_secs) <= now)
    }
}

impl fmt::Debug for IntegrationCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationCredential")
            .field("user_id", &self.user_id)
            .field("provider", &self.provider)
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("token_expiry", &self.token_expiry)
            .field("scopes", &self.scopes)
            .field("provider_email", &self.provider_email)
            .field("is_active", &self.is_active)
            .finish()
    }
}

/// Remote calendar event as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub cancelled: bool,
}

/// Event payload written to the provider by the push path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub summary: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub color_id: Option<String>,
}
