//! OAuth connect / disconnect flow for Google Calendar.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use goalpro_domain::constants::{
    GOOGLE_PROVIDER, OAUTH_ERROR_INVALID_STATE, OAUTH_ERROR_MISSING_CODE,
    OAUTH_ERROR_NOT_CONFIGURED, OAUTH_ERROR_STORAGE, OAUTH_ERROR_TOKEN_EXCHANGE,
    OAUTH_SUCCESS_FLAG,
};
use goalpro_domain::{GoalProError, IntegrationCredential, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::ports::{CredentialRepository, OAuthProvider, WebhookChannelRepository};
use super::state::OAuthStateSigner;

/// Query parameters delivered to the OAuth redirect URI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Result of the callback. Always rendered as a redirect, never as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Connected { user_id: String },
    Failed { reason: String },
}

impl CallbackOutcome {
    fn failed(reason: impl Into<String>) -> Self {
        Self::Failed { reason: reason.into() }
    }

    /// Query key and value appended to the settings page URL.
    pub fn redirect_query(&self) -> (&'static str, &str) {
        match self {
            Self::Connected { .. } => ("success", OAUTH_SUCCESS_FLAG),
            Self::Failed { reason } => ("error", reason.as_str()),
        }
    }
}

/// Connection summary returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// OAuth connect and disconnect flow for the Google Calendar integration.
pub struct ConnectionService {
    credentials: Arc<dyn CredentialRepository>,
    channels: Arc<dyn WebhookChannelRepository>,
    oauth: Arc<dyn OAuthProvider>,
    signer: OAuthStateSigner,
}

impl ConnectionService {
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        channels: Arc<dyn WebhookChannelRepository>,
        oauth: Arc<dyn OAuthProvider>,
        signer: OAuthStateSigner,
    ) -> Self {
        Self { credentials, channels, oauth, signer }
    }

    /// Build the consent URL carrying a signed state for `user_id`.
    #[instrument(skip(self))]
    pub fn start(&self, user_id: &str) -> Result<String> {
        if !self.oauth.is_configured() {
            return Err(GoalProError::Config("Google OAuth client is not configured".into()));
        }
        let state = self.signer.sign(user_id, Utc::now())?;
        self.oauth.authorization_url(&state)
    }

    /// Handle the provider redirect and store the credential.
    ///
    /// Checks run in a fixed order: provider error, configuration, state,
    /// code, token exchange, storage. The account email lookup is best-effort.
    #[instrument(skip_all)]
    pub async fn complete(&self, params: CallbackParams) -> CallbackOutcome {
        if let Some(error) = params.error.filter(|e| !e.is_empty()) {
            warn!(error = %error, "provider returned an oauth error");
            return CallbackOutcome::failed(error);
        }
        if !self.oauth.is_configured() {
            return CallbackOutcome::failed(OAUTH_ERROR_NOT_CONFIGURED);
        }

        let user_id = match params.state.as_deref().map(|s| self.signer.verify(s, Utc::now())) {
            Some(Ok(user_id)) => user_id,
            Some(Err(e)) => {
                warn!(error = %e, "rejected oauth state");
                return CallbackOutcome::failed(OAUTH_ERROR_INVALID_STATE);
            }
            None => return CallbackOutcome::failed(OAUTH_ERROR_INVALID_STATE),
        };

        let Some(code) = params.code.filter(|c| !c.is_empty()) else {
            return CallbackOutcome::failed(OAUTH_ERROR_MISSING_CODE);
        };

        let grant = match self.oauth.exchange_code(&code).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "token exchange failed");
                return CallbackOutcome::failed(OAUTH_ERROR_TOKEN_EXCHANGE);
            }
        };

        let provider_email = match self.oauth.fetch_account_email(&grant.access_token).await {
            Ok(email) => Some(email),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "failed to fetch google account email");
                None
            }
        };

        // Google only returns a refresh token on first consent; keep the stored one.
        let refresh_token = match grant.refresh_token.clone() {
            Some(token) => Some(token),
            None => match self.credentials.find(&user_id, GOOGLE_PROVIDER).await {
                Ok(existing) => existing.and_then(|c| c.refresh_token),
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "failed to load existing credential");
                    None
                }
            },
        };

        let credential = IntegrationCredential {
            user_id: user_id.clone(),
            provider: GOOGLE_PROVIDER.to_string(),
            access_token: grant.access_token.clone(),
            refresh_token,
            token_expiry: grant.expiry_from(Utc::now()),
            scopes: grant.scopes(),
            provider_email,
            is_active: true,
        };

        if let Err(e) = self.credentials.upsert(&credential).await {
            warn!(user_id = %user_id, error = %e, "failed to store google credential");
            return CallbackOutcome::failed(OAUTH_ERROR_STORAGE);
        }

        info!(user_id = %user_id, "google calendar connected");
        CallbackOutcome::Connected { user_id }
    }

    pub async fn status(&self, user_id: &str) -> Result<ConnectionStatus> {
        let status = match self.credentials.find(user_id, GOOGLE_PROVIDER).await? {
            Some(credential) if credential.is_active => ConnectionStatus {
                connected: true,
                email: credential.provider_email,
                expires_at: credential.token_expiry,
            },
            _ => ConnectionStatus { connected: false, email: None, expires_at: None },
        };
        Ok(status)
    }

    /// Revoke (best-effort), then delete the credential and switch off the
    /// user's push channels. Returns whether a credential existed.
    #[instrument(skip(self))]
    pub async fn disconnect(&self, user_id: &str) -> Result<bool> {
        if let Some(credential) = self.credentials.find(user_id, GOOGLE_PROVIDER).await? {
            let token = credential.refresh_token.as_deref().unwrap_or(&credential.access_token);
            if let Err(e) = self.oauth.revoke_token(token).await {
                warn!(user_id, error = %e, "token revocation failed; deleting credential anyway");
            }
        }

        let removed = self.credentials.delete(user_id, GOOGLE_PROVIDER).await?;

        match self.channels.deactivate_for_user(user_id).await {
            Ok(count) if count > 0 => info!(user_id, count, "deactivated webhook channels"),
            Ok(_) => {}
            Err(e) => warn!(user_id, error = %e, "failed to deactivate webhook channels"),
        }

        info!(user_id, removed, "google calendar disconnected");
        Ok(removed)
    }
}
