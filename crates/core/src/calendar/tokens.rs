//! Access token lookup with proactive refresh.

use std::sync::Arc;

use chrono::Utc;
use goalpro_domain::constants::{GOOGLE_PROVIDER, TOKEN_REFRESH_THRESHOLD_SECS};
use goalpro_domain::{GoalProError, IntegrationCredential, Result};
use tracing::{info, instrument, warn};

use super::ports::{CredentialRepository, OAuthProvider};

/// Hands out a usable Google access token for a user, refreshing it first
/// when it expires within [`TOKEN_REFRESH_THRESHOLD_SECS`].
pub struct AccessTokenSource {
    credentials: Arc<dyn CredentialRepository>,
    oauth: Arc<dyn OAuthProvider>,
}

impl AccessTokenSource {
    pub fn new(credentials: Arc<dyn CredentialRepository>, oauth: Arc<dyn OAuthProvider>) -> Self {
        Self { credentials, oauth }
    }

    /// Active Google credential for the user, or `NotConnected`.
    pub async fn credential(&self, user_id: &str) -> Result<IntegrationCredential> {
        match self.credentials.find(user_id, GOOGLE_PROVIDER).await? {
            Some(credential) if credential.is_active => Ok(credential),
            _ => Err(GoalProError::NotConnected("Google Calendar is not connected".into())),
        }
    }

    #[instrument(skip(self))]
    pub async fn access_token(&self, user_id: &str) -> Result<String> {
        let credential = self.credential(user_id).await?;
        let now = Utc::now();

        if !credential.expires_within(now, TOKEN_REFRESH_THRESHOLD_SECS) {
            return Ok(credential.access_token);
        }

        let Some(refresh_token) = credential.refresh_token.as_deref() else {
            warn!(user_id, "access token near expiry and no refresh token stored");
            return Ok(credential.access_token);
        };

        let grant = self.oauth.refresh_access_token(refresh_token).await?;
        let expiry = grant.expiry_from(now);
        self.credentials
            .update_access_token(user_id, GOOGLE_PROVIDER, &grant.access_token, expiry)
            .await?;

        info!(user_id, "refreshed google access token");
        Ok(grant.access_token)
    }
}
