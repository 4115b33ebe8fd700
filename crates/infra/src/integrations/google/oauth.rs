//! Google OAuth 2.0 client implementing the OAuthProvider port.
//!
//! Authorization requests ask for offline access with forced consent so the
//! first exchange always returns a refresh token.

use async_trait::async_trait;
use goalpro_core::{OAuthProvider, TokenGrant};
use goalpro_domain::constants::GOOGLE_CALENDAR_SCOPES;
use goalpro_domain::{GoalProError, GoogleConfig, Result};
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::wire::{TokenResponse, UserInfo};
use super::{build_http_client, provider_error};
use crate::errors::InfraError;

/// Google OAuth 2.0 token endpoint client.
pub struct GoogleOAuthClient {
    http: Client,
    config: GoogleConfig,
    scopes: Vec<String>,
    extra_authorize_params: Vec<(String, String)>,
}

impl GoogleOAuthClient {
    pub fn new(config: GoogleConfig) -> Result<Self> {
        Ok(Self {
            http: build_http_client(config.request_timeout_secs)?,
            scopes: GOOGLE_CALENDAR_SCOPES.iter().map(|s| (*s).to_string()).collect(),
            extra_authorize_params: vec![
                ("access_type".to_string(), "offline".to_string()),
                ("prompt".to_string(), "consent".to_string()),
            ],
            config,
        })
    }

    fn client_credentials(&self) -> Result<(&str, &str)> {
        match (self.config.client_id.as_deref(), self.config.client_secret.as_deref()) {
            (Some(id), Some(secret)) if self.config.has_credentials() => Ok((id, secret)),
            _ => Err(GoalProError::Config("Google OAuth client is not configured".into())),
        }
    }

    async fn token_request(&self, form: &[(&str, &str)], context: &str) -> Result<TokenGrant> {
        let response = self
            .http
            .post(&self.config.token_endpoint)
            .form(form)
            .send()
            .await
            .map_err(InfraError::from)?;

        let status = response.status();
        if !status.is_success() {
            // A rejected grant is a credential problem; 5xx stays a network failure.
            return Err(match provider_error(response, context).await {
                GoalProError::Network(msg) | GoalProError::NotFound(msg)
                    if status.is_client_error() =>
                {
                    GoalProError::ProviderAuth(msg)
                }
                other => other,
            });
        }

        let token: TokenResponse = response.json().await.map_err(InfraError::from)?;
        Ok(TokenGrant {
            access_token: token.access_token,
            refresh_token: token.refresh_token.filter(|t| !t.is_empty()),
            expires_in: token.expires_in,
            scope: token.scope,
        })
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthClient {
    fn is_configured(&self) -> bool {
        self.config.has_credentials()
    }

    fn authorization_url(&self, state: &str) -> Result<String> {
        let (client_id, _) = self.client_credentials()?;
        let scope = self.scopes.join(" ");

        let mut params: Vec<(&str, &str)> = vec![
            ("client_id", client_id),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("state", state),
        ];
        params.extend(self.extra_authorize_params.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let url = Url::parse_with_params(&self.config.authorization_endpoint, &params)
            .map_err(|e| GoalProError::Config(format!("invalid authorization endpoint: {e}")))?;
        Ok(url.into())
    }

    #[instrument(skip_all)]
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        let (client_id, client_secret) = self.client_credentials()?;
        let grant = self
            .token_request(
                &[
                    ("code", code),
                    ("client_id", client_id),
                    ("client_secret", client_secret),
                    ("redirect_uri", self.config.redirect_uri.as_str()),
                    ("grant_type", "authorization_code"),
                ],
                "Token exchange failed",
            )
            .await?;
        debug!(has_refresh_token = grant.refresh_token.is_some(), "authorization code exchanged");
        Ok(grant)
    }

    #[instrument(skip_all)]
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant> {
        let (client_id, client_secret) = self.client_credentials()?;
        self.token_request(
            &[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ],
            "Token refresh failed",
        )
        .await
    }

    async fn fetch_account_email(&self, access_token: &str) -> Result<String> {
        let response = self
            .http
            .get(&self.config.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            return Err(provider_error(response, "Google userinfo request failed").await);
        }

        let info: UserInfo = response.json().await.map_err(InfraError::from)?;
        info.email
            .filter(|email| !email.is_empty())
            .ok_or_else(|| GoalProError::Network("Google userinfo response has no email".into()))
    }

    async fn revoke_token(&self, token: &str) -> Result<()> {
        let response = self
            .http
            .post(&self.config.revoke_endpoint)
            .form(&[("token", token)])
            .send()
            .await
            .map_err(InfraError::from)?;

        if !response.status().is_success() {
            return Err(provider_error(response, "Token revocation failed").await);
        }
        Ok(())
    }
}
