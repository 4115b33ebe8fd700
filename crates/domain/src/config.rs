//! Configuration management

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub google: GoogleConfig,
    pub oauth: OAuthStateConfig,
    pub app: AppConfig,
    pub sync: SyncConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "127.0.0.1:8080".to_string() }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "goalpro.db".to_string(), pool_size: 8 }
    }
}

/// Google OAuth client and API endpoints.
///
/// Endpoint URLs are configurable so integration tests can point them at a
/// local mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    /// Public URL Google delivers push notifications to.
    pub webhook_url: Option<String>,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub revoke_endpoint: String,
    pub userinfo_endpoint: String,
    pub calendar_api_base: String,
    pub request_timeout_secs: u64,
}

impl GoogleConfig {
    /// Both client id and secret are present and non-empty.
    pub fn has_credentials(&self) -> bool {
        let present =
            |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
        present(&self.client_id) && present(&self.client_secret)
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: "http://localhost:8080/calendar/oauth/callback".to_string(),
            webhook_url: None,
            authorization_endpoint: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_endpoint: "https://oauth2.googleapis.com/token".to_string(),
            revoke_endpoint: "https://oauth2.googleapis.com/revoke".to_string(),
            userinfo_endpoint: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
            calendar_api_base: "https://www.googleapis.com/calendar/v3".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Signed OAuth state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthStateConfig {
    /// HMAC secret; a random per-process secret is used when absent.
    #[serde(skip_serializing)]
    pub state_secret: Option<String>,
    pub state_ttl_secs: i64,
}

impl Default for OAuthStateConfig {
    fn default() -> Self {
        Self { state_secret: None, state_ttl_secs: 600 }
    }
}

/// Application-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Page the OAuth callback redirects to.
    pub settings_url: String,
    /// Demo identity used when no session is present (debug builds only).
    pub anonymous_user_id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings_url: "http://localhost:3000/settings/integrations".to_string(),
            anonymous_user_id: None,
        }
    }
}

/// Background sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub queue_capacity: usize,
    pub job_timeout_secs: u64,
    pub auto_sync_enabled: bool,
    pub auto_sync_cron: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            job_timeout_secs: 120,
            auto_sync_enabled: true,
            auto_sync_cron: "0 * * * * *".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_credentials_require_both_values() {
        let mut google = GoogleConfig::default();
        assert!(!google.has_credentials());

        google.client_id = Some("client".into());
        assert!(!google.has_credentials());

        google.client_secret = Some("  ".into());
        assert!(!google.has_credentials());

        google.client_secret = Some("secret".into());
        assert!(google.has_credentials());
    }

    #[test]
    fn partial_sections_fall_back_to_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"database": {"path": "/tmp/x.db"}}"#).unwrap();
        assert_eq!(config.database.path, "/tmp/x.db");
        assert_eq!(config.database.pool_size, 8);
        assert_eq!(config.oauth.state_ttl_secs, 600);
    }
}
