//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Goal Achiever Pro
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum GoalProError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    /// The calendar provider rejected the stored credential or grant.
    #[error("Calendar provider authorization failed: {0}")]
    ProviderAuth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Security error: {0}")]
    Security(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calendar not connected: {0}")]
    NotConnected(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GoalProError {
    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::ProviderAuth(_) => "provider_auth",
            Self::Forbidden(_) => "forbidden",
            Self::Security(_) => "security",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::NotConnected(_) => "not_connected",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for Goal Achiever Pro operations
pub type Result<T> = std::result::Result<T, GoalProError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = GoalProError::NotFound("time block".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "NotFound");
        assert_eq!(json["message"], "time block");
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(GoalProError::Security(String::new()).label(), "security");
        assert_eq!(GoalProError::NotConnected(String::new()).label(), "not_connected");
        assert_eq!(GoalProError::ProviderAuth(String::new()).label(), "provider_auth");
    }
}
