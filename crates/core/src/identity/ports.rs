//! Session lookup port

use async_trait::async_trait;
use goalpro_domain::{Result, Role};

/// Identity behind a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: String,
    pub role: Role,
}

#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// `None` for unknown or expired tokens.
    async fn resolve(&self, token: &str) -> Result<Option<SessionIdentity>>;
}
