//! Request identity: sessions first, then the anonymous policy.

pub mod ports;

use std::sync::Arc;

use goalpro_domain::{Principal, Result};
use tracing::{debug, warn};

use self::ports::SessionResolver;

/// What to do with requests that carry no valid session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnonymousIdentityPolicy {
    /// No principal; protected handlers answer 401.
    Disabled,
    /// Act as a fixed demo user. Only honoured in debug builds.
    DemoUser(String),
}

impl AnonymousIdentityPolicy {
    /// Policy for the running build.
    pub fn from_config(demo_user: Option<&str>) -> Self {
        Self::for_build(demo_user, cfg!(debug_assertions))
    }

    /// Release builds always disable anonymous access, even when a demo user
    /// is configured.
    pub fn for_build(demo_user: Option<&str>, debug_build: bool) -> Self {
        match demo_user.map(str::trim).filter(|id| !id.is_empty()) {
            Some(user_id) if debug_build => Self::DemoUser(user_id.to_string()),
            Some(_) => {
                warn!("anonymous demo user configured in a release build; ignoring it");
                Self::Disabled
            }
            None => Self::Disabled,
        }
    }

    fn principal(&self) -> Option<Principal> {
        match self {
            Self::Disabled => None,
            Self::DemoUser(user_id) => Some(Principal::Anonymous { user_id: user_id.clone() }),
        }
    }
}

/// Turns request credentials into a [`Principal`].
pub struct PrincipalResolver {
    sessions: Arc<dyn SessionResolver>,
    anonymous: AnonymousIdentityPolicy,
}

impl PrincipalResolver {
    pub fn new(sessions: Arc<dyn SessionResolver>, anonymous: AnonymousIdentityPolicy) -> Self {
        Self { sessions, anonymous }
    }

    pub fn anonymous_policy(&self) -> &AnonymousIdentityPolicy {
        &self.anonymous
    }

    /// A presented but unknown bearer token never falls back to the
    /// anonymous policy.
    pub async fn resolve(&self, bearer_token: Option<&str>) -> Result<Option<Principal>> {
        match bearer_token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => {
                let identity = self.sessions.resolve(token).await?;
                if identity.is_none() {
                    debug!("bearer token did not match a session");
                }
                Ok(identity.map(|s| Principal::from_session(s.user_id, s.role)))
            }
            None => Ok(self.anonymous.principal()),
        }
    }
}
