//! Request principals.

use serde::{Deserialize, Serialize};

/// Role attached to an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

/// Identity resolved once per request and consumed by every handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Authenticated { user_id: String },
    Anonymous { user_id: String },
    Admin { user_id: String },
}

impl Principal {
    /// User the request acts on behalf of.
    pub fn user_id(&self) -> &str {
        match self {
            Self::Authenticated { user_id }
            | Self::Anonymous { user_id }
            | Self::Admin { user_id } => user_id,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin { .. })
    }

    /// Build the principal for a verified session.
    pub fn from_session(user_id: String, role: Role) -> Self {
        match role {
            Role::User => Self::Authenticated { user_id },
            Role::Admin => Self::Admin { user_id },
        }
    }
}
