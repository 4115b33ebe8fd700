//! Health report returned by `GET /health`.

use serde::Serialize;

/// Health of one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHealth {
    pub name: &'static str,
    pub is_healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: &'static str) -> Self {
        Self { name, is_healthy: true, message: None }
    }

    pub fn unhealthy(name: &'static str, message: impl Into<String>) -> Self {
        Self { name, is_healthy: false, message: Some(message.into()) }
    }
}

/// Overall status: `"ok"` only when every component is healthy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub components: Vec<ComponentHealth>,
    pub pending_sync_jobs: usize,
}

impl HealthStatus {
    pub fn from_components(components: Vec<ComponentHealth>, pending_sync_jobs: usize) -> Self {
        let status = if components.iter().all(|c| c.is_healthy) { "ok" } else { "degraded" };
        Self { status, components, pending_sync_jobs }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "ok"
    }
}
