use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tokio::task;

use super::AppState;
use crate::utils::health::{ComponentHealth, HealthStatus};

/// Round-trips the database. Answers 503 when any component is unhealthy.
pub async fn health(State(ctx): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let db = Arc::clone(&ctx.db);
    let database = match task::spawn_blocking(move || db.health_check()).await {
        Ok(Ok(())) => ComponentHealth::healthy("database"),
        Ok(Err(e)) => ComponentHealth::unhealthy("database", e.to_string()),
        Err(e) => ComponentHealth::unhealthy("database", e.to_string()),
    };

    let report = HealthStatus::from_components(vec![database], ctx.queue.pending_len());
    let code = if report.is_healthy() { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(report))
}
