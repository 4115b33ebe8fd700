//! Operator endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use goalpro_core::{EnqueueOutcome, SyncJobQueue, SyncTrigger};
use serde_json::{json, Value};
use tracing::info;

use super::AppState;
use crate::error::ApiResult;
use crate::identity::AdminUser;

/// Queue a sync pass for any user.
pub async fn resync(
    State(ctx): State<AppState>,
    admin: AdminUser,
    Path(user_id): Path<String>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let outcome = ctx.queue.enqueue(&user_id, SyncTrigger::Admin).await?;
    let status = match outcome {
        EnqueueOutcome::Queued => "queued",
        EnqueueOutcome::Coalesced => "coalesced",
    };
    info!(admin = admin.0.user_id(), user_id, status, "admin resync requested");
    Ok((StatusCode::ACCEPTED, Json(json!({ "status": status, "userId": user_id }))))
}
