//! Local time blocks and one-off pushes to Google.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use goalpro_domain::{NewTimeBlock, SyncRecord, TimeBlock};

use super::{parse_json, AppState};
use crate::error::ApiResult;
use crate::identity::CurrentUser;

pub async fn list(
    State(ctx): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<TimeBlock>>> {
    Ok(Json(ctx.time_blocks.list(user.user_id()).await?))
}

pub async fn create(
    State(ctx): State<AppState>,
    user: CurrentUser,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<TimeBlock>)> {
    let new_block: NewTimeBlock = parse_json(&body)?;
    let block = ctx.time_blocks.create(user.user_id(), new_block).await?;
    Ok((StatusCode::CREATED, Json(block)))
}

/// Create or update the Google event for one block. Blocks owned by another
/// user are reported as not found.
pub async fn push(
    State(ctx): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<SyncRecord>> {
    Ok(Json(ctx.sync.push_time_block(user.user_id(), &id).await?))
}
