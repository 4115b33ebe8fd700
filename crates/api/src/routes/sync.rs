//! Manual sync, ledger status and sync settings.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use goalpro_domain::{SyncLedgerSummary, SyncReport, SyncSettings, SyncSettingsPatch};
use serde::Serialize;

use super::{parse_json, AppState};
use crate::error::ApiResult;
use crate::identity::CurrentUser;

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: SyncReport,
}

/// Run a sync pass inline and return its report.
pub async fn run_sync(
    State(ctx): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<SyncResponse>> {
    let report = ctx.sync.sync_user(user.user_id()).await?;
    Ok(Json(SyncResponse { success: true, report }))
}

pub async fn sync_status(
    State(ctx): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<SyncLedgerSummary>> {
    Ok(Json(ctx.sync.ledger_summary(user.user_id()).await?))
}

pub async fn get_settings(
    State(ctx): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<SyncSettings>> {
    Ok(Json(ctx.settings.get(user.user_id()).await?))
}

pub async fn update_settings(
    State(ctx): State<AppState>,
    user: CurrentUser,
    body: Bytes,
) -> ApiResult<Json<SyncSettings>> {
    let patch: SyncSettingsPatch = parse_json(&body)?;
    Ok(Json(ctx.settings.update(user.user_id(), patch).await?))
}
