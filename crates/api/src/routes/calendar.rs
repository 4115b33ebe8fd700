//! Google Calendar connection endpoints.

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::Json;
use goalpro_core::{CallbackParams, ConnectionStatus};
use goalpro_domain::WebhookChannel;
use serde::Serialize;
use serde_json::{json, Value};
use url::form_urlencoded;

use super::AppState;
use crate::error::ApiResult;
use crate::identity::CurrentUser;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthStartResponse {
    pub auth_url: String,
}

pub async fn oauth_start(
    State(ctx): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<OAuthStartResponse>> {
    let auth_url = ctx.connections.start(user.user_id())?;
    Ok(Json(OAuthStartResponse { auth_url }))
}

/// Always answers with a redirect to the settings page.
pub async fn oauth_callback(
    State(ctx): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    let outcome = ctx.connections.complete(params).await;
    let (key, value) = outcome.redirect_query();
    Redirect::to(&settings_redirect(&ctx.config.app.settings_url, key, value))
}

/// Append `key=value` to `base`, keeping any query it already has.
pub(crate) fn settings_redirect(base: &str, key: &str, value: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new()).append_pair(key, value).finish();
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}")
}

pub async fn status(
    State(ctx): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ConnectionStatus>> {
    Ok(Json(ctx.connections.status(user.user_id()).await?))
}

pub async fn disconnect(State(ctx): State<AppState>, user: CurrentUser) -> ApiResult<Json<Value>> {
    let removed = ctx.connections.disconnect(user.user_id()).await?;
    let message = if removed {
        "Google Calendar disconnected"
    } else {
        "Google Calendar was not connected"
    };
    Ok(Json(json!({ "success": true, "message": message })))
}

pub async fn watch(
    State(ctx): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<WebhookChannel>> {
    Ok(Json(ctx.channels.watch(user.user_id()).await?))
}

pub async fn unwatch(State(ctx): State<AppState>, user: CurrentUser) -> ApiResult<Json<Value>> {
    let stopped = ctx.channels.unwatch(user.user_id()).await?;
    Ok(Json(json!({ "success": true, "stopped": stopped })))
}
