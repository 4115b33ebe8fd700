//! Google push notification receiver.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use goalpro_core::WebhookNotification;
use serde_json::{json, Value};

use super::AppState;
use crate::error::ApiResult;

pub const CHANNEL_ID_HEADER: &str = "x-goog-channel-id";
pub const RESOURCE_ID_HEADER: &str = "x-goog-resource-id";
pub const RESOURCE_STATE_HEADER: &str = "x-goog-resource-state";
pub const CHANNEL_TOKEN_HEADER: &str = "x-goog-channel-token";

/// The request body is ignored; everything Google sends that matters is in
/// the headers.
pub async fn receive(State(ctx): State<AppState>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    let outcome = ctx.webhooks.handle(notification_from_headers(&headers)).await?;
    Ok(Json(json!({ "status": outcome.as_str() })))
}

pub(crate) fn notification_from_headers(headers: &HeaderMap) -> WebhookNotification {
    let header = |name: &str| {
        headers.get(name).and_then(|v| v.to_str().ok()).map(|v| v.trim().to_string())
    };
    WebhookNotification {
        channel_id: header(CHANNEL_ID_HEADER),
        resource_id: header(RESOURCE_ID_HEADER),
        resource_state: header(RESOURCE_STATE_HEADER),
        channel_token: header(CHANNEL_TOKEN_HEADER),
    }
}
