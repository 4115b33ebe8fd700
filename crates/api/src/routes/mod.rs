//! HTTP routes.

pub mod admin;
pub mod calendar;
pub mod health;
pub mod sync;
pub mod time_blocks;
pub mod webhook;

use std::sync::Arc;

use axum::body::Bytes;
use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use goalpro_domain::GoalProError;
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::error::ApiResult;
use crate::identity::resolve_principal;

/// Shared handler state.
pub type AppState = Arc<AppContext>;

/// Build the application router.
pub fn router(ctx: AppState) -> Router {
    Router::new()
        // OAuth connection
        .route("/calendar/oauth/start", get(calendar::oauth_start))
        .route("/calendar/oauth/callback", get(calendar::oauth_callback))
        .route("/calendar/status", get(calendar::status))
        .route("/calendar/connection", delete(calendar::disconnect))
        .route("/calendar/watch", post(calendar::watch).delete(calendar::unwatch))
        // Sync
        .route("/calendar/sync", post(sync::run_sync))
        .route("/calendar/sync/status", get(sync::sync_status))
        .route("/calendar/sync/settings", get(sync::get_settings).post(sync::update_settings))
        .route("/calendar/webhook", post(webhook::receive))
        // Time blocks
        .route("/time-blocks", get(time_blocks::list).post(time_blocks::create))
        .route("/time-blocks/{id}/push", post(time_blocks::push))
        // Admin
        .route("/admin/calendar/resync/{user_id}", post(admin::resync))
        .route("/health", get(health::health))
        .layer(middleware::from_fn_with_state(Arc::clone(&ctx), resolve_principal))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Decode a JSON body, reporting malformed input as `InvalidInput`.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    let bytes: &[u8] = if body.is_empty() { b"{}" } else { body };
    serde_json::from_slice(bytes)
        .map_err(|e| GoalProError::InvalidInput(format!("invalid request body: {e}")).into())
}
