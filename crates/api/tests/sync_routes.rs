//! Time blocks, manual sync and settings over HTTP.

mod support;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use goalpro_core::CredentialRepository;
use goalpro_domain::{IntegrationCredential, Role};
use goalpro_infra::SqliteCredentialRepository;
use serde_json::json;
use support::TestApp;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn connect(app: &TestApp, user_id: &str) {
    connect_expiring_at(app, user_id, Utc::now() + Duration::hours(1)).await;
}

async fn connect_expiring_at(app: &TestApp, user_id: &str, expiry: chrono::DateTime<Utc>) {
    let repo = SqliteCredentialRepository::new(Arc::clone(&app.ctx.db));
    repo.upsert(&IntegrationCredential {
        user_id: user_id.into(),
        provider: "google".into(),
        access_token: "access-1".into(),
        refresh_token: Some("refresh-1".into()),
        token_expiry: Some(expiry),
        scopes: vec!["https://www.googleapis.com/auth/calendar.events".into()],
        provider_email: Some("ada@example.com".into()),
        is_active: true,
    })
    .await
    .expect("store credential");
}

fn new_block() -> serde_json::Value {
    json!({
        "title": "Deep work",
        "startTime": "2026-05-04T09:00:00Z",
        "endTime": "2026-05-04T10:00:00Z"
    })
}

#[tokio::test]
async fn sync_requires_a_connected_calendar() {
    let app = TestApp::spawn().await;
    let token = app.login("user-1", Role::User).await;

    let response = app.post("/calendar/sync", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Google Calendar is not connected");
}

#[tokio::test]
async fn revoked_refresh_token_is_not_a_session_failure() {
    let app = TestApp::spawn().await;
    let token = app.login("user-1", Role::User).await;
    connect_expiring_at(&app, "user-1", Utc::now() - Duration::minutes(5)).await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
        )
        .expect(1)
        .mount(&app.google)
        .await;

    let response = app.post("/calendar/sync", Some(&token), None).await;
    assert_ne!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    let message = response.body["error"].as_str().unwrap();
    assert!(message.contains("reconnect"));
    assert!(!message.contains("invalid_grant"));
}

#[tokio::test]
async fn pushed_block_is_reported_by_the_next_sync() {
    let app = TestApp::spawn().await;
    let token = app.login("user-1", Role::User).await;
    connect(&app, "user-1").await;

    Mock::given(method("POST"))
        .and(path("/calendar/v3/calendars/primary/events"))
        .and(header("authorization", "Bearer access-1"))
        .and(body_partial_json(json!({"summary": "Deep work"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "evt-1",
            "summary": "Deep work",
            "start": {"dateTime": "2026-05-04T09:00:00Z"},
            "end": {"dateTime": "2026-05-04T10:00:00Z"},
            "updated": "2026-05-01T08:00:00Z"
        })))
        .expect(1)
        .mount(&app.google)
        .await;
    Mock::given(method("GET"))
        .and(path("/calendar/v3/calendars/primary/events/evt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "evt-1",
            "status": "confirmed",
            "summary": "Deep work",
            "start": {"dateTime": "2026-05-04T09:00:00Z"},
            "end": {"dateTime": "2026-05-04T10:00:00Z"},
            "updated": "2026-05-01T08:00:00Z"
        })))
        .mount(&app.google)
        .await;

    let created = app.post("/time-blocks", Some(&token), Some(new_block())).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let block_id = created.body["id"].as_str().expect("block id").to_string();

    let pushed = app.post(&format!("/time-blocks/{block_id}/push"), Some(&token), None).await;
    assert_eq!(pushed.status, StatusCode::OK);
    assert_eq!(pushed.body["eventId"], "evt-1");
    assert_eq!(pushed.body["localEntityId"], block_id);

    let sync = app.post("/calendar/sync", Some(&token), None).await;
    assert_eq!(sync.status, StatusCode::OK);
    assert_eq!(sync.body["success"], true);
    assert_eq!(sync.body["synced"], 1);
    assert_eq!(sync.body["errors"], 0);
    assert_eq!(sync.body["details"][0]["action"], "unchanged");

    let status = app.get("/calendar/sync/status", Some(&token)).await;
    assert_eq!(status.body, json!({"linkedTimeBlocks": 1, "recordsNeedingCheck": 0}));

    let blocks = app.get("/time-blocks", Some(&token)).await;
    assert_eq!(blocks.body[0]["googleEventId"], "evt-1");
}

#[tokio::test]
async fn pushing_another_users_block_is_not_found() {
    let app = TestApp::spawn().await;
    let owner = app.login("owner", Role::User).await;
    let intruder = app.login("intruder", Role::User).await;
    connect(&app, "intruder").await;

    let created = app.post("/time-blocks", Some(&owner), Some(new_block())).await;
    let block_id = created.body["id"].as_str().expect("block id").to_string();

    let response = app.post(&format!("/time-blocks/{block_id}/push"), Some(&intruder), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let listed = app.get("/time-blocks", Some(&intruder)).await;
    assert_eq!(listed.body, json!([]));
}

#[tokio::test]
async fn invalid_time_block_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.login("user-1", Role::User).await;

    let backwards = json!({
        "title": "Backwards",
        "startTime": "2026-05-04T10:00:00Z",
        "endTime": "2026-05-04T09:00:00Z"
    });
    let response = app.post("/time-blocks", Some(&token), Some(backwards)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.post("/time-blocks", Some(&token), Some(json!({"title": 3}))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn settings_default_then_merge_partial_updates() {
    let app = TestApp::spawn().await;
    let token = app.login("user-1", Role::User).await;

    let defaults = app.get("/calendar/sync/settings", Some(&token)).await;
    assert_eq!(defaults.status, StatusCode::OK);
    assert_eq!(defaults.body["two_way_sync_enabled"], false);
    assert_eq!(defaults.body["conflict_resolution"], "app_wins");

    let updated = app
        .post(
            "/calendar/sync/settings",
            Some(&token),
            Some(json!({"twoWaySyncEnabled": true, "color_assignments": {"weekly": "9"}})),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["two_way_sync_enabled"], true);
    assert_eq!(updated.body["sync_daily_targets"], true);

    let patch = json!({"conflict_resolution": "manual"});
    let second = app.post("/calendar/sync/settings", Some(&token), Some(patch)).await;
    assert_eq!(second.body["two_way_sync_enabled"], true);
    assert_eq!(second.body["color_assignments"], json!({"weekly": "9"}));
    assert_eq!(second.body["conflict_resolution"], "manual");
}

#[tokio::test]
async fn settings_reject_unknown_labels_and_bad_intervals() {
    let app = TestApp::spawn().await;
    let token = app.login("user-1", Role::User).await;

    let patch = json!({"conflict_resolution": "coin_flip"});
    let label = app.post("/calendar/sync/settings", Some(&token), Some(patch)).await;
    assert_eq!(label.status, StatusCode::BAD_REQUEST);

    let interval = app
        .post("/calendar/sync/settings", Some(&token), Some(json!({"sync_interval_minutes": 1})))
        .await;
    assert_eq!(interval.status, StatusCode::BAD_REQUEST);

    let current = app.get("/calendar/sync/settings", Some(&token)).await;
    assert_eq!(current.body["conflict_resolution"], "app_wins");
}
