//! Shared harness for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use goalpro_api::{router, AppContext, BackgroundTasks};
use goalpro_domain::{Config, Role};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::MockServer;

pub const SETTINGS_URL: &str = "https://app.test/settings";

/// Router over a fresh database with Google endpoints pointed at a mock.
///
/// Background tasks are created but not started, so queued jobs stay
/// visible through `ctx.queue`.
pub struct TestApp {
    pub ctx: Arc<AppContext>,
    pub router: Router,
    pub tasks: BackgroundTasks,
    pub google: MockServer,
    _temp_dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

pub fn test_config(temp_dir: &TempDir, google: &MockServer) -> Config {
    let mut config = Config::default();
    config.database.path = temp_dir.path().join("goalpro.db").to_string_lossy().to_string();
    config.database.pool_size = 4;
    config.google.client_id = Some("client-123".into());
    config.google.client_secret = Some("client-secret".into());
    config.google.webhook_url = Some("https://api.test/calendar/webhook".into());
    config.google.token_endpoint = format!("{}/token", google.uri());
    config.google.revoke_endpoint = format!("{}/revoke", google.uri());
    config.google.userinfo_endpoint = format!("{}/userinfo", google.uri());
    config.google.calendar_api_base = format!("{}/calendar/v3", google.uri());
    config.oauth.state_secret = Some("test-state-secret".into());
    config.app.settings_url = SETTINGS_URL.into();
    config.app.anonymous_user_id = None;
    config.sync.auto_sync_enabled = false;
    config
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(customize: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let google = MockServer::start().await;
        let mut config = test_config(&temp_dir, &google);
        customize(&mut config);

        let (ctx, tasks) = AppContext::new(config).expect("context");
        let ctx = Arc::new(ctx);
        let router = router(Arc::clone(&ctx));
        Self { ctx, router, tasks, google, _temp_dir: temp_dir }
    }

    /// Create a session and return its bearer token.
    pub async fn login(&self, user_id: &str, role: Role) -> String {
        let token = format!("session-{user_id}");
        self.ctx.sessions.insert(&token, user_id, role, None).await.expect("insert session");
        token
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.dispatch(builder.body(body).expect("request")).await
    }

    pub async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("router response");
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).to_string())
            })
        };
        TestResponse { status, location, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        self.send(Method::POST, uri, token, body).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::DELETE, uri, token, None).await
    }
}
