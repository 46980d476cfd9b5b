//! Test context for unified test setup
//!
//! This module provides a unified test context that initializes the database,
//! settings, services and router for integration tests.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use EventHub::config::Settings;
use EventHub::database::DatabaseService;
use EventHub::handlers::create_router;
use EventHub::models::{Event, User};
use EventHub::services::ServiceFactory;
use EventHub::state::AppState;

use super::database_helper::TestDatabase;
use super::test_data::{event_request, register_request};

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

/// Settings for tests: fixed secret, generous rate limit, no sweep task
pub fn test_settings(database_url: &str) -> Settings {
    let mut settings = Settings::default();
    settings.database.url = database_url.to_string();
    settings.auth.jwt_secret = TEST_JWT_SECRET.to_string();
    settings.sweep.enabled = false;
    settings.rate_limit.requests_per_minute = 1000;
    settings.rate_limit.burst = 1000;
    settings
}

/// Unified test context that manages all test components
pub struct TestContext {
    pub database: TestDatabase,
    pub state: AppState,
}

impl TestContext {
    /// Create a new test context, or `None` when no database is available
    pub async fn new() -> Option<Self> {
        Self::with_settings(|_| {}).await
    }

    /// Create a test context after adjusting the default test settings
    pub async fn with_settings(adjust: impl FnOnce(&mut Settings)) -> Option<Self> {
        let database = TestDatabase::try_new().await?;

        let mut settings = test_settings(&database.database_url);
        adjust(&mut settings);

        let db = DatabaseService::new(database.pool.clone());
        let state = AppState::new(settings, db).expect("Failed to build app state");

        Some(Self { database, state })
    }

    pub fn services(&self) -> &ServiceFactory {
        &self.state.services
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Register a fresh user; returns it with its session token
    pub async fn create_user(&self) -> (User, String) {
        self.services()
            .user_service
            .register(register_request())
            .await
            .expect("Failed to register test user")
    }

    /// Create a public event organized by `organizer`
    pub async fn create_event(&self, organizer: &User, day: &str, start: &str, end: &str, max_attendees: i32) -> Event {
        self.services()
            .event_service
            .create(organizer, event_request(day, start, end, max_attendees))
            .await
            .expect("Failed to create test event")
    }

    /// Grant admin rights to `user`
    pub async fn make_admin(&self, user: &User) {
        self.services().db.admin.grant(user.id, None).await.expect("Failed to grant admin");
    }

    /// Send a request through the router; returns status and JSON body (Null when empty)
    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let (status, _, json) = send(self.router(), method, uri, token, body).await;
        (status, json)
    }

    /// Like `request`, with a raw `application/json` body that need not parse
    pub async fn request_raw(&self, method: Method, uri: &str, token: Option<&str>, body: &str) -> (StatusCode, Value) {
        let (status, _, json) = send_text(self.router(), method, uri, token, Some(body.to_string())).await;
        (status, json)
    }
}

/// Send one request to `router`; returns status, `Set-Cookie` header and JSON body
pub async fn send(
    router: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    send_text(router, method, uri, token, body.map(|json| json.to_string())).await
}

/// Send one request with an optional raw JSON body
pub async fn send_text(
    router: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<String>,
) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(text) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(text))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, cookie, json)
}
