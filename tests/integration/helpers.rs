//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use std::sync::Arc;

use chatdesk_api::{AppState, build_app, build_state};
use chatdesk_core::config::{AppConfig, DatabaseProvider};
use chatdesk_core::types::{BootEpoch, UserId};
use chatdesk_database::{AccountDirectory, MemoryStore, Stores};
use chatdesk_entity::user::UserRole;
use chatdesk_realtime::connection::ConnectionHandle;

/// A request's outcome.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for reaching the realtime engine directly
    pub state: AppState,
    /// The backing store, shared across restarts
    pub store: MemoryStore,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.provider = DatabaseProvider::Memory;
    config.auth.jwt_secret = Some("integration-test-secret".to_string());
    config.admin.protected_usernames = vec!["root".to_string()];
    config
}

impl TestApp {
    /// Fresh store seeded with `alice`, `bob` (users), `root` (protected
    /// admin) and `ops` (admin).
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let store = MemoryStore::new();
        for (name, role) in [
            ("alice", UserRole::User),
            ("bob", UserRole::User),
            ("root", UserRole::Admin),
            ("ops", UserRole::Admin),
        ] {
            store.ensure_account(name, role).await.unwrap();
        }
        Self::start(config, store)
    }

    fn start(config: AppConfig, store: MemoryStore) -> Self {
        let state = build_state(config, Stores::memory(store.clone()), BootEpoch::capture());
        let router = build_app(state.clone());
        Self {
            router,
            state,
            store,
        }
    }

    /// A new process run over the same store: new boot epoch, empty
    /// connection registry.
    pub fn restart(&self) -> Self {
        Self::start((*self.state.config).clone(), self.store.clone())
    }

    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        self.request_from(None, method, path, body, token).await
    }

    /// Like [`TestApp::request`], sent through a proxy reporting `forwarded_for`.
    pub async fn request_from(
        &self,
        forwarded_for: Option<&str>,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(ip) = forwarded_for {
            builder = builder.header("x-forwarded-for", ip);
        }
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, body }
    }

    pub async fn try_login(&self, username: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/login",
            Some(serde_json::json!({ "username": username })),
            None,
        )
        .await
    }

    /// Log in and return the token, asserting success.
    pub async fn login(&self, username: &str) -> String {
        let response = self.try_login(username).await;
        assert_eq!(response.status, StatusCode::OK, "login {username}: {:?}", response.body);
        response.body["token"].as_str().unwrap().to_string()
    }

    /// Open a live connection the way the WebSocket handler does.
    pub fn connect(&self, token: &str) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let identity = self.state.authenticator.authenticate(token).unwrap();
        self.state.realtime.connect(identity)
    }

    pub async fn user_id(&self, username: &str) -> UserId {
        self.store.find_by_username(username).await.unwrap().unwrap().id
    }
}

/// Let detached bookkeeping tasks run.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Drain every frame currently queued on a connection.
pub fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<Value> {
    let mut frames = Vec::new();
    while let Ok(text) = rx.try_recv() {
        frames.push(serde_json::from_str(&text).unwrap());
    }
    frames
}
