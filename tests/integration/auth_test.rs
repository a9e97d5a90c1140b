//! Login, logout and the per-request session check.

use http::StatusCode;

use chatdesk_core::events::LogoutReason;
use chatdesk_database::{AccountDirectory, SessionLedger};

use crate::helpers::{self, TestApp, settle};

#[tokio::test]
async fn test_login_logout_relogin() {
    let app = TestApp::new().await;

    let first = app.login("alice").await;
    let me = app.request("GET", "/api/me", None, Some(&first)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["username"], "alice");
    assert_eq!(me.body["role"], "user");

    let logout = app.request("POST", "/api/logout", None, Some(&first)).await;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);

    let stale = app.request("GET", "/api/me", None, Some(&first)).await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let second = app.login("alice").await;
    assert_ne!(first, second);
    let me = app.request("GET", "/api/me", None, Some(&second)).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_username_is_trimmed_and_case_insensitive() {
    let app = TestApp::new().await;
    let token = app.login("  ALICE ").await;
    let me = app.request("GET", "/api/me", None, Some(&token)).await;
    assert_eq!(me.body["username"], "alice");
}

#[tokio::test]
async fn test_second_login_while_online_conflicts() {
    let app = TestApp::new().await;
    let token = app.login("alice").await;
    let (_handle, _rx) = app.connect(&token);

    let again = app.try_login("alice").await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.body["error"], "User already logged in");

    // The original credential is unaffected.
    let me = app.request("GET", "/api/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_abandoned_session_is_taken_over() {
    let app = TestApp::new().await;
    let old = app.login("alice").await;

    // No live connection: the old session is abandoned.
    let new = app.login("alice").await;

    let old_me = app.request("GET", "/api/me", None, Some(&old)).await;
    assert_eq!(old_me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(old_me.body["error"], "Session expired");
    let new_me = app.request("GET", "/api/me", None, Some(&new)).await;
    assert_eq!(new_me.status, StatusCode::OK);

    settle().await;
    let logouts = app.store.logouts().await;
    assert_eq!(logouts.len(), 1);
    assert_eq!(logouts[0].reason, LogoutReason::Takeover);
    let logins = app.store.logins().await;
    assert_eq!(logins.len(), 2);
    assert_eq!(logins.iter().filter(|l| l.takeover).count(), 1);

    // Takeover does not stamp a logout time.
    let alice = app.user_id("alice").await;
    assert!(app.store.last_logout_at(&alice).await.unwrap().is_none());
}

#[tokio::test]
async fn test_superseded_logout_leaves_new_session() {
    let app = TestApp::new().await;
    let old = app.login("alice").await;
    let new = app.login("alice").await;

    let logout = app.request("POST", "/api/logout", None, Some(&old)).await;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);

    let me = app.request("GET", "/api/me", None, Some(&new)).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejections() {
    let app = TestApp::new().await;

    let unknown = app.try_login("mallory").await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body["error"], "Invalid username");

    let empty = app.try_login("   ").await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let bob = app.user_id("bob").await;
    app.store.set_active(&bob, false).await.unwrap();
    let disabled = app.try_login("bob").await;
    assert_eq!(disabled.status, StatusCode::UNAUTHORIZED);
    assert_eq!(disabled.body["error"], "Account disabled");
}

#[tokio::test]
async fn test_missing_secret_fails_without_locking() {
    let mut config = helpers::test_config();
    config.auth.jwt_secret = None;
    let app = TestApp::with_config(config).await;

    let response = app.try_login("alice").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "Server configuration error");

    let alice = app.user_id("alice").await;
    assert!(app.store.find_active_session(&alice).await.unwrap().is_none());
}

#[tokio::test]
async fn test_bearer_required() {
    let app = TestApp::new().await;

    let me = app.request("GET", "/api/me", None, None).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    let logout = app.request("POST", "/api/logout", None, None).await;
    assert_eq!(logout.status, StatusCode::UNAUTHORIZED);

    let garbage = app.request("POST", "/api/logout", None, Some("not-a-jwt")).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_disabled_account_gets_forbidden_on_me() {
    let app = TestApp::new().await;
    let token = app.login("alice").await;

    let alice = app.user_id("alice").await;
    app.store.set_active(&alice, false).await.unwrap();

    let me = app.request("GET", "/api/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::FORBIDDEN);

    // Logout still works for a disabled account.
    let logout = app.request("POST", "/api/logout", None, Some(&token)).await;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let health = app.request("GET", "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "ok");
    assert!(health.body["uptime_seconds"].as_i64().unwrap() >= 0);
    assert_eq!(health.body["ws_connections"], 0);
}
