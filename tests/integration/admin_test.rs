//! Admin presence, forced logout and account status.

use http::StatusCode;
use serde_json::json;

use chatdesk_core::events::LogoutReason;
use chatdesk_core::types::UserId;
use chatdesk_database::SessionLedger;

use crate::helpers::{TestApp, drain, settle};

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let app = TestApp::new().await;
    let token = app.login("alice").await;

    let presence = app.request("GET", "/api/admin/presence", None, Some(&token)).await;
    assert_eq!(presence.status, StatusCode::FORBIDDEN);

    let bob = app.user_id("bob").await;
    let kick = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/force-logout", bob.as_uuid()),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(kick.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_presence_lists_connected_users() {
    let app = TestApp::new().await;
    let admin = app.login("root").await;
    let alice = app.login("alice").await;
    let (_conn, _rx) = app.connect(&alice);

    let presence = app.request("GET", "/api/admin/presence", None, Some(&admin)).await;
    assert_eq!(presence.status, StatusCode::OK);
    let alice_id = app.user_id("alice").await;
    let online = presence.body["online"].as_array().unwrap();
    assert_eq!(online.len(), 1);
    assert_eq!(online[0], json!(alice_id));
}

#[tokio::test]
async fn test_admin_observes_login_events() {
    let app = TestApp::new().await;
    let admin = app.login("root").await;
    let (_admin_conn, mut admin_rx) = app.connect(&admin);

    let frames = drain(&mut admin_rx);
    assert_eq!(frames[0]["event"], "admin:presence_snapshot");

    let alice = app.login("alice").await;
    let (_conn, _rx) = app.connect(&alice);

    let events: Vec<_> = drain(&mut admin_rx)
        .into_iter()
        .filter(|f| f["event"] == "admin:event")
        .map(|f| f["data"].clone())
        .filter(|d| d["username"] == "alice")
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["type"], "LOGIN");
    assert_eq!(events[1]["type"], "PRESENCE");
    assert_eq!(events[1]["online"], true);
}

#[tokio::test]
async fn test_force_logout_disconnects_then_clears() {
    let app = TestApp::new().await;
    let admin = app.login("root").await;
    let alice = app.login("alice").await;
    let (conn, mut rx) = app.connect(&alice);
    let alice_id = app.user_id("alice").await;

    let kick = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/force-logout", alice_id.as_uuid()),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(kick.status, StatusCode::NO_CONTENT);
    assert!(conn.is_closed());

    let notices = drain(&mut rx);
    let notice = notices
        .iter()
        .find(|f| f["event"] == "user:event")
        .expect("force-logout notice");
    assert_eq!(notice["data"]["type"], "FORCE_LOGOUT");
    assert_eq!(notice["data"]["reason"], "kicked");

    settle().await;
    assert!(app.store.find_active_session(&alice_id).await.unwrap().is_none());
    let logouts = app.store.logouts().await;
    assert!(logouts.iter().any(|l| l.reason == LogoutReason::Forced));
    let audit = app.store.audit_entries().await;
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].action, "FORCE_LOGOUT");
    assert_eq!(audit[0].target_id, Some(alice_id));

    let me = app.request("GET", "/api/me", None, Some(&alice)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    // Closed connections still leave the registry through the socket task.
    app.state.realtime.disconnect(&conn.id);
    let relogin = app.try_login("alice").await;
    assert_eq!(relogin.status, StatusCode::OK);
}

#[tokio::test]
async fn test_force_logout_unknown_user() {
    let app = TestApp::new().await;
    let admin = app.login("root").await;
    let kick = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/force-logout", UserId::new().as_uuid()),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(kick.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_disabling_forces_logout() {
    let app = TestApp::new().await;
    let admin = app.login("root").await;
    let alice = app.login("alice").await;
    let (conn, _rx) = app.connect(&alice);
    let alice_id = app.user_id("alice").await;
    let path = format!("/api/admin/users/{}/status", alice_id.as_uuid());

    let disable = app
        .request("PATCH", &path, Some(json!({ "is_active": false })), Some(&admin))
        .await;
    assert_eq!(disable.status, StatusCode::OK);
    assert_eq!(disable.body["is_active"], false);
    assert_eq!(disable.body["forced_logout"], true);
    assert!(conn.is_closed());
    app.state.realtime.disconnect(&conn.id);

    let me = app.request("GET", "/api/me", None, Some(&alice)).await;
    assert_eq!(me.status, StatusCode::FORBIDDEN);
    let login = app.try_login("alice").await;
    assert_eq!(login.status, StatusCode::UNAUTHORIZED);
    assert_eq!(login.body["error"], "Account disabled");

    settle().await;
    let audit = app.store.audit_entries().await;
    assert!(audit.iter().any(|a| a.action == "UPDATE_USER"));

    let enable = app
        .request("PATCH", &path, Some(json!({ "isActive": true })), Some(&admin))
        .await;
    assert_eq!(enable.status, StatusCode::OK);
    assert_eq!(enable.body["forced_logout"], false);
    app.login("alice").await;
}

#[tokio::test]
async fn test_protected_account_refuses_other_admins() {
    let app = TestApp::new().await;
    let root = app.login("root").await;
    let ops = app.login("ops").await;
    let (root_conn, _root_rx) = app.connect(&root);
    let root_id = app.user_id("root").await;

    let kick = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/force-logout", root_id.as_uuid()),
            None,
            Some(&ops),
        )
        .await;
    assert_eq!(kick.status, StatusCode::FORBIDDEN);
    assert_eq!(kick.body["error"], "Not allowed");

    let disable = app
        .request(
            "PATCH",
            &format!("/api/admin/users/{}/status", root_id.as_uuid()),
            Some(json!({ "isActive": false })),
            Some(&ops),
        )
        .await;
    assert_eq!(disable.status, StatusCode::FORBIDDEN);
    assert_eq!(disable.body["error"], "Not allowed");

    assert!(!root_conn.is_closed());
    let me = app.request("GET", "/api/me", None, Some(&root)).await;
    assert_eq!(me.status, StatusCode::OK);

    settle().await;
    assert!(app.store.audit_entries().await.is_empty());

    // A protected admin still manages everyone else.
    let ops_id = app.user_id("ops").await;
    let kick_ops = app
        .request(
            "POST",
            &format!("/api/admin/users/{}/force-logout", ops_id.as_uuid()),
            None,
            Some(&root),
        )
        .await;
    assert_eq!(kick_ops.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_status_change_notifies_admins() {
    let app = TestApp::new().await;
    let root = app.login("root").await;
    let (_root_conn, mut root_rx) = app.connect(&root);
    let bob_id = app.user_id("bob").await;
    let path = format!("/api/admin/users/{}/status", bob_id.as_uuid());
    drain(&mut root_rx);

    let disable = app
        .request_from(
            Some("203.0.113.5"),
            "PATCH",
            &path,
            Some(json!({ "isActive": false })),
            Some(&root),
        )
        .await;
    assert_eq!(disable.status, StatusCode::OK);
    assert_eq!(disable.body["forced_logout"], false);

    // Re-sending the current status still reports the record.
    let again = app
        .request("PATCH", &path, Some(json!({ "isActive": false })), Some(&root))
        .await;
    assert_eq!(again.status, StatusCode::OK);

    let updates: Vec<_> = drain(&mut root_rx)
        .into_iter()
        .filter(|f| f["event"] == "admin:event")
        .map(|f| f["data"].clone())
        .filter(|d| d["type"] == "USER_UPDATED")
        .collect();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0]["userId"], json!(bob_id));
    assert_eq!(updates[0]["username"], "bob");
    assert_eq!(updates[0]["role"], "user");
    assert_eq!(updates[0]["isActive"], false);
    assert_eq!(updates[0]["ip"], "203.0.113.5");
    assert!(updates[1].get("ip").is_none());

    settle().await;
    let audit = app.store.audit_entries().await;
    assert_eq!(audit.iter().filter(|a| a.action == "UPDATE_USER").count(), 1);
}
