//! Credentials do not survive a process restart.

use std::time::Duration;

use http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_restart_rejects_old_credential_and_relogin_succeeds() {
    let before = TestApp::new().await;
    let old = before.login("alice").await;
    let old_me = before.request("GET", "/api/me", None, Some(&old)).await;
    let old_sid = old_me.body["session_id"].as_str().unwrap().to_string();

    // Boot epochs have one-second resolution.
    tokio::time::sleep(Duration::from_millis(1100)).await;
    let after = before.restart();

    let me = after.request("GET", "/api/me", None, Some(&old)).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(me.body["error"], "Session expired");
    assert!(after.state.authenticator.authenticate(&old).is_err());

    // The ledger still holds the previous run's session; it is acquirable.
    let new = after.login("alice").await;
    let new_me = after.request("GET", "/api/me", None, Some(&new)).await;
    assert_eq!(new_me.status, StatusCode::OK);
    assert_ne!(new_me.body["session_id"].as_str().unwrap(), old_sid);

    // Logging out with the old credential is still accepted and harmless.
    let logout = after.request("POST", "/api/logout", None, Some(&old)).await;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);
    let still = after.request("GET", "/api/me", None, Some(&new)).await;
    assert_eq!(still.status, StatusCode::OK);
}
