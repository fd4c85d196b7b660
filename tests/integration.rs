//! Integration tests for taskboard-client using wiremock.
//!
//! These tests mock the Taskboard REST API and exercise the full session
//! lifecycle: login, proactive refresh, single-flight refresh, bounded
//! retry, and logout.

use std::time::Duration;

use futures::future::join_all;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskboard_client::auth::expiry;
use taskboard_client::{
    AccessLevel, Error, Result, Session, SessionState, TaskboardClient, TokenField,
};

/// Build a client against the mock server with in-memory storage.
async fn create_test_client(mock_uri: &str) -> TaskboardClient {
    TaskboardClient::builder()
        .base_url(mock_uri)
        .in_memory()
        .build()
        .await
        .expect("client should build")
}

/// Seed the client's store with a session that expired 10 minutes ago.
async fn seed_expired_session(client: &TaskboardClient, access: &str, refresh: &str) {
    let session = Session::with_expires_at(
        access.to_string(),
        refresh.to_string(),
        expiry::now_millis() - 600_000,
    );
    client.store().store_session(&session).await;
}

/// Seed the client's store with a session valid for another hour.
async fn seed_valid_session(client: &TaskboardClient, access: &str, refresh: &str) {
    let session = Session::with_expires_at(
        access.to_string(),
        refresh.to_string(),
        expiry::now_millis() + 3_600_000,
    );
    client.store().store_session(&session).await;
}

fn profile_json() -> serde_json::Value {
    json!({
        "id": "c1",
        "name": "Ana Souza",
        "email": "ana@example.com",
        "accessLevel": "SUPERIOR"
    })
}

// ============================================================================
// Login (scenario A)
// ============================================================================

#[tokio::test]
async fn test_login_populates_store() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collaborators/login"))
        .and(body_partial_json(json!({
            "email": "a@b.com",
            "password": "secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "T1",
            "refreshToken": "R1",
            "expiresIn": 3600
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/collaborators/me"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri()).await;
    let before = expiry::now_millis();

    let profile = client.session().login("a@b.com", "secret").await?;
    assert_eq!(profile.name, "Ana Souza");
    assert_eq!(profile.access_level, AccessLevel::Superior);

    // Store holds the issued tokens and a derived expiry ~1h out.
    assert_eq!(
        client.store().get(TokenField::AccessToken).await.as_deref(),
        Some("T1")
    );
    assert_eq!(
        client.store().get(TokenField::RefreshToken).await.as_deref(),
        Some("R1")
    );
    let expires_at: i64 = client
        .store()
        .get(TokenField::ExpiresAt)
        .await
        .unwrap()
        .parse()
        .unwrap();
    assert!(expires_at >= before + 3_600_000);
    assert!(expires_at <= expiry::now_millis() + 3_600_000);

    assert!(client.session().is_authenticated().await);
    assert_eq!(client.session().state(), SessionState::Authenticated);

    // The profile was cached at login; no second /me call happens.
    let cached = client.session().current_user().await?;
    assert_eq!(cached, profile);

    Ok(())
}

// ============================================================================
// Refresh (scenarios B and C)
// ============================================================================

#[tokio::test]
async fn test_expired_token_triggers_single_refresh_before_request() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_partial_json(json!({ "refreshToken": "R1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "T2",
            "refreshToken": "R2",
            "expiresIn": 3600
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // The GET must carry the refreshed token, not the stale one.
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri()).await;
    seed_expired_session(&client, "STALE", "R1").await;

    let tasks = client.tasks().list(None).await?;
    assert!(tasks.is_empty());

    // The rotated refresh token was stored.
    assert_eq!(
        client.store().get(TokenField::RefreshToken).await.as_deref(),
        Some("R2")
    );

    Ok(())
}

#[tokio::test]
async fn test_rejected_refresh_ends_session_and_clears_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri()).await;
    seed_expired_session(&client, "STALE", "R1").await;

    let result = client.http().get("/tasks").await;
    assert_eq!(result.unwrap_err(), Error::SessionExpired);

    // Terminal refresh failure purged the session.
    assert!(client.store().session().await.is_none());
    assert!(client.store().get(TokenField::RefreshToken).await.is_none());
    assert!(!client.session().is_authenticated().await);
}

#[tokio::test]
async fn test_refresh_without_stored_token_is_session_unavailable() {
    let mock_server = MockServer::start().await;
    let client = create_test_client(&mock_server.uri()).await;

    let result = client.http().get("/tasks").await;
    assert_eq!(result.unwrap_err(), Error::SessionUnavailable);
}

#[tokio::test]
async fn test_transient_refresh_failure_keeps_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri()).await;
    seed_expired_session(&client, "STALE", "R1").await;

    let result = client.refresher().refresh().await;
    assert_eq!(result.unwrap_err(), Error::RefreshFailed(503));

    // The session survives a transient failure; a later retry is possible.
    assert_eq!(
        client.store().get(TokenField::RefreshToken).await.as_deref(),
        Some("R1")
    );
}

// ============================================================================
// Single-flight refresh
// ============================================================================

#[tokio::test]
async fn test_concurrent_refreshes_share_one_attempt() {
    let mock_server = MockServer::start().await;

    // The delay keeps the attempt in flight while the other callers pile on;
    // expect(1) is the single-flight assertion.
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "accessToken": "T2",
                    "expiresIn": 3600
                }))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri()).await;
    seed_expired_session(&client, "STALE", "R1").await;

    let outcomes = join_all((0..5).map(|_| client.refresher().refresh())).await;

    for outcome in outcomes {
        let session = outcome.expect("all callers share the one success");
        assert_eq!(session.access_token, "T2");
        // No rotation in the response: the old refresh token is kept.
        assert_eq!(session.refresh_token, "R1");
    }
}

#[tokio::test]
async fn test_concurrent_refreshes_share_one_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri()).await;
    seed_expired_session(&client, "STALE", "R1").await;

    let outcomes = join_all((0..4).map(|_| client.refresher().refresh())).await;

    for outcome in outcomes {
        assert_eq!(outcome.unwrap_err(), Error::RefreshFailed(500));
    }
}

#[tokio::test]
async fn test_sequential_refreshes_each_hit_the_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "T2",
            "expiresIn": 3600
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri()).await;
    seed_expired_session(&client, "STALE", "R1").await;

    // Non-overlapping calls are separate attempts, not a stale shared one.
    client.refresher().refresh().await.unwrap();
    client.refresher().refresh().await.unwrap();
}

// ============================================================================
// Bounded retry
// ============================================================================

#[tokio::test]
async fn test_retry_budget_is_bounded() {
    let mock_server = MockServer::start().await;

    // Initial request plus max_retries (2) retries = 3 hits, then give up.
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(401))
        .expect(3)
        .mount(&mock_server)
        .await;

    // Each retry cycle refreshes once.
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "T-fresh",
            "expiresIn": 3600
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri()).await;
    seed_valid_session(&client, "T0", "R1").await;

    let result = client.http().get("/tasks").await;
    assert_eq!(result.unwrap_err(), Error::SessionExpired);
}

#[tokio::test]
async fn test_non_auth_statuses_are_returned_as_is() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reports/42"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such report"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri()).await;
    seed_valid_session(&client, "T0", "R1").await;

    // The transport does not interpret business-level errors.
    let response = client.http().get("/reports/42").await?;
    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(response.text().await.unwrap(), "no such report");

    Ok(())
}

// ============================================================================
// Atomic session update
// ============================================================================

#[tokio::test]
async fn test_malformed_refresh_leaves_session_untouched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri()).await;
    let stored = Session::with_expires_at(
        "OLD".to_string(),
        "R-OLD".to_string(),
        expiry::now_millis() - 600_000,
    );
    client.store().store_session(&stored).await;

    let result = client.refresher().refresh().await;
    assert_eq!(result.unwrap_err(), Error::MalformedRefreshResponse);

    // No partial overwrite: all three fields are exactly as seeded.
    assert_eq!(client.store().session().await.unwrap(), stored);
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_is_idempotent_even_when_server_is_down() {
    // No logout mock mounted: the server answers 404, and that is fine.
    let mock_server = MockServer::start().await;

    let client = create_test_client(&mock_server.uri()).await;
    seed_valid_session(&client, "T0", "R1").await;
    assert!(client.session().is_authenticated().await);

    let mut state = client.session().watch_state();

    client.session().logout().await;
    client.session().logout().await;

    assert!(client.store().session().await.is_none());
    assert!(!client.session().is_authenticated().await);
    assert_eq!(*state.borrow_and_update(), SessionState::Anonymous);
}

// ============================================================================
// Invalid credentials / network failures
// ============================================================================

#[tokio::test]
async fn test_login_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collaborators/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "bad credentials" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri()).await;

    let result = client.session().login("a@b.com", "wrong").await;
    assert_eq!(result.unwrap_err(), Error::InvalidCredentials);

    // Nothing was stored.
    assert!(client.store().session().await.is_none());
    assert_eq!(client.session().state(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_failed_profile_fetch_discards_login() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collaborators/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "T1",
            "refreshToken": "R1",
            "expiresIn": 3600
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/collaborators/me"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri()).await;

    let result = client.session().login("a@b.com", "secret").await;
    assert!(matches!(result.unwrap_err(), Error::Api { status: 500, .. }));

    // A failed login leaves no session behind: the tokens stored before
    // the profile fetch were purged again.
    assert!(client.store().session().await.is_none());
    assert!(!client.session().is_authenticated().await);
    assert_eq!(client.session().state(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_terminal_failure_in_current_user_drops_state() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collaborators/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "T1",
            "refreshToken": "R1",
            "expiresIn": 3600
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/collaborators/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri()).await;
    client.session().login("a@b.com", "secret").await.unwrap();
    assert_eq!(client.session().state(), SessionState::Authenticated);

    let mut state = client.session().watch_state();
    state.borrow_and_update();

    // Simulate the transport having ended the session: the store is empty,
    // so the profile fetch hits a terminal refresh failure.
    client.store().clear().await;

    let err = client.session().current_user().await.unwrap_err();
    assert!(err.requires_login());

    // The published state followed the session loss, and watchers saw it.
    assert_eq!(client.session().state(), SessionState::Anonymous);
    assert!(state.has_changed().unwrap());
    assert_eq!(*state.borrow_and_update(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_login_network_error() {
    // Nothing listens on this port; connect fails fast.
    let client = create_test_client("http://127.0.0.1:9").await;

    let err = client
        .session()
        .login("a@b.com", "secret")
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::Network(_) | Error::Timeout),
        "unexpected error: {err:?}"
    );
}

// ============================================================================
// Typed resource API
// ============================================================================

#[tokio::test]
async fn test_boards_list_typed() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/boards"))
        .and(header("authorization", "Bearer T0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "b1", "name": "Launch", "createdAt": "2024-03-01T10:00:00Z" },
            { "id": "b2", "name": "Backlog" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri()).await;
    seed_valid_session(&client, "T0", "R1").await;

    let boards = client.boards().list().await?;
    assert_eq!(boards.len(), 2);
    assert_eq!(boards[0].name, "Launch");
    assert!(boards[1].created_at.is_none());

    Ok(())
}

#[tokio::test]
async fn test_task_update_maps_api_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/tasks/t1"))
        .respond_with(
            ResponseTemplate::new(422).set_body_string("phase does not exist"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri()).await;
    seed_valid_session(&client, "T0", "R1").await;

    let patch = taskboard_client::TaskPatch::default().phase("missing");
    let err = client.tasks().update("t1", &patch).await.unwrap_err();
    assert_eq!(
        err,
        Error::Api {
            status: 422,
            message: "phase does not exist".into()
        }
    );
}
