//! Integration tests for the session lifecycle over the scripted transport.
//!
//! These tests verify:
//! - Login, logout and status transitions
//! - The single refresh-and-reissue cycle on 401
//! - Concurrent 401s sharing one refresh
//! - Session expiry when renewal fails
//! - Logout or login landing while a refresh is running

mod common;

use std::time::Duration;

use serde_json::json;

use common::{mock_session, token_expiring_in, token_pair, url};
use sessionkit::adapters::mock::MockResponse;
use sessionkit::auth::{ApiRequest, Credentials, SessionStatus, UserProfile};
use sessionkit::error::AuthError;
use sessionkit::traits::{CredentialStore, HttpError};

// ============================================================================
// Login / logout / status
// ============================================================================

#[tokio::test]
async fn test_login_then_status_then_logout() {
    let (http, store, client) = mock_session();
    let access = token_expiring_in(3600);
    http.set_response(
        &url("/auth/login"),
        MockResponse::json(
            200,
            json!({ "accessToken": access, "refreshToken": "R1", "profile": { "id": "u1", "email": "u1@example.com" } }),
        ),
    );
    http.set_response(&url("/auth/logout"), MockResponse::status(204));

    assert_eq!(client.status().await.unwrap(), SessionStatus::Anonymous);

    client.login("u1@example.com", "pw", Some("challenge")).await.unwrap();
    assert!(client.is_authenticated().await);
    assert_eq!(client.profile().unwrap().unwrap().label(), "u1@example.com");

    client.logout().await.unwrap();
    assert!(!client.is_authenticated().await);
    assert!(store.snapshot().is_empty());
    assert_eq!(http.request_count(&url("/auth/logout")), 1);
}

#[tokio::test]
async fn test_logout_clears_store_when_remote_fails() {
    let (http, store, client) = mock_session();
    store
        .save(&Credentials::new(token_expiring_in(3600), "R1"))
        .unwrap();
    store.save_profile(&UserProfile::new("u1")).unwrap();
    http.set_response(&url("/auth/logout"), MockResponse::status(503));

    client.logout().await.unwrap();

    assert!(store.load().unwrap().is_none());
    assert!(store.load_profile().unwrap().is_none());
}

#[tokio::test]
async fn test_logout_clears_store_on_transport_error() {
    let (http, store, client) = mock_session();
    store.save(&Credentials::new("A1", "R1")).unwrap();
    http.set_response(
        &url("/auth/logout"),
        MockResponse::Error(HttpError::Timeout("no answer".to_string())),
    );

    client.logout().await.unwrap();
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let (http, store, client) = mock_session();
    http.set_response(&url("/auth/logout"), MockResponse::status(200));
    store.save(&Credentials::new("A1", "R1")).unwrap();

    client.logout().await.unwrap();
    client.logout().await.unwrap();

    assert_eq!(http.request_count(&url("/auth/logout")), 1);
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_expired_token_is_not_authenticated_and_is_cleared() {
    let (http, store, client) = mock_session();
    http.set_response(&url("/auth/logout"), MockResponse::status(200));
    store
        .save(&Credentials::new(token_expiring_in(-1), "R1"))
        .unwrap();

    assert!(!client.is_authenticated().await);
    assert!(store.snapshot().is_empty());
    assert_eq!(http.request_count(&url("/auth/refresh")), 0);
}

#[tokio::test]
async fn test_failed_login_is_terminal() {
    let (http, store, client) = mock_session();
    store.save(&Credentials::new("A0", "R0")).unwrap();
    http.set_response(&url("/auth/login"), MockResponse::status(403));

    let err = client.login("alice", "nope", None).await.unwrap_err();

    assert!(matches!(err, AuthError::InvalidCredentials { status: 403, .. }));
    assert!(err.requires_reauth());
    assert_eq!(store.load().unwrap(), Some(Credentials::new("A0", "R0")));
    assert_eq!(http.get_requests().len(), 1);
}

// ============================================================================
// Refresh-and-reissue
// ============================================================================

#[tokio::test]
async fn test_expired_access_token_is_renewed_and_request_reissued() {
    let (http, store, client) = mock_session();
    let a1 = token_expiring_in(-5);
    let a2 = token_expiring_in(3600);
    store.save(&Credentials::new(&a1, "R1")).unwrap();

    http.push_response(&url("/reports"), MockResponse::status(401));
    http.set_response(&url("/reports"), MockResponse::json(200, json!([1, 2, 3])));
    http.set_response(&url("/auth/refresh"), token_pair(&a2, "R2"));

    let response = client
        .authenticated_request(ApiRequest::get("/reports"))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.json::<Vec<u32>>().unwrap(), vec![1, 2, 3]);

    let sent = http.requests_to(&url("/reports"));
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].bearer_token(), Some(a1.as_str()));
    assert_eq!(sent[1].bearer_token(), Some(a2.as_str()));
    assert_eq!(store.load().unwrap(), Some(Credentials::new(a2, "R2")));
}

#[tokio::test]
async fn test_refresh_rejected_expires_session_without_third_request() {
    let (http, store, client) = mock_session();
    store.save(&Credentials::new("A1", "R1")).unwrap();
    store.save_profile(&UserProfile::new("u1")).unwrap();

    http.set_response(&url("/reports"), MockResponse::status(401));
    http.set_response(&url("/auth/refresh"), MockResponse::status(401));
    http.set_response(&url("/auth/logout"), MockResponse::status(200));

    let err = client
        .authenticated_request(ApiRequest::get("/reports"))
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::SessionExpired);
    assert_eq!(err.error_code(), "E_AUTH_SESSION_EXPIRED");
    assert!(store.snapshot().is_empty());
    assert_eq!(http.request_count(&url("/reports")), 1);
    assert_eq!(http.request_count(&url("/auth/refresh")), 1);
}

#[tokio::test]
async fn test_refresh_transport_failure_also_expires_session() {
    let (http, store, client) = mock_session();
    store.save(&Credentials::new("A1", "R1")).unwrap();

    http.set_response(&url("/reports"), MockResponse::status(401));
    http.set_response(
        &url("/auth/refresh"),
        MockResponse::Error(HttpError::ConnectionFailed("refused".to_string())),
    );
    http.set_response(&url("/auth/logout"), MockResponse::status(200));

    let err = client
        .authenticated_request(ApiRequest::get("/reports"))
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::SessionExpired);
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_anonymous_request_on_401_expires_without_refresh_call() {
    let (http, store, client) = mock_session();
    http.set_response(&url("/reports"), MockResponse::status(401));

    let err = client
        .authenticated_request(ApiRequest::get("/reports"))
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::SessionExpired);
    assert!(http.requests_to(&url("/reports"))[0].bearer_token().is_none());
    assert_eq!(http.request_count(&url("/auth/refresh")), 0);
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_other_errors_pass_through_without_refresh() {
    let (http, store, client) = mock_session();
    store.save(&Credentials::new("A1", "R1")).unwrap();

    for status in [400u16, 403, 404, 500] {
        http.clear_responses();
        http.set_response(&url("/reports"), MockResponse::status(status));

        let response = client
            .authenticated_request(ApiRequest::get("/reports"))
            .await
            .unwrap();
        assert_eq!(response.status, status);
    }
    assert_eq!(http.request_count(&url("/auth/refresh")), 0);
}

#[tokio::test]
async fn test_transport_error_on_request_propagates() {
    let (http, store, client) = mock_session();
    store.save(&Credentials::new("A1", "R1")).unwrap();
    http.set_response(
        &url("/reports"),
        MockResponse::Error(HttpError::ConnectionFailed("refused".to_string())),
    );

    let err = client
        .authenticated_request(ApiRequest::get("/reports"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Transport(HttpError::ConnectionFailed(_))));
    assert!(err.is_transient());
    assert!(store.load().unwrap().is_some());
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_concurrent_401s_share_one_refresh() {
    let (http, store, client) = mock_session();
    store.save(&Credentials::new("A1", "R1")).unwrap();

    http.push_response(&url("/a"), MockResponse::status(401));
    http.set_response(&url("/a"), MockResponse::status(200));
    http.push_response(&url("/b"), MockResponse::status(401));
    http.set_response(&url("/b"), MockResponse::status(200));
    http.set_response(&url("/auth/refresh"), token_pair("A2", "R2"));
    http.set_delay(&url("/auth/refresh"), Duration::from_millis(100));

    let first = client.clone();
    let second = client.clone();
    let (a, b) = tokio::join!(
        first.authenticated_request(ApiRequest::get("/a")),
        second.authenticated_request(ApiRequest::get("/b")),
    );

    assert_eq!(a.unwrap().status, 200);
    assert_eq!(b.unwrap().status, 200);
    assert_eq!(http.request_count(&url("/auth/refresh")), 1);

    for path in ["/a", "/b"] {
        let sent = http.requests_to(&url(path));
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].bearer_token(), Some("A1"));
        assert_eq!(sent[1].bearer_token(), Some("A2"));
    }
    assert_eq!(store.load().unwrap(), Some(Credentials::new("A2", "R2")));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_401s_all_expire_on_one_failed_refresh() {
    let (http, store, client) = mock_session();
    store.save(&Credentials::new("A1", "R1")).unwrap();

    http.set_response(&url("/a"), MockResponse::status(401));
    http.set_response(&url("/auth/refresh"), MockResponse::status(401));
    http.set_delay(&url("/auth/refresh"), Duration::from_millis(100));
    http.set_response(&url("/auth/logout"), MockResponse::status(200));

    let results = futures::future::join_all(
        (0..3).map(|_| client.authenticated_request(ApiRequest::get("/a"))),
    )
    .await;

    for result in results {
        assert_eq!(result.unwrap_err(), AuthError::SessionExpired);
    }
    assert_eq!(http.request_count(&url("/auth/refresh")), 1);
    assert_eq!(http.request_count(&url("/a")), 3);
    assert!(store.snapshot().is_empty());
}

// ============================================================================
// Session changes while a refresh is running
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_logout_during_refresh_stays_logged_out() {
    let (http, store, client) = mock_session();
    store.save(&Credentials::new("A1", "R1")).unwrap();

    http.push_response(&url("/reports"), MockResponse::status(401));
    http.set_response(&url("/reports"), MockResponse::status(200));
    http.set_response(&url("/auth/refresh"), token_pair("A2", "R2"));
    http.set_delay(&url("/auth/refresh"), Duration::from_millis(100));
    http.set_response(&url("/auth/logout"), MockResponse::status(204));

    let mut request = Box::pin(client.authenticated_request(ApiRequest::get("/reports")));
    assert!(futures::poll!(request.as_mut()).is_pending());
    assert!(client.refresher().in_flight());

    client.logout().await.unwrap();
    assert!(store.snapshot().is_empty());

    let err = request.await.unwrap_err();

    assert_eq!(err, AuthError::SessionExpired);
    assert!(store.snapshot().is_empty());
    assert!(!client.is_authenticated().await);
    assert_eq!(http.request_count(&url("/reports")), 1);
    assert_eq!(http.request_count(&url("/auth/refresh")), 1);
}

#[tokio::test(start_paused = true)]
async fn test_login_during_refresh_keeps_new_session() {
    let (http, store, client) = mock_session();
    store.save(&Credentials::new("A1", "R1")).unwrap();

    http.push_response(&url("/reports"), MockResponse::status(401));
    http.set_response(&url("/reports"), MockResponse::status(200));
    http.set_response(&url("/auth/refresh"), token_pair("A2", "R2"));
    http.set_delay(&url("/auth/refresh"), Duration::from_millis(100));
    http.set_response(
        &url("/auth/login"),
        MockResponse::json(
            200,
            json!({ "accessToken": "A9", "refreshToken": "R9", "profile": { "id": "u2" } }),
        ),
    );

    let mut request = Box::pin(client.authenticated_request(ApiRequest::get("/reports")));
    assert!(futures::poll!(request.as_mut()).is_pending());

    client.login("bob", "pw", None).await.unwrap();

    let response = request.await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(store.load().unwrap(), Some(Credentials::new("A9", "R9")));
    let sent = http.requests_to(&url("/reports"));
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].bearer_token(), Some("A1"));
    assert_eq!(sent[1].bearer_token(), Some("A9"));
    assert_eq!(http.request_count(&url("/auth/refresh")), 1);
}
