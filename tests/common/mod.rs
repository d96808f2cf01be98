//! Common test utilities for integration tests.
//!
//! This module provides token builders and ready-wired session clients for
//! both the scripted mock transport and a real HTTP server (wiremock).
//!
//! # Example
//!
//! ```ignore
//! use common::{mock_session, token_expiring_in};
//!
//! let (http, store, client) = mock_session();
//! store.save(&Credentials::new(token_expiring_in(3600), "R1"))?;
//! ```

#![allow(dead_code)]

use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::json;
use tempfile::TempDir;
use wiremock::MockServer;

use sessionkit::adapters::mock::{InMemoryCredentials, MockHttpClient, MockResponse};
use sessionkit::adapters::{FileCredentialStore, ReqwestHttpClient};
use sessionkit::auth::SessionClient;
use sessionkit::config::ClientConfig;

/// Base URL used with the mock transport.
pub const BASE: &str = "https://api.example.com";

/// Full mock URL for a path.
pub fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

/// Unsigned JWT whose `exp` claim is `exp`.
pub fn token_with_exp(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "exp": exp, "sub": "user-123" }).to_string());
    format!("{}.{}.signature", header, payload)
}

/// Unsigned JWT expiring `secs` seconds from now (negative for the past).
pub fn token_expiring_in(secs: i64) -> String {
    token_with_exp(chrono::Utc::now().timestamp() + secs)
}

/// Mock refresh response carrying a new token pair.
pub fn token_pair(access: &str, refresh: &str) -> MockResponse {
    MockResponse::json(200, json!({ "accessToken": access, "refreshToken": refresh }))
}

/// A session over the scripted transport and an in-memory store.
pub fn mock_session() -> (MockHttpClient, InMemoryCredentials, SessionClient) {
    let http = MockHttpClient::new();
    let store = InMemoryCredentials::new();
    let config = ClientConfig::new().with_base_url(BASE);
    let client = SessionClient::new(config, Arc::new(http.clone()), Arc::new(store.clone()));
    (http, store, client)
}

/// Configuration pointing at a wiremock server with a temporary
/// credentials file.
pub fn server_config(server: &MockServer, dir: &TempDir) -> ClientConfig {
    ClientConfig::new()
        .with_base_url(server.uri())
        .with_credentials_path(dir.path().join("credentials.json"))
}

/// A production-wired session (reqwest + credentials file) against a
/// wiremock server.
pub fn server_session(server: &MockServer, dir: &TempDir) -> SessionClient {
    SessionClient::from_config(server_config(server, dir)).unwrap()
}

/// The file store behind [`server_session`], for inspecting what was
/// persisted.
pub fn server_store(dir: &TempDir) -> FileCredentialStore {
    FileCredentialStore::new(dir.path().join("credentials.json"))
}

/// A reqwest transport with the default timeout.
pub fn http_client() -> Arc<ReqwestHttpClient> {
    Arc::new(ReqwestHttpClient::new())
}
