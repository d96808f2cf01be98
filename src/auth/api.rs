//! Client for the remote authentication endpoints.
//!
//! Thin typed wrappers over `/auth/login`, `/auth/refresh`, `/auth/me` and
//! `/auth/logout`. Nothing here touches the credential store; callers
//! decide what to persist.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::credentials::{Credentials, UserProfile};
use crate::error::{truncate_body, AuthError, AuthResult};
use crate::traits::{HttpClient, HttpRequest, Method, Response};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const ME_PATH: &str = "/auth/me";
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Request body for POST /auth/login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    identifier: &'a str,
    secret: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    challenge_token: Option<&'a str>,
}

/// Request body for POST /auth/refresh and POST /auth/logout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenBody<'a> {
    refresh_token: &'a str,
}

/// Response from POST /auth/refresh.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    #[serde(alias = "access_token")]
    pub access_token: String,
    #[serde(alias = "refresh_token")]
    pub refresh_token: String,
}

impl From<TokenPair> for Credentials {
    fn from(pair: TokenPair) -> Self {
        Credentials::new(pair.access_token, pair.refresh_token)
    }
}

/// Response from POST /auth/login.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(alias = "access_token")]
    pub access_token: String,
    #[serde(alias = "refresh_token")]
    pub refresh_token: String,
    #[serde(default, alias = "user")]
    pub profile: Option<UserProfile>,
}

impl LoginResponse {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.access_token, &self.refresh_token)
    }
}

/// Typed client for the authentication endpoints.
#[derive(Clone)]
pub struct AuthApi {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl std::fmt::Debug for AuthApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthApi")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AuthApi {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an endpoint path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange user credentials for a token pair.
    ///
    /// POST /auth/login
    ///
    /// Any non-success status is [`AuthError::InvalidCredentials`].
    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
        challenge_token: Option<&str>,
    ) -> AuthResult<LoginResponse> {
        let body = LoginRequest {
            identifier,
            secret,
            challenge_token,
        };
        let response = self.post_json(LOGIN_PATH, &body).await?;

        if !response.is_success() {
            return Err(AuthError::invalid_credentials(
                response.status,
                &response.text_lossy(),
            ));
        }
        parse(&response, LOGIN_PATH)
    }

    /// Trade a refresh token for a new token pair.
    ///
    /// POST /auth/refresh
    ///
    /// Any non-success status is [`AuthError::RefreshRejected`].
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let response = self
            .post_json(REFRESH_PATH, &RefreshTokenBody { refresh_token })
            .await?;

        if !response.is_success() {
            return Err(AuthError::refresh_rejected(
                response.status,
                &response.text_lossy(),
            ));
        }
        parse(&response, REFRESH_PATH)
    }

    /// Fetch the profile of the token's owner.
    ///
    /// GET /auth/me
    pub async fn me(&self, access_token: &str) -> AuthResult<UserProfile> {
        let request = HttpRequest::new(Method::Get, self.endpoint(ME_PATH))
            .with_header("Authorization", format!("Bearer {}", access_token));
        let response = self.http.execute(request).await?;

        if !response.is_success() {
            return Err(unexpected_status(ME_PATH, &response));
        }
        parse(&response, ME_PATH)
    }

    /// Invalidate a refresh token on the server.
    ///
    /// POST /auth/logout
    pub async fn logout(&self, refresh_token: &str) -> AuthResult<()> {
        let response = self
            .post_json(LOGOUT_PATH, &RefreshTokenBody { refresh_token })
            .await?;

        if !response.is_success() {
            return Err(unexpected_status(LOGOUT_PATH, &response));
        }
        Ok(())
    }

    async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> AuthResult<Response> {
        let body =
            serde_json::to_string(body).map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        let request = HttpRequest::new(Method::Post, self.endpoint(path)).with_json_body(body);

        let response = self.http.execute(request).await?;
        debug!(path, status = response.status, "Auth endpoint responded");
        Ok(response)
    }
}

/// Parse a success body, naming the endpoint on failure.
pub(crate) fn parse<T: serde::de::DeserializeOwned>(response: &Response, path: &str) -> AuthResult<T> {
    response
        .json()
        .map_err(|e| AuthError::InvalidResponse(format!("{}: {}", path, e)))
}

pub(crate) fn unexpected_status(path: &str, response: &Response) -> AuthError {
    AuthError::InvalidResponse(format!(
        "{} returned {}: {}",
        path,
        response.status,
        truncate_body(&response.text_lossy())
    ))
}
