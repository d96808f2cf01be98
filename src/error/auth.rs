//! Authentication-related error types.
//!
//! This module defines the errors a session can hit while logging in,
//! renewing its tokens, or making authenticated calls.

use thiserror::Error;

use crate::traits::{CredentialsError, HttpError};

/// Maximum length for response bodies carried in error messages.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Authentication-specific error variants.
///
/// `Clone` so that a single refresh failure can be handed to every caller
/// that was waiting on it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    /// The server rejected the login attempt.
    #[error("Invalid credentials ({status}): {message}")]
    InvalidCredentials { status: u16, message: String },

    /// A refresh was attempted with no refresh token stored.
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The server refused the refresh token (expired or revoked).
    #[error("Refresh token rejected ({status}): {message}")]
    RefreshRejected { status: u16, message: String },

    /// The session could not be renewed and has been cleared.
    #[error("Session expired")]
    SessionExpired,

    /// The request never got a response.
    #[error("Transport error: {0}")]
    Transport(#[from] HttpError),

    /// The server answered with a success status but an unreadable body.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The credential store failed.
    #[error("Credential storage error: {0}")]
    Storage(#[from] CredentialsError),

    /// The refresh this caller was waiting on was dropped before it settled.
    #[error("Token refresh was interrupted")]
    RefreshInterrupted,

    /// The session was logged out or replaced while a refresh was running;
    /// the renewed tokens were discarded.
    #[error("Session changed during token refresh")]
    SessionSuperseded,
}

impl AuthError {
    /// Build an [`AuthError::InvalidCredentials`] from a rejected login response.
    pub fn invalid_credentials(status: u16, body: &str) -> Self {
        AuthError::InvalidCredentials {
            status,
            message: truncate_body(body),
        }
    }

    /// Build an [`AuthError::RefreshRejected`] from a rejected refresh response.
    pub fn refresh_rejected(status: u16, body: &str) -> Self {
        AuthError::RefreshRejected {
            status,
            message: truncate_body(body),
        }
    }

    /// Check if this error can only be resolved by logging in again.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials { .. }
                | AuthError::NoRefreshToken
                | AuthError::RefreshRejected { .. }
                | AuthError::SessionExpired
        )
    }

    /// Check if retrying the same operation later might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AuthError::Transport(_) | AuthError::RefreshInterrupted
        )
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials { .. } => {
                "Sign-in failed. Check your details and try again.".to_string()
            }
            AuthError::NoRefreshToken | AuthError::SessionExpired => {
                "Your session has expired. Please sign in again.".to_string()
            }
            AuthError::RefreshRejected { .. } => {
                "Your session could not be renewed. Please sign in again.".to_string()
            }
            AuthError::Transport(e) => format!("Could not reach the server: {}", e),
            AuthError::InvalidResponse(_) => {
                "The server sent an unexpected response.".to_string()
            }
            AuthError::Storage(_) => {
                "Could not access stored credentials. Please check file permissions.".to_string()
            }
            AuthError::RefreshInterrupted => {
                "Session renewal was interrupted. Please try again.".to_string()
            }
            AuthError::SessionSuperseded => {
                "You signed in or out while the session was being renewed.".to_string()
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials { .. } => "E_AUTH_INVALID",
            AuthError::NoRefreshToken => "E_AUTH_NO_REFRESH",
            AuthError::RefreshRejected { .. } => "E_AUTH_REFRESH_REJECTED",
            AuthError::SessionExpired => "E_AUTH_SESSION_EXPIRED",
            AuthError::Transport(_) => "E_AUTH_TRANSPORT",
            AuthError::InvalidResponse(_) => "E_AUTH_RESPONSE",
            AuthError::Storage(_) => "E_AUTH_STORAGE",
            AuthError::RefreshInterrupted => "E_AUTH_INTERRUPTED",
            AuthError::SessionSuperseded => "E_AUTH_SUPERSEDED",
        }
    }
}

/// Truncate a response body to avoid carrying excessive data in errors.
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}
