//! Session credential types.
//!
//! [`Credentials`] is the token pair a session lives on. [`UserProfile`] is
//! the advisory identity snapshot cached next to it, and [`StoredSession`]
//! is the three-slot layout every store persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::jwt;

/// Access and refresh token pair for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Short-lived bearer token presented on every authenticated call.
    pub access_token: String,
    /// Longer-lived token used only to obtain a new access token.
    pub refresh_token: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Expiry decoded from the access token, if it has one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        jwt::decode_expiry(&self.access_token)
    }

    /// Check if the access token is expired.
    ///
    /// Returns `true` when the expiry cannot be decoded: such credentials
    /// are never usable.
    pub fn is_expired(&self) -> bool {
        !jwt::is_usable(Some(&self.access_token))
    }
}

/// Server-reported identity of the logged-in user.
///
/// Cached for display only; it can go stale and nothing authorizes off it.
/// Fields the client doesn't know about are kept in `extra` so a round trip
/// through the store loses nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "user_id", alias = "userId")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        default,
        alias = "displayName",
        alias = "name",
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Best human-readable label for the user.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.username.as_deref())
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

/// Persisted session layout: three independent slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

impl StoredSession {
    /// Both token slots as [`Credentials`], if both are populated.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) => Some(Credentials::new(access, refresh)),
            _ => None,
        }
    }

    /// Replace both token slots, keeping the profile.
    pub fn set_credentials(&mut self, credentials: &Credentials) {
        self.access_token = Some(credentials.access_token.clone());
        self.refresh_token = Some(credentials.refresh_token.clone());
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.profile.is_none()
    }
}
