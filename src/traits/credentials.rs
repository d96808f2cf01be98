//! Credential store trait abstraction.
//!
//! Provides a trait-based abstraction for credential storage and retrieval,
//! enabling dependency injection and mocking in tests.

use thiserror::Error;

use crate::auth::{Credentials, UserProfile};

/// Credential store operation errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CredentialsError {
    /// Failed to load credentials
    #[error("Failed to load credentials: {0}")]
    LoadFailed(String),
    /// Failed to save credentials
    #[error("Failed to save credentials: {0}")]
    SaveFailed(String),
    /// Failed to clear credentials
    #[error("Failed to clear credentials: {0}")]
    ClearFailed(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(String),
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Durable holder for one session's tokens and cached profile.
///
/// The store has three independent slots: access token, refresh token and
/// profile. Every operation is synchronous and touches nothing but the store
/// itself, so callers can read and write between suspension points without
/// extra locking.
///
/// # Example
///
/// ```ignore
/// use sessionkit::traits::CredentialStore;
/// use sessionkit::auth::Credentials;
///
/// fn rotate<S: CredentialStore>(store: &S, access: &str, refresh: &str) -> Result<(), CredentialsError> {
///     store.save(&Credentials::new(access, refresh))
/// }
/// ```
pub trait CredentialStore: Send + Sync {
    /// Write both token slots. The profile slot is left untouched.
    fn save(&self, credentials: &Credentials) -> Result<(), CredentialsError>;

    /// Read both token slots.
    ///
    /// # Returns
    /// - `Ok(Some(credentials))` if both tokens are stored
    /// - `Ok(None)` if either token slot is empty
    /// - `Err(error)` if the store could not be read
    fn load(&self) -> Result<Option<Credentials>, CredentialsError>;

    /// Read the access token slot on its own.
    fn access_token(&self) -> Result<Option<String>, CredentialsError> {
        Ok(self.load()?.map(|c| c.access_token))
    }

    /// Read the refresh token slot on its own.
    fn refresh_token(&self) -> Result<Option<String>, CredentialsError> {
        Ok(self.load()?.map(|c| c.refresh_token))
    }

    /// Remove the access token, refresh token and profile in one step.
    ///
    /// No partial state is observable afterwards.
    fn clear(&self) -> Result<(), CredentialsError>;

    /// Replace the cached profile.
    fn save_profile(&self, profile: &UserProfile) -> Result<(), CredentialsError>;

    /// Read the cached profile, if any.
    fn load_profile(&self) -> Result<Option<UserProfile>, CredentialsError>;

    /// Drop the cached profile, leaving the tokens in place.
    fn clear_profile(&self) -> Result<(), CredentialsError>;
}
