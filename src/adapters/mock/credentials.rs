//! In-memory credential store.
//!
//! Keeps the session in memory, suitable for tests and for embedders that
//! don't want anything written to disk.

use std::sync::{Arc, Mutex};

use crate::auth::credentials::{Credentials, StoredSession, UserProfile};
use crate::traits::{CredentialStore, CredentialsError};

/// In-memory credential store.
///
/// Clones share the same storage. Failure toggles let tests exercise the
/// paths where the store itself breaks.
///
/// # Example
///
/// ```ignore
/// use sessionkit::adapters::InMemoryCredentials;
/// use sessionkit::traits::CredentialStore;
/// use sessionkit::auth::Credentials;
///
/// let store = InMemoryCredentials::new();
/// assert!(store.load()?.is_none());
///
/// store.save(&Credentials::new("access", "refresh"))?;
/// assert_eq!(store.load()?.unwrap().access_token, "access");
///
/// store.clear()?;
/// assert!(store.snapshot().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentials {
    session: Arc<Mutex<StoredSession>>,
    save_should_fail: Arc<Mutex<bool>>,
    load_should_fail: Arc<Mutex<bool>>,
    clear_should_fail: Arc<Mutex<bool>>,
}

impl InMemoryCredentials {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given tokens.
    pub fn with_credentials(credentials: Credentials) -> Self {
        let store = Self::new();
        store.session.lock().unwrap().set_credentials(&credentials);
        store
    }

    /// Configure whether save operations should fail.
    pub fn set_save_should_fail(&self, should_fail: bool) {
        *self.save_should_fail.lock().unwrap() = should_fail;
    }

    /// Configure whether load operations should fail.
    pub fn set_load_should_fail(&self, should_fail: bool) {
        *self.load_should_fail.lock().unwrap() = should_fail;
    }

    /// Configure whether clear should fail.
    pub fn set_clear_should_fail(&self, should_fail: bool) {
        *self.clear_should_fail.lock().unwrap() = should_fail;
    }

    /// Copy of everything currently stored.
    pub fn snapshot(&self) -> StoredSession {
        self.session.lock().unwrap().clone()
    }

    /// Overwrite the stored session directly.
    pub fn set_snapshot(&self, session: StoredSession) {
        *self.session.lock().unwrap() = session;
    }

    fn check(&self, flag: &Mutex<bool>, err: impl FnOnce() -> CredentialsError) -> Result<(), CredentialsError> {
        if *flag.lock().unwrap() {
            Err(err())
        } else {
            Ok(())
        }
    }
}

impl CredentialStore for InMemoryCredentials {
    fn save(&self, credentials: &Credentials) -> Result<(), CredentialsError> {
        self.check(&self.save_should_fail, || {
            CredentialsError::SaveFailed("Mock save failure".to_string())
        })?;
        self.session.lock().unwrap().set_credentials(credentials);
        Ok(())
    }

    fn load(&self) -> Result<Option<Credentials>, CredentialsError> {
        self.check(&self.load_should_fail, || {
            CredentialsError::LoadFailed("Mock load failure".to_string())
        })?;
        Ok(self.session.lock().unwrap().credentials())
    }

    fn access_token(&self) -> Result<Option<String>, CredentialsError> {
        self.check(&self.load_should_fail, || {
            CredentialsError::LoadFailed("Mock load failure".to_string())
        })?;
        Ok(self.session.lock().unwrap().access_token.clone())
    }

    fn refresh_token(&self) -> Result<Option<String>, CredentialsError> {
        self.check(&self.load_should_fail, || {
            CredentialsError::LoadFailed("Mock load failure".to_string())
        })?;
        Ok(self.session.lock().unwrap().refresh_token.clone())
    }

    fn clear(&self) -> Result<(), CredentialsError> {
        self.check(&self.clear_should_fail, || {
            CredentialsError::ClearFailed("Mock clear failure".to_string())
        })?;
        *self.session.lock().unwrap() = StoredSession::default();
        Ok(())
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<(), CredentialsError> {
        self.check(&self.save_should_fail, || {
            CredentialsError::SaveFailed("Mock save failure".to_string())
        })?;
        self.session.lock().unwrap().profile = Some(profile.clone());
        Ok(())
    }

    fn load_profile(&self) -> Result<Option<UserProfile>, CredentialsError> {
        self.check(&self.load_should_fail, || {
            CredentialsError::LoadFailed("Mock load failure".to_string())
        })?;
        Ok(self.session.lock().unwrap().profile.clone())
    }

    fn clear_profile(&self) -> Result<(), CredentialsError> {
        self.check(&self.clear_should_fail, || {
            CredentialsError::ClearFailed("Mock clear failure".to_string())
        })?;
        self.session.lock().unwrap().profile = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_empty() {
        let store = InMemoryCredentials::new();
        assert!(store.load().unwrap().is_none());
        assert!(store.access_token().unwrap().is_none());
        assert!(store.load_profile().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let store = InMemoryCredentials::new();
        store.save(&Credentials::new("test-token", "test-refresh")).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "test-token");
        assert_eq!(loaded.refresh_token, "test-refresh");
        assert_eq!(store.access_token().unwrap().as_deref(), Some("test-token"));
    }

    #[test]
    fn test_save_keeps_profile() {
        let store = InMemoryCredentials::new();
        store.save_profile(&UserProfile::new("u1")).unwrap();
        store.save(&Credentials::new("a", "r")).unwrap();
        assert_eq!(store.load_profile().unwrap(), Some(UserProfile::new("u1")));
    }

    #[test]
    fn test_clear_removes_everything() {
        let store = InMemoryCredentials::with_credentials(Credentials::new("a", "r"));
        store.save_profile(&UserProfile::new("u1")).unwrap();

        store.clear().unwrap();
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_clear_profile_keeps_tokens() {
        let store = InMemoryCredentials::with_credentials(Credentials::new("a", "r"));
        store.save_profile(&UserProfile::new("u1")).unwrap();

        store.clear_profile().unwrap();
        assert!(store.load_profile().unwrap().is_none());
        assert!(store.load().unwrap().is_some());
    }

    #[test]
    fn test_failure_toggles() {
        let store = InMemoryCredentials::new();

        store.set_load_should_fail(true);
        assert!(matches!(store.load(), Err(CredentialsError::LoadFailed(_))));
        store.set_load_should_fail(false);

        store.set_save_should_fail(true);
        assert!(matches!(
            store.save(&Credentials::new("a", "r")),
            Err(CredentialsError::SaveFailed(_))
        ));
        store.set_save_should_fail(false);

        store.set_clear_should_fail(true);
        assert!(matches!(store.clear(), Err(CredentialsError::ClearFailed(_))));
    }

    #[test]
    fn test_clones_share_state() {
        let store = InMemoryCredentials::new();
        let cloned = store.clone();

        store.save(&Credentials::new("shared", "r")).unwrap();
        assert_eq!(cloned.load().unwrap().unwrap().access_token, "shared");

        cloned.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_separate_stores_are_isolated() {
        let first = InMemoryCredentials::new();
        let second = InMemoryCredentials::new();
        first.save(&Credentials::new("a", "r")).unwrap();
        assert!(second.load().unwrap().is_none());
    }
}
