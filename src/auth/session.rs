//! Session facade.
//!
//! [`SessionClient`] is what the rest of an application talks to: log in,
//! log out, ask whether the session is usable, and make calls that renew
//! the session on a 401 without the caller noticing.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::api::{self, AuthApi, ME_PATH};
use super::credentials::UserProfile;
use super::jwt;
use super::refresh::RefreshCoordinator;
use super::request::ApiRequest;
use crate::adapters::{FileCredentialStore, ReqwestHttpClient};
use crate::config::ClientConfig;
use crate::error::{AuthError, AuthResult};
use crate::traits::{CredentialStore, HttpClient, Response};

/// Where the stored session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// A usable access token is stored.
    Authenticated,
    /// A token was stored but had expired or was malformed; the session
    /// has been logged out.
    ExpiredAndCleared,
    /// Nothing was stored.
    Anonymous,
}

impl SessionStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionStatus::Authenticated)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Authenticated => write!(f, "authenticated"),
            SessionStatus::ExpiredAndCleared => write!(f, "expired (session cleared)"),
            SessionStatus::Anonymous => write!(f, "not logged in"),
        }
    }
}

/// Authenticated HTTP client for one session.
///
/// Cloning is cheap and every clone shares the same store and refresh
/// coordinator, so concurrent tasks can each hold one.
///
/// # Example
///
/// ```ignore
/// use sessionkit::auth::{ApiRequest, SessionClient};
/// use sessionkit::config::ClientConfig;
/// use sessionkit::error::AuthError;
///
/// let client = SessionClient::from_config(ClientConfig::from_env()?)?;
/// client.login("alice", "hunter2", None).await?;
///
/// match client.authenticated_request(ApiRequest::get("/items")).await {
///     Ok(response) => println!("{}", response.text_lossy()),
///     Err(AuthError::SessionExpired) => println!("Please log in again"),
///     Err(e) => return Err(e.into()),
/// }
/// ```
#[derive(Clone)]
pub struct SessionClient {
    config: Arc<ClientConfig>,
    http: Arc<dyn HttpClient>,
    store: Arc<dyn CredentialStore>,
    api: AuthApi,
    refresher: Arc<RefreshCoordinator>,
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("base_url", &self.config.base_url)
            .field("refresher", &self.refresher)
            .finish_non_exhaustive()
    }
}

impl SessionClient {
    /// Create a client from explicit collaborators.
    pub fn new(
        config: ClientConfig,
        http: Arc<dyn HttpClient>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let api = AuthApi::new(Arc::clone(&http), config.base_url.clone());
        let refresher = Arc::new(RefreshCoordinator::new(
            Arc::clone(&store),
            api.clone(),
            config.refresh_timeout,
        ));
        Self {
            config: Arc::new(config),
            http,
            store,
            api,
            refresher,
        }
    }

    /// Create a client that talks HTTP through reqwest and keeps its
    /// session in the configured credentials file.
    pub fn from_config(config: ClientConfig) -> AuthResult<Self> {
        let http = ReqwestHttpClient::with_timeout(config.request_timeout)?;
        let store = FileCredentialStore::new(config.credentials_path.clone());
        Ok(Self::new(config, Arc::new(http), Arc::new(store)))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The coordinator behind [`Self::authenticated_request`].
    pub fn refresher(&self) -> &RefreshCoordinator {
        &self.refresher
    }

    /// Log in and store the new session.
    ///
    /// If the server didn't include a profile, one is fetched from
    /// `/auth/me`; failing to get it doesn't fail the login. A rejected
    /// login returns [`AuthError::InvalidCredentials`] and leaves any
    /// existing session as it was.
    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
        challenge_token: Option<&str>,
    ) -> AuthResult<Option<UserProfile>> {
        let response = self.api.login(identifier, secret, challenge_token).await?;
        self.refresher
            .supersede(|| self.store.save(&response.credentials()))?;

        let profile = match response.profile {
            Some(profile) => Some(profile),
            None => match self.api.me(&response.access_token).await {
                Ok(profile) => Some(profile),
                Err(e) => {
                    warn!(error = %e, "Could not fetch profile after login");
                    None
                }
            },
        };

        match &profile {
            Some(profile) => self.store.save_profile(profile)?,
            None => self.store.clear_profile()?,
        }

        info!("Logged in");
        Ok(profile)
    }

    /// End the session.
    ///
    /// The server is told to forget the refresh token, but only within
    /// `logout_timeout` and without caring whether it agrees. The local
    /// session is cleared either way. The only error is failing to clear
    /// the local store.
    pub async fn logout(&self) -> AuthResult<()> {
        let refresh_token = match self.store.refresh_token() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Could not read refresh token for logout");
                None
            }
        };

        match refresh_token {
            Some(token) => {
                let limit = self.config.logout_timeout;
                match tokio::time::timeout(limit, self.api.logout(&token)).await {
                    Ok(Ok(())) => debug!("Remote logout acknowledged"),
                    Ok(Err(e)) => warn!(error = %e, "Remote logout failed"),
                    Err(_) => warn!(timeout = ?limit, "Remote logout timed out"),
                }
            }
            None => debug!("No refresh token stored, skipping remote logout"),
        }

        self.refresher.supersede(|| self.store.clear())?;
        info!("Logged out");
        Ok(())
    }

    /// Check the stored session, logging out if its token is unusable.
    pub async fn status(&self) -> AuthResult<SessionStatus> {
        match self.store.access_token()? {
            None => Ok(SessionStatus::Anonymous),
            Some(token) if jwt::is_usable(Some(&token)) => Ok(SessionStatus::Authenticated),
            Some(_) => {
                info!("Stored access token is no longer usable, ending session");
                self.logout().await?;
                Ok(SessionStatus::ExpiredAndCleared)
            }
        }
    }

    /// Whether a usable access token is stored.
    ///
    /// Side effect: a stored token that has expired or can't be decoded
    /// ends the session (see [`Self::status`]) before this returns false.
    pub async fn is_authenticated(&self) -> bool {
        match self.status().await {
            Ok(status) => status.is_authenticated(),
            Err(e) => {
                warn!(error = %e, "Could not determine session status");
                false
            }
        }
    }

    /// Send a request as the logged-in user.
    ///
    /// A 401 triggers one refresh (shared with any other caller refreshing
    /// at the same time) and one reissue of the same request, whose
    /// response is returned whatever its status. If the refresh fails the
    /// session is logged out and the call fails with
    /// [`AuthError::SessionExpired`]. Every other response comes back
    /// untouched.
    ///
    /// If the session is logged out or replaced by a new login while the
    /// refresh is running, the renewed tokens are dropped. The request is
    /// then reissued with the new login's token, or fails with
    /// `SessionExpired` after a logout.
    ///
    /// Requests to another origin than the base URL carry no token and are
    /// sent once, whatever they answer.
    pub async fn authenticated_request(&self, request: ApiRequest) -> AuthResult<Response> {
        if !request.targets_api(&self.config) {
            debug!(target = %request.target, "Foreign origin, sending without session");
            return self.send(&request, None).await;
        }

        let sent_token = self.store.access_token()?;
        let response = self.send(&request, sent_token.as_deref()).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        debug!(method = %request.method, target = %request.target, "Request unauthorized, renewing session");
        let token = match self.store.access_token()? {
            // someone else renewed while our request was out
            Some(current) if sent_token.as_deref() != Some(current.as_str()) => {
                debug!("Session already renewed, reusing stored token");
                current
            }
            _ => match self.refresher.refresh().await {
                Ok(token) => token,
                Err(AuthError::SessionSuperseded) => match self.store.access_token()? {
                    Some(current) => current,
                    None => return Err(AuthError::SessionExpired),
                },
                Err(e) => {
                    warn!(error = %e, code = e.error_code(), "Session renewal failed");
                    if let Err(e) = self.logout().await {
                        warn!(error = %e, "Could not clear session after failed renewal");
                    }
                    return Err(AuthError::SessionExpired);
                }
            },
        };

        self.send(&request, Some(&token)).await
    }

    /// Fetch the current user's profile and cache it.
    pub async fn fetch_profile(&self) -> AuthResult<UserProfile> {
        let response = self.authenticated_request(ApiRequest::get(ME_PATH)).await?;
        if !response.is_success() {
            return Err(api::unexpected_status(ME_PATH, &response));
        }
        let profile: UserProfile = api::parse(&response, ME_PATH)?;
        self.store.save_profile(&profile)?;
        Ok(profile)
    }

    /// The cached profile, without a network call.
    pub fn profile(&self) -> AuthResult<Option<UserProfile>> {
        Ok(self.store.load_profile()?)
    }

    /// The stored access token, usable or not.
    pub fn access_token(&self) -> AuthResult<Option<String>> {
        Ok(self.store.access_token()?)
    }

    async fn send(&self, request: &ApiRequest, access_token: Option<&str>) -> AuthResult<Response> {
        let http_request = request.to_http(&self.config, access_token);
        let response = self.http.execute(http_request).await?;
        debug!(status = response.status, target = %request.target, "Response received");
        Ok(response)
    }
}
