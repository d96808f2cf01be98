//! Client configuration.
//!
//! Use the builder-style setters to customize, or [`ClientConfig::from_env`]
//! to read overrides from `SESSIONKIT_*` environment variables.
//!
//! # Example
//!
//! ```ignore
//! use sessionkit::config::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::default()
//!     .with_base_url("https://api.example.com")
//!     .with_refresh_timeout(Some(Duration::from_secs(10)));
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// The credentials directory name, under the home directory.
const CREDENTIALS_DIR: &str = ".sessionkit";

/// The credentials file name.
const CREDENTIALS_FILE: &str = "credentials.json";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Upper bound on the best-effort remote logout call.
const DEFAULT_LOGOUT_TIMEOUT_SECS: u64 = 5;

pub const ENV_BASE_URL: &str = "SESSIONKIT_BASE_URL";
pub const ENV_CREDENTIALS_PATH: &str = "SESSIONKIT_CREDENTIALS_PATH";
pub const ENV_REQUEST_TIMEOUT: &str = "SESSIONKIT_REQUEST_TIMEOUT_SECS";
pub const ENV_LOGOUT_TIMEOUT: &str = "SESSIONKIT_LOGOUT_TIMEOUT_SECS";
pub const ENV_REFRESH_TIMEOUT: &str = "SESSIONKIT_REFRESH_TIMEOUT_SECS";

/// Configuration for a [`crate::auth::SessionClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL that relative request paths and auth endpoints resolve against.
    pub base_url: String,
    /// Where the file credential store keeps the session.
    pub credentials_path: PathBuf,
    /// Timeout applied to every HTTP request by the reqwest transport.
    pub request_timeout: Duration,
    /// Deadline for the remote half of logout.
    pub logout_timeout: Duration,
    /// Optional deadline for the remote refresh call (none by default).
    pub refresh_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials_path: default_credentials_path()
                .unwrap_or_else(|| PathBuf::from(CREDENTIALS_DIR).join(CREDENTIALS_FILE)),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            logout_timeout: Duration::from_secs(DEFAULT_LOGOUT_TIMEOUT_SECS),
            refresh_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by any `SESSIONKIT_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = env_var(ENV_BASE_URL) {
            config = config.with_base_url(url);
        }
        if let Some(path) = env_var(ENV_CREDENTIALS_PATH) {
            config.credentials_path = PathBuf::from(path);
        } else if default_credentials_path().is_none() {
            return Err(ConfigError::NoHomeDirectory);
        }
        if let Some(secs) = env_secs(ENV_REQUEST_TIMEOUT)? {
            config.request_timeout = secs;
        }
        if let Some(secs) = env_secs(ENV_LOGOUT_TIMEOUT)? {
            config.logout_timeout = secs;
        }
        config.refresh_timeout = env_secs(ENV_REFRESH_TIMEOUT)?;

        Ok(config)
    }

    /// Set the base URL. A trailing slash is dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the credentials file path.
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the remote logout deadline.
    pub fn with_logout_timeout(mut self, timeout: Duration) -> Self {
        self.logout_timeout = timeout;
        self
    }

    /// Set or remove the refresh deadline.
    pub fn with_refresh_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Resolve a path or absolute URL against the base URL.
    pub fn resolve(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else if target.starts_with('/') {
            format!("{}{}", self.base_url.trim_end_matches('/'), target)
        } else {
            format!("{}/{}", self.base_url.trim_end_matches('/'), target)
        }
    }
}

/// `~/.sessionkit/credentials.json`, if there is a home directory.
pub fn default_credentials_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CREDENTIALS_DIR).join(CREDENTIALS_FILE))
}

fn env_var(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn env_secs(var: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env_var(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|e| ConfigError::InvalidValue {
                var,
                value,
                reason: e.to_string(),
            }),
    }
}
