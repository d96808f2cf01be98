//! Error types for sessionkit.
//!
//! - [`AuthError`]: everything a session operation can fail with
//! - [`AuthResult<T>`]: result alias used across the crate
//! - [`ConfigError`]: invalid configuration values
//!
//! Transport and storage failures have their own types next to their
//! traits ([`crate::traits::HttpError`], [`crate::traits::CredentialsError`])
//! and convert into [`AuthError`] with `?`.

mod auth;

pub use auth::AuthError;
pub(crate) use auth::truncate_body;

use thiserror::Error;

/// Result alias for session operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// No home directory to derive the default credentials path from.
    #[error("Could not determine home directory")]
    NoHomeDirectory,
}
