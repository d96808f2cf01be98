//! sessionkit - an authenticated HTTP client runtime
//!
//! Logs a user in, attaches their access token to API calls, and renews the
//! session on a 401 with at most one refresh request in flight no matter how
//! many tasks hit the expiry at once.
//!
//! The entry point is [`auth::SessionClient`]. Transport and storage sit
//! behind the [`traits::HttpClient`] and [`traits::CredentialStore`] traits,
//! with production and test implementations in [`adapters`].

pub mod adapters;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod traits;
