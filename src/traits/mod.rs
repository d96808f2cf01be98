//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP transport used for every remote call
//! - [`CredentialStore`] - Token and profile storage

pub mod credentials;
pub mod http;

pub use credentials::{CredentialStore, CredentialsError};
pub use http::{Headers, HttpClient, HttpError, HttpRequest, Method, Response, STATUS_UNAUTHORIZED};
