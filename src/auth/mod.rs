//! Authentication and session management.
//!
//! This module provides:
//! - Credential and profile types shared by every store
//! - Access token expiry checks
//! - A typed client for the remote auth endpoints
//! - Single-flight token refresh
//! - The [`SessionClient`] facade used by the rest of an application

pub mod api;
pub mod credentials;
pub mod jwt;
pub mod refresh;
pub mod request;
pub mod session;

pub use api::{AuthApi, LoginResponse, TokenPair};
pub use credentials::{Credentials, StoredSession, UserProfile};
pub use refresh::RefreshCoordinator;
pub use request::ApiRequest;
pub use session::{SessionClient, SessionStatus};
