//! Test doubles for the trait abstractions.
//!
//! - [`MockHttpClient`] - scripted HTTP responses with request recording
//! - [`InMemoryCredentials`] - in-memory credential storage

pub mod credentials;
pub mod http;

pub use credentials::InMemoryCredentials;
pub use http::{MockHttpClient, MockResponse, RecordedRequest};
