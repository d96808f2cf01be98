//! Description of an authenticated API call.

use reqwest::Url;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::traits::{Headers, HttpRequest, Method};

/// A request to send through [`crate::auth::SessionClient::authenticated_request`].
///
/// `target` is either a path resolved against the configured base URL or an
/// absolute URL. The bearer token is added at send time, so the same value
/// can be reissued after a refresh. It is only ever sent to the base URL's
/// origin: an absolute URL on another scheme, host or port goes out without
/// it.
///
/// # Example
///
/// ```ignore
/// let request = ApiRequest::post("/items")
///     .header("X-Request-Id", "42")
///     .json(serde_json::json!({ "name": "widget" }));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub target: String,
    pub headers: Headers,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::Get, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::Post, target)
    }

    pub fn put(target: impl Into<String>) -> Self {
        Self::new(Method::Put, target)
    }

    pub fn patch(target: impl Into<String>) -> Self {
        Self::new(Method::Patch, target)
    }

    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(Method::Delete, target)
    }

    /// Add a header. An `Authorization` header set here is replaced by the
    /// session's bearer token when there is one.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set a JSON body and the matching content type.
    pub fn json(mut self, value: Value) -> Self {
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = Some(value.to_string());
        self
    }

    /// Set a raw body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Whether this request goes to the API the session belongs to.
    pub fn targets_api(&self, config: &ClientConfig) -> bool {
        same_origin(&config.resolve(&self.target), &config.base_url)
    }

    /// Build the wire request, attaching `access_token` as a bearer token
    /// when the target is on the API's origin.
    pub(crate) fn to_http(&self, config: &ClientConfig, access_token: Option<&str>) -> HttpRequest {
        let mut request = HttpRequest::new(self.method, config.resolve(&self.target));
        request.headers = self.headers.clone();
        request.body = self.body.clone();

        if let Some(token) = access_token.filter(|_| self.targets_api(config)) {
            request
                .headers
                .retain(|name, _| !name.eq_ignore_ascii_case("authorization"));
            request = request.with_header("Authorization", format!("Bearer {}", token));
        }
        request
    }
}

/// Scheme, host and port all match. Unparseable URLs match nothing.
fn same_origin(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => a.origin() == b.origin(),
        _ => false,
    }
}
