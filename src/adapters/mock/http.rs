//! Mock HTTP client for testing.
//!
//! Provides a scriptable mock HTTP client that returns predefined responses
//! or errors, optionally after a delay, and records every request it sees.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::traits::{Headers, HttpClient, HttpError, HttpRequest, Method, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method
    pub method: Method,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body
    pub body: Option<String>,
}

impl RecordedRequest {
    /// The bearer token presented on this request, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("authorization"))
            .and_then(|(_, v)| v.strip_prefix("Bearer "))
    }

    /// Parse the request body as JSON.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body.as_deref().and_then(|b| serde_json::from_str(b).ok())
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a response (any status)
    Success(Response),
    /// Fail at the transport level
    Error(HttpError),
}

impl MockResponse {
    /// Response with the given status and JSON body.
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        MockResponse::Success(Response::json_body(status, &value))
    }

    /// Response with the given status and an empty body.
    pub fn status(status: u16) -> Self {
        MockResponse::Success(Response::new(status, bytes::Bytes::new()))
    }
}

#[derive(Debug, Default)]
struct Script {
    /// One-shot responses, consumed in order
    queued: VecDeque<MockResponse>,
    /// Returned once the queue is empty
    sticky: Option<MockResponse>,
    /// Applied before every response for this URL
    delay: Option<Duration>,
}

/// Mock HTTP client for testing.
///
/// Responses are configured per URL. A URL matches a script exactly or, if
/// no exact script exists, by the longest configured prefix. Queued
/// responses are handed out first, then the sticky one, then the default.
///
/// # Example
///
/// ```ignore
/// use sessionkit::adapters::mock::{MockHttpClient, MockResponse};
///
/// let client = MockHttpClient::new();
/// client.push_response("https://api.example.com/data", MockResponse::status(401));
/// client.set_response("https://api.example.com/data", MockResponse::status(200));
///
/// // first call gets 401, every later call gets 200
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    scripts: Arc<Mutex<HashMap<String, Script>>>,
    default_response: Arc<Mutex<Option<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response returned whenever no queued response is left.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut scripts = self.scripts.lock().unwrap();
        scripts.entry(url.to_string()).or_default().sticky = Some(response);
    }

    /// Queue a response that is returned exactly once.
    pub fn push_response(&self, url: &str, response: MockResponse) {
        let mut scripts = self.scripts.lock().unwrap();
        scripts
            .entry(url.to_string())
            .or_default()
            .queued
            .push_back(response);
    }

    /// Delay every response for this URL.
    pub fn set_delay(&self, url: &str, delay: Duration) {
        let mut scripts = self.scripts.lock().unwrap();
        scripts.entry(url.to_string()).or_default().delay = Some(delay);
    }

    /// Set a default response for URLs without a script.
    pub fn set_default_response(&self, response: MockResponse) {
        *self.default_response.lock().unwrap() = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Recorded requests whose URL is exactly `url`.
    pub fn requests_to(&self, url: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .cloned()
            .collect()
    }

    /// Number of requests sent to exactly `url`.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests_to(url).len()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    /// Clear all configured responses and delays.
    pub fn clear_responses(&self) {
        self.scripts.lock().unwrap().clear();
    }

    fn record_request(&self, request: &HttpRequest) {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method,
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
        });
    }

    /// Pick the response and delay for a URL.
    fn next_response(&self, url: &str) -> (Option<MockResponse>, Option<Duration>) {
        let mut scripts = self.scripts.lock().unwrap();

        let key = if scripts.contains_key(url) {
            Some(url.to_string())
        } else {
            scripts
                .keys()
                .filter(|pattern| url.starts_with(pattern.as_str()))
                .max_by_key(|pattern| pattern.len())
                .cloned()
        };

        if let Some(script) = key.and_then(|k| scripts.get_mut(&k)) {
            let response = script.queued.pop_front().or_else(|| script.sticky.clone());
            if response.is_some() {
                return (response, script.delay);
            }
        }

        (self.default_response.lock().unwrap().clone(), None)
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<Response, HttpError> {
        self.record_request(&request);
        let (response, delay) = self.next_response(&request.url);

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match response {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!(
                "No mock response for URL: {}",
                request.url
            ))),
        }
    }
}
