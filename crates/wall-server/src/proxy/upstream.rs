//! Shared HTTP client for third-party read-only APIs.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Url;

/// Bytes of a non-2xx response body kept for logs.
pub const ERROR_BODY_LIMIT: usize = 4 * 1024;

/// Failure talking to an upstream API.
#[derive(Clone, Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Base URL and path did not form a valid URL.
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(String),
    /// Header name or value not representable on the wire.
    #[error("invalid header {0}")]
    InvalidHeader(String),
    /// Connection or protocol failure.
    #[error("network error: {0}")]
    Network(String),
    /// No complete response within the client timeout.
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    /// Non-2xx response.
    #[error("upstream responded with {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Start of the response body, at most [`ERROR_BODY_LIMIT`] bytes.
        body: String,
    },
    /// 2xx response whose body is not JSON.
    #[error("invalid upstream JSON: {0}")]
    Decode(String),
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl UpstreamError {
    /// Whether the upstream answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// GET-only JSON client with a bounded per-request timeout.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl UpstreamClient {
    /// Build a client whose requests, body included, must finish within
    /// `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("jackpot-wall/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;
        Ok(Self { http, timeout })
    }

    /// GET `url` and decode the body as JSON. Non-2xx statuses are errors.
    pub async fn get_json(
        &self,
        url: Url,
        headers: &[(&'static str, &str)],
    ) -> Result<serde_json::Value, UpstreamError> {
        let mut header_map = HeaderMap::new();
        let _ = header_map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in headers {
            let value = HeaderValue::from_str(value)
                .map_err(|_| UpstreamError::InvalidHeader((*name).to_string()))?;
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| UpstreamError::InvalidHeader((*name).to_string()))?;
            let _ = header_map.insert(name, value);
        }

        let response = self
            .http
            .get(url)
            .headers(header_map)
            .send()
            .await
            .map_err(|e| self.classify(&e, UpstreamError::Network))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }

        response
            .json()
            .await
            .map_err(|e| self.classify(&e, UpstreamError::Decode))
    }

    fn classify(&self, err: &reqwest::Error, other: fn(String) -> UpstreamError) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            other(err.to_string())
        }
    }
}

/// Read at most [`ERROR_BODY_LIMIT`] bytes of an error response. A body that
/// fails mid-read keeps what arrived.
async fn error_body(mut response: reqwest::Response) -> String {
    let mut buf = Vec::new();
    while buf.len() < ERROR_BODY_LIMIT {
        match response.chunk().await {
            Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
            Ok(None) | Err(_) => break,
        }
    }
    buf.truncate(ERROR_BODY_LIMIT);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Join a base URL and a request path (which may carry a query string).
pub fn join_path(base: &str, path: &str) -> Result<Url, UpstreamError> {
    let raw = format!("{}{}", base.trim_end_matches('/'), path);
    Url::parse(&raw).map_err(|e| UpstreamError::InvalidUrl(format!("{raw}: {e}")))
}

/// Append literal path segments to a base URL, percent-encoding each.
pub fn join_segments(base: &str, segments: &[&str]) -> Result<Url, UpstreamError> {
    let mut url =
        Url::parse(base).map_err(|e| UpstreamError::InvalidUrl(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| UpstreamError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
