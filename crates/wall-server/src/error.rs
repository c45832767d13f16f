//! Endpoint error taxonomy and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::debug;

use crate::proxy::upstream::UpstreamError;

/// Errors surfaced by HTTP handlers. Every variant maps to a `{"error": ...}`
/// body; internal details stay in the logs.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or wrong bearer token on a webhook delivery.
    #[error("unauthorized")]
    Unauthorized,

    /// Delivery body is not JSON or its blocks have the wrong shape.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Required query parameter absent. Holds the client-facing message.
    #[error("{0}")]
    MissingParameter(&'static str),

    /// Query parameter present but unusable. Holds the client-facing message.
    #[error("{0}")]
    InvalidParameter(String),

    /// A setting the endpoint needs is absent. Holds the log-only detail.
    #[error("server misconfigured: {0}")]
    Misconfigured(&'static str),

    /// Upstream API failure. `message` is what the caller sees.
    #[error("{message}: {source}")]
    Upstream {
        /// Endpoint-specific message for the response body.
        message: &'static str,
        /// What went wrong upstream.
        #[source]
        source: UpstreamError,
    },
}

impl ApiError {
    /// HTTP status for the response.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MissingParameter(_) | Self::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            Self::MalformedPayload(_) | Self::Misconfigured(_) | Self::Upstream { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message placed in the response body.
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthorized => "Unauthorized".into(),
            Self::MalformedPayload(_) => "Failed to process delivery".into(),
            Self::MissingParameter(msg) => (*msg).into(),
            Self::InvalidParameter(msg) => msg.clone(),
            Self::Misconfigured(_) => "Server configuration error".into(),
            Self::Upstream { message, .. } => (*message).into(),
        }
    }

    /// Short classification string, logged with every error response.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::MissingParameter(_) => "missing_parameter",
            Self::InvalidParameter(_) => "invalid_parameter",
            Self::Misconfigured(_) => "misconfigured",
            Self::Upstream { .. } => "upstream",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!(
            error_kind = self.error_kind(),
            status = self.status().as_u16(),
            error = %self,
            "request failed"
        );
        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}
