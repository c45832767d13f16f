//! Bearer-token authorization for webhook deliveries.

use axum::http::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

/// Shared-secret bearer check for webhook deliveries.
#[derive(Clone)]
pub struct WebhookAuth {
    secret: SecretString,
}

impl std::fmt::Debug for WebhookAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookAuth([REDACTED])")
    }
}

impl WebhookAuth {
    /// Accept deliveries presenting `secret`.
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// True when `header` is exactly `Bearer <secret>`.
    pub fn verify(&self, header: Option<&HeaderValue>) -> bool {
        let Some(token) = header
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
        else {
            return false;
        };
        constant_time_eq(token.as_bytes(), self.secret.expose_secret().as_bytes())
    }
}

/// Length-revealing but otherwise constant-time byte comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
