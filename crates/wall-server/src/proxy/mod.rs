//! Read-only proxies to third-party APIs. Server-held API keys never reach
//! the browser.

pub mod stacks;
pub mod talent;
pub mod upstream;

pub use upstream::{UpstreamClient, UpstreamError};
