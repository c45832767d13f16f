//! # wall-server
//!
//! Axum HTTP server for the Jackpot Wall backend:
//!
//! - **Chainhook receiver**: bearer-authenticated webhook that buffers print
//!   events from successful contract calls
//! - **Event feed**: newest-first snapshot of the buffer for dashboard polling
//! - **Proxies**: Hiro Stacks API passthrough and Talent Protocol reputation
//!   lookup, keeping API keys server-side
//! - **Health** and graceful shutdown

#![deny(unsafe_code)]

pub mod chainhook;
pub mod error;
pub mod health;
pub mod proxy;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{
    build_router, AppState, ServerError, ServerHandle, WallServer, DEFAULT_DRAIN_TIMEOUT,
};
