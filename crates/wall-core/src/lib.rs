//! # wall-core
//!
//! Chain event model and the bounded in-memory store that buffers events
//! delivered by the indexer until the dashboard polls them.

#![deny(unsafe_code)]

pub mod events;
pub mod store;

pub use events::{ChainEvent, EventKind, NewEvent};
pub use store::{EventStore, EVENT_STORE_CAPACITY};
