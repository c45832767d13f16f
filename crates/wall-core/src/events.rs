//! Chain event types shared by the receiver and the feed.

use serde::{Deserialize, Serialize};

/// Kind of chain activity an ingested event represents.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// A message posted to the wall. Default for every print event the
    /// receiver ingests; the dashboard refines it from the payload.
    #[default]
    NewPost,
    /// A jackpot payout.
    JackpotWon,
    /// Generic user transaction surfaced by fallback enrichment.
    UserTx,
}

impl EventKind {
    /// Wire name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewPost => "new-post",
            Self::JackpotWon => "jackpot-won",
            Self::UserTx => "user-tx",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event as handed to the store, before it is stamped.
#[derive(Clone, Debug, PartialEq)]
pub struct NewEvent {
    /// Transaction hash the event was printed in.
    pub id: String,
    /// Activity kind.
    pub kind: EventKind,
    /// Decoded print value, opaque to the server.
    pub data: serde_json::Value,
}

impl NewEvent {
    /// Event for transaction `id` with print value `data`.
    pub fn new(id: impl Into<String>, kind: EventKind, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            kind,
            data,
        }
    }
}

/// A buffered chain event as served to the dashboard.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChainEvent {
    /// Transaction hash. Not unique: one transaction may print several events.
    pub id: String,
    /// Activity kind, serialized as `type`.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Decoded print value.
    pub data: serde_json::Value,
    /// Ingestion time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ChainEvent {
    pub(crate) fn stamp(event: NewEvent, timestamp: i64) -> Self {
        Self {
            id: event.id,
            kind: event.kind,
            data: event.data,
            timestamp,
        }
    }
}
