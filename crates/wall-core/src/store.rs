//! Bounded in-memory event buffer.

use std::collections::VecDeque;

use chrono::Utc;
use parking_lot::Mutex;

use crate::events::{ChainEvent, NewEvent};

/// Maximum number of events held in memory.
pub const EVENT_STORE_CAPACITY: usize = 50;

/// Bounded, most-recent-first buffer of ingested chain events.
///
/// Lives for the lifetime of the process and is never persisted. The chain
/// stays the source of truth; this only caches recent activity for the feed.
pub struct EventStore {
    events: Mutex<VecDeque<ChainEvent>>,
}

impl EventStore {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(EVENT_STORE_CAPACITY + 1)),
        }
    }

    /// Stamp `event` with the current time, prepend it, and evict from the
    /// tail past capacity. Returns the stored entry.
    pub fn add(&self, event: NewEvent) -> ChainEvent {
        self.add_at(event, Utc::now().timestamp_millis())
    }

    fn add_at(&self, event: NewEvent, timestamp: i64) -> ChainEvent {
        let entry = ChainEvent::stamp(event, timestamp);
        let mut events = self.events.lock();
        events.push_front(entry.clone());
        events.truncate(EVENT_STORE_CAPACITY);
        entry
    }

    /// Snapshot of the buffer, newest first.
    pub fn get_all(&self) -> Vec<ChainEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Number of buffered events, at most [`EVENT_STORE_CAPACITY`].
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing has been buffered yet.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}
