//! Bounded in-memory event history

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of events kept before the oldest are evicted
pub const DEFAULT_EVENT_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
pub struct EventLogger {
    events: Mutex<VecDeque<EventRecord>>,
    capacity: usize,
}

impl EventLogger {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&self, event: impl Into<String>) {
        let record = EventRecord {
            event: event.into(),
            timestamp: Utc::now(),
        };
        debug!(event = %record.event, "Event recorded");

        let mut events = self.events.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(record);
    }

    /// Recorded events, oldest first
    pub fn history(&self) -> Vec<EventRecord> {
        self.events.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_in_order() {
        let log = EventLogger::new();
        log.record("started");
        log.record("stopped");

        let events: Vec<String> = log.history().into_iter().map(|r| r.event).collect();
        assert_eq!(events, vec!["started", "stopped"]);
    }

    #[test]
    fn test_oldest_evicted_at_capacity() {
        let log = EventLogger::with_capacity(2);
        log.record("a");
        log.record("b");
        log.record("c");

        let events: Vec<String> = log.history().into_iter().map(|r| r.event).collect();
        assert_eq!(events, vec!["b", "c"]);
    }
}
