//! Run liveness signalling
//!
//! A supervising scheduler distinguishes "working slowly" from "hung" by
//! watching heartbeats, so the batch loop emits one per iteration. The
//! backoff loop additionally emits zero-item ticks while it sleeps, since a
//! long wait is otherwise indistinguishable from a dead process.

use chrono::Utc;
use lichen_common::events::{AgentEvent, EventBus};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Liveness handle shared by the batch and backoff loops
pub struct Heartbeat {
    bus: EventBus,
    processed: AtomicU64,
}

impl Heartbeat {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            processed: AtomicU64::new(0),
        }
    }

    /// Record `items` more processed items and emit one liveness signal.
    ///
    /// `items` is 0 for iterations that advanced nothing (a backoff sleep),
    /// 1 for a file handled or skipped. Returns the cumulative count.
    pub fn tick(&self, items: u64) -> u64 {
        let total = self.processed.fetch_add(items, Ordering::Relaxed) + items;
        trace!(items_processed = total, "heartbeat");
        self.bus.emit(AgentEvent::Heartbeat {
            items_processed: total,
            timestamp: Utc::now(),
        });
        total
    }

    /// Announce an upcoming rate-limit sleep to subscribers
    pub fn rate_limit_wait(&self, wait_secs: i64) {
        self.bus.emit(AgentEvent::RateLimitWait {
            wait_secs,
            timestamp: Utc::now(),
        });
    }

    /// Cumulative processed-item count for this run
    pub fn count(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// The bus heartbeats are emitted on, for run-level events
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ticks_accumulate_and_broadcast() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let heartbeat = Heartbeat::new(bus);

        assert_eq!(heartbeat.tick(1), 1);
        assert_eq!(heartbeat.tick(0), 1);
        assert_eq!(heartbeat.tick(1), 2);
        assert_eq!(heartbeat.count(), 2);

        let mut seen = Vec::new();
        for _ in 0..3 {
            match rx.recv().await.unwrap() {
                AgentEvent::Heartbeat { items_processed, .. } => seen.push(items_processed),
                other => panic!("unexpected event: {:?}", other),
            }
        }
        assert_eq!(seen, vec![1, 1, 2]);
    }
}
