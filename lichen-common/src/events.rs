//! Event types for the lichen agent event system
//!
//! Provides the shared event definitions and EventBus used to signal run
//! liveness and progress to whatever supervises an agent run (a scheduler, a
//! test harness, a future UI). Events are a side channel distinct from
//! logging: a supervisor subscribes to the bus and watches heartbeats to
//! tell "working slowly" apart from "hung".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Lichen agent event types
///
/// Events are broadcast via [`EventBus`] and are serializable so they can be
/// forwarded over a wire by a supervising process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AgentEvent {
    /// An agent run started processing an upload
    RunStarted {
        upload_id: i64,
        /// When the run started
        timestamp: DateTime<Utc>,
    },

    /// Liveness signal, emitted once per batch iteration
    ///
    /// `items_processed` is cumulative for the run. Iterations that only
    /// slept (rate-limit waits) or only skipped a file still emit one of
    /// these with an unchanged count.
    Heartbeat {
        items_processed: u64,
        timestamp: DateTime<Utc>,
    },

    /// The run entered a rate-limit wait
    RateLimitWait {
        /// Seconds the run will sleep before re-querying
        wait_secs: i64,
        timestamp: DateTime<Utc>,
    },

    /// An agent run finished all files of an upload
    RunCompleted {
        upload_id: i64,
        files_found: u64,
        files_not_found: u64,
        files_skipped: u64,
        timestamp: DateTime<Utc>,
    },
}

/// Central event distribution bus for agent events
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking emit (slow subscribers don't block the batch loop)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AgentEvent>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity.
    ///
    /// Capacity bounds how many events a slow subscriber may lag behind
    /// before old events are dropped.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events.
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event. An event
    /// emitted with no subscribers is simply dropped; liveness signalling
    /// must never stall the run.
    pub fn emit(&self, event: AgentEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Number of currently attached subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
