//! Session telemetry collector.
//!
//! Each session owns one collector: a bounded history of `SessionEvent`s
//! plus a broadcast stream so a progress UI can follow along. Nothing is
//! shared between sessions.

use std::collections::VecDeque;

use tokio::sync::broadcast;

use crate::config::TelemetryConfig;

pub mod events;

pub use events::SessionEvent;

/// Snapshot of collector state for CLI reporting.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TelemetrySnapshot {
    pub recent: Vec<SessionEvent>,
    pub total_events: u64,
    pub dropped_events: u64,
}

/// Broadcast-based collector retaining a bounded history of session events.
pub struct SessionTelemetry {
    tx: broadcast::Sender<SessionEvent>,
    history: VecDeque<SessionEvent>,
    history_capacity: usize,
    total_events: u64,
    dropped_history: u64,
}

impl SessionTelemetry {
    pub fn new(channel_capacity: usize, history_capacity: usize) -> Self {
        // broadcast::channel panics on zero capacity
        let (tx, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            tx,
            history: VecDeque::with_capacity(history_capacity),
            history_capacity,
            total_events: 0,
            dropped_history: 0,
        }
    }

    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self::new(config.channel_capacity, config.history_capacity)
    }

    pub fn publish(&mut self, event: SessionEvent) {
        self.total_events += 1;
        if self.history.len() == self.history_capacity {
            self.history.pop_front();
            self.dropped_history += 1;
        }
        if self.history_capacity > 0 {
            self.history.push_back(event.clone());
        }

        // No subscribers is fine
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            recent: self.history.iter().cloned().collect(),
            total_events: self.total_events,
            dropped_events: self.dropped_history,
        }
    }
}

impl Default for SessionTelemetry {
    fn default() -> Self {
        Self::from_config(&TelemetryConfig::default())
    }
}
