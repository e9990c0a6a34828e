//! Event bus for broadcasting note events to live views

use super::NoteEvent;
use crate::config;
use tokio::sync::broadcast;
use tracing::debug;

/// Event bus that distributes `NoteEvent`s via `tokio::sync::broadcast`
///
/// Fire-and-forget: publishing never blocks, never panics.
/// If no subscribers are connected, events are silently dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<NoteEvent>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to receive events (for open note views)
    pub fn subscribe(&self) -> broadcast::Receiver<NoteEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish an event to all current subscribers
    pub fn publish(&self, event: NoteEvent) {
        let action = format!("{:?}", event.action);
        let note_id = event.note_id.clone();
        match self.sender.send(event) {
            Ok(n) => {
                debug!(
                    action = %action,
                    note_id = %note_id,
                    subscribers = n,
                    "NoteEvent published"
                );
            }
            Err(_) => {
                // No subscribers — this is expected and fine
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(config::EVENT_CHANNEL_CAPACITY)
    }
}
