//! Publish/subscribe transport
//!
//! The broker itself is an external collaborator; services talk to it
//! through [`MessageBus`] so the wiring can be swapped without touching the
//! pipeline. [`InMemoryBus`] is the in-process implementation used by the
//! demo node and the test suite.

use ecg_core::{EcgError, EcgResult};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Thread-safe topic-based publish/subscribe
///
/// `publish` may be called concurrently from any worker; implementations
/// must serialize delivery internally.
pub trait MessageBus: Send + Sync {
    /// Publish a payload to a topic
    fn publish(&self, topic: &str, payload: Vec<u8>) -> EcgResult<()>;

    /// Subscribe to a topic, receiving every payload published after the
    /// call
    fn subscribe(&self, topic: &str) -> broadcast::Receiver<Vec<u8>>;
}

/// In-process bus backed by one broadcast channel per topic
pub struct InMemoryBus {
    capacity: usize,
    topics: Mutex<HashMap<String, broadcast::Sender<Vec<u8>>>>,
}

impl InMemoryBus {
    /// Create a bus whose per-topic channels buffer `capacity` messages
    pub fn new(capacity: usize) -> Self {
        InMemoryBus {
            capacity,
            topics: Mutex::new(HashMap::new()),
        }
    }

    fn sender_for(&self, topic: &str) -> EcgResult<broadcast::Sender<Vec<u8>>> {
        let mut topics = self.topics.lock().map_err(|_| EcgError::TransportFailure {
            reason: "topic registry lock poisoned".to_string(),
        })?;
        Ok(topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone())
    }
}

impl MessageBus for InMemoryBus {
    fn publish(&self, topic: &str, payload: Vec<u8>) -> EcgResult<()> {
        let sender = self.sender_for(topic)?;
        // A send with no live subscribers is a drop, not a failure
        if sender.send(payload).is_err() {
            tracing::debug!(topic, "published with no subscribers, message dropped");
        }
        Ok(())
    }

    fn subscribe(&self, topic: &str) -> broadcast::Receiver<Vec<u8>> {
        match self.sender_for(topic) {
            Ok(sender) => sender.subscribe(),
            // A poisoned registry leaves us with a channel nobody can
            // publish to; the receiver simply reports Closed
            Err(_) => broadcast::channel(1).1,
        }
    }
}
