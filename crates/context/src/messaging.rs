//! In-process messaging hub shared by everything running in a context.
//!
//! Endpoints are named broadcast channels opened by the first subscriber and
//! dropped once nobody listens anymore. Every subscriber of an endpoint sees
//! every message published to it after the subscription was made.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::debug;

/// A message body. Cheap to clone across subscribers.
pub type Payload = Arc<[u8]>;

/// The shared messaging resource of a context.
pub struct MessagingContext {
    capacity: usize,
    endpoints: Mutex<HashMap<String, broadcast::Sender<Payload>>>,
}

impl MessagingContext {
    /// Create a hub whose endpoints buffer up to `capacity` messages each.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        debug!(capacity, "Messaging context created");
        Self {
            capacity,
            endpoints: Mutex::new(HashMap::new()),
        }
    }

    /// Per-endpoint buffer size.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Publish to `endpoint`. Returns how many subscribers received it.
    ///
    /// Nothing is created for an endpoint nobody listens on.
    pub fn publish(&self, endpoint: &str, payload: impl Into<Payload>) -> usize {
        let mut endpoints = self.lock();
        let Some(sender) = endpoints.get(endpoint) else {
            return 0;
        };
        if sender.receiver_count() == 0 {
            endpoints.remove(endpoint);
            debug!(endpoint, "Messaging endpoint closed");
            return 0;
        }
        // A receiver dropped since the check above just makes this a miss
        sender.send(payload.into()).unwrap_or(0)
    }

    /// Subscribe to `endpoint`, opening it if needed.
    pub fn subscribe(&self, endpoint: &str) -> broadcast::Receiver<Payload> {
        let mut endpoints = self.lock();
        endpoints.retain(|name, sender| {
            let live = sender.receiver_count() > 0;
            if !live {
                debug!(endpoint = %name, "Messaging endpoint closed");
            }
            live
        });
        if let Some(sender) = endpoints.get(endpoint) {
            return sender.subscribe();
        }
        let (sender, receiver) = broadcast::channel(self.capacity);
        endpoints.insert(endpoint.to_string(), sender);
        debug!(endpoint, "Messaging endpoint opened");
        receiver
    }

    /// Names of endpoints with at least one live subscriber, sorted.
    pub fn endpoints(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .lock()
            .iter()
            .filter(|(_, sender)| sender.receiver_count() > 0)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort_unstable();
        names
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<Payload>>> {
        // Senders stay valid even if a holder panicked
        self.endpoints
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
