//! Event bus for pub/sub messaging.
//!
//! Allows modules to subscribe to events and broadcast events to all
//! subscribers without blocking the publisher.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;

use super::events::{Event, Severity};

/// Subscriber ID for tracking subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

struct Subscriber {
    id: SubscriberId,
    sender: Sender<Event>,
}

/// Event bus for broadcasting events to subscribers
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
    next_id: Arc<AtomicUsize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Subscribe to events, returns a receiver and subscription ID
    pub fn subscribe(&self) -> (Receiver<Event>, SubscriberId) {
        let (tx, rx) = unbounded();
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.subscribers.write().push(Subscriber { id, sender: tx });

        (rx, id)
    }

    /// Unsubscribe from events
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.write().retain(|s| s.id != id);
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: Event) {
        let subscribers = self.subscribers.read();

        // If a send fails the subscriber channel is closed - that's ok
        for subscriber in subscribers.iter() {
            let _ = subscriber.sender.try_send(event.clone());
        }
    }

    /// Publish a toast notification.
    pub fn notify(&self, severity: Severity, message: impl Into<String>) {
        self.publish(Event::notification(severity, message));
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Clear all subscribers
    pub fn clear(&self) {
        self.subscribers.write().clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bus_subscribe() {
        let bus = EventBus::new();
        let (_rx, _id) = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_event_bus_unsubscribe() {
        let bus = EventBus::new();
        let (_rx, id) = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.unsubscribe(id);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_bus_notify() {
        let bus = EventBus::new();
        let (rx, _id) = bus.subscribe();

        bus.notify(Severity::Warning, "Audio may not be available for some sounds");

        match rx.try_recv().unwrap() {
            Event::Notification { severity, message } => {
                assert_eq!(severity, Severity::Warning);
                assert_eq!(message, "Audio may not be available for some sounds");
            }
            other => panic!("Wrong event type received: {:?}", other),
        }
    }

    #[test]
    fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::new();
        let (rx1, _id1) = bus.subscribe();
        let (rx2, _id2) = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(Event::Shutdown);

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_event_bus_publish_without_subscribers() {
        let bus = EventBus::new();
        // Must not block or panic
        bus.notify(Severity::Info, "Audio not available for this sound");
    }

    #[test]
    fn test_event_bus_clone_shares_state() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();

        let (_rx, _id) = bus1.subscribe();
        assert_eq!(bus2.subscriber_count(), 1);
    }
}
