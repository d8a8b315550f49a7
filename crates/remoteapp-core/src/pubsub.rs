//! Channel-connected notifications.

use std::{
    any::Any,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use uuid::Uuid;

/// Subscription identifier.
pub type SubscriptionId = Uuid;

/// Raised by the transport once a channel is up.
#[derive(Clone)]
pub struct ChannelConnectedEvent {
    /// Static channel name.
    pub name: String,
    /// Channel-specific interface object; its concrete type depends on
    /// `name`.
    pub interface: Arc<dyn Any + Send + Sync>,
}

impl ChannelConnectedEvent {
    /// Create a new event.
    #[must_use]
    pub fn new(name: impl Into<String>, interface: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            name: name.into(),
            interface,
        }
    }
}

impl fmt::Debug for ChannelConnectedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelConnectedEvent")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

type Handler = Arc<dyn Fn(&ChannelConnectedEvent) + Send + Sync>;

/// Synchronous notification bus scoped to one session.
#[derive(Default)]
pub struct PubSub {
    channel_connected: RwLock<Vec<(SubscriptionId, Handler)>>,
}

impl PubSub {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to channel-connected notifications.
    pub fn subscribe_channel_connected<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ChannelConnectedEvent) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.channel_connected
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self
            .channel_connected
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|(sub, _)| *sub != id);
        handlers.len() != before
    }

    /// Deliver an event to every subscriber in subscription order.
    ///
    /// Handlers run on the caller's thread with the subscriber list unlocked.
    pub fn publish_channel_connected(&self, event: &ChannelConnectedEvent) {
        let handlers: Vec<Handler> = self
            .channel_connected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();

        for handler in handlers {
            handler(event);
        }
    }

    /// Number of channel-connected subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.channel_connected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn event(name: &str) -> ChannelConnectedEvent {
        ChannelConnectedEvent::new(name, Arc::new(()))
    }

    #[test]
    fn test_publish_in_subscription_order() {
        let bus = PubSub::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            bus.subscribe_channel_connected(move |e| {
                seen.lock().unwrap().push(format!("{tag}:{}", e.name));
            });
        }

        bus.publish_channel_connected(&event("rail"));
        assert_eq!(*seen.lock().unwrap(), vec!["first:rail", "second:rail"]);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = PubSub::new();
        let id = bus.subscribe_channel_connected(|_| {});
        assert_eq!(bus.subscriber_count(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_handler_may_subscribe_while_publishing() {
        let bus = Arc::new(PubSub::new());
        let inner = Arc::clone(&bus);
        bus.subscribe_channel_connected(move |_| {
            inner.subscribe_channel_connected(|_| {});
        });

        bus.publish_channel_connected(&event("cliprdr"));
        assert_eq!(bus.subscriber_count(), 2);
    }
}
