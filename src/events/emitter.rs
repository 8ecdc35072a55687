//! Publish/subscribe table keyed by event name.
//!
//! # Responsibilities
//! - Keep an ordered listener list per channel
//! - Invoke listeners synchronously, in registration order
//! - Route verified events to their own channel and to `*`
//!
//! # Design Decisions
//! - Listener lists live in a `DashMap`; emit snapshots the list and drops
//!   the shard guard before calling out, so listeners may (un)subscribe
//!   from inside a callback
//! - Emitting on `error` with nobody listening is logged, not a panic

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::events::types::{WebhookEvent, WebhookFailure};
use crate::routing::WILDCARD;

/// Channel that receives every rejected delivery.
pub const ERROR_CHANNEL: &str = "error";

/// What travels on a channel.
#[derive(Debug, Clone)]
pub enum Message {
    Event(Arc<WebhookEvent>),
    Failure(Arc<WebhookFailure>),
    /// Anything emitted by hand through [`EventEmitter::emit`].
    Custom(Value),
}

pub type Listener = Arc<dyn Fn(&Message) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Listener registry.
#[derive(Default)]
pub struct EventEmitter {
    channels: DashMap<String, Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("channels", &self.channels.len())
            .finish()
    }
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener to `channel`.
    pub fn subscribe<F>(&self, channel: impl Into<String>, listener: F) -> SubscriptionId
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.channels
            .entry(channel.into())
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Listen for verified events on `channel` (an event name or `*`).
    pub fn on_event<F>(&self, channel: impl Into<String>, listener: F) -> SubscriptionId
    where
        F: Fn(&WebhookEvent) + Send + Sync + 'static,
    {
        self.subscribe(channel, move |message| {
            if let Message::Event(event) = message {
                listener(event);
            }
        })
    }

    /// Listen for rejected deliveries.
    pub fn on_error<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&WebhookFailure) + Send + Sync + 'static,
    {
        self.subscribe(ERROR_CHANNEL, move |message| {
            if let Message::Failure(failure) = message {
                listener(failure);
            }
        })
    }

    /// Forward verified events on `channel` into an async receiver.
    ///
    /// The sender side is dropped from the registry on the first send after
    /// the receiver goes away.
    pub fn event_stream(
        self: &Arc<Self>,
        channel: impl Into<String>,
    ) -> mpsc::UnboundedReceiver<Arc<WebhookEvent>> {
        let channel = channel.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let registry = Arc::downgrade(self);
        let slot: Arc<AtomicU64> = Arc::new(AtomicU64::new(u64::MAX));
        let own_id = slot.clone();
        let own_channel = channel.clone();

        let id = self.subscribe(channel, move |message| {
            if let Message::Event(event) = message {
                if tx.send(event.clone()).is_err() {
                    if let Some(registry) = registry.upgrade() {
                        let id = SubscriptionId(own_id.load(Ordering::Relaxed));
                        registry.unsubscribe(&own_channel, id);
                    }
                }
            }
        });
        slot.store(id.0, Ordering::Relaxed);
        rx
    }

    /// Remove one listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, channel: &str, id: SubscriptionId) -> bool {
        let Some(mut listeners) = self.channels.get_mut(channel) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        before != listeners.len()
    }

    /// Remove every listener on `channel`, returning how many were removed.
    pub fn remove_all_listeners(&self, channel: &str) -> usize {
        self.channels
            .remove(channel)
            .map(|(_, listeners)| listeners.len())
            .unwrap_or(0)
    }

    pub fn listener_count(&self, channel: &str) -> usize {
        self.channels
            .get(channel)
            .map(|listeners| listeners.len())
            .unwrap_or(0)
    }

    /// Call every listener on `channel` in registration order.
    ///
    /// Returns the number of listeners invoked.
    pub fn emit(&self, channel: &str, message: &Message) -> usize {
        let listeners: Vec<Listener> = match self.channels.get(channel) {
            Some(entry) => entry.iter().map(|(_, l)| l.clone()).collect(),
            None => Vec::new(),
        };

        if listeners.is_empty() && channel == ERROR_CHANNEL {
            if let Message::Failure(failure) = message {
                tracing::error!(
                    error = %failure.error,
                    uri = %failure.request.uri,
                    "Unhandled webhook failure (no error listener)"
                );
            }
        }

        for listener in &listeners {
            listener(message);
        }
        listeners.len()
    }

    /// Publish a verified event to its own channel, then to `*`.
    ///
    /// An event literally named `*` is only delivered once.
    pub fn publish_event(&self, event: Arc<WebhookEvent>) {
        let name = event.event.clone();
        let message = Message::Event(event);
        if name != WILDCARD {
            self.emit(&name, &message);
        }
        self.emit(WILDCARD, &message);
    }

    pub fn publish_failure(&self, failure: Arc<WebhookFailure>) {
        self.emit(ERROR_CHANNEL, &Message::Failure(failure));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::signing::Provider;

    fn event(name: &str) -> Arc<WebhookEvent> {
        Arc::new(WebhookEvent {
            event: name.to_string(),
            id: "bogus".into(),
            payload: serde_json::json!({}),
            url: "/".into(),
            path: "/".into(),
            host: None,
            protocol: None,
            provider: Provider::GitHub,
        })
    }

    #[test]
    fn test_emit_in_registration_order() {
        let emitter = EventEmitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let log = log.clone();
            emitter.subscribe("ping", move |_| log.lock().unwrap().push(tag));
        }

        let invoked = emitter.emit("ping", &Message::Custom(Value::from("pong")));
        assert_eq!(invoked, 3);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_custom_payload_reaches_listener() {
        let emitter = EventEmitter::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        emitter.subscribe("ping", move |message| {
            if let Message::Custom(value) = message {
                *sink.lock().unwrap() = Some(value.clone());
            }
        });

        emitter.emit("ping", &Message::Custom(Value::from("pong")));
        assert_eq!(*seen.lock().unwrap(), Some(Value::from("pong")));
    }

    #[test]
    fn test_unsubscribe() {
        let emitter = EventEmitter::new();
        let id = emitter.subscribe("push", |_| {});
        emitter.subscribe("push", |_| {});

        assert_eq!(emitter.listener_count("push"), 2);
        assert!(emitter.unsubscribe("push", id));
        assert!(!emitter.unsubscribe("push", id));
        assert!(!emitter.unsubscribe("issues", id));
        assert_eq!(emitter.listener_count("push"), 1);
        assert_eq!(emitter.remove_all_listeners("push"), 1);
        assert_eq!(emitter.listener_count("push"), 0);
    }

    #[test]
    fn test_publish_event_specific_then_wildcard() {
        let emitter = EventEmitter::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let wildcard_log = log.clone();
        emitter.on_event("*", move |e| wildcard_log.lock().unwrap().push(format!("*:{}", e.event)));
        let push_log = log.clone();
        emitter.on_event("push", move |e| push_log.lock().unwrap().push(format!("push:{}", e.event)));
        emitter.on_event("issues", |_| panic!("wrong channel"));

        emitter.publish_event(event("push"));
        assert_eq!(*log.lock().unwrap(), vec!["push:push", "*:push"]);
    }

    #[test]
    fn test_wildcard_named_event_delivered_once() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicU64::new(0));
        let counter = count.clone();
        emitter.on_event("*", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        emitter.publish_event(event("*"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_may_subscribe_during_emit() {
        let emitter = Arc::new(EventEmitter::new());
        let inner = emitter.clone();
        emitter.subscribe("push", move |_| {
            inner.subscribe("push", |_| {});
        });

        emitter.emit("push", &Message::Custom(Value::Null));
        assert_eq!(emitter.listener_count("push"), 2);
    }

    #[test]
    fn test_error_without_listener_does_not_panic() {
        let emitter = EventEmitter::new();
        assert_eq!(emitter.emit(ERROR_CHANNEL, &Message::Custom(Value::Null)), 0);
    }

    #[tokio::test]
    async fn test_event_stream_receives_events() {
        let emitter = Arc::new(EventEmitter::new());
        let mut rx = emitter.event_stream("push");

        emitter.publish_event(event("push"));
        emitter.publish_event(event("issues"));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event, "push");
        assert!(rx.try_recv().is_err());

        drop(rx);
        emitter.publish_event(event("push"));
        assert_eq!(emitter.listener_count("push"), 0);
    }
}
