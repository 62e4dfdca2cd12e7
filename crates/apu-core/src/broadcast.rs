//! Price broadcast between open editors
//!
//! A [`PriceBroker`] is created by the editing session and handed to every
//! editor that should share prices. Publishing only notifies in-memory
//! subscribers; nothing is persisted until an editor saves.
//!
//! Subscribers are notified for their own publications too. They must use
//! [`should_apply`] before taking an incoming price: the tolerance is what
//! stops publish → apply → publish cycles.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Default threshold under which an incoming price is ignored
pub const BROADCAST_TOLERANCE: f64 = 0.001;

/// A price published for a catalog resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub resource_ref: String,
    pub price: f64,
    /// Tag of the editor that published the price
    pub source: String,
}

type Callback = Arc<dyn Fn(&PriceUpdate) + Send + Sync>;

#[derive(Default)]
struct BrokerState {
    next_id: u64,
    subscribers: HashMap<String, Vec<(u64, Callback)>>,
    prices: HashMap<String, f64>,
}

/// Shared pub/sub channel for resource prices
///
/// Cloning yields another handle to the same broker.
#[derive(Clone, Default)]
pub struct PriceBroker {
    state: Arc<Mutex<BrokerState>>,
}

impl std::fmt::Debug for PriceBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PriceBroker")
            .field("resources", &state.subscribers.len())
            .field("prices", &state.prices.len())
            .finish()
    }
}

impl PriceBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for one resource.
    ///
    /// The callback stays registered until the returned [`Subscription`] is
    /// dropped or unsubscribed.
    pub fn subscribe<F>(&self, resource_ref: impl Into<String>, on_price: F) -> Subscription
    where
        F: Fn(&PriceUpdate) + Send + Sync + 'static,
    {
        let resource_ref = resource_ref.into();
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;
        state
            .subscribers
            .entry(resource_ref.clone())
            .or_default()
            .push((id, Arc::new(on_price)));

        tracing::trace!(resource = %resource_ref, subscription = id, "Subscribed to price updates");

        Subscription {
            state: Arc::downgrade(&self.state),
            resource_ref,
            id,
        }
    }

    /// Record a price and notify every subscriber of the resource.
    ///
    /// Returns the number of callbacks invoked. Callbacks run after the
    /// broker lock is released, so they may publish in turn.
    pub fn publish(&self, resource_ref: &str, price: f64, source: &str) -> usize {
        let callbacks: Vec<Callback> = {
            let mut state = self.state.lock();
            state.prices.insert(resource_ref.to_string(), price);
            state
                .subscribers
                .get(resource_ref)
                .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default()
        };

        tracing::debug!(
            resource = %resource_ref,
            price,
            source,
            subscribers = callbacks.len(),
            "Publishing price"
        );

        let update = PriceUpdate {
            resource_ref: resource_ref.to_string(),
            price,
            source: source.to_string(),
        };
        for callback in &callbacks {
            callback(&update);
        }
        callbacks.len()
    }

    /// Last price published for the resource
    pub fn current_price(&self, resource_ref: &str) -> Option<f64> {
        self.state.lock().prices.get(resource_ref).copied()
    }

    pub fn subscriber_count(&self, resource_ref: &str) -> usize {
        self.state
            .lock()
            .subscribers
            .get(resource_ref)
            .map_or(0, Vec::len)
    }
}

/// Handle returned by [`PriceBroker::subscribe`]
///
/// Dropping the handle deregisters the callback.
pub struct Subscription {
    state: Weak<Mutex<BrokerState>>,
    resource_ref: String,
    id: u64,
}

impl Subscription {
    pub fn resource_ref(&self) -> &str {
        &self.resource_ref
    }

    pub fn unsubscribe(self) {}
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("resource_ref", &self.resource_ref)
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(shared) = self.state.upgrade() else {
            return;
        };
        let mut state = shared.lock();
        if let Some(subs) = state.subscribers.get_mut(&self.resource_ref) {
            subs.retain(|(id, _)| *id != self.id);
            if subs.is_empty() {
                state.subscribers.remove(&self.resource_ref);
            }
        }
    }
}

/// Whether an incoming price differs enough from the current one to apply
pub fn should_apply(current: f64, incoming: f64, tolerance: f64) -> bool {
    (current - incoming).abs() > tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn publish_reaches_subscribers_of_the_resource_only() {
        let broker = PriceBroker::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let _sub = broker.subscribe("cement", move |update| {
            assert_eq!(update.price, 31.5);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(broker.publish("cement", 31.5, "panel"), 1);
        assert_eq!(broker.publish("sand", 12.0, "panel"), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn current_price_is_last_published() {
        let broker = PriceBroker::new();
        assert_eq!(broker.current_price("steel"), None);
        broker.publish("steel", 4.2, "a");
        broker.publish("steel", 4.35, "b");
        assert_eq!(broker.current_price("steel"), Some(4.35));
    }

    #[test]
    fn dropping_subscription_deregisters() {
        let broker = PriceBroker::new();
        let sub = broker.subscribe("brick", |_| {});
        let other = broker.subscribe("brick", |_| {});
        assert_eq!(broker.subscriber_count("brick"), 2);

        sub.unsubscribe();
        assert_eq!(broker.subscriber_count("brick"), 1);
        drop(other);
        assert_eq!(broker.subscriber_count("brick"), 0);
        assert_eq!(broker.publish("brick", 1.0, "x"), 0);
    }

    #[test]
    fn callbacks_may_publish_without_deadlock() {
        let broker = PriceBroker::new();
        let relay = broker.clone();
        let _sub = broker.subscribe("a", move |update| {
            relay.publish("b", update.price, "relay");
        });
        broker.publish("a", 2.0, "origin");
        assert_eq!(broker.current_price("b"), Some(2.0));
    }

    #[test]
    fn tolerance_blocks_echoes() {
        assert!(!should_apply(10.0, 10.0005, BROADCAST_TOLERANCE));
        assert!(should_apply(10.0, 10.01, BROADCAST_TOLERANCE));
    }
}
