//! In-process publish/subscribe hub.

use super::models::{EventKind, RoundEvent};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};
use tokio::sync::mpsc;

/// Callback invoked for every event on a subscribed channel
pub type EventHandler = Arc<dyn Fn(&RoundEvent) + Send + Sync>;

/// Token returned by subscribe calls, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    handler: EventHandler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    channels: HashMap<EventKind, Vec<Subscription>>,
}

impl Registry {
    fn allocate(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    fn find(&self, kind: EventKind, handler: &EventHandler) -> Option<SubscriptionId> {
        self.channels
            .get(&kind)?
            .iter()
            .find(|s| same_handler(&s.handler, handler))
            .map(|s| s.id)
    }

    fn insert(&mut self, kind: EventKind, id: SubscriptionId, handler: EventHandler) {
        self.channels
            .entry(kind)
            .or_default()
            .push(Subscription { id, handler });
    }
}

/// Typed event channels with synchronous, in-order delivery.
///
/// Delivery happens on the publisher's thread. The subscriber list for a
/// channel is captured when `publish` begins, so handlers added during a
/// publish only see later events. Nothing is buffered or replayed.
#[derive(Default)]
pub struct EventBus {
    registry: Mutex<Registry>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.lock();
        let counts: HashMap<_, _> = registry
            .channels
            .iter()
            .map(|(kind, subs)| (*kind, subs.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("subscribers", &counts)
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver `event` to every current subscriber of its kind
    pub fn publish(&self, event: &RoundEvent) {
        let handlers: Vec<EventHandler> = {
            let registry = self.lock();
            match registry.channels.get(&event.kind()) {
                Some(subs) => subs.iter().map(|s| Arc::clone(&s.handler)).collect(),
                None => return,
            }
        };

        for handler in handlers {
            handler(event);
        }
    }

    /// Register `handler` on `kind`.
    ///
    /// Subscribing the same handler twice to one kind returns the original id.
    pub fn subscribe(&self, kind: EventKind, handler: EventHandler) -> SubscriptionId {
        let mut registry = self.lock();
        if let Some(existing) = registry.find(kind, &handler) {
            return existing;
        }

        let id = registry.allocate();
        registry.insert(kind, id, handler);
        id
    }

    /// Register one handler on every kind under a single id.
    ///
    /// A handler already subscribed keeps its id and is only added to the
    /// kinds it is missing from.
    pub fn subscribe_all(&self, handler: EventHandler) -> SubscriptionId {
        let mut registry = self.lock();
        let existing = EventKind::ALL
            .iter()
            .find_map(|kind| registry.find(*kind, &handler));
        let id = match existing {
            Some(id) => id,
            None => registry.allocate(),
        };

        for kind in EventKind::ALL {
            if registry.find(kind, &handler).is_none() {
                registry.insert(kind, id, Arc::clone(&handler));
            }
        }
        id
    }

    /// Remove subscription `id` from `kind`. Unknown ids are ignored.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) {
        if let Some(subs) = self.lock().channels.get_mut(&kind) {
            subs.retain(|s| s.id != id);
        }
    }

    /// Remove subscription `id` from every kind
    pub fn unsubscribe_all(&self, id: SubscriptionId) {
        for subs in self.lock().channels.values_mut() {
            subs.retain(|s| s.id != id);
        }
    }

    /// Drop every subscriber of every kind.
    ///
    /// Meant for teardown only: calling this while a round is running silently
    /// stops all downstream notification.
    pub fn clear_all(&self) {
        self.lock().channels.clear();
    }

    #[must_use]
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.lock().channels.get(&kind).map_or(0, Vec::len)
    }

    /// Forward events of `kinds` into a bounded tokio channel.
    ///
    /// A full channel drops the event; a closed channel removes the
    /// subscription on the next delivery attempt.
    pub fn forward(
        self: &Arc<Self>,
        kinds: &[EventKind],
        sender: mpsc::Sender<RoundEvent>,
    ) -> SubscriptionId {
        let mut registry = self.lock();
        let id = registry.allocate();
        let bus: Weak<Self> = Arc::downgrade(self);

        let handler: EventHandler = Arc::new(move |event: &RoundEvent| {
            match sender.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("Subscriber {id:?} channel full, dropping {:?}", event.kind());
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {id:?} disconnected, removing");
                    if let Some(bus) = bus.upgrade() {
                        bus.unsubscribe_all(id);
                    }
                }
            }
        });

        for kind in kinds {
            registry.insert(*kind, id, Arc::clone(&handler));
        }
        id
    }
}

fn same_handler(a: &EventHandler, b: &EventHandler) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
