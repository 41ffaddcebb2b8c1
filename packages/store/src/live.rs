//! # Live subscriptions
//!
//! A provider hands out a [`Live<E>`] for every push-based query: a release
//! handle ([`Subscription`]) paired with the stream of events the provider emits
//! for it. Events travel over a `futures` unbounded channel, so the store that
//! owns the `Live` is the only reader and therefore the only writer of its own
//! state.
//!
//! Dropping a `Live` (or calling [`Live::release`]) runs the handle's release
//! hook exactly once and discards anything still queued, so nothing is applied
//! after release.
//!
//! [`Listeners`] is the fan-out registry provider implementations use on their
//! side of the channel.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::channel::mpsc::{unbounded, UnboundedSender};
use futures::stream::{LocalBoxStream, Stream, StreamExt};
use futures::FutureExt;

/// Identifier of one subscription, unique per provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Release handle for an active subscription.
///
/// The release hook runs on [`Subscription::release`] or on drop, whichever
/// comes first, and never twice.
pub struct Subscription {
    id: SubscriptionId,
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(id: SubscriptionId, release: impl FnOnce() + 'static) -> Self {
        Self {
            id,
            release: Some(Box::new(release)),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }

    pub fn release(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            tracing::debug!(subscription = %self.id, "releasing subscription");
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("released", &self.is_released())
            .finish()
    }
}

/// Result of a non-blocking read from a [`Live`] stream.
#[derive(Debug, Clone, PartialEq)]
pub enum TryNext<E> {
    Event(E),
    /// Nothing queued right now.
    Empty,
    /// The provider closed the stream; no more events will arrive.
    Closed,
}

/// An active subscription and the events it produces.
pub struct Live<E> {
    // Declared first so the release hook runs before queued events are dropped.
    handle: Subscription,
    events: LocalBoxStream<'static, E>,
}

impl<E: 'static> Live<E> {
    pub fn new(handle: Subscription, events: impl Stream<Item = E> + 'static) -> Self {
        Self {
            handle,
            events: events.boxed_local(),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.handle.id()
    }

    /// Wait for the next event. `None` once the provider closes the stream.
    pub async fn next(&mut self) -> Option<E> {
        self.events.next().await
    }

    /// Take the next event if one is already queued.
    pub fn try_next(&mut self) -> TryNext<E> {
        match self.events.next().now_or_never() {
            Some(Some(event)) => TryNext::Event(event),
            Some(None) => TryNext::Closed,
            None => TryNext::Empty,
        }
    }

    pub fn release(self) {
        drop(self);
    }
}

impl<E> fmt::Debug for Live<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Live").field("handle", &self.handle).finish()
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Registry<E> {
    next_id: u64,
    senders: BTreeMap<SubscriptionId, UnboundedSender<E>>,
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self {
            next_id: 1,
            senders: BTreeMap::new(),
        }
    }
}

/// Provider-side registry of listeners for one event source.
pub struct Listeners<E> {
    inner: Arc<Mutex<Registry<E>>>,
}

impl<E> Clone for Listeners<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry::default())),
        }
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("active", &lock(&self.inner).senders.len())
            .finish()
    }
}

impl<E: Clone + 'static> Listeners<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener whose stream starts with `initial`.
    pub fn subscribe_with(&self, initial: E) -> Live<E> {
        let (tx, rx) = unbounded();
        // Cannot fail: the receiver is alive in this scope.
        let _ = tx.unbounded_send(initial);

        let id = {
            let mut registry = lock(&self.inner);
            let id = SubscriptionId(registry.next_id);
            registry.next_id += 1;
            registry.senders.insert(id, tx);
            id
        };
        tracing::debug!(subscription = %id, "listener registered");

        let registry: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.inner);
        let handle = Subscription::new(id, move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry).senders.remove(&id);
            }
        });
        Live::new(handle, rx)
    }

    /// Deliver `event` to every registered listener, in registration order.
    pub fn emit(&self, event: E) {
        let mut registry = lock(&self.inner);
        registry
            .senders
            .retain(|_, tx| tx.unbounded_send(event.clone()).is_ok());
    }

    /// Deliver a final `event` to every listener, then end all their streams.
    pub fn close_with(&self, event: E) {
        let senders = std::mem::take(&mut lock(&self.inner).senders);
        for tx in senders.into_values() {
            let _ = tx.unbounded_send(event.clone());
        }
    }

    /// Number of listeners that have not been released.
    pub fn active(&self) -> usize {
        lock(&self.inner).senders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_release_hook_runs_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let sub = Subscription::new(SubscriptionId(7), move || counter.set(counter.get() + 1));
        assert_eq!(sub.id().to_string(), "sub-7");
        sub.release();
        assert_eq!(calls.get(), 1);

        let counter = Rc::clone(&calls);
        {
            let _sub = Subscription::new(SubscriptionId(8), move || counter.set(counter.get() + 1));
        }
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_listeners_deliver_in_order() {
        let listeners = Listeners::<u32>::new();
        let mut live = listeners.subscribe_with(0);
        listeners.emit(1);
        listeners.emit(2);

        assert_eq!(live.try_next(), TryNext::Event(0));
        assert_eq!(live.try_next(), TryNext::Event(1));
        assert_eq!(live.try_next(), TryNext::Event(2));
        assert_eq!(live.try_next(), TryNext::Empty);
    }

    #[test]
    fn test_release_unregisters_listener() {
        let listeners = Listeners::<u32>::new();
        let first = listeners.subscribe_with(0);
        let second = listeners.subscribe_with(0);
        assert_ne!(first.id(), second.id());
        assert_eq!(listeners.active(), 2);

        first.release();
        assert_eq!(listeners.active(), 1);

        drop(second);
        assert_eq!(listeners.active(), 0);

        // Emitting with nobody listening is a no-op.
        listeners.emit(3);
        assert_eq!(listeners.active(), 0);
    }

    #[tokio::test]
    async fn test_next_waits_for_queued_event() {
        let listeners = Listeners::<&'static str>::new();
        let mut live = listeners.subscribe_with("hello");
        assert_eq!(live.next().await, Some("hello"));
        listeners.emit("again");
        assert_eq!(live.next().await, Some("again"));
    }
}
