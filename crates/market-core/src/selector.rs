//! Selector subscriptions over the store state.
//!
//! A consumer registers:
//! - a *selector*: a pure projection `Fn(&MarketState) -> T`,
//! - an *equality* function deciding whether two projections are the same,
//! - an *on_change* callback.
//!
//! After every successful write the store re-runs each selector and calls
//! `on_change` only when the projection differs from the previous one. The
//! initial projection is taken at subscribe time and is not reported.
//!
//! Writes are applied synchronously, so a write that changes a projection
//! produces exactly one notification. A batch of writes (one feed tick) is
//! reported once, with the final value.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::store::MarketState;

/// Identifier for a live subscription, unique within one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Unsubscribe handle returned by `subscribe`.
///
/// Dropping the handle ends the subscription. Use [`Subscription::detach`]
/// to keep a subscription alive for the lifetime of the store.
///
/// Ending a subscription only flips a shared flag, so it is fine to do so
/// from inside any `on_change` callback.
#[derive(Debug)]
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: SubscriptionId,
    active: Arc<AtomicBool>,
    detached: bool,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// `false` once unsubscribed or once the store was disposed.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn unsubscribe(self) {
        // Drop does the work.
    }

    /// Keep the subscription alive without holding the handle.
    pub fn detach(mut self) {
        self.detached = true;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.detached {
            self.active.store(false, Ordering::Release);
        }
    }
}

/// Type-erased subscription entry held by the store.
trait Watcher: Send + Sync {
    fn is_active(&self) -> bool;
    fn deactivate(&self);
    fn check(&mut self, state: &MarketState);
}

struct Watch<T, S, E, C> {
    selector: S,
    is_equal: E,
    on_change: C,
    last: T,
    active: Arc<AtomicBool>,
}

impl<T, S, E, C> Watcher for Watch<T, S, E, C>
where
    T: Send + Sync,
    S: Fn(&MarketState) -> T + Send + Sync,
    E: Fn(&T, &T) -> bool + Send + Sync,
    C: FnMut(&T) + Send + Sync,
{
    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    fn check(&mut self, state: &MarketState) {
        let next = (self.selector)(state);
        if (self.is_equal)(&self.last, &next) {
            return;
        }
        self.last = next;
        (self.on_change)(&self.last);
    }
}

/// The store's subscription registry.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    watchers: Vec<Box<dyn Watcher>>,
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("next_id", &self.next_id)
            .field("watchers", &self.watchers.len())
            .finish()
    }
}

impl Subscribers {
    pub(crate) fn add<T, S, E, C>(
        &mut self,
        state: &MarketState,
        selector: S,
        is_equal: E,
        on_change: C,
    ) -> Subscription
    where
        T: Send + Sync + 'static,
        S: Fn(&MarketState) -> T + Send + Sync + 'static,
        E: Fn(&T, &T) -> bool + Send + Sync + 'static,
        C: FnMut(&T) + Send + Sync + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        let active = Arc::new(AtomicBool::new(true));

        let last = selector(state);
        self.watchers.push(Box::new(Watch {
            selector,
            is_equal,
            on_change,
            last,
            active: Arc::clone(&active),
        }));

        Subscription {
            id,
            active,
            detached: false,
        }
    }

    /// Re-project every live subscription against `state`.
    pub(crate) fn notify(&mut self, state: &MarketState) {
        self.watchers.retain(|w| w.is_active());
        for watcher in self.watchers.iter_mut() {
            // A callback earlier in this pass may have ended this one.
            if watcher.is_active() {
                watcher.check(state);
            }
        }
    }

    /// End every subscription.
    pub(crate) fn clear(&mut self) {
        for watcher in self.watchers.drain(..) {
            watcher.deactivate();
        }
    }

    /// Number of live subscriptions.
    pub(crate) fn len(&self) -> usize {
        self.watchers.iter().filter(|w| w.is_active()).count()
    }
}
