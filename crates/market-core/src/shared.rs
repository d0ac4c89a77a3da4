//! Cloneable handle to a store shared between tasks.
//!
//! Every method takes the lock once, runs one store operation to
//! completion and releases it. Nothing awaits while the lock is held, so
//! each operation is atomic with respect to every other reader and writer.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::account::{ChartInterval, Theme};
use crate::error::StoreError;
use crate::order::{Order, OrderForm};
use crate::position::PositionUpdate;
use crate::selector::Subscription;
use crate::store::{MarketSeed, MarketSnapshot, MarketState, MarketStore};
use crate::status::ConnectionStatus;

#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<RwLock<MarketStore>>,
}

impl SharedStore {
    pub fn new(store: MarketStore) -> Self {
        SharedStore {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn create(seed: MarketSeed) -> Result<Self, StoreError> {
        MarketStore::create(seed).map(SharedStore::new)
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, MarketStore> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, MarketStore> {
        self.inner.write().await
    }

    /// Non-blocking write access, for use from `Drop`.
    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, MarketStore>> {
        self.inner.try_write().ok()
    }

    pub async fn snapshot(&self) -> MarketSnapshot {
        self.inner.read().await.snapshot()
    }

    /// Run `f` against the current state under the read lock.
    pub async fn select<T>(&self, f: impl FnOnce(&MarketState) -> T) -> T {
        f(self.inner.read().await.state())
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.inner.read().await.ws_status()
    }

    /// Record a new order.
    ///
    /// Asynchronous so a networked implementation can suspend between
    /// request and response. Rejects with [`StoreError::Disposed`] once the
    /// store is disposed.
    pub async fn place_order(&self, form: OrderForm) -> Result<Order, StoreError> {
        self.inner.write().await.place_order(form)
    }

    pub async fn cancel_order(&self, order_id: &str) -> Option<Order> {
        self.inner.write().await.cancel_order(order_id)
    }

    pub async fn update_position(&self, position_id: &str, update: &PositionUpdate) -> bool {
        self.inner.write().await.update_position(position_id, update)
    }

    pub async fn set_selected_symbol(&self, symbol: &str) -> Result<(), StoreError> {
        self.inner.write().await.set_selected_symbol(symbol)
    }

    pub async fn set_chart_interval(&self, interval: ChartInterval) {
        self.inner.write().await.set_chart_interval(interval)
    }

    pub async fn set_theme(&self, theme: Theme) {
        self.inner.write().await.set_theme(theme)
    }

    pub async fn subscribe_eq<T, S, C>(&self, selector: S, on_change: C) -> Subscription
    where
        T: PartialEq + Send + Sync + 'static,
        S: Fn(&MarketState) -> T + Send + Sync + 'static,
        C: FnMut(&T) + Send + Sync + 'static,
    {
        self.inner.write().await.subscribe_eq(selector, on_change)
    }

    pub async fn dispose(&self) {
        self.inner.write().await.dispose()
    }
}
