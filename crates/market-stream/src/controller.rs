//! Streaming connection controller.
//!
//! Owns the tick timer and the reconnect timer for one [`SharedStore`]:
//!
//! - `connect` moves the store to `connecting`, starts a periodic ticker
//!   and moves to `connected`. The first tick fires one full interval
//!   after connecting.
//! - every tick takes the feed and the store write lock together, asks the
//!   feed for the next batch and applies it in one step. Subscribers see
//!   the whole batch at once.
//! - `disconnect` stops the ticker and any pending reconnect, then moves
//!   to `disconnected`. No tick lands after it returns.
//! - `schedule_reconnect` arms a single delayed `connect`. Arming again
//!   replaces the previous timer.
//! - a feed error moves the store to `error` and arms a reconnect.
//!
//! Background tasks only hold a weak reference to the controller. Dropping
//! the last handle aborts both timers.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use market_core::{ConnectionStatus, SharedStore};
use market_feed::{FeedError, MarketFeed};
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, StreamConfig};

/// Default delay before a scheduled reconnect fires.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(5000);

#[derive(Default)]
struct Tasks {
    ticker: Option<JoinHandle<()>>,
    reconnect: Option<JoinHandle<()>>,
    // Bumped whenever the pending reconnect is replaced or cancelled.
    reconnect_generation: u64,
}

struct Inner<F> {
    store: SharedStore,
    feed: Arc<Mutex<F>>,
    tick_interval: Duration,
    reconnect_delay: Duration,
    tasks: Mutex<Tasks>,
    connect_calls: AtomicU64,
}

/// Cloneable handle driving a store from a [`MarketFeed`].
pub struct ConnectionController<F> {
    inner: Arc<Inner<F>>,
}

impl<F> Clone for ConnectionController<F> {
    fn clone(&self) -> Self {
        ConnectionController {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: MarketFeed + 'static> ConnectionController<F> {
    /// Controller ticking at the feed's own cadence with the default
    /// reconnect delay.
    pub fn new(store: SharedStore, feed: F) -> Result<Self, ConfigError> {
        let tick_interval = feed.tick_interval();
        ConnectionController::with_timing(store, feed, tick_interval, DEFAULT_RECONNECT_DELAY)
    }

    pub fn from_config(
        store: SharedStore,
        feed: F,
        config: &StreamConfig,
    ) -> Result<Self, ConfigError> {
        ConnectionController::with_timing(
            store,
            feed,
            config.tick_interval(),
            config.reconnect_delay(),
        )
    }

    /// Both durations must be non-zero.
    pub fn with_timing(
        store: SharedStore,
        feed: F,
        tick_interval: Duration,
        reconnect_delay: Duration,
    ) -> Result<Self, ConfigError> {
        if tick_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("tick interval"));
        }
        if reconnect_delay.is_zero() {
            return Err(ConfigError::ZeroInterval("reconnect delay"));
        }

        Ok(ConnectionController {
            inner: Arc::new(Inner {
                store,
                feed: Arc::new(Mutex::new(feed)),
                tick_interval,
                reconnect_delay,
                tasks: Mutex::new(Tasks::default()),
                connect_calls: AtomicU64::new(0),
            }),
        })
    }

    pub fn store(&self) -> &SharedStore {
        &self.inner.store
    }

    /// Start ticking. A no-op while a ticker is already running.
    pub async fn connect(&self) {
        self.inner.connect(None).await
    }

    /// Stop ticking and cancel any pending reconnect.
    pub async fn disconnect(&self) {
        self.inner.disconnect().await
    }

    /// Arm a delayed `connect`, replacing any reconnect already pending.
    pub async fn schedule_reconnect(&self) {
        let mut tasks = self.inner.tasks.lock().await;
        self.inner.arm_reconnect(&mut tasks);
    }

    /// Tear down every timer. Equivalent to [`disconnect`](Self::disconnect).
    pub async fn shutdown(&self) {
        info!("Shutting down stream");
        self.inner.disconnect().await
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.inner.store.status().await
    }

    /// Number of `connect` invocations, manual or from a reconnect timer.
    /// Timers replaced before they fired are not counted.
    pub fn connect_calls(&self) -> u64 {
        self.inner.connect_calls.load(Ordering::SeqCst)
    }

    pub async fn is_connected(&self) -> bool {
        let tasks = self.inner.tasks.lock().await;
        is_running(&tasks.ticker)
    }

    pub async fn is_reconnect_pending(&self) -> bool {
        let tasks = self.inner.tasks.lock().await;
        is_running(&tasks.reconnect)
    }
}

impl<F: MarketFeed + 'static> Inner<F> {
    /// `generation` is set when called from a reconnect timer; the call is
    /// dropped if that timer was replaced or cancelled in the meantime.
    async fn connect(self: &Arc<Self>, generation: Option<u64>) {
        let mut tasks = self.tasks.lock().await;
        if let Some(generation) = generation {
            if tasks.reconnect_generation != generation {
                debug!("Stale reconnect timer, ignoring");
                return;
            }
            // Our own handle; dropping it detaches without aborting.
            tasks.reconnect.take();
        }
        self.connect_calls.fetch_add(1, Ordering::SeqCst);

        if is_running(&tasks.ticker) {
            debug!("Already connected");
            return;
        }
        if let Some(finished) = tasks.ticker.take() {
            report_join("ticker", finished.await);
        }

        {
            let feed = self.feed.lock().await;
            let store = self.store.read().await;
            for symbol in feed.symbols() {
                if !store.contains_symbol(symbol.as_str()) {
                    warn!("Feed publishes {} but the store does not quote it", symbol);
                }
            }
        }

        self.store
            .write()
            .await
            .set_ws_status(ConnectionStatus::Connecting);

        tasks.ticker = Some(tokio::spawn(run_ticker(
            Arc::downgrade(self),
            self.store.clone(),
            Arc::clone(&self.feed),
            self.tick_interval,
        )));

        self.store
            .write()
            .await
            .set_ws_status(ConnectionStatus::Connected);
        info!("Stream connected (tick every {:?})", self.tick_interval);
    }

    fn connect_boxed(self: Arc<Self>, generation: u64) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async move { self.connect(Some(generation)).await })
    }

    async fn disconnect(&self) {
        let mut tasks = self.tasks.lock().await;

        if let Some(ticker) = tasks.ticker.take() {
            ticker.abort();
            // Wait for an in-flight tick to finish or be cancelled.
            report_join("ticker", ticker.await);
        }
        if let Some(reconnect) = tasks.reconnect.take() {
            reconnect.abort();
            report_join("reconnect timer", reconnect.await);
        }
        tasks.reconnect_generation += 1;

        self.store
            .write()
            .await
            .set_ws_status(ConnectionStatus::Disconnected);
        info!("Stream disconnected");
    }

    fn arm_reconnect(self: &Arc<Self>, tasks: &mut Tasks) {
        if let Some(previous) = tasks.reconnect.take() {
            previous.abort();
        }
        tasks.reconnect_generation += 1;

        let generation = tasks.reconnect_generation;
        let delay = self.reconnect_delay;
        let controller = Arc::downgrade(self);

        tasks.reconnect = Some(tokio::spawn(async move {
            sleep(delay).await;
            if let Some(inner) = controller.upgrade() {
                info!("Reconnecting");
                inner.connect_boxed(generation).await;
            }
        }));
        debug!("Reconnect scheduled in {:?}", delay);
    }

    async fn on_feed_error(self: &Arc<Self>, err: FeedError) {
        warn!("Feed failed: {}", err);

        let mut tasks = self.tasks.lock().await;
        // This task is the ticker; release its slot so `connect` can start
        // a new one.
        tasks.ticker.take();

        self.store
            .write()
            .await
            .set_ws_status(ConnectionStatus::Error);
        self.arm_reconnect(&mut tasks);
    }
}

impl<F> Drop for Inner<F> {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut();
        if let Some(ticker) = tasks.ticker.take() {
            ticker.abort();
        }
        if let Some(reconnect) = tasks.reconnect.take() {
            reconnect.abort();
        }

        if let Some(mut store) = self.store.try_write() {
            if store.ws_status() != ConnectionStatus::Disconnected {
                store.set_ws_status(ConnectionStatus::Disconnected);
            }
        }
    }
}

fn report_join(task: &str, result: Result<(), JoinError>) {
    if let Err(err) = result {
        if err.is_panic() {
            warn!("Stream {} panicked: {}", task, err);
        }
    }
}

fn is_running(handle: &Option<JoinHandle<()>>) -> bool {
    handle.as_ref().is_some_and(|h| !h.is_finished())
}

async fn run_ticker<F: MarketFeed + 'static>(
    controller: Weak<Inner<F>>,
    store: SharedStore,
    feed: Arc<Mutex<F>>,
    period: Duration,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let result = {
            let mut feed = feed.lock().await;
            let mut store = store.write().await;
            if store.is_disposed() {
                debug!("Store disposed, ticker exiting");
                return;
            }
            feed.next_tick(store.state())
                .map(|events| store.apply_tick(events))
        };

        match result {
            Ok(applied) => debug!("Tick applied {} events", applied),
            Err(err) => {
                if let Some(inner) = controller.upgrade() {
                    inner.on_feed_error(err).await;
                }
                return;
            }
        }
    }
}
