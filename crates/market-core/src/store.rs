//! The market-state store.
//!
//! One [`MarketStore`] is the single source of truth for market data
//! (quotes, order books, chart history) and account data (positions,
//! orders, strategies, user) for one symbol universe.
//!
//! - All writes go through named operations on `&mut MarketStore`.
//! - Consumers read through [`MarketStore::state`] / [`MarketStore::snapshot`]
//!   or subscribe to a projection with [`MarketStore::subscribe`].
//! - Nothing here runs timers; the feed is driven from outside and hands
//!   its output in as [`MarketEvent`]s.
//!
//! Operations never panic. Precondition violations (unknown symbol,
//! non-positive price) come back as [`StoreError`] and leave the state
//! untouched. Cancelling or updating something that does not exist is a
//! no-op whose return value tells the caller nothing was found.

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::account::{ChartInterval, Strategy, Theme, User};
use crate::chart::{ChartHistory, ChartPoint};
use crate::error::StoreError;
use crate::messages::{MarketEvent, OrderBookUpdate, PriceUpdate};
use crate::order::{Order, OrderForm, OrderIdGenerator};
use crate::order_book::OrderBook;
use crate::position::{Position, PositionUpdate};
use crate::quote::PriceQuote;
use crate::selector::{Subscribers, Subscription};
use crate::status::ConnectionStatus;
use crate::symbol::Symbol;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Everything the store holds. Consumers only ever see this by shared
/// reference or as an owned clone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketState {
    pub user: User,
    pub prices: IndexMap<Symbol, PriceQuote>,
    pub order_books: IndexMap<Symbol, OrderBook>,
    pub chart_data: IndexMap<Symbol, ChartHistory>,
    pub selected_symbol: Symbol,
    pub positions: Vec<Position>,
    /// Newest first.
    pub orders: Vec<Order>,
    pub strategies: Vec<Strategy>,
    pub theme: Theme,
    pub chart_interval: ChartInterval,
    pub ws_status: ConnectionStatus,
    /// Time of the last price update, milliseconds since the Unix epoch.
    pub last_update: i64,
}

/// Owned copy of the state handed to readers outside the lock.
pub type MarketSnapshot = MarketState;

/// Initial contents of a store.
///
/// The symbol universe is the set of symbols in `quotes`. Books and chart
/// histories for symbols outside the universe are ignored; universe symbols
/// without one get an empty book and a one-point history at their quote.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSeed {
    pub user: User,
    pub quotes: Vec<PriceQuote>,
    pub order_books: IndexMap<Symbol, OrderBook>,
    pub chart_data: IndexMap<Symbol, ChartHistory>,
    pub positions: Vec<Position>,
    pub orders: Vec<Order>,
    pub strategies: Vec<Strategy>,
    /// Defaults to the first universe symbol.
    pub selected_symbol: Option<Symbol>,
}

impl MarketSeed {
    /// A seed with just quotes and an empty account.
    pub fn from_quotes(quotes: Vec<PriceQuote>) -> Self {
        MarketSeed {
            user: User {
                id: "1".to_string(),
                name: String::new(),
                email: String::new(),
                balance: 0.0,
                avatar: None,
            },
            quotes,
            order_books: IndexMap::new(),
            chart_data: IndexMap::new(),
            positions: Vec::new(),
            orders: Vec::new(),
            strategies: Vec::new(),
            selected_symbol: None,
        }
    }
}

/// The market-state store.
#[derive(Debug)]
pub struct MarketStore {
    state: MarketState,
    subscribers: Subscribers,
    order_ids: OrderIdGenerator,
    disposed: bool,
}

impl MarketStore {
    /// Build a store from `seed`.
    ///
    /// Fails if the seed has no quotes or a quote price that is not
    /// finite and positive.
    pub fn create(seed: MarketSeed) -> Result<Self, StoreError> {
        let MarketSeed {
            user,
            quotes,
            mut order_books,
            mut chart_data,
            positions,
            orders,
            strategies,
            selected_symbol,
        } = seed;

        if quotes.is_empty() {
            return Err(StoreError::EmptyUniverse);
        }

        let now = now_ms();
        let mut prices = IndexMap::with_capacity(quotes.len());
        let mut books = IndexMap::with_capacity(quotes.len());
        let mut charts = IndexMap::with_capacity(quotes.len());

        for quote in quotes {
            if !is_valid_price(quote.price) {
                return Err(StoreError::InvalidPrice {
                    symbol: quote.symbol,
                    price: quote.price,
                });
            }

            let symbol = quote.symbol.clone();
            let book = order_books.shift_remove(&symbol).unwrap_or_default();
            let chart = chart_data
                .shift_remove(&symbol)
                .filter(|history| !history.is_empty())
                .unwrap_or_else(|| {
                    ChartHistory::from_points([ChartPoint {
                        time: now,
                        price: quote.price,
                    }])
                });

            books.insert(symbol.clone(), book);
            charts.insert(symbol.clone(), chart);
            prices.insert(symbol, quote);
        }

        for symbol in order_books.keys().chain(chart_data.keys()) {
            warn!("Ignoring seed data for {} (not in the symbol universe)", symbol);
        }

        let selected_symbol = match selected_symbol {
            Some(symbol) if prices.contains_key(&symbol) => symbol,
            _ => prices
                .keys()
                .next()
                .cloned()
                .ok_or(StoreError::EmptyUniverse)?,
        };

        let mut order_ids = OrderIdGenerator::new();
        for order in &orders {
            order_ids.observe(&order.id);
        }

        debug!(
            "Created market store with {} symbols (selected {})",
            prices.len(),
            selected_symbol
        );

        Ok(MarketStore {
            state: MarketState {
                user,
                prices,
                order_books: books,
                chart_data: charts,
                selected_symbol,
                positions,
                orders,
                strategies,
                theme: Theme::default(),
                chart_interval: ChartInterval::default(),
                ws_status: ConnectionStatus::Disconnected,
                last_update: now,
            },
            subscribers: Subscribers::default(),
            order_ids,
            disposed: false,
        })
    }

    /// End all subscriptions and stop accepting writes.
    ///
    /// Reads keep returning the last state.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.subscribers.clear();
        self.disposed = true;
        debug!("Market store disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // -------------------------------------------------------------------------
    // Read contract
    // -------------------------------------------------------------------------

    pub fn state(&self) -> &MarketState {
        &self.state
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        self.state.clone()
    }

    /// Symbols of this store, in universe order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.state.prices.keys()
    }

    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.state.prices.contains_key(symbol)
    }

    pub fn quote(&self, symbol: &str) -> Option<&PriceQuote> {
        self.state.prices.get(symbol)
    }

    pub fn order_book(&self, symbol: &str) -> Option<&OrderBook> {
        self.state.order_books.get(symbol)
    }

    pub fn chart(&self, symbol: &str) -> Option<&ChartHistory> {
        self.state.chart_data.get(symbol)
    }

    pub fn selected_symbol(&self) -> &Symbol {
        &self.state.selected_symbol
    }

    pub fn orders(&self) -> &[Order] {
        &self.state.orders
    }

    pub fn order(&self, order_id: &str) -> Option<&Order> {
        self.state.orders.iter().find(|o| o.id == order_id)
    }

    pub fn positions(&self) -> &[Position] {
        &self.state.positions
    }

    pub fn ws_status(&self) -> ConnectionStatus {
        self.state.ws_status
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Watch a projection of the state. `on_change` runs after a write
    /// whenever `is_equal(previous, current)` is `false`.
    ///
    /// On a disposed store the returned handle is already inactive.
    pub fn subscribe<T, S, E, C>(&mut self, selector: S, is_equal: E, on_change: C) -> Subscription
    where
        T: Send + Sync + 'static,
        S: Fn(&MarketState) -> T + Send + Sync + 'static,
        E: Fn(&T, &T) -> bool + Send + Sync + 'static,
        C: FnMut(&T) + Send + Sync + 'static,
    {
        let subscription = self
            .subscribers
            .add(&self.state, selector, is_equal, on_change);
        if self.disposed {
            self.subscribers.clear();
        }
        subscription
    }

    /// [`subscribe`](Self::subscribe) using `PartialEq` as the comparison.
    pub fn subscribe_eq<T, S, C>(&mut self, selector: S, on_change: C) -> Subscription
    where
        T: PartialEq + Send + Sync + 'static,
        S: Fn(&MarketState) -> T + Send + Sync + 'static,
        C: FnMut(&T) + Send + Sync + 'static,
    {
        self.subscribe(selector, |a: &T, b: &T| a == b, on_change)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn notify(&mut self) {
        self.subscribers.notify(&self.state);
    }

    fn ensure_live(&self) -> Result<(), StoreError> {
        if self.disposed {
            debug!("Ignoring write to a disposed store");
            return Err(StoreError::Disposed);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Feed-driven writes
    // -------------------------------------------------------------------------

    /// Set a new last price for `symbol`.
    ///
    /// Nudges `change_24h` (see [`PriceQuote::apply_price`]), appends the
    /// price to the symbol's chart history (evicting the oldest point past
    /// 150) and stamps `last_update`.
    pub fn update_price(&mut self, symbol: &str, new_price: f64) -> Result<(), StoreError> {
        self.apply_price(symbol, new_price)?;
        self.notify();
        Ok(())
    }

    /// Replace the order book for `symbol`.
    pub fn update_order_book(&mut self, symbol: &str, book: OrderBook) -> Result<(), StoreError> {
        self.apply_order_book(symbol, book)?;
        self.notify();
        Ok(())
    }

    /// Apply one feed event.
    pub fn process_event(&mut self, event: MarketEvent) -> Result<(), StoreError> {
        self.apply_event(event)?;
        self.notify();
        Ok(())
    }

    /// Apply one tick's worth of events in order, notifying subscribers
    /// once at the end.
    ///
    /// Events that fail their preconditions are skipped and logged; the
    /// rest still apply. Returns the number of events applied.
    pub fn apply_tick(&mut self, events: impl IntoIterator<Item = MarketEvent>) -> usize {
        if self.ensure_live().is_err() {
            return 0;
        }

        let mut applied = 0;
        for event in events {
            let symbol = event.symbol().clone();
            match self.apply_event(event) {
                Ok(()) => applied += 1,
                Err(e) => warn!("Dropping feed event for {}: {}", symbol, e),
            }
        }

        if applied > 0 {
            self.notify();
        }
        applied
    }

    fn apply_event(&mut self, event: MarketEvent) -> Result<(), StoreError> {
        match event {
            MarketEvent::PriceUpdate(PriceUpdate { symbol, price }) => {
                self.apply_price(symbol.as_str(), price)
            }
            MarketEvent::OrderBookUpdate(OrderBookUpdate { symbol, book }) => {
                self.apply_order_book(symbol.as_str(), book)
            }
        }
    }

    fn apply_price(&mut self, symbol: &str, new_price: f64) -> Result<(), StoreError> {
        self.ensure_live()?;

        if !is_valid_price(new_price) {
            return Err(StoreError::InvalidPrice {
                symbol: Symbol::from(symbol),
                price: new_price,
            });
        }

        let quote = self
            .state
            .prices
            .get_mut(symbol)
            .ok_or_else(|| StoreError::UnknownSymbol(Symbol::from(symbol)))?;
        quote.apply_price(new_price);

        let point = self
            .state
            .chart_data
            .entry(quote.symbol.clone())
            .or_default()
            .push(now_ms(), new_price);
        self.state.last_update = point.time;
        Ok(())
    }

    fn apply_order_book(&mut self, symbol: &str, book: OrderBook) -> Result<(), StoreError> {
        self.ensure_live()?;

        let slot = self
            .state
            .order_books
            .get_mut(symbol)
            .ok_or_else(|| StoreError::UnknownSymbol(Symbol::from(symbol)))?;
        *slot = book;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // User commands
    // -------------------------------------------------------------------------

    pub fn set_selected_symbol(&mut self, symbol: &str) -> Result<(), StoreError> {
        self.ensure_live()?;
        let symbol = self
            .state
            .prices
            .get_key_value(symbol)
            .map(|(key, _)| key.clone())
            .ok_or_else(|| StoreError::UnknownSymbol(Symbol::from(symbol)))?;

        self.state.selected_symbol = symbol;
        self.notify();
        Ok(())
    }

    pub fn set_chart_interval(&mut self, interval: ChartInterval) {
        if self.ensure_live().is_err() {
            return;
        }
        self.state.chart_interval = interval;
        self.notify();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if self.ensure_live().is_err() {
            return;
        }
        self.state.theme = theme;
        self.notify();
    }

    /// Record a new order from `form` and return it.
    ///
    /// The order is `open`, has nothing filled, and is placed at the front
    /// of the order list. No business rules are checked here.
    pub fn place_order(&mut self, form: OrderForm) -> Result<Order, StoreError> {
        self.ensure_live()?;

        let now = now_ms();
        let id = self.order_ids.next_id(now);
        let order = form.into_order(id, now);

        debug!(
            "Placed order {}: {} {} {} @ {}",
            order.id,
            order.side.as_str(),
            order.quantity,
            order.symbol,
            order.price
        );

        self.state.orders.insert(0, order.clone());
        self.notify();
        Ok(order)
    }

    /// Remove the order with `order_id`.
    ///
    /// Returns the removed order, or `None` if there was no such order (in
    /// which case nothing changes and no one is notified).
    pub fn cancel_order(&mut self, order_id: &str) -> Option<Order> {
        if self.ensure_live().is_err() {
            return None;
        }

        let idx = match self.state.orders.iter().position(|o| o.id == order_id) {
            Some(idx) => idx,
            None => {
                debug!("Cancel for unknown order {} ignored", order_id);
                return None;
            }
        };

        let order = self.state.orders.remove(idx);
        debug!("Cancelled order {}", order.id);
        self.notify();
        Some(order)
    }

    /// Merge `update` into the position with `position_id`.
    ///
    /// Returns `false` (and changes nothing) if there is no such position.
    /// An empty update finds the position but notifies no one.
    pub fn update_position(&mut self, position_id: &str, update: &PositionUpdate) -> bool {
        if self.ensure_live().is_err() {
            return false;
        }

        let Some(position) = self
            .state
            .positions
            .iter_mut()
            .find(|p| p.id == position_id)
        else {
            debug!("Update for unknown position {} ignored", position_id);
            return false;
        };

        if update.is_empty() {
            return true;
        }

        update.apply_to(position);
        self.notify();
        true
    }

    /// Overwrite the connection status.
    ///
    /// The connection controller is the only intended writer. Transitions
    /// outside the documented state machine are applied anyway but logged.
    pub fn set_ws_status(&mut self, status: ConnectionStatus) {
        if self.ensure_live().is_err() {
            return;
        }

        let current = self.state.ws_status;
        if !current.can_transition_to(status) {
            warn!("Unexpected connection status change: {} -> {}", current, status);
        }
        if current == status {
            return;
        }

        self.state.ws_status = status;
        self.notify();
    }
}

fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}
