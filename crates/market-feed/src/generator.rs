//! Tick generation.
//!
//! [`MarketFeed`] is the contract the connection controller drives: a
//! symbol list, a cadence, and a way to turn the current store state into
//! the next batch of [`MarketEvent`]s. [`SimulatedFeed`] is the random-walk
//! implementation.
//!
//! One simulated tick:
//! - every universe symbol's price moves by a factor of
//!   `1 + (u - 0.5) * 0.001` with `u` uniform in `[0, 1)`, i.e. at most
//!   ±0.05%;
//! - the selected symbol gets a fresh book of [`BOOK_DEPTH`] levels per
//!   side around its new price.

use std::time::Duration;

use market_core::{BookLevel, MarketEvent, MarketState, OrderBook, Symbol};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::FeedError;
use crate::universe::Universe;

/// Default tick cadence.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Maximum relative move per tick, either direction, is half of this.
pub const PRICE_JITTER: f64 = 0.001;

/// Levels per side in a synthesized book.
pub const BOOK_DEPTH: usize = 15;

/// A source of market-data ticks.
pub trait MarketFeed: Send {
    /// Symbols this feed publishes.
    fn symbols(&self) -> &[Symbol];

    /// Time between ticks.
    fn tick_interval(&self) -> Duration;

    /// Produce the next tick given the current store state.
    fn next_tick(&mut self, state: &MarketState) -> Result<Vec<MarketEvent>, FeedError>;
}

/// Move `price` by a random factor in `[1 - PRICE_JITTER/2, 1 + PRICE_JITTER/2)`.
pub fn perturb_price<R: Rng + ?Sized>(rng: &mut R, price: f64) -> f64 {
    price * (1.0 + (rng.gen::<f64>() - 0.5) * PRICE_JITTER)
}

/// Build a book of `depth` levels per side around `mid`.
///
/// Level `i` sits in `(mid - step*(i+1), mid - step*i]` on the bid side and
/// `[mid + step*i, mid + step*(i+1))` on the ask side, so bids come out
/// strictly descending and asks strictly ascending. Quantities are uniform
/// in `[0, 2)`; `total` is the level price times an independent draw from
/// the same range.
pub fn synthesize_order_book<R: Rng + ?Sized>(
    rng: &mut R,
    mid: f64,
    step: f64,
    depth: usize,
) -> OrderBook {
    let mut bids = Vec::with_capacity(depth);
    let mut asks = Vec::with_capacity(depth);
    for i in 0..depth {
        let price = mid - step * i as f64 - step * rng.gen::<f64>();
        bids.push(random_level(rng, price));
    }
    for i in 0..depth {
        let price = mid + step * i as f64 + step * rng.gen::<f64>();
        asks.push(random_level(rng, price));
    }

    OrderBook::new(bids, asks)
}

fn random_level<R: Rng + ?Sized>(rng: &mut R, price: f64) -> BookLevel {
    let quantity = rng.gen::<f64>() * 2.0;
    let total = price * rng.gen::<f64>() * 2.0;
    BookLevel::new(price, quantity, total)
}

/// Random-walk feed over a fixed universe.
#[derive(Debug)]
pub struct SimulatedFeed<R = StdRng> {
    universe: Universe,
    interval: Duration,
    rng: R,
}

impl SimulatedFeed<StdRng> {
    /// Feed with an OS-seeded RNG.
    pub fn new(universe: Universe) -> Self {
        SimulatedFeed::with_rng(universe, StdRng::from_entropy())
    }

    /// Deterministic feed for tests and replays.
    pub fn seeded(universe: Universe, seed: u64) -> Self {
        SimulatedFeed::with_rng(universe, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SimulatedFeed<R> {
    pub fn with_rng(universe: Universe, rng: R) -> Self {
        SimulatedFeed {
            universe,
            interval: DEFAULT_TICK_INTERVAL,
            rng,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Level spacing for `symbol`'s book. Symbols outside the universe use
    /// one hundred-thousandth of the price.
    fn book_step(&self, symbol: &str, mid: f64) -> f64 {
        self.universe
            .get(symbol)
            .map(|i| i.tick_size)
            .unwrap_or(mid * 0.00001)
    }
}

impl<R: Rng + Send> MarketFeed for SimulatedFeed<R> {
    fn symbols(&self) -> &[Symbol] {
        self.universe.symbols()
    }

    fn tick_interval(&self) -> Duration {
        self.interval
    }

    fn next_tick(&mut self, state: &MarketState) -> Result<Vec<MarketEvent>, FeedError> {
        let mut events = Vec::with_capacity(self.universe.len() + 1);
        let selected = &state.selected_symbol;
        let mut selected_price = state.prices.get(selected).map(|q| q.price);

        for instrument in self.universe.instruments() {
            // Symbols the store does not quote are skipped.
            let Some(quote) = state.prices.get(&instrument.symbol) else {
                continue;
            };
            let price = perturb_price(&mut self.rng, quote.price);
            if instrument.symbol == *selected {
                selected_price = Some(price);
            }
            events.push(MarketEvent::price(instrument.symbol.clone(), price));
        }

        if let Some(mid) = selected_price {
            let step = self.book_step(selected.as_str(), mid);
            let book = synthesize_order_book(&mut self.rng, mid, step, BOOK_DEPTH);
            events.push(MarketEvent::order_book(selected.clone(), book));
        } else {
            debug!("No quote for selected symbol {}, skipping book", selected);
        }

        Ok(events)
    }
}
