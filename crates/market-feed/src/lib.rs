//! market-feed
//!
//! Simulated market data:
//! - the fixed symbol [`Universe`]
//! - the [`MarketFeed`] contract and the random-walk [`SimulatedFeed`]
//! - demo seed data for a fresh store
//!
//! Everything here is synchronous; `market-stream` owns the timers.

pub mod error;
pub mod generator;
pub mod seed;
pub mod universe;

pub use error::FeedError;
pub use generator::{
    perturb_price, synthesize_order_book, MarketFeed, SimulatedFeed, BOOK_DEPTH,
    DEFAULT_TICK_INTERVAL, PRICE_JITTER,
};
pub use seed::demo_seed;
pub use universe::{Instrument, Universe};
