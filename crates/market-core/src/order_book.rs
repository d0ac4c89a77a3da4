//! Display order book: a list of levels per side.
//!
//! Unlike a matching book this holds no orders, only what the feed last
//! published. Bids are kept best-first (descending price), asks best-first
//! (ascending price). The store replaces a book wholesale on every update;
//! there is no merge or diff.

use serde::{Deserialize, Serialize};

/// One row on either side of the book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: f64,
    pub quantity: f64,
    /// Display aggregate (price times a quantity-like magnitude). This is
    /// not a cumulative depth sum.
    pub total: f64,
}

impl BookLevel {
    pub fn new(price: f64, quantity: f64, total: f64) -> Self {
        BookLevel {
            price,
            quantity,
            total,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    /// Descending by price.
    pub bids: Vec<BookLevel>,
    /// Ascending by price.
    pub asks: Vec<BookLevel>,
}

impl OrderBook {
    pub fn new(bids: Vec<BookLevel>, asks: Vec<BookLevel>) -> Self {
        OrderBook { bids, asks }
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    pub fn best_bid(&self) -> Option<&BookLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&BookLevel> {
        self.asks.first()
    }

    /// Best ask minus best bid, if both sides are present.
    pub fn spread(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.price - bid.price),
            _ => None,
        }
    }

    /// `true` if bids are non-increasing and asks non-decreasing.
    pub fn is_sorted(&self) -> bool {
        self.bids.windows(2).all(|w| w[0].price >= w[1].price)
            && self.asks.windows(2).all(|w| w[0].price <= w[1].price)
    }
}
